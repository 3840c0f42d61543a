//! Product list query: filters, search terms and ordering parsed from query parameters.

use crate::error::{AppError, FieldErrors};
use serde::Deserialize;
use utoipa::IntoParams;

pub const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_FILTER_NUMBER: &str = "Enter a number.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Price,
    CreatedAt,
    Name,
}

impl SortField {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "price" => Some(SortField::Price),
            "created_at" => Some(SortField::CreatedAt),
            "name" => Some(SortField::Name),
            _ => None,
        }
    }

    /// Column on the products table.
    pub fn column(self) -> &'static str {
        match self {
            SortField::Price => "price",
            SortField::CreatedAt => "created_at",
            SortField::Name => "name",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

/// Newest first.
pub const DEFAULT_ORDERING: SortKey = SortKey {
    field: SortField::CreatedAt,
    descending: true,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductFilter {
    pub category: Option<i64>,
    pub stock_quantity: Option<i64>,
    /// Every term must appear in the name or the description (case-insensitive).
    pub search_terms: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProductQuery {
    pub filter: ProductFilter,
    /// Never empty; id ascending is the implicit final tie-breaker.
    pub ordering: Vec<SortKey>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        ProductQuery {
            filter: ProductFilter::default(),
            ordering: vec![DEFAULT_ORDERING],
        }
    }
}

/// Query parameters accepted by the product list endpoint.
#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListParams {
    /// Exact category id.
    pub category: Option<String>,
    /// Exact stock quantity.
    pub stock_quantity: Option<String>,
    /// Case-insensitive match on name or description; whitespace or comma separated terms.
    pub search: Option<String>,
    /// Comma separated list of `price`, `created_at`, `name`; prefix `-` for descending.
    pub ordering: Option<String>,
    /// 1-based page number or `last`.
    pub page: Option<String>,
    /// Items per page, capped by the server maximum.
    pub page_size: Option<String>,
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ProductListParams {
    pub fn to_query(&self) -> Result<ProductQuery, AppError> {
        let mut errors = FieldErrors::new();

        let category = non_empty(&self.category).and_then(|s| match s.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add("category", INVALID_CHOICE);
                None
            }
        });
        let stock_quantity = non_empty(&self.stock_quantity).and_then(|s| match s.parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => {
                errors.add("stock_quantity", INVALID_FILTER_NUMBER);
                None
            }
        });
        errors.into_result()?;

        Ok(ProductQuery {
            filter: ProductFilter {
                category,
                stock_quantity,
                search_terms: self.search.as_deref().map(search_terms).unwrap_or_default(),
            },
            ordering: self.ordering.as_deref().map(ordering).unwrap_or_else(|| vec![DEFAULT_ORDERING]),
        })
    }
}

/// Split on whitespace and commas; terms are lowercased.
pub fn search_terms(raw: &str) -> Vec<String> {
    raw.replace('\0', "")
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Unknown fields are dropped; falls back to the default when nothing valid remains.
pub fn ordering(raw: &str) -> Vec<SortKey> {
    let mut keys: Vec<SortKey> = Vec::new();
    for term in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let (descending, name) = match term.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, term),
        };
        if let Some(field) = SortField::parse(name) {
            if !keys.iter().any(|k| k.field == field) {
                keys.push(SortKey { field, descending });
            }
        }
    }
    if keys.is_empty() {
        keys.push(DEFAULT_ORDERING);
    }
    keys
}
