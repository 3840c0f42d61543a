//! Builds the parameterized product list and count queries. Identifiers come from fixed
//! enums only; user input is always bound.

use crate::service::{ProductFilter, ProductQuery, SortField, SortKey};
use crate::sql::BindValue;

/// Columns of the API product shape, read from `p` (products) joined with `c` and `u`.
pub const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.price, p.stock_quantity, \
     p.category_id AS category, c.name AS category_name, u.username AS created_by, p.created_at";

pub const PRODUCT_JOINS: &str = "JOIN categories c ON c.id = p.category_id JOIN users u ON u.id = p.created_by";

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf::default()
    }

    fn push_param(&mut self, v: BindValue) -> u32 {
        self.params.push(v);
        self.params.len() as u32
    }
}

/// `%` and `_` in a search term match literally.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// WHERE clause (with leading space) for the filter, or empty. Conditions are ANDed;
/// each search term may match name or description.
fn where_clause(filter: &ProductFilter, q: &mut QueryBuf) -> String {
    let mut parts = Vec::new();
    if let Some(category) = filter.category {
        let n = q.push_param(BindValue::BigInt(category));
        parts.push(format!("p.{} = ${}::bigint", quoted("category_id"), n));
    }
    if let Some(stock) = filter.stock_quantity {
        let n = q.push_param(BindValue::BigInt(stock));
        parts.push(format!("p.{} = ${}::bigint", quoted("stock_quantity"), n));
    }
    for term in &filter.search_terms {
        let n = q.push_param(BindValue::Text(like_pattern(term)));
        parts.push(format!(
            "(p.{} ILIKE ${n}::text OR p.{} ILIKE ${n}::text)",
            quoted("name"),
            quoted("description"),
        ));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", parts.join(" AND "))
    }
}

/// Names sort by code point whatever the database locale.
fn order_clause(ordering: &[SortKey]) -> String {
    let mut keys: Vec<String> = ordering
        .iter()
        .map(|k| {
            format!(
                "p.{}{} {}",
                quoted(k.field.column()),
                if k.field == SortField::Name { " COLLATE \"C\"" } else { "" },
                if k.descending { "DESC" } else { "ASC" }
            )
        })
        .collect();
    keys.push(format!("p.{} ASC", quoted("id")));
    format!(" ORDER BY {}", keys.join(", "))
}

/// SELECT one window of products matching the query.
pub fn select_products(query: &ProductQuery, offset: u64, limit: u64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(&query.filter, &mut q);
    q.sql = format!(
        "SELECT {} FROM products p {}{}{} LIMIT {} OFFSET {}",
        PRODUCT_COLUMNS,
        PRODUCT_JOINS,
        where_sql,
        order_clause(&query.ordering),
        limit,
        offset
    );
    q
}

/// COUNT of products matching the filter.
pub fn count_products(filter: &ProductFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let where_sql = where_clause(filter, &mut q);
    q.sql = format!("SELECT COUNT(*) FROM products p{}", where_sql);
    q
}
