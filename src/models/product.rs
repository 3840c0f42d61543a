//! Product rows and the payloads that create or change them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Product as returned by the API, joined with its category name and creator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Product {
    pub id: i64,
    #[schema(example = "Phone")]
    pub name: String,
    pub description: String,
    #[schema(value_type = String, example = "299.99")]
    pub price: Decimal,
    pub stock_quantity: i32,
    /// Category id.
    pub category: i64,
    pub category_name: String,
    /// Username of the creator.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Raw request body; fields are checked by the product validator.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct ProductPayload {
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "Phone")]
    pub name: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "A phone")]
    pub description: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "299.99")]
    pub price: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<i32>, example = 10)]
    pub stock_quantity: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<i64>, example = 1)]
    pub category: Option<Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub category_id: i64,
    pub created_by: i64,
}

/// Partial update; `None` leaves the column unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub category_id: Option<i64>,
}
