//! Categories: the grouping every product belongs to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Category {
    pub id: i64,
    #[schema(example = "Electronics")]
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Raw request body; fields are checked by the category validator.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct CategoryPayload {
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "Electronics")]
    pub name: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "Gadgets")]
    pub description: Option<Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub description: String,
}

/// Partial update; `None` leaves the column unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}
