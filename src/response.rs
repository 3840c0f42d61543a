//! Response helpers: status + bare JSON body, and the paginated list shape.

use axum::{http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

/// One page of a list result.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct Page<T> {
    /// Total matching items across all pages.
    pub count: u64,
    /// Absolute URL of the next page.
    pub next: Option<String>,
    /// Absolute URL of the previous page.
    pub previous: Option<String>,
    pub results: Vec<T>,
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}
