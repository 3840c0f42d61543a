//! HTTP handlers for categories, products and accounts.

pub mod auth;
pub mod category;
pub mod product;

use crate::error::AppError;

/// Path ids that are not integers match nothing.
pub(crate) fn parse_id(id_str: &str) -> Result<i64, AppError> {
    id_str
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::NotFound(id_str.to_string()))
}
