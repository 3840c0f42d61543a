use crate::error::AppError;
use axum::extract::FromRequestParts;

/// `axum::extract::Query` whose rejections render as `{"detail": ...}` 400s.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
