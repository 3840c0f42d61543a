use crate::error::AppError;
use axum::extract::FromRequest;

/// `axum::Json` whose rejections render as `{"detail": ...}` 400s.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
