//! Typed errors and HTTP mapping.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Field name -> messages, serialized as a flat JSON object.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors with a single message on one field.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("validation: {0}")]
    Validation(FieldErrors),
    #[error("{0}")]
    BadRequest(String),
    #[error("Authentication credentials were not provided.")]
    NotAuthenticated,
    #[error("Given token not valid for any token type")]
    InvalidToken,
    #[error("No active account found with the given credentials")]
    InvalidCredentials,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("Invalid page.")]
    InvalidPage,
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("internal: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("JSON parse error - {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(format!("Query string parse error - {}", rejection.body_text()))
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

fn detail(status: StatusCode, message: impl Into<String>, code: Option<&'static str>) -> Response {
    (
        status,
        Json(ErrorBody {
            detail: message.into(),
            code,
        }),
    )
        .into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            AppError::BadRequest(message) => detail(StatusCode::BAD_REQUEST, message, None),
            AppError::NotAuthenticated => {
                let mut response = detail(StatusCode::UNAUTHORIZED, self.to_string(), None);
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    header::HeaderValue::from_static("Bearer realm=\"api\""),
                );
                response
            }
            AppError::InvalidToken => {
                let mut response = detail(StatusCode::UNAUTHORIZED, "Token is invalid or expired", Some("token_not_valid"));
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    header::HeaderValue::from_static("Bearer realm=\"api\""),
                );
                response
            }
            AppError::InvalidCredentials => detail(StatusCode::UNAUTHORIZED, self.to_string(), None),
            AppError::NotFound(_) => detail(StatusCode::NOT_FOUND, "Not found.", None),
            AppError::InvalidPage => detail(StatusCode::NOT_FOUND, self.to_string(), None),
            AppError::Db(sqlx::Error::RowNotFound) => detail(StatusCode::NOT_FOUND, "Not found.", None),
            AppError::Db(ref e) => {
                tracing::error!(error = %e, "database error");
                detail(StatusCode::INTERNAL_SERVER_ERROR, "A server error occurred.", None)
            }
            AppError::Config(ref e) => {
                tracing::error!(error = %e, "configuration error");
                detail(StatusCode::INTERNAL_SERVER_ERROR, "A server error occurred.", None)
            }
            AppError::Internal(ref message) => {
                tracing::error!(error = %message, "internal error");
                detail(StatusCode::INTERNAL_SERVER_ERROR, "A server error occurred.", None)
            }
        }
    }
}
