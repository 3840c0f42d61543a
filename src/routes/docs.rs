//! API documentation: Swagger UI, ReDoc and the raw OpenAPI document.

use crate::openapi::{redoc, swagger_ui};
use axum::{response::Redirect, routing::get, Router};

pub fn docs_routes() -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::temporary("/swagger/") }))
        .merge(swagger_ui())
        .merge(redoc())
}
