//! Router assembly: API routes, docs, operational endpoints and middleware.

pub mod catalog;
pub mod common;
pub mod docs;

use crate::state::AppState;
use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

fn cors(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}

/// The whole application.
pub fn app(state: AppState) -> Router {
    let cors = cors(&state.config.cors_allowed_origins);
    let body_limit = state.config.max_body_bytes;
    Router::new()
        .merge(catalog::catalog_routes(state.clone()))
        .merge(catalog::auth_routes(state.clone()))
        .merge(common::common_routes(state))
        .merge(docs::docs_routes())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
