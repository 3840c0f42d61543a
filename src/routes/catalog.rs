//! Category, product and account routes. Item paths keep the trailing slash.

use crate::handlers::{auth, category, product};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn catalog_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/categories/", get(category::list).post(category::create))
        .route(
            "/api/categories/:id/",
            get(category::read)
                .put(category::update)
                .patch(category::partial_update)
                .delete(category::delete),
        )
        .route("/api/products/", get(product::list).post(product::create))
        .route(
            "/api/products/:id/",
            get(product::read)
                .put(product::update)
                .patch(product::partial_update)
                .delete(product::delete),
        )
        .with_state(state)
}

pub fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/register/", post(auth::register))
        .route("/api/auth/login/", post(auth::login))
        .route("/api/auth/token/refresh/", post(auth::refresh))
        .with_state(state)
}
