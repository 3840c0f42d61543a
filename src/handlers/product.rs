//! Product handlers. Reads are public; writes need an authenticated caller, who becomes
//! `created_by` on create.

use super::parse_id;
use crate::error::AppError;
use crate::extractors::{AppJson, AppQuery, AuthUser, MaybeUser};
use crate::models::{Product, ProductPayload};
use crate::response::Page;
use crate::service::{request_url, CatalogService, ProductListParams};
use crate::state::AppState;
use axum::{
    extract::{OriginalUri, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};

#[utoipa::path(
    get,
    path = "/api/products/",
    tag = "products",
    params(ProductListParams),
    responses(
        (status = 200, description = "One page of matching products", body = Page<Product>),
        (status = 400, description = "Invalid filter value"),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn list(
    State(state): State<AppState>,
    _caller: MaybeUser,
    headers: HeaderMap,
    OriginalUri(uri): OriginalUri,
    AppQuery(params): AppQuery<ProductListParams>,
) -> Result<Json<Page<Product>>, AppError> {
    let url = request_url(&headers, &uri);
    let page = CatalogService::list_products(&state.repos, state.config.pagination, &params, url.as_ref()).await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/api/products/",
    tag = "products",
    request_body = ProductPayload,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Created", body = Product),
        (status = 400, description = "Field errors"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(payload): AppJson<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    let product = CatalogService::create_product(&state.repos, &user, &payload).await?;
    Ok(crate::response::created(product))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Found", body = Product),
        (status = 404, description = "Not found")
    )
)]
pub async fn read(
    State(state): State<AppState>,
    _caller: MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(CatalogService::get_product(&state.repos, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}/",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    request_body = ProductPayload,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Replaced", body = Product),
        (status = 400, description = "Field errors"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<ProductPayload>,
) -> Result<Json<Product>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(CatalogService::update_product(&state.repos, id, &payload, false).await?))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    request_body = ProductPayload,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated", body = Product),
        (status = 400, description = "Field errors"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Not found")
    )
)]
pub async fn partial_update(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<ProductPayload>,
) -> Result<Json<Product>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(CatalogService::update_product(&state.repos, id, &payload, true).await?))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}/",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    CatalogService::delete_product(&state.repos, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
