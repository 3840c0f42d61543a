//! Category handlers. Reads are public; writes need an authenticated caller.

use super::parse_id;
use crate::error::AppError;
use crate::extractors::{AppJson, AuthUser, MaybeUser};
use crate::models::{Category, CategoryPayload};
use crate::service::CatalogService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

#[utoipa::path(
    get,
    path = "/api/categories/",
    tag = "categories",
    responses((status = 200, description = "All categories by id", body = [Category]))
)]
pub async fn list(State(state): State<AppState>, _caller: MaybeUser) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(CatalogService::list_categories(&state.repos).await?))
}

#[utoipa::path(
    post,
    path = "/api/categories/",
    tag = "categories",
    request_body = CategoryPayload,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Created", body = Category),
        (status = 400, description = "Field errors"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    AppJson(payload): AppJson<CategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    let category = CatalogService::create_category(&state.repos, &payload).await?;
    Ok(crate::response::created(category))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}/",
    tag = "categories",
    params(("id" = i64, Path, description = "Category id")),
    responses(
        (status = 200, description = "Found", body = Category),
        (status = 404, description = "Not found")
    )
)]
pub async fn read(
    State(state): State<AppState>,
    _caller: MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<Category>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(CatalogService::get_category(&state.repos, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}/",
    tag = "categories",
    params(("id" = i64, Path, description = "Category id")),
    request_body = CategoryPayload,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Replaced", body = Category),
        (status = 400, description = "Field errors"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<CategoryPayload>,
) -> Result<Json<Category>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(CatalogService::update_category(&state.repos, id, &payload, false).await?))
}

#[utoipa::path(
    patch,
    path = "/api/categories/{id}/",
    tag = "categories",
    params(("id" = i64, Path, description = "Category id")),
    request_body = CategoryPayload,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Updated", body = Category),
        (status = 400, description = "Field errors"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Not found")
    )
)]
pub async fn partial_update(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<String>,
    AppJson(payload): AppJson<CategoryPayload>,
) -> Result<Json<Category>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(CatalogService::update_category(&state.repos, id, &payload, true).await?))
}

/// Deleting a category deletes its products.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}/",
    tag = "categories",
    params(("id" = i64, Path, description = "Category id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    CatalogService::delete_category(&state.repos, id).await?;
    tracing::debug!(category_id = id, user = %user.username, "category delete");
    Ok(StatusCode::NO_CONTENT)
}
