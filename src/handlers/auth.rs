//! Registration and JWT issuance.

use crate::error::AppError;
use crate::extractors::AppJson;
use crate::models::{AccessToken, LoginPayload, RefreshPayload, RegisterPayload, RegisteredUser, TokenPair};
use crate::service::AccountService;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};

#[utoipa::path(
    post,
    path = "/api/auth/register/",
    tag = "auth",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "User created", body = RegisteredUser),
        (status = 400, description = "Field errors, including mismatched passwords")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterPayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = AccountService::register(&state.repos, &payload).await?;
    Ok(crate::response::created(user))
}

#[utoipa::path(
    post,
    path = "/api/auth/login/",
    tag = "auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Access and refresh tokens", body = TokenPair),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Bad credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginPayload>,
) -> Result<Json<TokenPair>, AppError> {
    Ok(Json(AccountService::login(&state.repos, &state.tokens, &payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/auth/token/refresh/",
    tag = "auth",
    request_body = RefreshPayload,
    responses(
        (status = 200, description = "New access token", body = AccessToken),
        (status = 401, description = "Invalid or expired refresh token")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshPayload>,
) -> Result<Json<AccessToken>, AppError> {
    Ok(Json(AccountService::refresh(&state.repos, &state.tokens, &payload).await?))
}
