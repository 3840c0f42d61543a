//! Resolve the caller from `Authorization: Bearer <access token>`.

use crate::auth::TokenKind;
use crate::error::AppError;
use crate::models::User;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

const BEARER: &str = "Bearer";

/// Token from the Authorization header. `Ok(None)` when the header is absent or uses
/// another scheme; a malformed Bearer header is an invalid token.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AppError::InvalidToken)?;
    let mut parts = value.split_whitespace();
    match parts.next() {
        Some(scheme) if scheme == BEARER => {}
        _ => return Ok(None),
    }
    match (parts.next(), parts.next()) {
        (Some(token), None) => Ok(Some(token)),
        _ => Err(AppError::InvalidToken),
    }
}

/// Caller identity when credentials were sent. A presented token must be valid.
#[derive(Clone, Debug)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(&parts.headers)? else {
            return Ok(MaybeUser(None));
        };
        let claims = state.tokens.verify(token, TokenKind::Access)?;
        let user = state
            .repos
            .users
            .get(claims.user_id)
            .await?
            .ok_or(AppError::InvalidToken)?;
        Ok(MaybeUser(Some(user)))
    }
}

/// Authenticated caller; anonymous requests are rejected with 401.
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await? {
            MaybeUser(Some(user)) => Ok(AuthUser(user)),
            MaybeUser(None) => Err(AppError::NotAuthenticated),
        }
    }
}
