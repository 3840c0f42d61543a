//! Accounts plus the registration, login and token payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct RegisterPayload {
    #[serde(default)]
    #[schema(example = "alice")]
    pub username: Option<String>,
    #[serde(default)]
    #[schema(example = "alice@example.com")]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Password confirmation.
    #[serde(default)]
    pub password2: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RegisteredUser {
    pub username: String,
    pub email: String,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct LoginPayload {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct RefreshPayload {
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessToken {
    pub access: String,
}
