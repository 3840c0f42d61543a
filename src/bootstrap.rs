//! Superuser bootstrap from `DJANGO_SUPERUSER_*` variables. Safe to run on every deploy.

use crate::auth::hash_password;
use crate::config::AppConfig;
use crate::error::{AppError, ConfigError};
use crate::models::NewUser;
use crate::store::{connect, Repositories, UserRepository};

pub const USERNAME_VAR: &str = "DJANGO_SUPERUSER_USERNAME";
pub const EMAIL_VAR: &str = "DJANGO_SUPERUSER_EMAIL";
pub const PASSWORD_VAR: &str = "DJANGO_SUPERUSER_PASSWORD";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuperuserSpec {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SuperuserSpec {
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `None` unless both username and password are non-empty. Email defaults to empty.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Some(SuperuserSpec {
            username: get(USERNAME_VAR)?,
            email: get(EMAIL_VAR).unwrap_or_default(),
            password: lookup(PASSWORD_VAR).filter(|v| !v.is_empty())?,
        })
    }
}

/// The configured database URL. An account created in the in-memory store is lost on exit.
pub fn require_database(config: &AppConfig) -> Result<&str, ConfigError> {
    config.database_url.as_deref().ok_or(ConfigError::Missing("DATABASE_URL"))
}

/// Like [`connect`], but never falls back to process memory.
pub async fn connect_persistent(config: &AppConfig) -> Result<Repositories, AppError> {
    require_database(config)?;
    connect(config).await
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Credentials were not configured.
    Skipped,
    AlreadyExists,
    Created,
}

pub async fn create_superuser(
    users: &dyn UserRepository,
    spec: Option<&SuperuserSpec>,
) -> Result<BootstrapOutcome, AppError> {
    let Some(spec) = spec else {
        tracing::info!(
            "{} or {} not set; skipping superuser creation",
            USERNAME_VAR,
            PASSWORD_VAR
        );
        return Ok(BootstrapOutcome::Skipped);
    };
    if users.find_by_username(&spec.username).await?.is_some() {
        tracing::warn!(username = %spec.username, "superuser already exists");
        return Ok(BootstrapOutcome::AlreadyExists);
    }
    users
        .create(NewUser {
            username: spec.username.clone(),
            email: spec.email.clone(),
            password_hash: hash_password(&spec.password)?,
            is_staff: true,
            is_superuser: true,
        })
        .await?;
    tracing::info!(username = %spec.username, "superuser created");
    Ok(BootstrapOutcome::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_with;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn spec_needs_username_and_password() {
        assert_eq!(SuperuserSpec::from_lookup(lookup(&[(USERNAME_VAR, "admin")])), None);
        assert_eq!(
            SuperuserSpec::from_lookup(lookup(&[(USERNAME_VAR, ""), (PASSWORD_VAR, "pw")])),
            None
        );
        let spec = SuperuserSpec::from_lookup(lookup(&[(USERNAME_VAR, "admin"), (PASSWORD_VAR, "pw")])).unwrap();
        assert_eq!(spec.email, "");
    }

    #[test]
    fn bootstrap_requires_a_database() {
        let config = load_with(lookup(&[(USERNAME_VAR, "admin"), (PASSWORD_VAR, "pw")])).unwrap();
        assert!(matches!(require_database(&config), Err(ConfigError::Missing("DATABASE_URL"))));

        let config = load_with(lookup(&[
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("SECRET_KEY", "s3cret"),
        ]))
        .unwrap();
        assert_eq!(require_database(&config).unwrap(), "postgres://localhost/catalog");
    }

    #[tokio::test]
    async fn bootstrap_without_database_fails_before_connecting() {
        let config = load_with(lookup(&[])).unwrap();
        let err = connect_persistent(&config).await.err().unwrap();
        assert!(matches!(err, AppError::Config(ConfigError::Missing("DATABASE_URL"))));
    }

    #[tokio::test]
    async fn running_twice_creates_one_user() {
        let repos = Repositories::in_memory();
        let spec = SuperuserSpec {
            username: "admin".into(),
            email: "admin@example.com".into(),
            password: "adminpass123".into(),
        };
        let first = create_superuser(repos.users.as_ref(), Some(&spec)).await.unwrap();
        let second = create_superuser(repos.users.as_ref(), Some(&spec)).await.unwrap();
        assert_eq!(first, BootstrapOutcome::Created);
        assert_eq!(second, BootstrapOutcome::AlreadyExists);
        let admin = repos.users.find_by_username("admin").await.unwrap().unwrap();
        assert!(admin.is_staff && admin.is_superuser);
    }

    #[tokio::test]
    async fn missing_credentials_skip() {
        let repos = Repositories::in_memory();
        assert_eq!(
            create_superuser(repos.users.as_ref(), None).await.unwrap(),
            BootstrapOutcome::Skipped
        );
        assert!(repos.users.find_by_username("admin").await.unwrap().is_none());
    }
}
