//! Load `AppConfig` from the process environment (after `.env`) or any key lookup.

use crate::config::types::{AppConfig, DEV_SECRET_KEY};
use crate::config::validate;
use crate::error::ConfigError;
use std::str::FromStr;
use std::time::Duration;

/// Read `.env` if present, then build config from the process environment.
pub fn load_from_env() -> Result<AppConfig, ConfigError> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env");
    }
    load_with(|key| std::env::var(key).ok())
}

/// Build config from a key lookup. Unset and empty values fall back to defaults.
pub fn load_with<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let mut config = AppConfig::default();

    config.database_url = get("DATABASE_URL");
    if let Some(v) = get("DATABASE_MAX_CONNECTIONS") {
        config.database_max_connections = parse("DATABASE_MAX_CONNECTIONS", &v)?;
    }
    if let Some(v) = get("BIND_ADDR") {
        config.bind_addr = v;
    }

    match get("SECRET_KEY") {
        Some(secret) => config.tokens.secret = secret,
        None if config.database_url.is_some() => return Err(ConfigError::Missing("SECRET_KEY")),
        None => {
            tracing::warn!("SECRET_KEY not set; using the development secret");
            config.tokens.secret = DEV_SECRET_KEY.to_string();
        }
    }
    if let Some(v) = get("ACCESS_TOKEN_LIFETIME_SECS") {
        config.tokens.access_lifetime = Duration::from_secs(parse("ACCESS_TOKEN_LIFETIME_SECS", &v)?);
    }
    if let Some(v) = get("REFRESH_TOKEN_LIFETIME_SECS") {
        config.tokens.refresh_lifetime = Duration::from_secs(parse("REFRESH_TOKEN_LIFETIME_SECS", &v)?);
    }

    if let Some(v) = get("PAGE_SIZE") {
        config.pagination.page_size = parse("PAGE_SIZE", &v)?;
    }
    if let Some(v) = get("MAX_PAGE_SIZE") {
        config.pagination.max_page_size = parse("MAX_PAGE_SIZE", &v)?;
    }

    if let Some(v) = get("CORS_ALLOWED_ORIGINS") {
        config.cors_allowed_origins = v
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }
    if let Some(v) = get("MAX_BODY_BYTES") {
        config.max_body_bytes = parse("MAX_BODY_BYTES", &v)?;
    }

    validate(&config)?;
    Ok(config)
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}
