//! Startup configuration passed to the router constructor.

use std::time::Duration;

/// Secret used when no `SECRET_KEY` is configured and the in-memory store is active.
pub const DEV_SECRET_KEY: &str = "insecure-dev-secret-change-me";

#[derive(Clone, Debug)]
pub struct TokenConfig {
    /// HMAC secret for HS256 signing.
    pub secret: String,
    pub access_lifetime: Duration,
    pub refresh_lifetime: Duration,
}

impl Default for TokenConfig {
    fn default() -> Self {
        TokenConfig {
            secret: DEV_SECRET_KEY.to_string(),
            access_lifetime: Duration::from_secs(5 * 60),
            refresh_lifetime: Duration::from_secs(24 * 60 * 60),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationConfig {
    pub page_size: u32,
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        PaginationConfig {
            page_size: 10,
            max_page_size: 100,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Postgres URL. `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub bind_addr: String,
    pub tokens: TokenConfig,
    pub pagination: PaginationConfig,
    /// Empty allows any origin.
    pub cors_allowed_origins: Vec<String>,
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_url: None,
            database_max_connections: 5,
            bind_addr: "0.0.0.0:8000".to_string(),
            tokens: TokenConfig::default(),
            pagination: PaginationConfig::default(),
            cors_allowed_origins: Vec::new(),
            max_body_bytes: 1024 * 1024,
        }
    }
}
