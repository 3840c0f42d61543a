//! Config validation: cross-field consistency checked once at startup.

use crate::config::AppConfig;
use crate::error::ConfigError;

pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let pagination = &config.pagination;
    if pagination.page_size == 0 {
        return Err(ConfigError::Invalid {
            key: "PAGE_SIZE",
            value: "0".into(),
        });
    }
    if pagination.max_page_size < pagination.page_size {
        return Err(ConfigError::Invalid {
            key: "MAX_PAGE_SIZE",
            value: pagination.max_page_size.to_string(),
        });
    }
    if config.tokens.secret.is_empty() {
        return Err(ConfigError::Missing("SECRET_KEY"));
    }
    if config.tokens.access_lifetime.is_zero() {
        return Err(ConfigError::Invalid {
            key: "ACCESS_TOKEN_LIFETIME_SECS",
            value: "0".into(),
        });
    }
    if config.database_max_connections == 0 {
        return Err(ConfigError::Invalid {
            key: "DATABASE_MAX_CONNECTIONS",
            value: "0".into(),
        });
    }
    Ok(())
}
