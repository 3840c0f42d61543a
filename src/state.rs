//! Shared application state for all routes.

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::store::Repositories;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repos: Repositories,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(config: AppConfig, repos: Repositories) -> Self {
        let tokens = Arc::new(TokenService::new(&config.tokens));
        AppState {
            config: Arc::new(config),
            repos,
            tokens,
        }
    }
}
