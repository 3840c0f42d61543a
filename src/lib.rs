//! Catalog API: categories and products over REST with JWT authentication.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod models;
pub mod openapi;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{load_from_env, load_with, AppConfig};
pub use error::{AppError, ConfigError, FieldErrors};
pub use migration::apply_migrations;
pub use routes::app;
pub use state::AppState;
pub use store::{connect, ensure_database_exists, Repositories};
