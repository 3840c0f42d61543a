//! Persistence interfaces, one per resource, with Postgres and in-memory adapters.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::{Category, CategoryChanges, NewCategory, NewProduct, NewUser, Product, ProductChanges, User};
use crate::service::{ProductFilter, ProductQuery};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// All categories by ascending id.
    async fn list(&self) -> Result<Vec<Category>, AppError>;
    async fn get(&self, id: i64) -> Result<Option<Category>, AppError>;
    async fn create(&self, new: NewCategory) -> Result<Category, AppError>;
    /// `None` when no category has this id.
    async fn update(&self, id: i64, changes: CategoryChanges) -> Result<Option<Category>, AppError>;
    /// Also removes the category's products. `false` when nothing was deleted.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn count(&self, filter: &ProductFilter) -> Result<u64, AppError>;
    /// Filtered, ordered window of products.
    async fn list(&self, query: &ProductQuery, offset: u64, limit: u64) -> Result<Vec<Product>, AppError>;
    async fn get(&self, id: i64) -> Result<Option<Product>, AppError>;
    async fn create(&self, new: NewProduct) -> Result<Product, AppError>;
    async fn update(&self, id: i64, changes: ProductChanges) -> Result<Option<Product>, AppError>;
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<User>, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn email_in_use(&self, email: &str) -> Result<bool, AppError>;
    /// Fails with a `username` or `email` field error when either is taken. Blank emails may repeat.
    async fn create(&self, new: NewUser) -> Result<User, AppError>;
}

#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), AppError>;
}

/// The set of repositories handlers work against.
#[derive(Clone)]
pub struct Repositories {
    pub categories: Arc<dyn CategoryRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub users: Arc<dyn UserRepository>,
    pub health: Arc<dyn StoreHealth>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(InMemoryStore::new()))
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self::from_backend(Arc::new(PgStore::new(pool)))
    }

    fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: CategoryRepository + ProductRepository + UserRepository + StoreHealth + 'static,
    {
        Repositories {
            categories: backend.clone(),
            products: backend.clone(),
            users: backend.clone(),
            health: backend,
        }
    }
}

pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const EMAIL_TAKEN: &str = "A user with that email already exists.";

/// Open the configured backend. With a database URL: create the database if needed, pool,
/// migrate. Without one, everything lives in process memory.
pub async fn connect(config: &AppConfig) -> Result<Repositories, AppError> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; using the in-memory store");
        return Ok(Repositories::in_memory());
    };
    ensure_database_exists(url).await?;
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(url)
        .await?;
    crate::migration::apply_migrations(&pool).await?;
    tracing::info!(max_connections = config.database_max_connections, "connected to postgres");
    Ok(Repositories::postgres(pool))
}
