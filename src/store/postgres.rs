//! PostgreSQL adapter. Product rows are always read joined with their category and creator.

use super::{CategoryRepository, ProductRepository, StoreHealth, UserRepository, EMAIL_TAKEN, USERNAME_TAKEN};
use crate::error::{AppError, FieldErrors};
use crate::migration::{PRODUCTS_CATEGORY_FKEY, USERS_EMAIL_KEY, USERS_USERNAME_KEY};
use crate::models::{Category, CategoryChanges, NewCategory, NewProduct, NewUser, Product, ProductChanges, User};
use crate::service::{missing_reference_message, ProductFilter, ProductQuery};
use crate::sql::{count_products, select_products, PRODUCT_COLUMNS, PRODUCT_JOINS};
use async_trait::async_trait;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

const CATEGORY_COLUMNS: &str = "id, name, description, created_at";
const USER_COLUMNS: &str = "id, username, email, password_hash, is_staff, is_superuser, date_joined";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, AppError> {
        let sql = format!("SELECT {} FROM products p {} WHERE p.id = $1", PRODUCT_COLUMNS, PRODUCT_JOINS);
        Ok(sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

/// A write naming a category that does not exist surfaces as a `category` field error.
/// Other foreign keys stay database errors.
fn category_violation(e: sqlx::Error, category_id: i64) -> AppError {
    match e.as_database_error() {
        Some(db) if db.is_foreign_key_violation() && is_category_reference(db.constraint()) => {
            AppError::Validation(FieldErrors::single("category", missing_reference_message(category_id)))
        }
        _ => AppError::Db(e),
    }
}

fn is_category_reference(constraint: Option<&str>) -> bool {
    constraint == Some(PRODUCTS_CATEGORY_FKEY)
}

/// Field error for a unique constraint on users, if it is one the API reports per field.
fn user_conflict(constraint: Option<&str>) -> Option<FieldErrors> {
    match constraint? {
        USERS_USERNAME_KEY => Some(FieldErrors::single("username", USERNAME_TAKEN)),
        USERS_EMAIL_KEY => Some(FieldErrors::single("email", EMAIL_TAKEN)),
        _ => None,
    }
}

#[async_trait]
impl CategoryRepository for PgStore {
    async fn list(&self) -> Result<Vec<Category>, AppError> {
        let sql = format!("SELECT {} FROM categories ORDER BY id", CATEGORY_COLUMNS);
        Ok(sqlx::query_as::<_, Category>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get(&self, id: i64) -> Result<Option<Category>, AppError> {
        let sql = format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS);
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create(&self, new: NewCategory) -> Result<Category, AppError> {
        let sql = format!(
            "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING {}",
            CATEGORY_COLUMNS
        );
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(&new.name)
            .bind(&new.description)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update(&self, id: i64, changes: CategoryChanges) -> Result<Option<Category>, AppError> {
        let sql = format!(
            "UPDATE categories SET name = COALESCE($2, name), description = COALESCE($3, description) \
             WHERE id = $1 RETURNING {}",
            CATEGORY_COLUMNS
        );
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.description)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        // products.category_id cascades
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProductRepository for PgStore {
    async fn count(&self, filter: &ProductFilter) -> Result<u64, AppError> {
        let q = count_products(filter);
        tracing::debug!(sql = %q.sql, params = ?q.params, "count products");
        let mut query = sqlx::query_scalar::<_, i64>(&q.sql);
        for p in q.params {
            query = query.bind(p);
        }
        let n = query.fetch_one(&self.pool).await?;
        Ok(n.max(0) as u64)
    }

    async fn list(&self, query: &ProductQuery, offset: u64, limit: u64) -> Result<Vec<Product>, AppError> {
        let q = select_products(query, offset, limit);
        tracing::debug!(sql = %q.sql, params = ?q.params, "select products");
        let mut rows = sqlx::query_as::<_, Product>(&q.sql);
        for p in q.params {
            rows = rows.bind(p);
        }
        Ok(rows.fetch_all(&self.pool).await?)
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, AppError> {
        self.fetch_product(id).await
    }

    async fn create(&self, new: NewProduct) -> Result<Product, AppError> {
        let sql = format!(
            "WITH p AS (\
                INSERT INTO products (name, description, price, stock_quantity, category_id, created_by) \
                VALUES ($1, $2, $3, $4, $5, $6) RETURNING *\
             ) SELECT {} FROM p {}",
            PRODUCT_COLUMNS, PRODUCT_JOINS
        );
        sqlx::query_as::<_, Product>(&sql)
            .bind(&new.name)
            .bind(&new.description)
            .bind(new.price)
            .bind(new.stock_quantity)
            .bind(new.category_id)
            .bind(new.created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| category_violation(e, new.category_id))
    }

    async fn update(&self, id: i64, changes: ProductChanges) -> Result<Option<Product>, AppError> {
        let sql = format!(
            "WITH p AS (\
                UPDATE products SET \
                    name = COALESCE($2, name), \
                    description = COALESCE($3, description), \
                    price = COALESCE($4, price), \
                    stock_quantity = COALESCE($5, stock_quantity), \
                    category_id = COALESCE($6, category_id) \
                WHERE id = $1 RETURNING *\
             ) SELECT {} FROM p {}",
            PRODUCT_COLUMNS, PRODUCT_JOINS
        );
        let category_id = changes.category_id;
        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.description)
            .bind(changes.price)
            .bind(changes.stock_quantity)
            .bind(changes.category_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| category_violation(e, category_id.unwrap_or_default()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn get(&self, id: i64) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn email_in_use(&self, email: &str) -> Result<bool, AppError> {
        let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists.0)
    }

    async fn create(&self, new: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, is_staff, is_superuser) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&new.username)
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(new.is_staff)
            .bind(new.is_superuser)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let conflict = e
                    .as_database_error()
                    .filter(|db| db.is_unique_violation())
                    .and_then(|db| user_conflict(db.constraint()));
                match conflict {
                    Some(errors) => AppError::Validation(errors),
                    None => AppError::Db(e),
                }
            })
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// (admin url pointing at `postgres`, database name).
fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let invalid = || {
        AppError::Config(crate::error::ConfigError::Invalid {
            key: "DATABASE_URL",
            value: "<redacted>".into(),
        })
    };
    let scheme_end = url.find("://").ok_or_else(invalid)? + 3;
    let path_start = url[scheme_end..].find('/').ok_or_else(invalid)? + scheme_end + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let (db_name, query) = match path_and_query.split_once('?') {
        Some((name, q)) => (name.trim(), Some(q)),
        None => (path_and_query.trim(), None),
    };
    let base = url.get(..path_start).unwrap_or(url);
    let admin_url = match query {
        Some(q) => format!("{}postgres?{}", base, q),
        None => format!("{}postgres", base),
    };
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
