//! Catalog schema DDL. Order follows foreign key dependencies; every statement is idempotent.

use crate::error::AppError;
use sqlx::PgPool;

pub const USERS_USERNAME_KEY: &str = "users_username_key";
pub const USERS_EMAIL_KEY: &str = "users_email_key";
pub const PRODUCTS_CATEGORY_FKEY: &str = "products_category_id_fkey";

const USERS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username VARCHAR(150) NOT NULL CONSTRAINT users_username_key UNIQUE,
        email VARCHAR(254) NOT NULL DEFAULT '',
        password_hash TEXT NOT NULL,
        is_staff BOOLEAN NOT NULL DEFAULT FALSE,
        is_superuser BOOLEAN NOT NULL DEFAULT FALSE,
        date_joined TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const CATEGORIES_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS categories (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const PRODUCTS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(200) NOT NULL,
        description TEXT NOT NULL,
        price NUMERIC(10, 2) NOT NULL CHECK (price >= 0),
        stock_quantity INTEGER NOT NULL DEFAULT 0 CHECK (stock_quantity >= 0),
        category_id BIGINT NOT NULL
            CONSTRAINT products_category_id_fkey REFERENCES categories (id) ON DELETE CASCADE,
        created_by BIGINT NOT NULL
            CONSTRAINT products_created_by_fkey REFERENCES users (id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS products_category_id_idx ON products (category_id)",
    "CREATE INDEX IF NOT EXISTS products_created_by_idx ON products (created_by)",
    "CREATE INDEX IF NOT EXISTS products_created_at_idx ON products (created_at)",
    // blank emails may repeat
    "DROP INDEX IF EXISTS users_email_idx",
    "CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON users (email) WHERE email <> ''",
];

/// Create users, categories, products and their indexes if missing.
pub async fn apply_migrations(pool: &PgPool) -> Result<(), AppError> {
    for ddl in [USERS_DDL, CATEGORIES_DDL, PRODUCTS_DDL] {
        sqlx::query(ddl).execute(pool).await?;
    }
    for ddl in INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }
    tracing::debug!("schema up to date");
    Ok(())
}
