//! Store checks that only mean something against a real server. Each test is a no-op when
//! `DATABASE_URL` is unset.

mod common;

use catalog_api::models::{NewCategory, NewProduct, NewUser};
use catalog_api::{apply_migrations, AppError, Repositories};
use common::{fresh_database_url, postgres_server};
use rust_decimal::Decimal;
use sqlx::PgPool;

async fn migrated_pool() -> Option<PgPool> {
    let Some(server) = postgres_server() else {
        eprintln!("DATABASE_URL not set; skipping");
        return None;
    };
    let url = fresh_database_url(&server).await;
    let pool = PgPool::connect(&url).await.expect("failed to connect");
    apply_migrations(&pool).await.expect("failed to migrate");
    Some(pool)
}

fn new_user(username: &str, email: &str) -> NewUser {
    NewUser {
        username: username.into(),
        email: email.into(),
        password_hash: "x".into(),
        is_staff: false,
        is_superuser: false,
    }
}

#[tokio::test]
async fn migrations_can_run_again() {
    let Some(pool) = migrated_pool().await else { return };
    apply_migrations(&pool).await.unwrap();
    let (unique,): (bool,) = sqlx::query_as(
        "SELECT indisunique FROM pg_index i JOIN pg_class c ON c.oid = i.indexrelid WHERE c.relname = 'users_email_key'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(unique);
}

#[tokio::test]
async fn user_conflicts_are_field_errors() {
    let Some(pool) = migrated_pool().await else { return };
    let repos = Repositories::postgres(pool);
    repos.users.create(new_user("alice", "alice@example.com")).await.unwrap();

    let err = repos.users.create(new_user("alice", "other@example.com")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(ref e) if e.contains("username") && !e.contains("email")));

    let err = repos.users.create(new_user("alicia", "alice@example.com")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(ref e) if e.contains("email") && !e.contains("username")));

    repos.users.create(new_user("admin", "")).await.unwrap();
    repos.users.create(new_user("root", "")).await.unwrap();
}

#[tokio::test]
async fn only_a_missing_category_is_a_category_error() {
    let Some(pool) = migrated_pool().await else { return };
    let repos = Repositories::postgres(pool);
    let user = repos.users.create(new_user("owner", "owner@example.com")).await.unwrap();
    let category = repos
        .categories
        .create(NewCategory {
            name: "Tools".into(),
            description: String::new(),
        })
        .await
        .unwrap();
    let product = |category_id: i64, created_by: i64| NewProduct {
        name: "Hammer".into(),
        description: "Steel".into(),
        price: Decimal::new(1999, 2),
        stock_quantity: 1,
        category_id,
        created_by,
    };

    let err = repos.products.create(product(category.id + 1000, user.id)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(ref e) if e.contains("category")));

    let err = repos.products.create(product(category.id, user.id + 1000)).await.unwrap_err();
    assert!(matches!(err, AppError::Db(_)));

    let created = repos.products.create(product(category.id, user.id)).await.unwrap();
    assert_eq!(created.category_name, "Tools");
    assert_eq!(created.created_by, "owner");
}
