//! In-memory store used when no database is configured, and as the double for unit and
//! router tests. Every table sits behind one lock, so each operation is atomic. Filtering
//! and ordering mirror the SQL in `crate::sql`: text matches are case-insensitive and names
//! sort by code point, as `COLLATE "C"` does.

use super::{CategoryRepository, ProductRepository, StoreHealth, UserRepository, EMAIL_TAKEN, USERNAME_TAKEN};
use crate::error::{AppError, FieldErrors};
use crate::models::{Category, CategoryChanges, NewCategory, NewProduct, NewUser, Product, ProductChanges, User};
use crate::service::{missing_reference_message, ProductFilter, ProductQuery, SortField};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone, Debug)]
struct ProductRow {
    id: i64,
    name: String,
    description: String,
    price: Decimal,
    stock_quantity: i32,
    category_id: i64,
    created_by: i64,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    categories: BTreeMap<i64, Category>,
    products: BTreeMap<i64, ProductRow>,
    users: BTreeMap<i64, User>,
    last_category_id: i64,
    last_product_id: i64,
    last_user_id: i64,
}

impl Tables {
    /// Join a row with its category and creator.
    fn product(&self, row: &ProductRow) -> Product {
        Product {
            id: row.id,
            name: row.name.clone(),
            description: row.description.clone(),
            price: row.price,
            stock_quantity: row.stock_quantity,
            category: row.category_id,
            category_name: self
                .categories
                .get(&row.category_id)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            created_by: self
                .users
                .get(&row.created_by)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            created_at: row.created_at,
        }
    }

    fn check_category(&self, id: i64) -> Result<(), AppError> {
        if self.categories.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::Validation(FieldErrors::single(
                "category",
                missing_reference_message(id),
            )))
        }
    }
}

/// Category and stock are exact; every search term must appear in the name or description.
fn accepts(filter: &ProductFilter, product: &Product) -> bool {
    if filter.category.is_some_and(|c| c != product.category) {
        return false;
    }
    if filter.stock_quantity.is_some_and(|n| n != i64::from(product.stock_quantity)) {
        return false;
    }
    if filter.search_terms.is_empty() {
        return true;
    }
    let name = product.name.to_lowercase();
    let description = product.description.to_lowercase();
    filter
        .search_terms
        .iter()
        .all(|term| name.contains(term.as_str()) || description.contains(term.as_str()))
}

/// Sort keys in order, then ascending id.
fn compare(query: &ProductQuery, a: &Product, b: &Product) -> Ordering {
    for key in &query.ordering {
        let ord = match key.field {
            SortField::Price => a.price.cmp(&b.price),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Name => a.name.cmp(&b.name),
        };
        let ord = if key.descending { ord.reverse() } else { ord };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.id.cmp(&b.id)
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.tables
            .read()
            .map_err(|_| AppError::Internal("store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, AppError> {
        self.tables
            .write()
            .map_err(|_| AppError::Internal("store lock poisoned".into()))
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn list(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.read()?.categories.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Category>, AppError> {
        Ok(self.read()?.categories.get(&id).cloned())
    }

    async fn create(&self, new: NewCategory) -> Result<Category, AppError> {
        let mut tables = self.write()?;
        tables.last_category_id += 1;
        let category = Category {
            id: tables.last_category_id,
            name: new.name,
            description: new.description,
            created_at: Utc::now(),
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, id: i64, changes: CategoryChanges) -> Result<Option<Category>, AppError> {
        let mut tables = self.write()?;
        let Some(category) = tables.categories.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            category.name = name;
        }
        if let Some(description) = changes.description {
            category.description = description;
        }
        Ok(Some(category.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.write()?;
        if tables.categories.remove(&id).is_none() {
            return Ok(false);
        }
        tables.products.retain(|_, p| p.category_id != id);
        Ok(true)
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn count(&self, filter: &ProductFilter) -> Result<u64, AppError> {
        let tables = self.read()?;
        let n = tables
            .products
            .values()
            .filter(|row| accepts(filter, &tables.product(row)))
            .count();
        Ok(n as u64)
    }

    async fn list(&self, query: &ProductQuery, offset: u64, limit: u64) -> Result<Vec<Product>, AppError> {
        let tables = self.read()?;
        let mut items: Vec<Product> = tables
            .products
            .values()
            .map(|row| tables.product(row))
            .filter(|p| accepts(&query.filter, p))
            .collect();
        items.sort_by(|a, b| compare(query, a, b));
        Ok(items
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, AppError> {
        let tables = self.read()?;
        Ok(tables.products.get(&id).map(|row| tables.product(row)))
    }

    async fn create(&self, new: NewProduct) -> Result<Product, AppError> {
        let mut tables = self.write()?;
        tables.check_category(new.category_id)?;
        if !tables.users.contains_key(&new.created_by) {
            return Err(AppError::Internal(format!("unknown user {}", new.created_by)));
        }
        tables.last_product_id += 1;
        let row = ProductRow {
            id: tables.last_product_id,
            name: new.name,
            description: new.description,
            price: new.price,
            stock_quantity: new.stock_quantity,
            category_id: new.category_id,
            created_by: new.created_by,
            created_at: Utc::now(),
        };
        let product = tables.product(&row);
        tables.products.insert(row.id, row);
        Ok(product)
    }

    async fn update(&self, id: i64, changes: ProductChanges) -> Result<Option<Product>, AppError> {
        let mut tables = self.write()?;
        if let Some(category_id) = changes.category_id {
            tables.check_category(category_id)?;
        }
        let Some(row) = tables.products.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            row.name = name;
        }
        if let Some(description) = changes.description {
            row.description = description;
        }
        if let Some(price) = changes.price {
            row.price = price;
        }
        if let Some(stock_quantity) = changes.stock_quantity {
            row.stock_quantity = stock_quantity;
        }
        if let Some(category_id) = changes.category_id {
            row.category_id = category_id;
        }
        let row = row.clone();
        Ok(Some(tables.product(&row)))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.write()?.products.remove(&id).is_some())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn get(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn email_in_use(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.read()?.users.values().any(|u| u.email == email))
    }

    async fn create(&self, new: NewUser) -> Result<User, AppError> {
        let mut tables = self.write()?;
        if tables.users.values().any(|u| u.username == new.username) {
            return Err(AppError::Validation(FieldErrors::single("username", USERNAME_TAKEN)));
        }
        if !new.email.is_empty() && tables.users.values().any(|u| u.email == new.email) {
            return Err(AppError::Validation(FieldErrors::single("email", EMAIL_TAKEN)));
        }
        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            is_staff: new.is_staff,
            is_superuser: new.is_superuser,
            date_joined: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl StoreHealth for InMemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.read().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ordering;
    use crate::store::Repositories;
    use chrono::TimeZone;

    async fn seeded() -> (Repositories, i64, i64) {
        let repos = Repositories::in_memory();
        let user = repos
            .users
            .create(NewUser {
                username: "tester".into(),
                email: "tester@example.com".into(),
                password_hash: "x".into(),
                is_staff: false,
                is_superuser: false,
            })
            .await
            .unwrap();
        let category = repos
            .categories
            .create(NewCategory {
                name: "Electronics".into(),
                description: "Gadgets".into(),
            })
            .await
            .unwrap();
        (repos, user.id, category.id)
    }

    fn product(id: i64, name: &str, description: &str, price: i64, stock_quantity: i32, category: i64) -> Product {
        Product {
            id,
            name: name.to_string(),
            description: description.to_string(),
            price: Decimal::new(price, 2),
            stock_quantity,
            category,
            category_name: "c".to_string(),
            created_by: "tester".to_string(),
            created_at: Utc.timestamp_opt(1_700_000_000 + id, 0).unwrap(),
        }
    }

    #[test]
    fn filter_is_conjunctive_and_search_disjunctive_across_fields() {
        let phone = product(1, "Phone", "A smart device", 29999, 4, 1);
        let book = product(2, "Book", "About phones", 999, 4, 2);

        let by_text = ProductFilter {
            search_terms: vec!["phone".into()],
            ..Default::default()
        };
        assert!(accepts(&by_text, &phone));
        assert!(accepts(&by_text, &book));

        let by_text_and_category = ProductFilter {
            category: Some(1),
            search_terms: vec!["phone".into()],
            ..Default::default()
        };
        assert!(accepts(&by_text_and_category, &phone));
        assert!(!accepts(&by_text_and_category, &book));

        let every_term = ProductFilter {
            search_terms: vec!["phone".into(), "smart".into()],
            ..Default::default()
        };
        assert!(accepts(&every_term, &phone));
        assert!(!accepts(&every_term, &book));
    }

    #[test]
    fn stock_filter_is_exact_and_combines_with_category() {
        let stocked = product(1, "Phone", "", 100, 7, 1);
        let empty = product(2, "Case", "", 100, 0, 1);
        let other_category = product(3, "Novel", "", 100, 7, 2);

        let seven = ProductFilter {
            stock_quantity: Some(7),
            ..Default::default()
        };
        assert!(accepts(&seven, &stocked));
        assert!(!accepts(&seven, &empty));
        assert!(accepts(&seven, &other_category));

        let seven_in_first = ProductFilter {
            category: Some(1),
            stock_quantity: Some(7),
            ..Default::default()
        };
        assert!(accepts(&seven_in_first, &stocked));
        assert!(!accepts(&seven_in_first, &other_category));

        let none_in_stock = ProductFilter {
            stock_quantity: Some(0),
            ..Default::default()
        };
        assert!(accepts(&none_in_stock, &empty));
        assert!(!accepts(&none_in_stock, &stocked));
    }

    #[test]
    fn compare_applies_keys_then_id() {
        let cheap = product(1, "B", "", 500, 0, 1);
        let pricey = product(2, "A", "", 100000, 0, 1);
        let same_price = product(3, "C", "", 500, 0, 1);

        let by_price = ProductQuery {
            filter: ProductFilter::default(),
            ordering: ordering("price"),
        };
        let mut items = vec![pricey.clone(), same_price.clone(), cheap.clone()];
        items.sort_by(|a, b| compare(&by_price, a, b));
        assert_eq!(items.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 3, 2]);

        let newest_first = ProductQuery::default();
        items.sort_by(|a, b| compare(&newest_first, a, b));
        assert_eq!(items.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3, 2, 1]);
    }

    #[test]
    fn names_sort_by_code_point() {
        let by_name = ProductQuery {
            filter: ProductFilter::default(),
            ordering: ordering("name"),
        };
        let mut items = vec![
            product(1, "apple", "", 100, 0, 1),
            product(2, "Zebra", "", 100, 0, 1),
            product(3, "Phone", "", 100, 0, 1),
        ];
        items.sort_by(|a, b| compare(&by_name, a, b));
        let names: Vec<&str> = items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Phone", "Zebra", "apple"]);
    }

    fn new_product(name: &str, price: i64, category_id: i64, created_by: i64) -> NewProduct {
        NewProduct {
            name: name.into(),
            description: format!("A {}", name.to_lowercase()),
            price: Decimal::new(price, 2),
            stock_quantity: 3,
            category_id,
            created_by,
        }
    }

    #[tokio::test]
    async fn product_joins_category_and_creator() {
        let (repos, user, category) = seeded().await;
        let product = repos
            .products
            .create(new_product("Phone", 29999, category, user))
            .await
            .unwrap();
        assert_eq!(product.category, category);
        assert_eq!(product.category_name, "Electronics");
        assert_eq!(product.created_by, "tester");
        assert_eq!(product.price.to_string(), "299.99");
    }

    #[tokio::test]
    async fn product_requires_existing_category() {
        let (repos, user, _) = seeded().await;
        let err = repos
            .products
            .create(new_product("Ghost", 100, 999, user))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref e) if e.contains("category")));
        assert_eq!(repos.products.count(&ProductFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn list_windows_ordered_results() {
        let (repos, user, category) = seeded().await;
        for (name, price) in [("A", 500), ("B", 100), ("C", 300)] {
            repos
                .products
                .create(new_product(name, price, category, user))
                .await
                .unwrap();
        }
        let query = ProductQuery {
            filter: ProductFilter::default(),
            ordering: ordering("price"),
        };
        let page = repos.products.list(&query, 1, 5).await.unwrap();
        let names: Vec<&str> = page.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A"]);
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let (repos, user, category) = seeded().await;
        let product = repos
            .products
            .create(new_product("Phone", 29999, category, user))
            .await
            .unwrap();
        let updated = repos
            .products
            .update(
                product.id,
                ProductChanges {
                    stock_quantity: Some(42),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.stock_quantity, 42);
        assert_eq!(updated.name, "Phone");
        assert_eq!(updated.created_at, product.created_at);
        assert!(repos.products.update(999, ProductChanges::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_category_cascades() {
        let (repos, user, category) = seeded().await;
        repos
            .products
            .create(new_product("Phone", 29999, category, user))
            .await
            .unwrap();
        assert!(repos.categories.delete(category).await.unwrap());
        assert_eq!(repos.products.count(&ProductFilter::default()).await.unwrap(), 0);
        assert!(!repos.categories.delete(category).await.unwrap());
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let (repos, _, _) = seeded().await;
        let err = repos
            .users
            .create(NewUser {
                username: "tester".into(),
                email: "other@example.com".into(),
                password_hash: "x".into(),
                is_staff: false,
                is_superuser: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref e) if e.contains("username")));
        assert!(repos.users.email_in_use("tester@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn emails_are_unique_unless_blank() {
        let (repos, _, _) = seeded().await;
        let user = |username: &str, email: &str| NewUser {
            username: username.into(),
            email: email.into(),
            password_hash: "x".into(),
            is_staff: false,
            is_superuser: false,
        };
        let err = repos
            .users
            .create(user("other", "tester@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref e) if e.get("email") == Some(&[EMAIL_TAKEN.to_string()][..])));
        repos.users.create(user("admin", "")).await.unwrap();
        repos.users.create(user("root", "")).await.unwrap();
    }
}
