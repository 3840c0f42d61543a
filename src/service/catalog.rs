//! Category and product operations: payload validation, reference checks and list assembly.

use crate::config::PaginationConfig;
use crate::error::{AppError, FieldErrors};
use crate::models::{
    Category, CategoryChanges, CategoryPayload, NewCategory, NewProduct, Product, ProductChanges, ProductPayload, User,
};
use crate::response::Page;
use crate::service::pagination::{page_links, resolve_page, resolve_page_size};
use crate::service::query::{ProductListParams, INVALID_CHOICE};
use crate::service::validation::{
    decimal_field, integer_field, missing_reference_message, primary_key_field, string_field, Presence,
};
use crate::store::Repositories;
use rust_decimal::Decimal;
use url::Url;

pub const CATEGORY_NAME_MAX: usize = 100;
pub const PRODUCT_NAME_MAX: usize = 200;
pub const PRICE_MAX_DIGITS: u32 = 10;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

pub struct CatalogService;

impl CatalogService {
    pub async fn list_categories(repos: &Repositories) -> Result<Vec<Category>, AppError> {
        repos.categories.list().await
    }

    pub async fn get_category(repos: &Repositories, id: i64) -> Result<Category, AppError> {
        repos
            .categories
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("category {}", id)))
    }

    pub async fn create_category(repos: &Repositories, payload: &CategoryPayload) -> Result<Category, AppError> {
        let changes = validate_category(payload, false)?;
        let category = repos
            .categories
            .create(NewCategory {
                name: changes.name.unwrap_or_default(),
                description: changes.description.unwrap_or_default(),
            })
            .await?;
        tracing::info!(category_id = category.id, "category created");
        Ok(category)
    }

    /// PUT when `partial` is false, PATCH otherwise. Unknown ids are 404 before any validation.
    pub async fn update_category(
        repos: &Repositories,
        id: i64,
        payload: &CategoryPayload,
        partial: bool,
    ) -> Result<Category, AppError> {
        Self::get_category(repos, id).await?;
        let changes = validate_category(payload, partial)?;
        repos
            .categories
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("category {}", id)))
    }

    pub async fn delete_category(repos: &Repositories, id: i64) -> Result<(), AppError> {
        if !repos.categories.delete(id).await? {
            return Err(AppError::NotFound(format!("category {}", id)));
        }
        tracing::info!(category_id = id, "category deleted with its products");
        Ok(())
    }

    /// Filter, search, order, then paginate. `url` is the current request URL used for links.
    pub async fn list_products(
        repos: &Repositories,
        pagination: PaginationConfig,
        params: &ProductListParams,
        url: Option<&Url>,
    ) -> Result<Page<Product>, AppError> {
        let query = params.to_query()?;
        if let Some(category) = query.filter.category {
            if repos.categories.get(category).await?.is_none() {
                return Err(AppError::Validation(FieldErrors::single("category", INVALID_CHOICE)));
            }
        }
        let size = resolve_page_size(params.page_size.as_deref(), pagination);
        let count = repos.products.count(&query.filter).await?;
        let window = resolve_page(params.page.as_deref(), count, size)?;
        let results = repos.products.list(&query, window.offset(), window.size).await?;
        let (next, previous) = page_links(url, &window);
        Ok(Page {
            count,
            next,
            previous,
            results,
        })
    }

    pub async fn get_product(repos: &Repositories, id: i64) -> Result<Product, AppError> {
        repos
            .products
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", id)))
    }

    /// `creator` becomes `created_by`; it is never taken from the payload.
    pub async fn create_product(
        repos: &Repositories,
        creator: &User,
        payload: &ProductPayload,
    ) -> Result<Product, AppError> {
        let changes = validate_product(repos, payload, false).await?;
        let (Some(name), Some(description), Some(price), Some(category_id)) =
            (changes.name, changes.description, changes.price, changes.category_id)
        else {
            return Err(AppError::Internal("validated product is incomplete".into()));
        };
        let product = repos
            .products
            .create(NewProduct {
                name,
                description,
                price,
                stock_quantity: changes.stock_quantity.unwrap_or(0),
                category_id,
                created_by: creator.id,
            })
            .await?;
        tracing::info!(product_id = product.id, user = %creator.username, "product created");
        Ok(product)
    }

    pub async fn update_product(
        repos: &Repositories,
        id: i64,
        payload: &ProductPayload,
        partial: bool,
    ) -> Result<Product, AppError> {
        Self::get_product(repos, id).await?;
        let changes = validate_product(repos, payload, partial).await?;
        repos
            .products
            .update(id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {}", id)))
    }

    pub async fn delete_product(repos: &Repositories, id: i64) -> Result<(), AppError> {
        if !repos.products.delete(id).await? {
            return Err(AppError::NotFound(format!("product {}", id)));
        }
        Ok(())
    }
}

/// Description is optional and may be blank.
fn validate_category(payload: &CategoryPayload, partial: bool) -> Result<CategoryChanges, AppError> {
    let mut errors = FieldErrors::new();
    let name = string_field(
        &mut errors,
        "name",
        payload.name.as_ref(),
        Presence::for_partial(partial),
        Some(CATEGORY_NAME_MAX),
        false,
    );
    let description = string_field(
        &mut errors,
        "description",
        payload.description.as_ref(),
        Presence::Optional,
        None,
        true,
    );
    errors.into_result()?;
    Ok(CategoryChanges { name, description })
}

/// All field errors are collected before the category reference is looked up.
async fn validate_product(
    repos: &Repositories,
    payload: &ProductPayload,
    partial: bool,
) -> Result<ProductChanges, AppError> {
    let presence = Presence::for_partial(partial);
    let mut errors = FieldErrors::new();
    let name = string_field(
        &mut errors,
        "name",
        payload.name.as_ref(),
        presence,
        Some(PRODUCT_NAME_MAX),
        false,
    );
    let description = string_field(&mut errors, "description", payload.description.as_ref(), presence, None, false);
    let price = decimal_field(
        &mut errors,
        "price",
        payload.price.as_ref(),
        presence,
        PRICE_MAX_DIGITS,
        PRICE_DECIMAL_PLACES,
        Some(Decimal::ZERO),
    );
    // has a default, so never required
    let stock_quantity = integer_field(
        &mut errors,
        "stock_quantity",
        payload.stock_quantity.as_ref(),
        Presence::Optional,
        Some(0),
        Some(i64::from(i32::MAX)),
    )
    .map(|n| n as i32);
    let category_id = primary_key_field(&mut errors, "category", payload.category.as_ref(), presence);
    if let Some(id) = category_id {
        if repos.categories.get(id).await?.is_none() {
            errors.add("category", missing_reference_message(id));
        }
    }
    errors.into_result()?;
    Ok(ProductChanges {
        name,
        description,
        price,
        stock_quantity,
        category_id,
    })
}
