//! Product service
//!
//! Implements business logic for the catalog:
//! - Paginated, filtered listing for the admin product list and storefront
//! - Lookup by id, by slug, or by either (old storefront links used ids)
//! - Create/update with validation, slug generation and uniqueness checks
//! - Single, bulk and confirmed delete-all removal
//!
//! Every mutation drops cached product lookups and the rendered sitemap.

use crate::cache::{invalidate_catalog, keys, CacheLayer, SharedCache};
use crate::db::repositories::ProductRepository;
use crate::models::{
    CreateProductInput, DeleteAllOutcome, PagedResult, Product, ProductImage, ProductImageInput, ProductQuery,
    UpdateProductInput,
};
use crate::services::slug::product_slug;
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Phrase an operator must type to wipe the catalog
pub const DELETE_ALL_CONFIRMATION: &str = "DELETE ALL PRODUCTS";

/// Error types for product service operations
#[derive(Debug, thiserror::Error)]
pub enum ProductServiceError {
    /// Product not found
    #[error("Product not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Slug or SKU already used by another product
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Delete-all confirmation phrase did not match
    #[error("Confirmation phrase does not match")]
    ConfirmationMismatch,

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Product service for catalog management
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
    cache: SharedCache,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>, cache: SharedCache) -> Self {
        Self { repo, cache }
    }

    /// List products matching the query
    pub async fn list(&self, query: &ProductQuery) -> Result<PagedResult<Product>, ProductServiceError> {
        Ok(self.repo.list(query).await.context("Failed to list products")?)
    }

    /// Get a product by id
    pub async fn get(&self, id: &str) -> Result<Product, ProductServiceError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| ProductServiceError::NotFound(id.to_string()))
    }

    /// Get a product by slug
    pub async fn get_by_slug(&self, slug: &str) -> Result<Product, ProductServiceError> {
        self.find_by_slug(slug)
            .await?
            .ok_or_else(|| ProductServiceError::NotFound(slug.to_string()))
    }

    /// Get a product by slug, falling back to the id
    pub async fn resolve(&self, key: &str) -> Result<Product, ProductServiceError> {
        if let Some(product) = self.find_by_slug(key).await? {
            return Ok(product);
        }
        self.find_by_id(key)
            .await?
            .ok_or_else(|| ProductServiceError::NotFound(key.to_string()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Product>, ProductServiceError> {
        let cache_key = keys::product_id(id);
        if let Some(product) = self.cache.get::<Product>(&cache_key).await.ok().flatten() {
            return Ok(Some(product));
        }

        let product = self.repo.get_by_id(id).await.context("Failed to get product by ID")?;
        if let Some(ref p) = product {
            if let Err(e) = self.cache.set_default(&cache_key, p).await {
                tracing::warn!(key = %cache_key, "Failed to cache product: {}", e);
            }
        }
        Ok(product)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, ProductServiceError> {
        let cache_key = keys::product_slug(slug);
        if let Some(product) = self.cache.get::<Product>(&cache_key).await.ok().flatten() {
            return Ok(Some(product));
        }

        let product = self.repo.get_by_slug(slug).await.context("Failed to get product by slug")?;
        if let Some(ref p) = product {
            if let Err(e) = self.cache.set_default(&cache_key, p).await {
                tracing::warn!(key = %cache_key, "Failed to cache product: {}", e);
            }
        }
        Ok(product)
    }

    /// Create a product
    ///
    /// # Errors
    /// - `ValidationError` for a blank title, a negative price or stock, or a
    ///   title that yields an empty slug
    /// - `Conflict` if the slug or SKU is taken
    pub async fn create(&self, input: CreateProductInput) -> Result<Product, ProductServiceError> {
        validate_title(&input.title)?;
        validate_amounts(Some(input.price), input.compare_at_price, Some(input.stock_quantity))?;

        let slug = match input.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(slug) => normalize_slug(slug)?,
            None => normalize_slug(&input.title)?,
        };
        if self.repo.slug_exists(&slug, None).await.context("Failed to check slug")? {
            return Err(ProductServiceError::Conflict(format!("slug '{}' is already in use", slug)));
        }
        let sku = clean(input.sku);
        if let Some(ref sku) = sku {
            if self.repo.sku_exists(sku, None).await.context("Failed to check SKU")? {
                return Err(ProductServiceError::Conflict(format!("SKU '{}' is already in use", sku)));
            }
        }

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            slug,
            title: input.title.trim().to_string(),
            title_ar: clean(input.title_ar),
            description_en: clean(input.description_en),
            description_ar: clean(input.description_ar),
            sku,
            price: input.price,
            compare_at_price: input.compare_at_price,
            stock_quantity: input.stock_quantity,
            brand: clean(input.brand),
            brand_ar: clean(input.brand_ar),
            category: clean(input.category),
            category_ar: clean(input.category_ar),
            concerns: input.concerns,
            is_active: input.is_active.unwrap_or(true),
            is_featured: input.is_featured,
            is_today_deal: input.is_today_deal,
            is_new: input.is_new,
            images: build_images(&input.images),
            created_at: now,
            updated_at: now,
        };

        let created = self.repo.create(&product).await.context("Failed to create product")?;
        invalidate_catalog(&self.cache).await;
        tracing::info!(product_id = %created.id, slug = %created.slug, "Product created");
        Ok(created)
    }

    /// Update a product; unset fields keep their values and a present image
    /// list replaces the old one
    pub async fn update(&self, id: &str, input: UpdateProductInput) -> Result<Product, ProductServiceError> {
        if !input.has_changes() {
            return Err(ProductServiceError::ValidationError("No fields to update".to_string()));
        }
        if let Some(ref title) = input.title {
            validate_title(title)?;
        }
        validate_amounts(input.price, input.compare_at_price.flatten(), input.stock_quantity)?;

        let mut product = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get product")?
            .ok_or_else(|| ProductServiceError::NotFound(id.to_string()))?;
        let old_slug = product.slug.clone();

        let mut input = input;
        if let Some(slug) = input.slug.take() {
            let slug = normalize_slug(&slug)?;
            if slug != old_slug && self.repo.slug_exists(&slug, Some(id)).await.context("Failed to check slug")? {
                return Err(ProductServiceError::Conflict(format!("slug '{}' is already in use", slug)));
            }
            input.slug = Some(slug);
        }
        input.sku = input.sku.map(|sku| sku.trim().to_string());
        if let Some(sku) = input.sku.as_deref().filter(|s| !s.is_empty()) {
            if self.repo.sku_exists(sku, Some(id)).await.context("Failed to check SKU")? {
                return Err(ProductServiceError::Conflict(format!("SKU '{}' is already in use", sku)));
            }
        }

        input.apply_to(&mut product);
        if let Some(ref images) = input.images {
            product.images = build_images(images);
        }
        product.updated_at = Utc::now();

        let updated = self
            .repo
            .update(&product, input.images.is_some())
            .await
            .context("Failed to update product")?;
        invalidate_catalog(&self.cache).await;
        tracing::info!(product_id = %id, "Product updated");
        Ok(updated)
    }

    /// Delete a product and its images
    pub async fn delete(&self, id: &str) -> Result<(), ProductServiceError> {
        let deleted = self.repo.delete(id).await.context("Failed to delete product")?;
        if !deleted {
            return Err(ProductServiceError::NotFound(id.to_string()));
        }
        invalidate_catalog(&self.cache).await;
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Delete several products; ids that do not exist are ignored
    ///
    /// Returns how many products were removed.
    pub async fn delete_many(&self, ids: &[String]) -> Result<u64, ProductServiceError> {
        let ids: Vec<String> = ids
            .iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
        if ids.is_empty() {
            return Err(ProductServiceError::ValidationError("No product ids given".to_string()));
        }

        let deleted = self.repo.delete_many(&ids).await.context("Failed to delete products")?;
        invalidate_catalog(&self.cache).await;
        tracing::info!(requested = ids.len(), deleted, "Products bulk deleted");
        Ok(deleted)
    }

    /// Wipe the whole catalog, images included
    ///
    /// `confirmation` must equal [`DELETE_ALL_CONFIRMATION`] exactly.
    pub async fn delete_all(&self, confirmation: &str) -> Result<DeleteAllOutcome, ProductServiceError> {
        if confirmation != DELETE_ALL_CONFIRMATION {
            tracing::warn!("Delete-all rejected: confirmation phrase mismatch");
            return Err(ProductServiceError::ConfirmationMismatch);
        }

        let outcome = self.repo.delete_all().await.context("Failed to delete all products")?;
        invalidate_catalog(&self.cache).await;
        tracing::warn!(
            products = outcome.deleted_products_count,
            images = outcome.deleted_images_count,
            "All products deleted"
        );
        Ok(outcome)
    }
}

fn validate_title(title: &str) -> Result<(), ProductServiceError> {
    if title.trim().is_empty() {
        return Err(ProductServiceError::ValidationError("Title is required".to_string()));
    }
    Ok(())
}

fn validate_amounts(
    price: Option<f64>,
    compare_at_price: Option<f64>,
    stock: Option<i64>,
) -> Result<(), ProductServiceError> {
    for (name, value) in [("Price", price), ("Compare-at price", compare_at_price)] {
        if let Some(value) = value {
            if !value.is_finite() || value < 0.0 {
                return Err(ProductServiceError::ValidationError(format!("{} must be zero or more", name)));
            }
        }
    }
    if stock.is_some_and(|s| s < 0) {
        return Err(ProductServiceError::ValidationError(
            "Stock quantity must be zero or more".to_string(),
        ));
    }
    Ok(())
}

fn normalize_slug(raw: &str) -> Result<String, ProductServiceError> {
    let slug = product_slug(raw);
    if slug.is_empty() {
        return Err(ProductServiceError::ValidationError(format!("Cannot build a slug from '{}'", raw)));
    }
    Ok(slug)
}

/// Trim, mapping blank text to `None`
fn clean(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn build_images(inputs: &[ProductImageInput]) -> Vec<ProductImage> {
    inputs
        .iter()
        .filter(|img| !img.url.trim().is_empty())
        .enumerate()
        .map(|(i, img)| ProductImage {
            id: Uuid::new_v4().to_string(),
            url: img.url.trim().to_string(),
            is_main: img.is_main,
            sort_order: i as i32,
        })
        .collect()
}
