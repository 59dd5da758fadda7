//! Product repository
//!
//! Database operations for catalog products and their images.
//!
//! This module provides:
//! - `ProductRepository` trait defining the interface for product data access
//! - `SqlxProductRepository` implementing the trait for SQLite and MySQL

use crate::db::repositories::{decode_json, placeholders, BindValue};
use crate::db::DynDatabasePool;
use crate::models::{DeleteAllOutcome, PagedResult, Product, ProductImage, ProductQuery, LOW_STOCK_THRESHOLD};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::collections::HashMap;
use std::sync::Arc;

const PRODUCT_COLUMNS: &str = "id, slug, title, title_ar, description_en, description_ar, sku, price, \
     compare_at_price, stock_quantity, brand, brand_ar, category, category_ar, concerns, \
     is_active, is_featured, is_today_deal, is_new, created_at, updated_at";

const INSERT_PRODUCT: &str = r#"
    INSERT INTO products (id, slug, title, title_ar, description_en, description_ar, sku, price,
        compare_at_price, stock_quantity, brand, brand_ar, category, category_ar, concerns,
        is_active, is_featured, is_today_deal, is_new, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const UPDATE_PRODUCT: &str = r#"
    UPDATE products SET slug = ?, title = ?, title_ar = ?, description_en = ?, description_ar = ?,
        sku = ?, price = ?, compare_at_price = ?, stock_quantity = ?, brand = ?, brand_ar = ?,
        category = ?, category_ar = ?, concerns = ?, is_active = ?, is_featured = ?,
        is_today_deal = ?, is_new = ?, updated_at = ?
    WHERE id = ?
"#;

const INSERT_IMAGE: &str =
    "INSERT INTO product_images (id, product_id, url, is_main, sort_order) VALUES (?, ?, ?, ?, ?)";

/// Slug and last modification time of an active product
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapProduct {
    pub slug: String,
    pub updated_at: DateTime<Utc>,
}

/// Product repository trait
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product together with its images
    async fn create(&self, product: &Product) -> Result<Product>;

    async fn get_by_id(&self, id: &str) -> Result<Option<Product>>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>>;

    /// Filtered, paginated listing ordered newest first
    async fn list(&self, query: &ProductQuery) -> Result<PagedResult<Product>>;

    /// Persist every column of `product`; replaces its images when `replace_images`
    async fn update(&self, product: &Product, replace_images: bool) -> Result<Product>;

    /// Delete one product, returning whether it existed
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Delete the given products, returning how many existed
    async fn delete_many(&self, ids: &[String]) -> Result<u64>;

    /// Delete every product and image in one transaction
    async fn delete_all(&self) -> Result<DeleteAllOutcome>;

    /// Whether another product already uses `slug`
    async fn slug_exists(&self, slug: &str, exclude_id: Option<&str>) -> Result<bool>;

    /// Whether another product already uses `sku`
    async fn sku_exists(&self, sku: &str, exclude_id: Option<&str>) -> Result<bool>;

    /// Active products for the sitemap, most recently updated first
    async fn list_active_for_sitemap(&self, limit: i64) -> Result<Vec<SitemapProduct>>;
}

/// SQLx-based product repository implementation
pub struct SqlxProductRepository {
    pool: DynDatabasePool,
}

impl SqlxProductRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ProductRepository> {
        Arc::new(Self::new(pool))
    }
}

macro_rules! product_from_row {
    ($row:expr) => {{
        let row = $row;
        Product {
            id: row.try_get("id")?,
            slug: row.try_get("slug")?,
            title: row.try_get("title")?,
            title_ar: row.try_get("title_ar")?,
            description_en: row.try_get("description_en")?,
            description_ar: row.try_get("description_ar")?,
            sku: row.try_get("sku")?,
            price: row.try_get("price")?,
            compare_at_price: row.try_get("compare_at_price")?,
            stock_quantity: row.try_get("stock_quantity")?,
            brand: row.try_get("brand")?,
            brand_ar: row.try_get("brand_ar")?,
            category: row.try_get("category")?,
            category_ar: row.try_get("category_ar")?,
            concerns: decode_json("concerns", row.try_get("concerns")?)?,
            is_active: row.try_get("is_active")?,
            is_featured: row.try_get("is_featured")?,
            is_today_deal: row.try_get("is_today_deal")?,
            is_new: row.try_get("is_new")?,
            images: Vec::new(),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }
    }};
}

/// Fetch images for `$ids`, grouped by product id and ordered by sort order
macro_rules! load_images {
    ($conn:expr, $ids:expr) => {{
        let ids: &[String] = $ids;
        let mut by_product: HashMap<String, Vec<ProductImage>> = HashMap::new();
        if !ids.is_empty() {
            let sql = format!(
                "SELECT id, product_id, url, is_main, sort_order FROM product_images \
                 WHERE product_id IN ({}) ORDER BY sort_order ASC, id ASC",
                placeholders(ids.len())
            );
            let mut query = sqlx::query(&sql);
            for id in ids {
                query = query.bind(id.clone());
            }
            let rows = query
                .fetch_all($conn)
                .await
                .context("Failed to load product images")?;
            for row in &rows {
                let product_id: String = row.try_get("product_id")?;
                by_product.entry(product_id).or_default().push(ProductImage {
                    id: row.try_get("id")?,
                    url: row.try_get("url")?,
                    is_main: row.try_get("is_main")?,
                    sort_order: row.try_get("sort_order")?,
                });
            }
        }
        by_product
    }};
}

fn attach_images(products: &mut [Product], mut images: HashMap<String, Vec<ProductImage>>) {
    for product in products.iter_mut() {
        product.images = images.remove(&product.id).unwrap_or_default();
    }
}

/// WHERE clause and its binds for a listing query
fn build_filters(query: &ProductQuery) -> (String, Vec<BindValue>) {
    let mut conditions: Vec<&str> = Vec::new();
    let mut binds = Vec::new();

    let flags = [
        ("is_active = ?", query.is_active),
        ("is_featured = ?", query.is_featured),
        ("is_today_deal = ?", query.is_today_deal),
        ("is_new = ?", query.is_new),
    ];
    for (condition, value) in flags {
        if let Some(value) = value {
            conditions.push(condition);
            binds.push(BindValue::Bool(value));
        }
    }

    if query.low_stock == Some(true) {
        conditions.push("stock_quantity <= ?");
        binds.push(BindValue::Int(LOW_STOCK_THRESHOLD));
    }

    if let Some(term) = query.search_term() {
        conditions.push(
            "(title LIKE ? ESCAPE '!' OR title_ar LIKE ? ESCAPE '!' OR slug LIKE ? ESCAPE '!' \
             OR sku LIKE ? ESCAPE '!' OR brand LIKE ? ESCAPE '!')",
        );
        let pattern = format!("%{}%", escape_like(term));
        binds.extend(std::iter::repeat(BindValue::Text(pattern)).take(5));
    }

    if conditions.is_empty() {
        (String::new(), binds)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), binds)
    }
}

/// Escape LIKE wildcards so the term matches literally. `!` is the escape
/// character because a backslash literal is read differently by MySQL and SQLite.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '!' | '%' | '_') {
            escaped.push('!');
        }
        escaped.push(c);
    }
    escaped
}

fn dedup_ids(ids: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(id.clone());
        }
    }
    unique
}

#[async_trait]
impl ProductRepository for SqlxProductRepository {
    async fn create(&self, product: &Product) -> Result<Product> {
        let concerns = serde_json::to_string(&product.concerns)?;

        on_pool!(self.pool, |conn| {
            let mut tx = conn.begin().await?;
            sqlx::query(INSERT_PRODUCT)
                .bind(&product.id)
                .bind(&product.slug)
                .bind(&product.title)
                .bind(&product.title_ar)
                .bind(&product.description_en)
                .bind(&product.description_ar)
                .bind(&product.sku)
                .bind(product.price)
                .bind(product.compare_at_price)
                .bind(product.stock_quantity)
                .bind(&product.brand)
                .bind(&product.brand_ar)
                .bind(&product.category)
                .bind(&product.category_ar)
                .bind(&concerns)
                .bind(product.is_active)
                .bind(product.is_featured)
                .bind(product.is_today_deal)
                .bind(product.is_new)
                .bind(product.created_at)
                .bind(product.updated_at)
                .execute(&mut *tx)
                .await
                .context("Failed to create product")?;

            for image in &product.images {
                sqlx::query(INSERT_IMAGE)
                    .bind(&image.id)
                    .bind(&product.id)
                    .bind(&image.url)
                    .bind(image.is_main)
                    .bind(image.sort_order)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to create product image")?;
            }
            tx.commit().await?;
        });

        Ok(product.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?", PRODUCT_COLUMNS);
        on_pool!(self.pool, |conn| {
            let row = sqlx::query(&sql)
                .bind(id)
                .fetch_optional(conn)
                .await
                .context("Failed to get product by ID")?;
            match row {
                Some(row) => {
                    let mut product = product_from_row!(&row);
                    let images = load_images!(conn, std::slice::from_ref(&product.id));
                    attach_images(std::slice::from_mut(&mut product), images);
                    Ok(Some(product))
                }
                None => Ok(None),
            }
        })
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        let sql = format!("SELECT {} FROM products WHERE slug = ?", PRODUCT_COLUMNS);
        on_pool!(self.pool, |conn| {
            let row = sqlx::query(&sql)
                .bind(slug)
                .fetch_optional(conn)
                .await
                .context("Failed to get product by slug")?;
            match row {
                Some(row) => {
                    let mut product = product_from_row!(&row);
                    let images = load_images!(conn, std::slice::from_ref(&product.id));
                    attach_images(std::slice::from_mut(&mut product), images);
                    Ok(Some(product))
                }
                None => Ok(None),
            }
        })
    }

    async fn list(&self, query: &ProductQuery) -> Result<PagedResult<Product>> {
        let params = query.params();
        let (where_clause, binds) = build_filters(query);
        let count_sql = format!("SELECT COUNT(*) FROM products{}", where_clause);
        let list_sql = format!(
            "SELECT {} FROM products{} ORDER BY created_at DESC, id ASC LIMIT ? OFFSET ?",
            PRODUCT_COLUMNS, where_clause
        );

        on_pool!(self.pool, |conn| {
            let total: i64 = bind_all!(sqlx::query_scalar::<_, i64>(&count_sql), binds)
                .fetch_one(conn)
                .await
                .context("Failed to count products")?;

            let rows = bind_all!(sqlx::query(&list_sql), binds)
                .bind(params.limit())
                .bind(params.offset())
                .fetch_all(conn)
                .await
                .context("Failed to list products")?;

            let mut products = rows
                .iter()
                .map(|row| -> Result<Product> { Ok(product_from_row!(row)) })
                .collect::<Result<Vec<_>>>()?;
            let ids: Vec<String> = products.iter().map(|p| p.id.clone()).collect();
            let images = load_images!(conn, &ids);
            attach_images(&mut products, images);

            Ok(PagedResult::new(products, total, &params))
        })
    }

    async fn update(&self, product: &Product, replace_images: bool) -> Result<Product> {
        let concerns = serde_json::to_string(&product.concerns)?;

        on_pool!(self.pool, |conn| {
            let mut tx = conn.begin().await?;
            sqlx::query(UPDATE_PRODUCT)
                .bind(&product.slug)
                .bind(&product.title)
                .bind(&product.title_ar)
                .bind(&product.description_en)
                .bind(&product.description_ar)
                .bind(&product.sku)
                .bind(product.price)
                .bind(product.compare_at_price)
                .bind(product.stock_quantity)
                .bind(&product.brand)
                .bind(&product.brand_ar)
                .bind(&product.category)
                .bind(&product.category_ar)
                .bind(&concerns)
                .bind(product.is_active)
                .bind(product.is_featured)
                .bind(product.is_today_deal)
                .bind(product.is_new)
                .bind(product.updated_at)
                .bind(&product.id)
                .execute(&mut *tx)
                .await
                .context("Failed to update product")?;

            if replace_images {
                sqlx::query("DELETE FROM product_images WHERE product_id = ?")
                    .bind(&product.id)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to clear product images")?;
                for image in &product.images {
                    sqlx::query(INSERT_IMAGE)
                        .bind(&image.id)
                        .bind(&product.id)
                        .bind(&image.url)
                        .bind(image.is_main)
                        .bind(image.sort_order)
                        .execute(&mut *tx)
                        .await
                        .context("Failed to create product image")?;
                }
            }
            tx.commit().await?;
        });

        Ok(product.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let deleted = self.delete_many(std::slice::from_ref(&id.to_string())).await?;
        Ok(deleted > 0)
    }

    async fn delete_many(&self, ids: &[String]) -> Result<u64> {
        let ids = dedup_ids(ids);
        if ids.is_empty() {
            return Ok(0);
        }
        let list = placeholders(ids.len());
        let images_sql = format!("DELETE FROM product_images WHERE product_id IN ({})", list);
        let products_sql = format!("DELETE FROM products WHERE id IN ({})", list);

        on_pool!(self.pool, |conn| {
            let mut tx = conn.begin().await?;

            let mut images = sqlx::query(&images_sql);
            for id in &ids {
                images = images.bind(id.clone());
            }
            images
                .execute(&mut *tx)
                .await
                .context("Failed to delete product images")?;

            let mut products = sqlx::query(&products_sql);
            for id in &ids {
                products = products.bind(id.clone());
            }
            let result = products
                .execute(&mut *tx)
                .await
                .context("Failed to delete products")?;

            tx.commit().await?;
            Ok(result.rows_affected())
        })
    }

    async fn delete_all(&self) -> Result<DeleteAllOutcome> {
        on_pool!(self.pool, |conn| {
            let mut tx = conn.begin().await?;
            let images = sqlx::query("DELETE FROM product_images")
                .execute(&mut *tx)
                .await
                .context("Failed to delete product images")?;
            let products = sqlx::query("DELETE FROM products")
                .execute(&mut *tx)
                .await
                .context("Failed to delete products")?;
            tx.commit().await?;

            Ok(DeleteAllOutcome {
                deleted_products_count: products.rows_affected(),
                deleted_images_count: images.rows_affected(),
            })
        })
    }

    async fn slug_exists(&self, slug: &str, exclude_id: Option<&str>) -> Result<bool> {
        let exclude = exclude_id.unwrap_or("");
        on_pool!(self.pool, |conn| {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE slug = ? AND id <> ?")
                .bind(slug)
                .bind(exclude)
                .fetch_one(conn)
                .await
                .context("Failed to check product slug")?;
            Ok(count > 0)
        })
    }

    async fn sku_exists(&self, sku: &str, exclude_id: Option<&str>) -> Result<bool> {
        let exclude = exclude_id.unwrap_or("");
        on_pool!(self.pool, |conn| {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE sku = ? AND id <> ?")
                .bind(sku)
                .bind(exclude)
                .fetch_one(conn)
                .await
                .context("Failed to check product SKU")?;
            Ok(count > 0)
        })
    }

    async fn list_active_for_sitemap(&self, limit: i64) -> Result<Vec<SitemapProduct>> {
        on_pool!(self.pool, |conn| {
            let rows = sqlx::query(
                "SELECT slug, updated_at FROM products WHERE is_active = ? ORDER BY updated_at DESC LIMIT ?",
            )
            .bind(true)
            .bind(limit)
            .fetch_all(conn)
            .await
            .context("Failed to list products for sitemap")?;

            rows.iter()
                .map(|row| -> Result<SitemapProduct> {
                    Ok(SitemapProduct {
                        slug: row.try_get("slug")?,
                        updated_at: row.try_get("updated_at")?,
                    })
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxProductRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxProductRepository::new(pool)
    }

    fn product(slug: &str, minutes_ago: i64) -> Product {
        let at = Utc::now() - chrono::Duration::minutes(minutes_ago);
        Product {
            id: uuid::Uuid::new_v4().to_string(),
            slug: slug.to_string(),
            title: slug.replace('-', " "),
            title_ar: None,
            description_en: None,
            description_ar: None,
            sku: None,
            price: 12.5,
            compare_at_price: None,
            stock_quantity: 50,
            brand: None,
            brand_ar: None,
            category: None,
            category_ar: None,
            concerns: vec!["acne".to_string()],
            is_active: true,
            is_featured: false,
            is_today_deal: false,
            is_new: false,
            images: vec![],
            created_at: at,
            updated_at: at,
        }
    }

    fn image(url: &str, is_main: bool, sort_order: i32) -> ProductImage {
        ProductImage {
            id: uuid::Uuid::new_v4().to_string(),
            url: url.to_string(),
            is_main,
            sort_order,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_with_images() {
        let repo = setup_test_repo().await;
        let mut p = product("vitamin-c-serum", 0);
        p.images = vec![image("https://cdn/b.webp", false, 1), image("https://cdn/a.webp", true, 0)];
        repo.create(&p).await.expect("Failed to create product");

        let found = repo.get_by_id(&p.id).await.unwrap().expect("Product not found");
        assert_eq!(found.slug, "vitamin-c-serum");
        assert_eq!(found.concerns, vec!["acne"]);
        assert_eq!(found.images.len(), 2);
        assert_eq!(found.images[0].url, "https://cdn/a.webp");

        let by_slug = repo.get_by_slug("vitamin-c-serum").await.unwrap();
        assert_eq!(by_slug.map(|p| p.id), Some(p.id));
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let repo = setup_test_repo().await;
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
        assert!(repo.get_by_slug("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_and_paginates() {
        let repo = setup_test_repo().await;
        for (i, slug) in ["old", "middle", "new"].iter().enumerate() {
            repo.create(&product(slug, 30 - i as i64 * 10)).await.unwrap();
        }

        let query = ProductQuery {
            page: 1,
            limit: 2,
            ..Default::default()
        };
        let page = repo.list(&query).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages(), 2);
        let slugs: Vec<_> = page.items.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "middle"]);

        let page2 = repo.list(&ProductQuery { page: 2, ..query }).await.unwrap();
        assert_eq!(page2.items.len(), 1);
        assert_eq!(page2.items[0].slug, "old");
    }

    #[tokio::test]
    async fn test_list_filters() {
        let repo = setup_test_repo().await;

        let mut featured = product("featured-cream", 3);
        featured.is_featured = true;
        let mut low = product("low-stock-toner", 2);
        low.stock_quantity = 4;
        let mut inactive = product("hidden-mask", 1);
        inactive.is_active = false;
        let mut deal = product("deal-cleanser", 0);
        deal.is_today_deal = true;
        deal.sku = Some("CLN-77".into());

        for p in [&featured, &low, &inactive, &deal] {
            repo.create(p).await.unwrap();
        }

        let only = |q: ProductQuery| {
            let repo = &repo;
            async move {
                repo.list(&q)
                    .await
                    .unwrap()
                    .items
                    .into_iter()
                    .map(|p| p.slug)
                    .collect::<Vec<_>>()
            }
        };

        assert_eq!(
            only(ProductQuery { is_featured: Some(true), ..Default::default() }).await,
            vec!["featured-cream"]
        );
        assert_eq!(
            only(ProductQuery { low_stock: Some(true), ..Default::default() }).await,
            vec!["low-stock-toner"]
        );
        assert_eq!(
            only(ProductQuery { is_today_deal: Some(true), ..Default::default() }).await,
            vec!["deal-cleanser"]
        );
        assert_eq!(
            only(ProductQuery { is_active: Some(true), ..Default::default() }).await.len(),
            3
        );
        assert_eq!(
            only(ProductQuery { search: Some("cln-77".into()), ..Default::default() }).await,
            vec!["deal-cleanser"]
        );
        assert_eq!(
            only(ProductQuery { search: Some("  ".into()), ..Default::default() }).await.len(),
            4
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("serum"), "serum");
        assert_eq!(escape_like("50%_off!"), "50!%!_off!!");
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let repo = setup_test_repo().await;

        let mut percent = product("spf-serum", 2);
        percent.title = "SPF 50% Serum".into();
        let mut underscore = product("night-cream", 1);
        underscore.sku = Some("NC_01".into());
        let mut bang = product("wow-mask", 0);
        bang.title = "Wow! Mask".into();
        for p in [&percent, &underscore, &bang] {
            repo.create(p).await.unwrap();
        }

        let search = |term: &str| {
            let repo = &repo;
            let query = ProductQuery { search: Some(term.to_string()), ..Default::default() };
            async move {
                repo.list(&query)
                    .await
                    .unwrap()
                    .items
                    .into_iter()
                    .map(|p| p.slug)
                    .collect::<Vec<_>>()
            }
        };

        assert_eq!(search("%").await, vec!["spf-serum"]);
        assert_eq!(search("_").await, vec!["night-cream"]);
        assert_eq!(search("!").await, vec!["wow-mask"]);
        assert_eq!(search("50%").await, vec!["spf-serum"]);
        assert!(search("5_%").await.is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_images() {
        let repo = setup_test_repo().await;
        let mut p = product("night-cream", 0);
        p.images = vec![image("https://cdn/old.webp", true, 0)];
        repo.create(&p).await.unwrap();

        p.title = "Night Cream Plus".into();
        p.images = vec![image("https://cdn/new.webp", true, 0)];
        repo.update(&p, true).await.unwrap();

        let found = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Night Cream Plus");
        assert_eq!(found.images.len(), 1);
        assert_eq!(found.images[0].url, "https://cdn/new.webp");

        p.images = vec![];
        repo.update(&p, false).await.unwrap();
        let found = repo.get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(found.images.len(), 1);
    }

    #[tokio::test]
    async fn test_deleted_product_disappears_from_list() {
        let repo = setup_test_repo().await;
        let keep = product("keep", 1);
        let gone = product("gone", 0);
        repo.create(&keep).await.unwrap();
        repo.create(&gone).await.unwrap();

        assert!(repo.delete(&gone.id).await.unwrap());
        assert!(!repo.delete(&gone.id).await.unwrap());

        let listed = repo.list(&ProductQuery::default()).await.unwrap();
        assert_eq!(listed.total, 1);
        assert_eq!(listed.items[0].id, keep.id);
    }

    #[tokio::test]
    async fn test_delete_many_counts_existing_only() {
        let repo = setup_test_repo().await;
        let a = product("a", 2);
        let b = product("b", 1);
        let c = product("c", 0);
        for p in [&a, &b, &c] {
            repo.create(p).await.unwrap();
        }

        let deleted = repo
            .delete_many(&[a.id.clone(), b.id.clone(), b.id.clone(), "missing".into()])
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(repo.delete_many(&[]).await.unwrap(), 0);
        assert_eq!(repo.list(&ProductQuery::default()).await.unwrap().total, 1);
    }

    #[tokio::test]
    async fn test_delete_all_reports_counts() {
        let repo = setup_test_repo().await;
        let mut a = product("a", 1);
        a.images = vec![image("https://cdn/1.webp", true, 0), image("https://cdn/2.webp", false, 1)];
        let b = product("b", 0);
        repo.create(&a).await.unwrap();
        repo.create(&b).await.unwrap();

        let outcome = repo.delete_all().await.unwrap();
        assert_eq!(outcome.deleted_products_count, 2);
        assert_eq!(outcome.deleted_images_count, 2);
        assert_eq!(repo.list(&ProductQuery::default()).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn test_slug_and_sku_exists() {
        let repo = setup_test_repo().await;
        let mut p = product("rose-water", 0);
        p.sku = Some("RW-1".into());
        repo.create(&p).await.unwrap();

        assert!(repo.slug_exists("rose-water", None).await.unwrap());
        assert!(!repo.slug_exists("rose-water", Some(&p.id)).await.unwrap());
        assert!(repo.sku_exists("RW-1", None).await.unwrap());
        assert!(!repo.sku_exists("RW-2", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_active_for_sitemap_skips_inactive() {
        let repo = setup_test_repo().await;
        let active = product("active", 0);
        let mut inactive = product("inactive", 0);
        inactive.is_active = false;
        repo.create(&active).await.unwrap();
        repo.create(&inactive).await.unwrap();

        let entries = repo.list_active_for_sitemap(10_000).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].slug, "active");
    }

    #[test]
    fn test_build_filters_without_conditions() {
        let (clause, binds) = build_filters(&ProductQuery::default());
        assert!(clause.is_empty());
        assert!(binds.is_empty());
    }

    #[test]
    fn test_build_filters_combines_conditions() {
        let query = ProductQuery {
            is_active: Some(true),
            low_stock: Some(true),
            search: Some("serum".into()),
            ..Default::default()
        };
        let (clause, binds) = build_filters(&query);
        assert!(clause.starts_with(" WHERE is_active = ?"));
        assert!(clause.contains("stock_quantity <= ?"));
        assert_eq!(binds.len(), 1 + 1 + 5);
        assert_eq!(binds[1], BindValue::Int(LOW_STOCK_THRESHOLD));
    }
}
