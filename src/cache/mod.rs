//! Cache layer
//!
//! In-process cache (moka) for rendered sitemaps and product lookups. Keys are
//! namespaced with a `prefix:` so a whole family can be dropped at once after a
//! mutation.
//!
//! ```rust,ignore
//! use sawavo::cache::{create_cache, CacheLayer};
//!
//! let cache = create_cache(&config.cache);
//! cache.set("sitemap:xml", &xml, Duration::from_secs(60)).await?;
//! ```

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;

pub use memory::MemoryCache;

/// Cache key namespaces
pub mod keys {
    /// Rendered sitemap document
    pub const SITEMAP_XML: &str = "sitemap:xml";
    /// Prefix for cached product lookups
    pub const PRODUCTS_PREFIX: &str = "products:";

    /// Key for a product looked up by slug
    pub fn product_slug(slug: &str) -> String {
        format!("{}slug:{}", PRODUCTS_PREFIX, slug)
    }

    /// Key for a product looked up by id
    pub fn product_id(id: &str) -> String {
        format!("{}id:{}", PRODUCTS_PREFIX, id)
    }
}

/// Cache layer trait
///
/// Generic methods make this trait unusable as `dyn CacheLayer`; callers hold
/// the concrete `MemoryCache` through [`SharedCache`].
#[async_trait]
pub trait CacheLayer: Send + Sync {
    /// Get a value from cache
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>>;

    /// Set a value in cache with TTL
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>;

    /// Delete a value from cache
    async fn delete(&self, key: &str) -> Result<()>;

    /// Delete all values matching a glob pattern
    async fn delete_pattern(&self, pattern: &str) -> Result<()>;

    /// Clear all cache entries
    async fn clear(&self) -> Result<()>;
}

/// Shared cache handle
pub type SharedCache = Arc<MemoryCache>;

/// Create the cache from configuration
pub fn create_cache(config: &CacheConfig) -> SharedCache {
    let ttl = Duration::from_secs(config.ttl_seconds);
    tracing::debug!(ttl_seconds = config.ttl_seconds, "Creating in-memory cache");
    Arc::new(MemoryCache::with_capacity_and_ttl(10_000, ttl))
}

/// Drop every catalog-derived entry (product lookups and the sitemap).
///
/// Failures are logged, never propagated: a stale entry expires with its TTL.
pub async fn invalidate_catalog(cache: &MemoryCache) {
    if let Err(e) = cache.delete_pattern(&format!("{}*", keys::PRODUCTS_PREFIX)).await {
        tracing::warn!("Failed to invalidate product cache: {}", e);
    }
    if let Err(e) = cache.delete(keys::SITEMAP_XML).await {
        tracing::warn!("Failed to invalidate sitemap cache: {}", e);
    }
}
