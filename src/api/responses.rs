//! Shared API response types
//!
//! Envelopes reused by several endpoints so list and mutation responses keep
//! one shape across the catalog and blog APIs.

use serde::{Deserialize, Serialize};

use crate::models::PagedResult;

// ============================================================================
// Envelopes
// ============================================================================

/// `{ "data": ... }` wrapper used by admin mutations
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Pagination block of a list response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: u32,
}

impl<T> From<&PagedResult<T>> for Pagination {
    fn from(result: &PagedResult<T>) -> Self {
        Self {
            page: result.page,
            limit: result.per_page,
            total: result.total,
            total_pages: result.total_pages(),
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// `GET /products` response
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<crate::models::Product>,
    pub pagination: Pagination,
}

impl From<PagedResult<crate::models::Product>> for ProductListResponse {
    fn from(result: PagedResult<crate::models::Product>) -> Self {
        let pagination = Pagination::from(&result);
        Self {
            products: result.items,
            pagination,
        }
    }
}

/// Bulk delete result
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteResult {
    pub deleted_count: u64,
}

// ============================================================================
// Blog
// ============================================================================

/// `GET /blog/posts` response
#[derive(Debug, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<crate::models::BlogPost>,
    pub pagination: Pagination,
}

impl From<PagedResult<crate::models::BlogPost>> for PostListResponse {
    fn from(result: PagedResult<crate::models::BlogPost>) -> Self {
        let pagination = Pagination::from(&result);
        Self {
            posts: result.items,
            pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{sample_product, ListParams};

    #[test]
    fn test_product_list_shape() {
        let result = PagedResult::new(vec![sample_product()], 21, &ListParams::new(2, 10));
        let json = serde_json::to_value(ProductListResponse::from(result)).unwrap();

        assert_eq!(json["products"][0]["slug"], "hydrating-serum");
        assert_eq!(
            json["pagination"],
            serde_json::json!({ "page": 2, "limit": 10, "total": 21, "totalPages": 3 })
        );
    }

    #[test]
    fn test_data_envelope() {
        let json = serde_json::to_value(DataResponse::new(BulkDeleteResult { deleted_count: 3 })).unwrap();
        assert_eq!(json, serde_json::json!({ "data": { "deletedCount": 3 } }));
    }
}
