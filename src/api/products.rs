//! Product API endpoints
//!
//! Public catalog:
//! - GET /api/v1/products - Paginated, filtered listing
//! - GET /api/v1/products/{id} - Product by id
//! - GET /api/v1/products/slug/{slug} - Product by slug
//! - GET /api/v1/products/{id}/metadata - Page metadata (slug or id)
//!
//! Admin (session + admin role):
//! - POST /api/v1/admin/products - Create
//! - PUT /api/v1/admin/products/{id} - Update
//! - DELETE /api/v1/admin/products/{id} - Delete one
//! - POST /api/v1/admin/products/bulk-delete - Delete many
//! - DELETE /api/v1/admin/products - Delete all (typed confirmation)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{BulkDeleteResult, DataResponse, ProductListResponse};
use crate::models::{CreateProductInput, DeleteAllOutcome, Product, ProductQuery, UpdateProductInput};
use crate::services::{product_metadata, ProductMetadata, ProductServiceError};

/// Request body for bulk delete
#[derive(Debug, Serialize, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

/// Request body for delete-all
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteAllRequest {
    pub confirm: String,
}

/// Query for the metadata endpoint
#[derive(Debug, Deserialize)]
pub struct MetadataQuery {
    pub locale: Option<String>,
}

/// Build the public product router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/slug/{slug}", get(get_product_by_slug))
        .route("/{id}", get(get_product))
        .route("/{id}/metadata", get(get_product_metadata))
}

/// Build the admin product router (auth layers are added by the caller)
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_product).delete(delete_all_products))
        .route("/bulk-delete", post(bulk_delete_products))
        .route("/{id}", put(update_product).delete(delete_product))
}

/// GET /api/v1/products
async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let result = state.product_service.list(&query).await?;
    Ok(Json(result.into()))
}

/// GET /api/v1/products/{id}
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.product_service.get(&id).await?))
}

/// GET /api/v1/products/slug/{slug}
async fn get_product_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.product_service.get_by_slug(&slug).await?))
}

/// GET /api/v1/products/{id}/metadata?locale=
///
/// Always answers with usable metadata: an unknown product yields the
/// not-found titles and a lookup failure yields the generic fallback.
async fn get_product_metadata(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<MetadataQuery>,
) -> Json<ProductMetadata> {
    let site = &state.config.site;
    let locale = query
        .locale
        .filter(|l| site.is_supported_locale(l))
        .unwrap_or_else(|| site.default_locale.clone());

    let metadata = match state.product_service.resolve(&key).await {
        Ok(product) => product_metadata(Some(&product), &locale, site),
        Err(ProductServiceError::NotFound(_)) => product_metadata(None, &locale, site),
        Err(e) => {
            tracing::warn!(key = %key, "Failed to load product metadata: {}", e);
            ProductMetadata::fallback()
        }
    };
    Json(metadata)
}

/// POST /api/v1/admin/products
async fn create_product(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(body): Json<CreateProductInput>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.product_service.create(body).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/v1/admin/products/{id}
async fn update_product(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateProductInput>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(state.product_service.update(&id, body).await?))
}

/// DELETE /api/v1/admin/products/{id}
async fn delete_product(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.product_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/products/bulk-delete
async fn bulk_delete_products(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(body): Json<BulkDeleteRequest>,
) -> Result<Json<DataResponse<BulkDeleteResult>>, ApiError> {
    let deleted_count = state.product_service.delete_many(&body.ids).await?;
    Ok(Json(DataResponse::new(BulkDeleteResult { deleted_count })))
}

/// DELETE /api/v1/admin/products
async fn delete_all_products(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(body): Json<DeleteAllRequest>,
) -> Result<Json<DataResponse<DeleteAllOutcome>>, ApiError> {
    let outcome = state.product_service.delete_all(&body.confirm).await?;
    tracing::info!(admin = %user.email, "Catalog wiped by admin");
    Ok(Json(DataResponse::new(outcome)))
}
