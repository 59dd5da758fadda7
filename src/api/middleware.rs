//! API middleware
//!
//! Contains middleware for:
//! - Authentication (session token validation)
//! - Authorization (admin role checking)
//! - Storefront locale routing and legacy product URL redirects
//! - Request statistics for the health endpoint

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::cache::{create_cache, SharedCache};
use crate::config::Config;
use crate::db::repositories::{
    SqlxBlogRepository, SqlxProductRepository, SqlxSessionRepository, SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::models::User;
use crate::services::locale;
use crate::services::{
    BlogService, BlogServiceError, ProductService, ProductServiceError, SitemapService, UserService,
    UserServiceError, DELETE_ALL_CONFIRMATION,
};

// ============================================================================
// Request Statistics
// ============================================================================

/// Lightweight request statistics using atomic operations (no locks)
pub struct RequestStats {
    total_requests: AtomicU64,
    /// Total response time in microseconds
    total_response_time_us: AtomicU64,
    start_time: Instant,
}

impl RequestStats {
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            total_response_time_us: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a request with its response time
    pub fn record(&self, duration_us: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time_us.fetch_add(duration_us, Ordering::Relaxed);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Average response time in microseconds
    pub fn avg_response_time_us(&self) -> f64 {
        let total = self.total_requests.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        self.total_response_time_us.load(Ordering::Relaxed) as f64 / total as f64
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for RequestStats {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Application State
// ============================================================================

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub config: Arc<Config>,
    pub cache: SharedCache,
    pub product_service: Arc<ProductService>,
    pub blog_service: Arc<BlogService>,
    pub user_service: Arc<UserService>,
    pub sitemap_service: Arc<SitemapService>,
    pub request_stats: Arc<RequestStats>,
}

impl AppState {
    /// Wire repositories, cache and services over a migrated pool
    pub fn new(pool: DynDatabasePool, config: Config) -> anyhow::Result<Self> {
        let cache = create_cache(&config.cache);
        let product_repo = SqlxProductRepository::boxed(pool.clone());
        let blog_repo = SqlxBlogRepository::boxed(pool.clone());

        let sitemap_service = SitemapService::new(
            product_repo.clone(),
            blog_repo.clone(),
            cache.clone(),
            config.site.clone(),
        )?;
        let user_service = UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
        );

        Ok(Self {
            product_service: Arc::new(ProductService::new(product_repo, cache.clone())),
            blog_service: Arc::new(BlogService::new(blog_repo)),
            user_service: Arc::new(user_service),
            sitemap_service: Arc::new(sitemap_service),
            request_stats: Arc::new(RequestStats::new()),
            config: Arc::new(config),
            cache,
            pool,
        })
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Authenticated user extracted from request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ProductServiceError> for ApiError {
    fn from(e: ProductServiceError) -> Self {
        match e {
            ProductServiceError::NotFound(key) => Self::not_found(format!("Product not found: {}", key)),
            ProductServiceError::ValidationError(msg) => Self::validation_error(msg),
            ProductServiceError::Conflict(msg) => Self::conflict(msg),
            ProductServiceError::ConfirmationMismatch => Self::with_details(
                "VALIDATION_ERROR",
                "Confirmation phrase does not match",
                serde_json::json!({ "expected": DELETE_ALL_CONFIRMATION }),
            ),
            ProductServiceError::InternalError(e) => {
                tracing::error!("Product operation failed: {:#}", e);
                Self::internal_error(e.to_string())
            }
        }
    }
}

impl From<BlogServiceError> for ApiError {
    fn from(e: BlogServiceError) -> Self {
        match e {
            BlogServiceError::NotFound(slug) => Self::not_found(format!("Post not found: {}", slug)),
            BlogServiceError::InternalError(e) => {
                tracing::error!("Blog operation failed: {:#}", e);
                Self::internal_error(e.to_string())
            }
        }
    }
}

impl From<UserServiceError> for ApiError {
    fn from(e: UserServiceError) -> Self {
        match e {
            UserServiceError::AuthenticationError(msg) => Self::unauthorized(msg),
            UserServiceError::ValidationError(msg) => Self::validation_error(msg),
            UserServiceError::UserExists(msg) => Self::conflict(msg),
            UserServiceError::InternalError(e) => {
                tracing::error!("User operation failed: {:#}", e);
                Self::internal_error(e.to_string())
            }
        }
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// Extract session token from the `Authorization: Bearer` header, else the
/// `session` cookie
pub fn extract_session_token(headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
    {
        return Some(token.trim().to_string());
    }

    headers
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .find_map(|c| c.trim().strip_prefix("session=").map(str::to_string))
        })
}

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let user = state
        .user_service
        .validate_session(&token)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired session"))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Admin authorization middleware
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.is_admin() {
        return Err(ApiError::forbidden("Admin privileges required"));
    }

    Ok(next.run(request).await)
}

// ============================================================================
// Storefront locale routing
// ============================================================================

/// Locale routing for storefront paths.
///
/// Paths without a locale prefix are redirected (307) to the negotiated locale
/// and the choice is remembered in the `NEXT_LOCALE` cookie. Old
/// `/{locale}/products/{uuid}` links are logged and permanently redirected to
/// the slug URL when the product still exists. API paths, framework internals
/// and files pass through untouched.
pub async fn storefront_locale(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if !locale::is_localized_path(&path) {
        return next.run(request).await;
    }

    let site = &state.config.site;
    // read headers up front so no borrow of `request` is held across an await
    let (cookie_header, accept_language_header) = {
        let header_str = |name: header::HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        };
        (header_str(header::COOKIE), header_str(header::ACCEPT_LANGUAGE))
    };
    let negotiate = || {
        locale::negotiate(
            &path,
            cookie_header.as_deref(),
            accept_language_header.as_deref(),
            site,
        )
    };

    if let Some(legacy) = locale::detect_legacy_product_url(&path) {
        tracing::info!(
            path = %path,
            product_id = %legacy.product_id,
            "Legacy product URL detected"
        );
        match state.product_service.get(&legacy.product_id.to_ascii_lowercase()).await {
            Ok(product) => {
                // an unknown prefix would be treated as an unprefixed path
                let target_locale = if site.is_supported_locale(&legacy.locale) {
                    legacy.locale.to_ascii_lowercase()
                } else {
                    negotiate()
                };
                let target = format!("/{}/products/{}", target_locale, urlencoding::encode(&product.slug));
                return Redirect::permanent(&target).into_response();
            }
            Err(ProductServiceError::NotFound(_)) => {}
            Err(e) => tracing::warn!("Legacy product lookup failed: {}", e),
        }
        return next.run(request).await;
    }

    if locale::path_locale(&path, site).is_some() {
        return next.run(request).await;
    }

    let negotiated = negotiate();
    let suffix = if path == "/" { "" } else { path.as_str() };
    let target = match request.uri().query() {
        Some(query) => format!("/{}{}?{}", negotiated, suffix, query),
        None => format!("/{}{}", negotiated, suffix),
    };

    let mut response = Redirect::temporary(&target).into_response();
    let cookie = format!("{}={}; Path=/; SameSite=Lax", locale::LOCALE_COOKIE, negotiated);
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

// ============================================================================
// Request statistics and cache headers
// ============================================================================

/// Request statistics middleware
pub async fn request_stats_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;
    state.request_stats.record(start.elapsed().as_micros() as u64);
    response
}

/// Generate a strong ETag from content
pub fn generate_etag(content: &[u8]) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// Check an `If-None-Match` value against a response ETag
pub fn etag_matches(request_etag: Option<&str>, response_etag: &str) -> bool {
    match request_etag {
        Some(etag) => etag
            .split(',')
            .map(|e| e.trim().trim_start_matches("W/"))
            .any(|e| e == "*" || e == response_etag.trim_start_matches("W/")),
        None => false,
    }
}

/// Build a public Cache-Control header
pub fn cache_control_public(max_age: u32, stale_while_revalidate: Option<u32>) -> String {
    match stale_while_revalidate {
        Some(swr) => format!("public, max-age={}, stale-while-revalidate={}", max_age, swr),
        None => format!("public, max-age={}", max_age),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    fn headers(pairs: &[(header::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_extract_session_token_from_bearer() {
        let map = headers(&[(header::AUTHORIZATION, "Bearer test-token-123")]);
        assert_eq!(extract_session_token(&map), Some("test-token-123".to_string()));
    }

    #[test]
    fn test_extract_session_token_from_cookie() {
        let map = headers(&[(header::COOKIE, "NEXT_LOCALE=ar; session=test-token-456")]);
        assert_eq!(extract_session_token(&map), Some("test-token-456".to_string()));
    }

    #[test]
    fn test_extract_session_token_bearer_priority() {
        let map = headers(&[
            (header::AUTHORIZATION, "Bearer bearer-token"),
            (header::COOKIE, "session=cookie-token"),
        ]);
        assert_eq!(extract_session_token(&map), Some("bearer-token".to_string()));
    }

    #[test]
    fn test_extract_session_token_none() {
        assert!(extract_session_token(&HeaderMap::new()).is_none());
        let map = headers(&[(header::AUTHORIZATION, "Basic invalid")]);
        assert!(extract_session_token(&map).is_none());
    }

    #[test]
    fn test_service_errors_map_to_status_codes() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (ProductServiceError::NotFound("x".into()).into(), StatusCode::NOT_FOUND),
            (ProductServiceError::ValidationError("bad".into()).into(), StatusCode::BAD_REQUEST),
            (ProductServiceError::Conflict("slug".into()).into(), StatusCode::CONFLICT),
            (ProductServiceError::ConfirmationMismatch.into(), StatusCode::BAD_REQUEST),
            (BlogServiceError::NotFound("post".into()).into(), StatusCode::NOT_FOUND),
            (
                UserServiceError::AuthenticationError("nope".into()).into(),
                StatusCode::UNAUTHORIZED,
            ),
            (
                UserServiceError::InternalError(anyhow::anyhow!("db down")).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.status(), status, "{:?}", error);
        }
    }

    #[test]
    fn test_confirmation_mismatch_carries_expected_phrase() {
        let error: ApiError = ProductServiceError::ConfirmationMismatch.into();
        assert_eq!(error.error.code, "VALIDATION_ERROR");
        assert_eq!(
            error.error.details,
            Some(serde_json::json!({ "expected": "DELETE ALL PRODUCTS" }))
        );
    }

    #[test]
    fn test_etag_helpers() {
        let etag = generate_etag(b"<urlset/>");
        assert_eq!(etag, generate_etag(b"<urlset/>"));
        assert_ne!(etag, generate_etag(b"<urlset></urlset>"));
        assert!(etag_matches(Some(&etag), &etag));
        assert!(etag_matches(Some(&format!("W/{}", etag)), &etag));
        assert!(etag_matches(Some("\"other\", *"), &etag));
        assert!(!etag_matches(None, &etag));
    }

    #[test]
    fn test_cache_control_public() {
        assert_eq!(cache_control_public(3600, None), "public, max-age=3600");
        assert!(cache_control_public(300, Some(60)).ends_with("stale-while-revalidate=60"));
    }

    #[test]
    fn test_request_stats() {
        let stats = RequestStats::new();
        assert_eq!(stats.avg_response_time_us(), 0.0);
        stats.record(100);
        stats.record(300);
        assert_eq!(stats.total_requests(), 2);
        assert_eq!(stats.avg_response_time_us(), 200.0);
    }
}
