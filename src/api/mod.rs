//! API layer - HTTP handlers and routing
//!
//! This module contains all HTTP endpoints of the Sawavo backend:
//! - Product catalog (public) and product management (admin)
//! - Admin authentication
//! - Blog posts, categories and tags
//! - Site info and health
//! - `/sitemap.xml` and storefront locale redirects

pub mod auth;
pub mod blog;
pub mod middleware;
pub mod products;
pub mod responses;
pub mod site;
pub mod sitemap;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser, RequestStats};

/// Build the `/api/v1` router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Admin routes (need admin role)
    let admin_routes = Router::new()
        .nest("/admin/products", products::admin_router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Protected routes (need a session, any role)
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_auth,
        ));

    // Public routes
    Router::new()
        .nest("/products", products::router())
        .nest("/blog", blog::router())
        .nest("/auth", auth::public_router())
        .merge(site::router())
        .merge(admin_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState) -> Router {
    let cors_origin = &state.config.server.cors_origin;
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);
    let cors = match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!(origin = %cors_origin, "Invalid CORS origin, cross-origin requests disabled: {}", e);
            cors
        }
    };

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .route("/sitemap.xml", get(sitemap::sitemap_xml))
        .fallback(not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::storefront_locale,
        ))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::request_stats_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}


#[cfg(test)]
mod tests {
    use super::test_support::{admin_token, test_server};
    use axum::http::{header, HeaderValue, StatusCode};
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_unprefixed_paths_redirect_to_negotiated_locale() {
        let (server, _) = test_server().await;

        let home = server
            .get("/")
            .add_header(header::ACCEPT_LANGUAGE, HeaderValue::from_static("ar-JO,ar;q=0.9,en;q=0.5"))
            .await;
        home.assert_status(StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(home.header(header::LOCATION), "/ar");
        assert!(home.header(header::SET_COOKIE).to_str().unwrap().starts_with("NEXT_LOCALE=ar"));

        let blog = server
            .get("/blog")
            .add_query_param("page", "2")
            .add_header(header::COOKIE, HeaderValue::from_static("NEXT_LOCALE=ar"))
            .await;
        blog.assert_status(StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(blog.header(header::LOCATION), "/ar/blog?page=2");

        let fallback = server.get("/shop").await;
        assert_eq!(fallback.header(header::LOCATION), "/en/shop");
    }

    #[tokio::test]
    async fn test_prefixed_files_and_api_paths_pass_through() {
        let (server, _) = test_server().await;

        for path in ["/en/blog", "/favicon.ico", "/_next/static/app.js", "/api/v1/nothing-here"] {
            let response = server.get(path).await;
            response.assert_status_not_found();
            assert_eq!(response.json::<Value>()["error"]["code"], "NOT_FOUND", "{}", path);
        }
    }

    #[tokio::test]
    async fn test_legacy_product_urls_redirect_to_slug() {
        let (server, state) = test_server().await;
        let token = admin_token(&state).await;
        let created: Value = server
            .post("/api/v1/admin/products")
            .authorization_bearer(&token)
            .json(&json!({ "title": "Aloe Gel", "price": 9.5 }))
            .await
            .json();
        let id = created["id"].as_str().unwrap();

        let response = server.get(&format!("/ar/products/{}", id.to_uppercase())).await;
        response.assert_status(StatusCode::PERMANENT_REDIRECT);
        assert_eq!(response.header(header::LOCATION), "/ar/products/aloe-gel");

        server
            .get("/en/products/00000000-0000-4000-8000-000000000000")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_legacy_url_with_unknown_locale_uses_negotiated_locale() {
        let (server, state) = test_server().await;
        let token = admin_token(&state).await;
        let created: Value = server
            .post("/api/v1/admin/products")
            .authorization_bearer(&token)
            .json(&json!({ "title": "Aloe Gel", "price": 9.5 }))
            .await
            .json();
        let id = created["id"].as_str().unwrap();

        let fallback = server.get(&format!("/fr/products/{}", id)).await;
        fallback.assert_status(StatusCode::PERMANENT_REDIRECT);
        assert_eq!(fallback.header(header::LOCATION), "/en/products/aloe-gel");

        let from_cookie = server
            .get(&format!("/fr/products/{}", id))
            .add_header(header::COOKIE, HeaderValue::from_static("NEXT_LOCALE=ar"))
            .await;
        assert_eq!(from_cookie.header(header::LOCATION), "/ar/products/aloe-gel");

        // the target is served directly, not redirected again
        server.get("/en/products/aloe-gel").await.assert_status_not_found();

        let upper = server.get(&format!("/AR/products/{}", id)).await;
        assert_eq!(upper.header(header::LOCATION), "/ar/products/aloe-gel");
    }
}
