//! Sitemap endpoint
//!
//! GET /sitemap.xml - served at the root, outside `/api/v1`

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::api::middleware::{cache_control_public, etag_matches, generate_etag, ApiError, AppState};

/// How long crawlers and CDNs may reuse the sitemap
const SITEMAP_MAX_AGE: u32 = 3600;

/// GET /sitemap.xml
pub async fn sitemap_xml(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ApiError> {
    let xml = state.sitemap_service.xml().await.map_err(|e| {
        tracing::error!("Failed to render sitemap: {:#}", e);
        ApiError::internal_error("Failed to render sitemap")
    })?;

    let etag = generate_etag(xml.as_bytes());
    let cache_control = cache_control_public(SITEMAP_MAX_AGE, None);
    let if_none_match = headers.get(header::IF_NONE_MATCH).and_then(|h| h.to_str().ok());

    if etag_matches(if_none_match, &etag) {
        return Ok((
            StatusCode::NOT_MODIFIED,
            [(header::ETAG, etag), (header::CACHE_CONTROL, cache_control)],
        )
            .into_response());
    }

    Ok((
        [
            (header::CONTENT_TYPE, "application/xml; charset=utf-8".to_string()),
            (header::ETAG, etag),
            (header::CACHE_CONTROL, cache_control),
        ],
        xml,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{admin_token, test_server};
    use axum::http::{header, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_sitemap_served_with_cache_headers() {
        let (server, _) = test_server().await;

        let response = server.get("/sitemap.xml").await;
        response.assert_status_ok();
        assert!(response
            .header(header::CONTENT_TYPE)
            .to_str()
            .unwrap()
            .starts_with("application/xml"));
        let body = response.text();
        assert!(body.starts_with("<?xml"));
        assert!(body.contains("<loc>https://sawavo.com/ar/faq</loc>"));

        let etag = response.header(header::ETAG);
        server
            .get("/sitemap.xml")
            .add_header(header::IF_NONE_MATCH, etag)
            .await
            .assert_status(StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_product_mutation_refreshes_sitemap() {
        let (server, state) = test_server().await;
        let before = server.get("/sitemap.xml").await.text();
        assert!(!before.contains("/products/argan-oil"));

        let token = admin_token(&state).await;
        server
            .post("/api/v1/admin/products")
            .authorization_bearer(&token)
            .json(&json!({ "title": "Argan Oil", "price": 15 }))
            .await
            .assert_status(StatusCode::CREATED);

        let after = server.get("/sitemap.xml").await.text();
        assert!(after.contains("<loc>https://sawavo.com/en/products/argan-oil</loc>"));
    }
}
