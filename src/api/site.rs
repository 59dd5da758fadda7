//! Public site information API
//!
//! - GET /api/v1/site - Storefront configuration (URLs, locales, analytics id)
//! - GET /api/v1/health - Liveness plus database reachability

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::middleware::AppState;

/// Response for public site info
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfoResponse {
    pub version: String,
    pub site_url: String,
    pub api_url: String,
    pub locales: Vec<String>,
    pub default_locale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ga_measurement_id: Option<String>,
}

/// Response for the health check
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub uptime_seconds: u64,
    pub total_requests: u64,
    pub avg_response_time_ms: f64,
}

/// Build the site router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/site", get(get_site_info))
        .route("/health", get(health))
}

/// GET /api/v1/site
async fn get_site_info(State(state): State<AppState>) -> Json<SiteInfoResponse> {
    let site = &state.config.site;
    Json(SiteInfoResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        site_url: site.base_url().to_string(),
        api_url: site.api_url.clone(),
        locales: site.locales.clone(),
        default_locale: site.default_locale.clone(),
        ga_measurement_id: site.ga_measurement_id.clone(),
    })
}

/// GET /api/v1/health
///
/// 503 when the database does not answer a ping.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, database) = match state.pool.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!("Health check database ping failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    let stats = &state.request_stats;
    (
        status,
        Json(HealthResponse {
            status: if status.is_success() { "ok" } else { "degraded" }.to_string(),
            database: database.to_string(),
            uptime_seconds: stats.uptime_seconds(),
            total_requests: stats.total_requests(),
            avg_response_time_ms: stats.avg_response_time_us() / 1000.0,
        }),
    )
}
