//! REST API handlers
//!
//! | Route | Description |
//! |-------|-------------|
//! | `GET /health` | Liveness and uptime |
//! | `GET /api/services` | Default streaming services |
//! | `GET /api/directors` | Directors priced so far |
//! | `GET /api/directors/{name}/prices?services=A,B` | Price a filmography |
//! | `GET /metrics` | Prometheus text format |

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::AppState;
use crate::metrics;
use crate::models::DirectorReport;

// ============================================================================
// API Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Query string for the prices route
#[derive(Debug, Default, Deserialize)]
pub struct PricesQuery {
    /// Comma-separated service names
    pub services: Option<String>,
}

impl PricesQuery {
    /// Requested services, or `None` when the parameter is absent
    ///
    /// A present but blank `services=` is an explicit empty list, so every
    /// film is priced by rental.
    pub fn service_list(&self) -> Option<Vec<String>> {
        let services = self
            .services
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Some(services)
    }
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/services", get(list_services))
        .route("/api/directors", get(list_directors))
        .route("/api/directors/{name}/prices", get(director_prices))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    }))
}

async fn list_services(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.streaming_services.as_ref().clone()))
}

async fn list_directors(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.crawler.known_directors().await))
}

/// Price a director's filmography
///
/// Per-film problems never fail the request; they are listed in the
/// report's `failures`.
async fn director_prices(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<PricesQuery>,
) -> impl IntoResponse {
    const ENDPOINT: &str = "/api/directors/{name}/prices";
    let started = Instant::now();

    if name.trim().is_empty() {
        metrics::record_api_request(ENDPOINT, 400, started.elapsed().as_secs_f64());
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<DirectorReport>::error("director name is required")),
        );
    }

    let services = query
        .service_list()
        .unwrap_or_else(|| state.streaming_services.as_ref().clone());

    let report = state.crawler.scrape_director(&name, &services).await;

    metrics::record_api_request(ENDPOINT, 200, started.elapsed().as_secs_f64());
    (StatusCode::OK, Json(ApiResponse::success(report)))
}

async fn metrics_endpoint() -> impl IntoResponse {
    match metrics::encode_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
                String::from("failed to encode metrics"),
            )
        }
    }
}
