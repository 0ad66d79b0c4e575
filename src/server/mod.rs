//! HTTP API server
//!
//! Wraps a [`DirectorCrawler`] in a small axum router; see [`api`] for the
//! routes.

pub mod api;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::crawler::DirectorCrawler;

use self::api::create_router;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub crawler: Arc<DirectorCrawler>,

    /// Services used when a request names none
    pub streaming_services: Arc<Vec<String>>,

    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    pub fn new(crawler: Arc<DirectorCrawler>, streaming_services: Vec<String>) -> Self {
        Self {
            crawler,
            streaming_services: Arc::new(streaming_services),
            start_time: Instant::now(),
        }
    }
}

// ============================================================================
// Server
// ============================================================================

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {message}")]
    Bind { addr: SocketAddr, message: String },

    #[error("Server error: {0}")]
    Serve(String),
}

pub struct ApiServer {
    config: ServerConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: ServerConfig, crawler: Arc<DirectorCrawler>) -> Self {
        let state = AppState::new(crawler, config.streaming_services.clone());
        Self { config, state }
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes and configured layers
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Serve until the process is stopped
    pub async fn start(&self) -> Result<(), ServerError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let router = self.build_router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr,
                message: e.to_string(),
            })?;

        tracing::info!(%addr, "Starting API server");

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))
    }
}
