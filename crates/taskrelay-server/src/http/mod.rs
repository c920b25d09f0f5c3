//! HTTP server for the relay.
//!
//! Provides endpoints for:
//! - Run submission (`POST /v1/runs`)
//! - Run status polling (`GET /v1/runs/:run_id`)
//! - Health check (`/health`)
//! - Prometheus metrics (`/metrics`)
//!
//! Anything else answers with a generic 404.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod error;
mod handlers;
pub mod responses;

pub use error::ApiError;

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);

    Router::new()
        // Run API
        .route(
            "/v1/runs",
            post(handlers::submit_run).fallback(handlers::not_found),
        )
        .route(
            "/v1/runs/:run_id",
            get(handlers::get_run).fallback(handlers::not_found),
        )
        // Observability routes
        .route(
            "/health",
            get(handlers::health_check).fallback(handlers::not_found),
        )
        .route(
            "/metrics",
            get(handlers::metrics_handler).fallback(handlers::not_found),
        )
        .fallback(handlers::not_found)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
