//! Run submission and status handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use tracing::{info, warn};

use taskrelay_core::{RunId, RunPlan};

use crate::http::error::ApiError;
use crate::http::responses::RunResponse;
use crate::state::AppState;

/// Submit a run plan.
///
/// POST /v1/runs
///
/// Returns as soon as the run is registered as `queued`; processing happens
/// in the background.
pub async fn submit_run(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.auth.verify_headers(&headers) {
        warn!("Run submission rejected: missing or invalid bearer token");
        return Err(ApiError::Unauthorized);
    }

    let body = body.map_err(|rejection| {
        warn!(error = %rejection, "Run submission rejected: unreadable body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(rejection.body_text())
        } else {
            ApiError::MalformedInput(rejection.body_text())
        }
    })?;

    let plan: RunPlan = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Run submission rejected: malformed plan");
        ApiError::MalformedInput(e.to_string())
    })?;

    let run_id = RunId::generate();
    let writer = state.store.create(run_id.clone(), plan.clone()).await?;

    // Snapshot before dispatch so the response always shows `queued`.
    let snapshot = state
        .store
        .get(&run_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Run not found: {}", run_id)))?;

    info!(run_id = %run_id, tasks = plan.len(), "Run submitted");
    state.scheduler.dispatch(writer, plan).await;

    Ok((StatusCode::ACCEPTED, Json(RunResponse::from_run(snapshot))))
}

/// Get the current state of a run.
///
/// GET /v1/runs/:run_id
pub async fn get_run(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
) -> Result<Json<RunResponse>, ApiError> {
    let run_id = RunId::new(run_id);
    let run = state
        .store
        .get(&run_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Run not found: {}", run_id)))?;

    Ok(Json(RunResponse::from_run(run)))
}

/// Fallback for unknown routes and methods.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("not found".to_string())
}
