//! HTTP request and response types.

use serde::Serialize;
use serde_json::Value;

use taskrelay_core::{Artifact, ExecutionError, Run, RunStatus};

// ============================================================================
// Error types
// ============================================================================

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Run types
// ============================================================================

/// Current state of a run, as returned by submission and polling.
#[derive(Debug, Serialize)]
pub struct RunResponse {
    pub run_id: String,
    pub status: RunStatus,
    pub artifacts: Vec<Artifact>,
    pub errors: Vec<ExecutionError>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<Value>,
}

impl RunResponse {
    /// Build the response for a run snapshot.
    pub fn from_run(run: Run) -> Self {
        Self {
            run_id: run.id.into_inner(),
            status: run.status,
            artifacts: run.artifacts,
            errors: run.errors,
            created_at: run.created_at.to_rfc3339(),
            started_at: run.started_at.map(|t| t.to_rfc3339()),
            finished_at: run.finished_at.map(|t| t.to_rfc3339()),
            delivery: run.plan.delivery,
        }
    }
}
