//! Prometheus metrics collection and formatting.
//!
//! This module provides metrics in Prometheus text exposition format.

use std::fmt::Write;
use std::sync::Arc;

use taskrelay_core::RunStatus;

use crate::state::AppState;

const STATUSES: [RunStatus; 5] = [
    RunStatus::Queued,
    RunStatus::Running,
    RunStatus::Complete,
    RunStatus::Partial,
    RunStatus::Failed,
];

/// Collect all metrics from AppState and format as Prometheus text.
pub async fn collect_metrics(state: &Arc<AppState>) -> String {
    let mut output = String::new();

    collect_run_metrics(state, &mut output).await;
    collect_scheduler_metrics(state, &mut output).await;

    output
}

/// Collect run metrics by status.
async fn collect_run_metrics(state: &Arc<AppState>, output: &mut String) {
    let counts = state.store.status_counts().await;

    writeln!(
        output,
        "# HELP taskrelay_runs_total Number of runs by status"
    )
    .ok();
    writeln!(output, "# TYPE taskrelay_runs_total gauge").ok();
    for status in STATUSES {
        let count = counts.get(&status).copied().unwrap_or(0);
        writeln!(output, "taskrelay_runs_total{{status=\"{status}\"}} {count}").ok();
    }
}

/// Collect scheduler metrics.
async fn collect_scheduler_metrics(state: &Arc<AppState>, output: &mut String) {
    let in_flight = state.scheduler.in_flight().await;

    writeln!(output).ok();
    writeln!(
        output,
        "# HELP taskrelay_runs_in_flight Runs currently being processed"
    )
    .ok();
    writeln!(output, "# TYPE taskrelay_runs_in_flight gauge").ok();
    writeln!(output, "taskrelay_runs_in_flight {in_flight}").ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    use taskrelay_core::{RunId, RunPlan};

    use crate::auth::AuthToken;
    use crate::gateway::Gateway;

    fn state() -> Arc<AppState> {
        AppState::new(
            Arc::new(Gateway::http("http://127.0.0.1:9")),
            AuthToken::new("t0ken"),
            1024,
        )
    }

    #[tokio::test]
    async fn test_collect_metrics_empty_state() {
        let state = state();
        let output = collect_metrics(&state).await;

        assert!(output.contains("taskrelay_runs_total{status=\"queued\"} 0"));
        assert!(output.contains("taskrelay_runs_total{status=\"failed\"} 0"));
        assert!(output.contains("taskrelay_runs_in_flight 0"));
    }

    #[tokio::test]
    async fn test_collect_metrics_counts_runs() {
        let state = state();
        let _writer = state
            .store
            .create(RunId::generate(), RunPlan::new(vec![]))
            .await
            .unwrap();

        let output = collect_metrics(&state).await;
        assert!(output.contains("taskrelay_runs_total{status=\"queued\"} 1"));
        assert!(output.contains("taskrelay_runs_total{status=\"complete\"} 0"));
    }
}
