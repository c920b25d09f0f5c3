//! Run processor - drives one run from `queued` to a terminal status.
//!
//! Tasks execute strictly in plan order, one at a time. A failing task is
//! recorded and the run moves on; only a fault outside the per-task
//! boundary (a panic, or the store rejecting a write) ends the run early.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use taskrelay_core::{Artifact, ErrorKind, ExecutionError, RunPlan, RunStatus, TaskMode, TaskSpec};

use crate::gateway::ConnectorGateway;
use crate::store::{RunWriter, StoreError};

/// Failures outside any single task.
#[derive(Debug, Error)]
pub enum ProcessorFault {
    #[error("Run store rejected write: {0}")]
    Store(#[from] StoreError),

    #[error("Run processing panicked: {0}")]
    Panicked(String),
}

/// Executes runs against a connector gateway.
pub struct RunProcessor {
    gateway: Arc<dyn ConnectorGateway>,
}

impl RunProcessor {
    /// Create a new RunProcessor.
    pub fn new(gateway: Arc<dyn ConnectorGateway>) -> Self {
        Self { gateway }
    }

    /// Process a run to completion and return its terminal status.
    ///
    /// Anything escaping task execution force-terminates the run with a
    /// `processor_fault` error, so a run is never left `running`.
    pub async fn process(&self, writer: RunWriter, plan: RunPlan) -> Result<RunStatus, StoreError> {
        let run_id = writer.id().clone();

        let outcome = AssertUnwindSafe(self.execute(&writer, &plan))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ProcessorFault::Panicked(panic_message(&*panic))));

        let status = match outcome {
            Ok(()) => writer.complete().await?,
            Err(fault) => {
                error!(run_id = %run_id, error = %fault, "Run processing fault");
                writer.fault(fault.to_string()).await?
            }
        };

        info!(run_id = %run_id, status = %status, "Run finished");
        Ok(status)
    }

    async fn execute(&self, writer: &RunWriter, plan: &RunPlan) -> Result<(), ProcessorFault> {
        writer.start().await?;
        info!(run_id = %writer.id(), tasks = plan.len(), "Run started");

        for (index, task) in plan.tasks.iter().enumerate() {
            match self.execute_task(task).await {
                Ok(data) => {
                    debug!(run_id = %writer.id(), task = index, source = %task.source, "Task succeeded");
                    writer
                        .push_artifact(Artifact::capture(task.source.clone(), data))
                        .await?;
                }
                Err(err) => {
                    warn!(
                        run_id = %writer.id(),
                        task = index,
                        source = %task.source,
                        kind = %err.kind,
                        error = %err.message,
                        "Task failed"
                    );
                    writer.push_error(err).await?;
                }
            }
        }

        Ok(())
    }

    async fn execute_task(&self, task: &TaskSpec) -> Result<Value, ExecutionError> {
        if task.mode != TaskMode::Fetch {
            return Err(ExecutionError::task(
                ErrorKind::UnsupportedMode,
                task.source.clone(),
                format!(
                    "Mode '{}' is not supported by read-only connector {}",
                    task.mode, task.source
                ),
            ));
        }

        self.gateway
            .invoke(&task.source, &task.params)
            .await
            .map_err(|e| ExecutionError::task(e.kind(), task.source.clone(), e.to_string()))
    }
}

/// Best-effort text of a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
