//! In-memory run store.
//!
//! Partitioned by run id: the outer map lock is only held to insert or look
//! up an entry, each run sits behind its own lock. Mutation goes through the
//! single [`RunWriter`] handed out by [`RunStore::create`]; everyone else
//! gets whole-record snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use taskrelay_core::{Artifact, CoreError, ExecutionError, Run, RunId, RunPlan, RunStatus};

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Run already exists: {0}")]
    DuplicateRun(RunId),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Process-wide run registry.
#[derive(Default)]
pub struct RunStore {
    runs: RwLock<HashMap<RunId, Arc<RwLock<Run>>>>,
}

impl RunStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a queued run and return its writer.
    pub async fn create(&self, id: RunId, plan: RunPlan) -> Result<RunWriter, StoreError> {
        let mut runs = self.runs.write().await;
        if runs.contains_key(&id) {
            return Err(StoreError::DuplicateRun(id));
        }

        let run = Arc::new(RwLock::new(Run::new(id.clone(), plan)));
        runs.insert(id.clone(), run.clone());

        Ok(RunWriter { id, run })
    }

    /// Snapshot of a run.
    pub async fn get(&self, id: &RunId) -> Option<Run> {
        let entry = self.runs.read().await.get(id).cloned()?;
        let run = entry.read().await.clone();
        Some(run)
    }

    /// Number of runs ever submitted.
    pub async fn len(&self) -> usize {
        self.runs.read().await.len()
    }

    /// Returns true if no run was ever submitted.
    pub async fn is_empty(&self) -> bool {
        self.runs.read().await.is_empty()
    }

    /// Count runs by current status.
    pub async fn status_counts(&self) -> HashMap<RunStatus, u64> {
        let entries: Vec<Arc<RwLock<Run>>> = self.runs.read().await.values().cloned().collect();

        let mut counts = HashMap::new();
        for entry in entries {
            let status = entry.read().await.status;
            *counts.entry(status).or_insert(0) += 1;
        }
        counts
    }
}

/// Exclusive mutation handle for one run.
///
/// Not `Clone`: whoever holds it is the run's only writer. The terminal
/// operations consume it.
pub struct RunWriter {
    id: RunId,
    run: Arc<RwLock<Run>>,
}

impl RunWriter {
    /// Id of the run this writer owns.
    pub fn id(&self) -> &RunId {
        &self.id
    }

    /// Move the run from `queued` to `running`.
    pub async fn start(&self) -> Result<(), StoreError> {
        self.run.write().await.start()?;
        Ok(())
    }

    /// Append an artifact.
    pub async fn push_artifact(&self, artifact: Artifact) -> Result<(), StoreError> {
        self.run.write().await.record_artifact(artifact)?;
        Ok(())
    }

    /// Append an execution error.
    pub async fn push_error(&self, error: ExecutionError) -> Result<(), StoreError> {
        self.run.write().await.record_error(error)?;
        Ok(())
    }

    /// Assign the terminal status implied by the recorded outcomes.
    pub async fn complete(self) -> Result<RunStatus, StoreError> {
        Ok(self.run.write().await.finish()?)
    }

    /// Force-terminate after a processor fault.
    pub async fn fault(self, message: impl Into<String>) -> Result<RunStatus, StoreError> {
        let error = ExecutionError::processor_fault(message);
        Ok(self.run.write().await.abort(error)?)
    }
}
