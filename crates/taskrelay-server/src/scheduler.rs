//! Run scheduler - spawns one unit of work per run.
//!
//! Dispatch is fire-and-forget: the caller gets control back as soon as
//! the run's task is spawned. There is no cancellation API; in-flight runs
//! are tracked by id only so shutdown can wait for them. A run stays
//! registered until its own task removes it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use taskrelay_core::{RunId, RunPlan};

use crate::processor::RunProcessor;
use crate::store::RunWriter;

/// Run scheduler.
pub struct Scheduler {
    processor: Arc<RunProcessor>,
    in_flight: Arc<Mutex<HashMap<RunId, JoinHandle<()>>>>,
    settled: Arc<Notify>,
}

/// Recheck interval while draining.
const DRAIN_POLL: Duration = Duration::from_millis(100);

impl Scheduler {
    /// Create a new Scheduler.
    pub fn new(processor: Arc<RunProcessor>) -> Self {
        Self {
            processor,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            settled: Arc::new(Notify::new()),
        }
    }

    /// Spawn processing for a run.
    pub async fn dispatch(&self, writer: RunWriter, plan: RunPlan) {
        let run_id = writer.id().clone();
        let processor = self.processor.clone();
        let in_flight = self.in_flight.clone();
        let settled = self.settled.clone();

        // Hold the registry while spawning so the task's own removal
        // cannot run before the insert below.
        let mut registry = self.in_flight.lock().await;

        let task_run_id = run_id.clone();
        let handle = tokio::spawn(async move {
            match processor.process(writer, plan).await {
                Ok(status) => debug!(run_id = %task_run_id, status = %status, "Run task done"),
                Err(e) => error!(run_id = %task_run_id, error = %e, "Run could not be finalized"),
            }
            in_flight.lock().await.remove(&task_run_id);
            settled.notify_waiters();
        });

        debug!(run_id = %run_id, "Run dispatched");
        registry.insert(run_id, handle);
    }

    /// Number of runs still processing.
    pub async fn in_flight(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    /// Wait for every in-flight run to finish.
    ///
    /// Runs stay registered (and counted) until their own task removes them.
    pub async fn drain(&self) {
        loop {
            let notified = self.settled.notified();
            {
                let mut registry = self.in_flight.lock().await;
                // A task that died before deregistering leaves a finished handle.
                registry.retain(|run_id, handle| {
                    if handle.is_finished() {
                        warn!(run_id = %run_id, "Run task ended without deregistering");
                        false
                    } else {
                        true
                    }
                });
                if registry.is_empty() {
                    return;
                }
                debug!(pending = registry.len(), "Waiting for in-flight runs");
            }
            let _ = tokio::time::timeout(DRAIN_POLL, notified).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use serde_json::{json, Map, Value};
    use tokio::sync::Semaphore;

    use taskrelay_core::{RunStatus, SourceRef, TaskSpec};

    use crate::gateway::{ConnectorGateway, GatewayError};
    use crate::store::RunStore;

    /// Echoes the source; panics for `site:panic`.
    struct EchoGateway;

    #[async_trait]
    impl ConnectorGateway for EchoGateway {
        async fn invoke(
            &self,
            source: &SourceRef,
            _params: &Map<String, Value>,
        ) -> Result<Value, GatewayError> {
            if source.name == "panic" {
                panic!("echo gateway asked to panic");
            }
            Ok(json!({ "source": source.to_string() }))
        }
    }

    /// Blocks until released.
    struct GatedGateway(Arc<Semaphore>);

    #[async_trait]
    impl ConnectorGateway for GatedGateway {
        async fn invoke(
            &self,
            _source: &SourceRef,
            _params: &Map<String, Value>,
        ) -> Result<Value, GatewayError> {
            let _permit = self.0.acquire().await.map_err(|e| GatewayError::Connector {
                operation: "gated".to_string(),
                message: e.to_string(),
            })?;
            Ok(json!({}))
        }
    }

    fn scheduler(gateway: Arc<dyn ConnectorGateway>) -> Scheduler {
        Scheduler::new(Arc::new(RunProcessor::new(gateway)))
    }

    #[tokio::test]
    async fn test_dispatch_and_drain() {
        let store = RunStore::new();
        let scheduler = scheduler(Arc::new(EchoGateway));

        let mut ids = Vec::new();
        for source in ["official_api:gmail", "site:panic", "official_api:drive"] {
            let plan = RunPlan::new(vec![TaskSpec::fetch(source)]);
            let id = RunId::generate();
            let writer = store.create(id.clone(), plan.clone()).await.unwrap();
            scheduler.dispatch(writer, plan).await;
            ids.push(id);
        }

        scheduler.drain().await;

        let statuses: Vec<RunStatus> = {
            let mut out = Vec::new();
            for id in &ids {
                out.push(store.get(id).await.unwrap().status);
            }
            out
        };
        assert_eq!(
            statuses,
            vec![RunStatus::Complete, RunStatus::Failed, RunStatus::Complete]
        );
        assert_eq!(scheduler.in_flight().await, 0);
    }

    #[tokio::test]
    async fn test_runs_stay_counted_while_draining() {
        let gate = Arc::new(Semaphore::new(0));
        let store = RunStore::new();
        let scheduler = Arc::new(scheduler(Arc::new(GatedGateway(gate.clone()))));

        for _ in 0..2 {
            let plan = RunPlan::new(vec![TaskSpec::fetch("official_api:gmail")]);
            let writer = store.create(RunId::generate(), plan.clone()).await.unwrap();
            scheduler.dispatch(writer, plan).await;
        }

        let draining = {
            let scheduler = scheduler.clone();
            tokio::spawn(async move { scheduler.drain().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(!draining.is_finished());
        assert_eq!(scheduler.in_flight().await, 2);

        gate.add_permits(2);
        draining.await.unwrap();
        assert_eq!(scheduler.in_flight().await, 0);
    }

    #[tokio::test]
    async fn test_dispatch_does_not_wait_for_run() {
        let gate = Arc::new(Semaphore::new(0));
        let store = RunStore::new();
        let scheduler = scheduler(Arc::new(GatedGateway(gate.clone())));

        let plan = RunPlan::new(vec![TaskSpec::fetch("official_api:gmail")]);
        let id = RunId::generate();
        let writer = store.create(id.clone(), plan.clone()).await.unwrap();
        scheduler.dispatch(writer, plan).await;

        assert_eq!(scheduler.in_flight().await, 1);
        assert!(!store.get(&id).await.unwrap().status.is_terminal());

        gate.add_permits(1);
        scheduler.drain().await;
        assert_eq!(store.get(&id).await.unwrap().status, RunStatus::Complete);
    }
}
