//! Run, Artifact and ExecutionError types.

use crate::{CoreError, RunId, RunPlan, RunStatus, SourceRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Successful outcome of one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Source of the task that produced it.
    pub source: SourceRef,

    /// When the result was captured.
    pub timestamp: DateTime<Utc>,

    /// Connector result payload.
    pub data: Value,
}

impl Artifact {
    /// Capture a result now.
    pub fn capture(source: SourceRef, data: Value) -> Self {
        Self {
            source,
            timestamp: Utc::now(),
            data,
        }
    }
}

/// Machine-readable category of an execution error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No capability matches the task's source.
    UnsupportedSource,
    /// The task's mode cannot run against a read-only connector.
    UnsupportedMode,
    /// The capability call failed.
    ConnectorError,
    /// Run processing failed outside any single task.
    ProcessorFault,
}

impl ErrorKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedSource => "unsupported_source",
            Self::UnsupportedMode => "unsupported_mode",
            Self::ConnectorError => "connector_error",
            Self::ProcessorFault => "processor_fault",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure recorded against a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionError {
    /// Error category.
    pub kind: ErrorKind,

    /// Human-readable description.
    pub message: String,

    /// Source of the failed task; absent for run-level faults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
}

impl ExecutionError {
    /// Error belonging to one task.
    pub fn task(kind: ErrorKind, source: SourceRef, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Run-level processor fault.
    pub fn processor_fault(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::ProcessorFault,
            message: message.into(),
            source: None,
        }
    }
}

/// One execution of a submitted plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Unique run identifier.
    pub id: RunId,

    /// Current lifecycle status.
    pub status: RunStatus,

    /// Submitted plan.
    pub plan: RunPlan,

    /// Successful task outcomes in plan order.
    pub artifacts: Vec<Artifact>,

    /// Failures in plan order.
    pub errors: Vec<ExecutionError>,

    /// When the run was submitted.
    pub created_at: DateTime<Utc>,

    /// When processing started.
    pub started_at: Option<DateTime<Utc>>,

    /// When the run reached a terminal status.
    pub finished_at: Option<DateTime<Utc>>,
}

impl Run {
    /// Create a queued run.
    pub fn new(id: RunId, plan: RunPlan) -> Self {
        Self {
            id,
            status: RunStatus::Queued,
            plan,
            artifacts: Vec::new(),
            errors: Vec::new(),
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Check if the run is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Mark the run as running.
    pub fn start(&mut self) -> Result<(), CoreError> {
        if self.status != RunStatus::Queued {
            return Err(self.transition_error(RunStatus::Running));
        }
        self.status = RunStatus::Running;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// Append an artifact.
    pub fn record_artifact(&mut self, artifact: Artifact) -> Result<(), CoreError> {
        self.ensure_running()?;
        self.artifacts.push(artifact);
        Ok(())
    }

    /// Append an error.
    pub fn record_error(&mut self, error: ExecutionError) -> Result<(), CoreError> {
        self.ensure_running()?;
        self.errors.push(error);
        Ok(())
    }

    /// Assign the terminal status implied by the recorded outcomes.
    pub fn finish(&mut self) -> Result<RunStatus, CoreError> {
        let status = RunStatus::classify(self.artifacts.len(), self.errors.len());
        if self.status != RunStatus::Running {
            return Err(self.transition_error(status));
        }
        self.status = status;
        self.finished_at = Some(Utc::now());
        Ok(status)
    }

    /// Force a terminal status after a processor fault.
    ///
    /// Works from `queued` or `running`; a run that is already terminal is
    /// left untouched.
    pub fn abort(&mut self, error: ExecutionError) -> Result<RunStatus, CoreError> {
        let status = if self.artifacts.is_empty() {
            RunStatus::Failed
        } else {
            RunStatus::Partial
        };
        if self.status.is_terminal() {
            return Err(self.transition_error(status));
        }
        self.errors.push(error);
        self.status = status;
        self.finished_at = Some(Utc::now());
        Ok(status)
    }

    fn ensure_running(&self) -> Result<(), CoreError> {
        if self.status == RunStatus::Running {
            Ok(())
        } else {
            Err(self.transition_error(self.status))
        }
    }

    fn transition_error(&self, to: RunStatus) -> CoreError {
        CoreError::InvalidStateTransition {
            from: self.status,
            to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskSpec;
    use serde_json::json;

    fn sample_run() -> Run {
        let plan = RunPlan::new(vec![
            TaskSpec::fetch("official_api:gmail"),
            TaskSpec::fetch("official_api:drive"),
        ]);
        Run::new(RunId::new("run-1"), plan)
    }

    #[test]
    fn test_lifecycle_complete() {
        let mut run = sample_run();
        run.start().unwrap();
        run.record_artifact(Artifact::capture("official_api:gmail".into(), json!([])))
            .unwrap();
        run.record_artifact(Artifact::capture("official_api:drive".into(), json!([])))
            .unwrap();
        assert_eq!(run.finish().unwrap(), RunStatus::Complete);
        assert!(run.finished_at.is_some());
    }

    #[test]
    fn test_no_writes_after_terminal() {
        let mut run = sample_run();
        run.start().unwrap();
        run.record_error(ExecutionError::task(
            ErrorKind::ConnectorError,
            "official_api:gmail".into(),
            "boom",
        ))
        .unwrap();
        assert_eq!(run.finish().unwrap(), RunStatus::Failed);

        let late = Artifact::capture("official_api:drive".into(), json!({}));
        assert!(run.record_artifact(late).is_err());
        assert!(run.finish().is_err());
        assert!(run.abort(ExecutionError::processor_fault("late")).is_err());
        assert_eq!(run.errors.len(), 1);
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut run = sample_run();
        run.start().unwrap();
        assert!(matches!(
            run.start(),
            Err(CoreError::InvalidStateTransition {
                from: RunStatus::Running,
                ..
            })
        ));
    }

    #[test]
    fn test_abort_keeps_partial_results() {
        let mut run = sample_run();
        run.start().unwrap();
        run.record_artifact(Artifact::capture("official_api:gmail".into(), json!({})))
            .unwrap();
        let status = run.abort(ExecutionError::processor_fault("panic")).unwrap();
        assert_eq!(status, RunStatus::Partial);
        assert_eq!(run.errors[0].kind, ErrorKind::ProcessorFault);
        assert!(run.errors[0].source.is_none());
    }

    #[test]
    fn test_error_wire_shape() {
        let error = ExecutionError::task(
            ErrorKind::UnsupportedSource,
            "official_api:unknownthing".into(),
            "unsupported source",
        );
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({
                "kind": "unsupported_source",
                "message": "unsupported source",
                "source": "official_api:unknownthing"
            })
        );
    }
}
