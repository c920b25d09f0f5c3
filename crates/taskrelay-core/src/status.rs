//! Run lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a Run.
///
/// `Queued -> Running -> {Complete | Partial | Failed}`. Nothing leaves a
/// terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Run registered, processing not started.
    #[default]
    Queued,
    /// Processor is executing tasks.
    Running,
    /// Every task produced an artifact.
    Complete,
    /// At least one artifact and at least one error.
    Partial,
    /// At least one error and no artifacts.
    Failed,
}

impl RunStatus {
    /// Returns true if the run is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Partial | Self::Failed)
    }

    /// Returns true if the run is still active (not terminal).
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Terminal status for a run that attempted all of its tasks.
    pub fn classify(artifacts: usize, errors: usize) -> Self {
        match (artifacts, errors) {
            (_, 0) => Self::Complete,
            (0, _) => Self::Failed,
            _ => Self::Partial,
        }
    }

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Partial => "partial",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
