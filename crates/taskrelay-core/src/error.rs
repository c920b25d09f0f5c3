//! Core domain errors.

use thiserror::Error;

use crate::RunStatus;

/// Core domain errors for TaskRelay.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid state transition.
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: RunStatus, to: RunStatus },
}
