//! TaskRelay Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - HTTP/transport
//! - Connector backends
//! - Runtime specifics
//!
//! All types here describe task plans, runs, and their outcomes.

pub mod error;
pub mod ids;
pub mod plan;
pub mod run;
pub mod status;

// Re-export commonly used types
pub use error::CoreError;
pub use ids::RunId;
pub use plan::{RunPlan, SourceRef, TaskMode, TaskSpec};
pub use run::{Artifact, ErrorKind, ExecutionError, Run};
pub use status::RunStatus;
