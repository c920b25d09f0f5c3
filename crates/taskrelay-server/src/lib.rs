//! TaskRelay Server Library
//!
//! Accepts run plans over HTTP, executes their tasks against connector
//! capabilities in the background, and serves run status for polling.

pub mod auth;
pub mod config;
pub mod gateway;
pub mod http;
pub mod metrics;
pub mod processor;
pub mod scheduler;
pub mod state;
pub mod store;

pub use auth::AuthToken;
pub use config::{Config, ConfigError};
pub use gateway::{ConnectorGateway, Gateway, GatewayError};
pub use processor::RunProcessor;
pub use scheduler::Scheduler;
pub use state::AppState;
pub use store::{RunStore, RunWriter, StoreError};
