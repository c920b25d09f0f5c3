//! Shared application state.

use std::sync::Arc;

use crate::auth::AuthToken;
use crate::config::Config;
use crate::gateway::{ConnectorGateway, Gateway};
use crate::processor::RunProcessor;
use crate::scheduler::Scheduler;
use crate::store::RunStore;

/// Shared application state.
///
/// Built once at startup and handed to every handler by `Arc`.
pub struct AppState {
    /// Runs indexed by RunId.
    pub store: RunStore,

    /// Spawns run processing.
    pub scheduler: Scheduler,

    /// Submission credential.
    pub auth: AuthToken,

    /// Submission body ceiling in bytes.
    pub max_body_bytes: usize,
}

impl AppState {
    /// Create a new AppState wrapped in Arc.
    pub fn new(
        gateway: Arc<dyn ConnectorGateway>,
        auth: AuthToken,
        max_body_bytes: usize,
    ) -> Arc<Self> {
        let processor = Arc::new(RunProcessor::new(gateway));
        Arc::new(Self {
            store: RunStore::new(),
            scheduler: Scheduler::new(processor),
            auth,
            max_body_bytes,
        })
    }

    /// Create an AppState calling connectors over HTTP.
    pub fn from_config(config: &Config) -> Arc<Self> {
        Self::new(
            Arc::new(Gateway::http(&config.connector_url)),
            AuthToken::new(&config.auth_token),
            config.max_body_bytes,
        )
    }
}
