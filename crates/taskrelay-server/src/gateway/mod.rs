//! Connector gateway.
//!
//! Uniform call interface from a task's `kind:name` source and parameters
//! to one concrete capability. Wired capabilities go through a
//! [`ToolTransport`]; known capabilities without a backend answer with a
//! placeholder result instead of failing.

mod capability;
mod transport;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use taskrelay_core::{ErrorKind, SourceRef};

pub use capability::{CalendarParams, Capability, SearchParams};
pub use transport::{HttpToolTransport, ToolTransport};

/// Gateway errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Unsupported source: {0}")]
    UnsupportedSource(SourceRef),

    #[error("Connector call '{operation}' failed: {message}")]
    Connector { operation: String, message: String },
}

impl GatewayError {
    /// Wrap a transport-level failure.
    pub(crate) fn transport(operation: &str, err: reqwest::Error) -> Self {
        Self::Connector {
            operation: operation.to_string(),
            message: err.to_string(),
        }
    }

    /// Category recorded against the run.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedSource(_) => ErrorKind::UnsupportedSource,
            Self::Connector { .. } => ErrorKind::ConnectorError,
        }
    }
}

/// Call interface the run processor executes tasks against.
#[async_trait]
pub trait ConnectorGateway: Send + Sync {
    /// Invoke the capability named by `source`.
    async fn invoke(&self, source: &SourceRef, params: &Map<String, Value>)
        -> Result<Value, GatewayError>;
}

/// Gateway backed by a tool transport.
pub struct Gateway {
    transport: Arc<dyn ToolTransport>,
}

impl Gateway {
    /// Create a new Gateway.
    pub fn new(transport: Arc<dyn ToolTransport>) -> Self {
        Self { transport }
    }

    /// Create a Gateway calling tools over HTTP.
    pub fn http(connector_url: &str) -> Self {
        Self::new(Arc::new(HttpToolTransport::new(connector_url)))
    }
}

#[async_trait]
impl ConnectorGateway for Gateway {
    async fn invoke(
        &self,
        source: &SourceRef,
        params: &Map<String, Value>,
    ) -> Result<Value, GatewayError> {
        let capability = Capability::resolve(source, params)?;

        let Some(operation) = capability.operation() else {
            info!(source = %source, "Capability not wired, returning placeholder");
            return Ok(json!({
                "status": "unimplemented",
                "source": source.to_string(),
                "params": Value::Object(params.clone()),
            }));
        };

        debug!(
            source = %source,
            operation = %operation,
            query = capability.query().unwrap_or_default(),
            "Invoking capability"
        );
        self.transport
            .call(operation, Value::Object(params.clone()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Transport that records calls and echoes the operation back.
    #[derive(Default)]
    struct RecordingTransport {
        calls: Mutex<Vec<(String, Value)>>,
    }

    #[async_trait]
    impl ToolTransport for RecordingTransport {
        async fn call(&self, operation: &str, params: Value) -> Result<Value, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((operation.to_string(), params));
            Ok(json!({ "operation": operation }))
        }
    }

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_wired_capability_uses_transport() {
        let transport = Arc::new(RecordingTransport::default());
        let gateway = Gateway::new(transport.clone());

        let result = gateway
            .invoke(
                &SourceRef::parse("official_api:canva"),
                &params(json!({ "query": "poster" })),
            )
            .await
            .unwrap();

        assert_eq!(result, json!({ "operation": "canva_search_designs" }));
        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, json!({ "query": "poster" }));
    }

    #[tokio::test]
    async fn test_params_reach_transport_unchanged() {
        let transport = Arc::new(RecordingTransport::default());
        let gateway = Gateway::new(transport.clone());

        let mistyped = json!({ "query": "x", "max_results": "5" });
        let with_null = json!({ "query": null, "max_results": 3 });

        gateway
            .invoke(&SourceRef::parse("official_api:gmail"), &params(mistyped.clone()))
            .await
            .unwrap();
        gateway
            .invoke(&SourceRef::parse("official_api:drive"), &params(with_null.clone()))
            .await
            .unwrap();

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], ("gmail_search".to_string(), mistyped));
        assert_eq!(calls[1], ("drive_search".to_string(), with_null));
        assert!(calls[1].1.as_object().unwrap().contains_key("query"));
    }

    #[tokio::test]
    async fn test_unwired_capability_returns_placeholder() {
        let transport = Arc::new(RecordingTransport::default());
        let gateway = Gateway::new(transport.clone());

        let result = gateway
            .invoke(
                &SourceRef::parse("vendor:newsapi"),
                &params(json!({ "q": "rust" })),
            )
            .await
            .unwrap();

        assert_eq!(result["status"], "unimplemented");
        assert_eq!(result["source"], "vendor:newsapi");
        assert_eq!(result["params"]["q"], "rust");
        assert!(transport.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_source_fails() {
        let gateway = Gateway::new(Arc::new(RecordingTransport::default()));
        let err = gateway
            .invoke(&SourceRef::parse("official_api:unknownthing"), &Map::new())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnsupportedSource);
        assert!(err.to_string().contains("official_api:unknownthing"));
    }
}
