//! Tool transport: the side channel wired capabilities are called through.
//!
//! Every call takes an operation name and a parameter object. The reply
//! carries either a `result` field or an `error` field.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use super::GatewayError;

/// Side channel for calling connector tools.
#[async_trait]
pub trait ToolTransport: Send + Sync {
    /// Call one tool operation.
    async fn call(&self, operation: &str, params: Value) -> Result<Value, GatewayError>;
}

/// Request body sent to a tool.
#[derive(Debug, Serialize)]
struct ToolRequest {
    params: Value,
}

/// Reply body returned by a tool.
#[derive(Debug, Deserialize)]
struct ToolReply {
    /// `Some(Value::Null)` when the tool answered `"result": null`.
    #[serde(default, deserialize_with = "present")]
    result: Option<Value>,

    #[serde(default)]
    error: Option<Value>,
}

impl ToolReply {
    fn into_result(self, operation: &str) -> Result<Value, GatewayError> {
        match (self.error, self.result) {
            (Some(error), _) if !error.is_null() => Err(GatewayError::Connector {
                operation: operation.to_string(),
                message: error_message(error),
            }),
            (_, Some(result)) => Ok(result),
            _ => Err(GatewayError::Connector {
                operation: operation.to_string(),
                message: "reply carried neither result nor error".to_string(),
            }),
        }
    }
}

/// Keep a present field as `Some`, even when its value is `null`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// Flatten a tool error into a readable message.
fn error_message(error: Value) -> String {
    match error {
        Value::String(message) => message,
        Value::Object(ref map) => match map.get("message").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => error.to_string(),
        },
        other => other.to_string(),
    }
}

/// Tool transport over HTTP: `POST {base_url}/tools/{operation}`.
pub struct HttpToolTransport {
    inner: reqwest::Client,
    base_url: String,
}

impl HttpToolTransport {
    /// Create a new HTTP tool transport.
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ToolTransport for HttpToolTransport {
    async fn call(&self, operation: &str, params: Value) -> Result<Value, GatewayError> {
        let url = format!("{}/tools/{}", self.base_url, operation);
        debug!(url = %url, operation = %operation, "Calling connector tool");

        let response = self
            .inner
            .post(&url)
            .json(&ToolRequest { params })
            .send()
            .await
            .map_err(|e| GatewayError::transport(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Connector {
                operation: operation.to_string(),
                message: format!("HTTP {}: {}", status, body.trim()),
            });
        }

        let reply: ToolReply = response
            .json()
            .await
            .map_err(|e| GatewayError::transport(operation, e))?;

        reply.into_result(operation)
    }
}
