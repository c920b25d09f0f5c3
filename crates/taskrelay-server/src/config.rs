//! Server configuration.

use clap::Parser;
use thiserror::Error;

/// Default ceiling for submission bodies (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Settings the server refuses to start with.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("auth token must not be empty")]
    EmptyAuthToken,

    #[error("max body bytes must be greater than zero")]
    ZeroBodyLimit,
}

/// TaskRelay server configuration.
#[derive(Parser, Debug, Clone)]
#[command(name = "taskrelay-server", about = "TaskRelay run orchestration server")]
pub struct Config {
    /// HTTP server address
    #[arg(long, env = "TASKRELAY_HTTP_ADDR", default_value = "127.0.0.1:8787")]
    pub http_addr: String,

    /// Bearer token required to submit runs
    #[arg(long, env = "TASKRELAY_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: String,

    /// Base URL of the connector tool endpoint
    #[arg(long, env = "TASKRELAY_CONNECTOR_URL", default_value = "http://127.0.0.1:8788")]
    pub connector_url: String,

    /// Maximum accepted submission body size in bytes
    #[arg(long, env = "TASKRELAY_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

impl Config {
    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth_token.trim().is_empty() {
            return Err(ConfigError::EmptyAuthToken);
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::ZeroBodyLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["taskrelay-server", "--auth-token", "t0ken"]).unwrap();
        assert_eq!(config.http_addr, "127.0.0.1:8787");
        assert_eq!(config.connector_url, "http://127.0.0.1:8788");
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_token_rejected() {
        let config = Config::try_parse_from(["taskrelay-server", "--auth-token", "  "]).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::EmptyAuthToken));
    }

    #[test]
    fn test_zero_body_limit_rejected() {
        let config = Config::try_parse_from([
            "taskrelay-server",
            "--auth-token",
            "t0ken",
            "--max-body-bytes",
            "0",
        ])
        .unwrap();
        assert_eq!(config.validate(), Err(ConfigError::ZeroBodyLimit));
    }
}
