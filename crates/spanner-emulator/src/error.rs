//! Error types for emulator lifecycle, bootstrap and data access

use std::time::Duration;
use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the emulator harness
#[derive(Error, Debug)]
pub enum Error {
    /// An endpoint string could not be split into `host:port`
    #[error("unable to parse port from: {endpoint:?}")]
    InvalidEndpoint {
        /// The offending endpoint string
        endpoint: String,
    },

    /// Neither a gRPC nor a REST endpoint was configured
    #[error("no emulator endpoint configured")]
    NoEndpoint,

    /// The container runtime could not be invoked
    #[error("command execution error: {0}")]
    Command(#[from] command_executor::Error),

    /// The container runtime ran but reported failure
    #[error("container `{name}` failed to start: {output}")]
    Container {
        /// Container name
        name: String,
        /// Captured output of the failed command
        output: String,
    },

    /// The emulator did not accept connections in time
    #[error("emulator at {endpoint} not reachable after {after:?}")]
    EmulatorNotReady {
        /// Endpoint that was probed
        endpoint: String,
        /// How long we waited
        after: Duration,
    },

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The emulator answered with an error status
    #[error("API error ({http_status}): {message}")]
    Api {
        /// HTTP status code
        http_status: u16,
        /// Canonical status name, when the body carried one
        status: Option<String>,
        /// Error message from the body
        message: String,
    },

    /// A long-running operation did not finish in time
    #[error("timed out after {after:?} waiting for {operation}")]
    Timeout {
        /// Description of what we were waiting for
        operation: String,
        /// The bound that elapsed
        after: Duration,
    },

    /// A long-running operation finished with an error
    #[error("{operation} failed: {message} (code {code})")]
    OperationFailed {
        /// Description of the operation
        operation: String,
        /// RPC status code of the failure
        code: i32,
        /// Error message
        message: String,
    },

    /// A query expected to find a row found none
    #[error("{0} not found")]
    RowNotFound(String),

    /// An update statement affected zero rows
    #[error("no rows updated")]
    NoRowsUpdated,

    /// A value or row could not be decoded into the requested shape
    #[error("decode error: {0}")]
    Decode(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// JSON (de)serialization error
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse error
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Returns true for the "resource does not exist" signal of the admin API
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Api {
                http_status,
                status,
                ..
            } => *http_status == 404 || status.as_deref() == Some("NOT_FOUND"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_by_http_status_or_status_name() {
        let by_http = Error::Api {
            http_status: 404,
            status: None,
            message: "Database not found".to_string(),
        };
        let by_status = Error::Api {
            http_status: 400,
            status: Some("NOT_FOUND".to_string()),
            message: "missing".to_string(),
        };
        let other = Error::Api {
            http_status: 409,
            status: Some("ALREADY_EXISTS".to_string()),
            message: "exists".to_string(),
        };

        assert!(by_http.is_not_found());
        assert!(by_status.is_not_found());
        assert!(!other.is_not_found());
        assert!(!Error::NoRowsUpdated.is_not_found());
    }

    #[test]
    fn test_api_error_display() {
        let err = Error::Api {
            http_status: 404,
            status: Some("NOT_FOUND".to_string()),
            message: "Database not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API error (404): Database not found"
        );
    }
}
