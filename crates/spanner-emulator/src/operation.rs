//! Long-running operations and bounded waiting on them.

use crate::rest::Status;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// A long-running administrative operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Resource name, e.g. `projects/p/instances/i/operations/o`
    #[serde(default)]
    pub name: String,
    /// Whether the operation has finished
    #[serde(default)]
    pub done: bool,
    /// Set when the operation finished with an error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Status>,
}

impl Operation {
    /// A finished, successful operation
    pub fn completed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            error: None,
        }
    }

    /// A not-yet-finished operation
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
            error: None,
        }
    }
}

/// Something that can report the current state of an operation
#[async_trait]
pub trait Operations: Send + Sync {
    /// Fetch the operation by name
    async fn get_operation(&self, name: &str) -> Result<Operation>;
}

/// Wait for `operation` to finish, polling every `poll_interval`, for at most `timeout`.
///
/// The polling future is dropped when the timeout fires, so no request
/// outlives the wait. An operation that finishes with an error becomes
/// [`Error::OperationFailed`].
pub async fn wait_for_operation<O>(
    source: &O,
    operation: Operation,
    what: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Operation>
where
    O: Operations + ?Sized,
{
    let poll = async {
        let mut current = operation;
        loop {
            if current.done {
                return Ok::<_, Error>(current);
            }
            tokio::time::sleep(poll_interval).await;
            debug!("polling {} ({})", what, current.name);
            current = source.get_operation(&current.name).await?;
        }
    };

    let finished = tokio::time::timeout(timeout, poll)
        .await
        .map_err(|_| Error::Timeout {
            operation: what.to_string(),
            after: timeout,
        })??;

    match finished.error {
        Some(status) => Err(Error::OperationFailed {
            operation: what.to_string(),
            code: status.code,
            message: status.message,
        }),
        None => Ok(finished),
    }
}
