//! Thin JSON-over-HTTP client for the emulator's REST gateway.

use crate::endpoint::{ConnectionTarget, REACHABILITY_TIMEOUT};
use crate::{Error, Result};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Shared HTTP client bound to one emulator
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
}

/// Error body in either the Google API shape (`{"error": {...}}`) or the
/// bare gateway shape (`{"code": 5, "message": ...}`)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Wrapped { error: Status },
    Bare(Status),
}

/// An RPC status as carried in error bodies and finished operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Numeric code (HTTP-style in wrapped bodies, RPC code otherwise)
    #[serde(default)]
    pub code: i32,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Canonical status name, e.g. `NOT_FOUND`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl RestClient {
    /// Create a client for the target's REST gateway
    pub fn new(target: &ConnectionTarget) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: target.base_url(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/v1/{}", self.base_url, path);
        debug!("{} {}", method, url);
        self.http.request(method, url)
    }

    /// `GET /v1/{path}` with query parameters
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self.request(Method::GET, path).query(query).send().await?;
        decode(response).await
    }

    /// `POST /v1/{path}` with a JSON body
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.request(Method::POST, path).json(body).send().await?;
        decode(response).await
    }

    /// Whether the gateway answers `GET /v1/{path}` with any HTTP response.
    ///
    /// Error statuses count as serving. A port that accepts and then drops
    /// the connection does not.
    pub async fn is_serving(&self, path: &str) -> bool {
        match self
            .request(Method::GET, path)
            .timeout(REACHABILITY_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => {
                debug!("{} answered {}", self.base_url, response.status());
                true
            }
            Err(e) => {
                debug!("{} not serving: {}", self.base_url, e);
                false
            }
        }
    }

    /// Poll [`RestClient::is_serving`] until it holds or `timeout` elapses
    pub async fn wait_until_serving(
        &self,
        path: &str,
        timeout: Duration,
        interval: Duration,
    ) -> Result<()> {
        let start = Instant::now();
        loop {
            if self.is_serving(path).await {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                return Err(Error::EmulatorNotReady {
                    endpoint: self.base_url.clone(),
                    after: timeout,
                });
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// `DELETE /v1/{path}`
    pub async fn delete(&self, path: &str) -> Result<()> {
        let response = self.request(Method::DELETE, path).send().await?;
        let _: serde_json::Value = decode(response).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        let text = if body.trim().is_empty() { "{}" } else { &body };
        return Ok(serde_json::from_str(text)?);
    }

    debug!("HTTP {}: {}", status, body);
    Err(api_error(status.as_u16(), &body))
}

fn api_error(http_status: u16, body: &str) -> Error {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Wrapped { error }) | Ok(ErrorBody::Bare(error)) => Error::Api {
            http_status,
            status: error.status.or_else(|| rpc_code_name(error.code).map(str::to_string)),
            message: error.message,
        },
        Err(_) => Error::Api {
            http_status,
            status: None,
            message: body.trim().to_string(),
        },
    }
}

/// Canonical name of the RPC codes we act on
pub(crate) fn rpc_code_name(code: i32) -> Option<&'static str> {
    match code {
        5 => Some("NOT_FOUND"),
        6 => Some("ALREADY_EXISTS"),
        10 => Some("ABORTED"),
        _ => None,
    }
}
