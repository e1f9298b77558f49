//! Endpoint parsing and reachability probing.

use crate::{Error, Result};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tracing::debug;

/// How long a single reachability probe waits for the TCP handshake
pub const REACHABILITY_TIMEOUT: Duration = Duration::from_secs(1);

/// Split a `host:port` endpoint and return the port.
///
/// The port must be numeric. Only the last colon is significant, so
/// bracketed IPv6 hosts such as `[::1]:9010` parse as well.
pub fn port(endpoint: &str) -> Result<&str> {
    let invalid = || Error::InvalidEndpoint {
        endpoint: endpoint.to_string(),
    };

    let (host, port) = endpoint.rsplit_once(':').ok_or_else(invalid)?;
    if host.is_empty() || port.parse::<u16>().is_err() {
        return Err(invalid());
    }
    Ok(port)
}

/// Returns true if something accepts TCP connections at `endpoint`.
///
/// One attempt, bounded by [`REACHABILITY_TIMEOUT`]. The connection is
/// closed immediately. Resolution failures count as "not running".
pub async fn is_running(endpoint: &str) -> bool {
    match tokio::time::timeout(REACHABILITY_TIMEOUT, TcpStream::connect(endpoint)).await {
        Ok(Ok(stream)) => {
            drop(stream);
            true
        }
        Ok(Err(e)) => {
            debug!("{} not reachable: {}", endpoint, e);
            false
        }
        Err(_) => {
            debug!("{} not reachable: connect timed out", endpoint);
            false
        }
    }
}

/// Probe `endpoint` until it accepts connections or `timeout` elapses.
pub async fn wait_until_running(
    endpoint: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<()> {
    let start = Instant::now();
    loop {
        if is_running(endpoint).await {
            debug!("{} reachable after {:?}", endpoint, start.elapsed());
            return Ok(());
        }
        if start.elapsed() >= timeout {
            return Err(Error::EmulatorNotReady {
                endpoint: endpoint.to_string(),
                after: timeout,
            });
        }
        tokio::time::sleep(interval).await;
    }
}

/// Where the harness talks to the emulator.
///
/// Built once by the bootstrapper and handed to every client, instead of
/// redirecting the client library through a process environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    /// Preferred endpoint used for liveness probes (gRPC first, then REST)
    pub probe: String,
    /// `host:port` of the REST gateway the clients speak to
    pub rest_host: String,
}

impl ConnectionTarget {
    /// Resolve the target from the emulator's two endpoints.
    ///
    /// The first non-empty of `grpc_host`, `rest_host` becomes the probe
    /// endpoint. The REST endpoint is required because the clients use it.
    pub fn resolve(grpc_host: &str, rest_host: &str) -> Result<Self> {
        let probe = [grpc_host, rest_host]
            .into_iter()
            .find(|h| !h.is_empty())
            .ok_or(Error::NoEndpoint)?;
        if rest_host.is_empty() {
            return Err(Error::Config(
                "a REST endpoint is required to reach the emulator".to_string(),
            ));
        }
        port(probe)?;
        port(rest_host)?;

        Ok(Self {
            probe: probe.to_string(),
            rest_host: rest_host.to_string(),
        })
    }

    /// Base URL of the REST gateway
    pub fn base_url(&self) -> String {
        format!("http://{}", self.rest_host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_port_parsing() {
        assert_eq!(port("localhost:9010").unwrap(), "9010");
        assert_eq!(port("127.0.0.1:9020").unwrap(), "9020");
        assert_eq!(port("[::1]:9010").unwrap(), "9010");
    }

    #[test]
    fn test_port_parsing_rejects_malformed() {
        let err = port("localhost").unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint { .. }));
        assert!(err.to_string().contains("localhost"));

        assert!(port("localhost:grpc").is_err());
        assert!(port(":9010").is_err());
        assert!(port("").is_err());
    }

    #[test]
    fn test_resolve_prefers_grpc() {
        let target = ConnectionTarget::resolve("localhost:9010", "localhost:9020").unwrap();
        assert_eq!(target.probe, "localhost:9010");
        assert_eq!(target.base_url(), "http://localhost:9020");
    }

    #[test]
    fn test_resolve_falls_back_to_rest() {
        let target = ConnectionTarget::resolve("", "localhost:9020").unwrap();
        assert_eq!(target.probe, "localhost:9020");
    }

    #[test]
    fn test_resolve_without_endpoints() {
        assert!(matches!(
            ConnectionTarget::resolve("", ""),
            Err(Error::NoEndpoint)
        ));
        assert!(matches!(
            ConnectionTarget::resolve("localhost:9010", ""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ConnectionTarget::resolve("localhost", "localhost:9020"),
            Err(Error::InvalidEndpoint { .. })
        ));
    }

    #[tokio::test]
    async fn test_is_running_with_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        assert!(is_running(&addr).await);
    }

    #[tokio::test]
    async fn test_is_running_without_listener() {
        // Bind then drop to get a port nobody listens on
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().to_string()
        };

        let start = Instant::now();
        assert!(!is_running(&addr).await);
        assert!(start.elapsed() <= REACHABILITY_TIMEOUT + Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_wait_until_running_times_out() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().to_string()
        };

        let err = wait_until_running(&addr, Duration::from_millis(50), Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmulatorNotReady { .. }));
    }
}
