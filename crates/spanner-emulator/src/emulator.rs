//! Emulator facade: how the emulator process is brought up, kept apart
//! from what happens once it is reachable.

use crate::config::EmulatorConfig;
use crate::container::DockerContainer;
use crate::endpoint::ConnectionTarget;
use crate::Result;
use async_trait::async_trait;

/// Brings an emulator process up and tears it down
#[async_trait]
pub trait EmulatorRuntime: Send + Sync {
    /// Start the emulator listening on the given endpoints (empty ones are skipped)
    async fn run(&self, grpc_host: &str, rest_host: &str) -> Result<()>;

    /// Stop the emulator. Never fails; problems are logged and dropped.
    async fn close_best_effort(&self);
}

#[async_trait]
impl EmulatorRuntime for DockerContainer {
    async fn run(&self, grpc_host: &str, rest_host: &str) -> Result<()> {
        let endpoints: Vec<&str> = [grpc_host, rest_host]
            .into_iter()
            .filter(|h| !h.is_empty())
            .collect();
        self.start(&endpoints).await
    }

    async fn close_best_effort(&self) {
        DockerContainer::close_best_effort(self).await
    }
}

/// Runtime for an emulator someone else manages; run and close do nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalEmulator;

#[async_trait]
impl EmulatorRuntime for ExternalEmulator {
    async fn run(&self, _grpc_host: &str, _rest_host: &str) -> Result<()> {
        Ok(())
    }

    async fn close_best_effort(&self) {}
}

/// A runtime paired with the two endpoints the emulator listens on
pub struct Emulator {
    runtime: Box<dyn EmulatorRuntime>,
    grpc_host: String,
    rest_host: String,
}

impl Emulator {
    /// Pair a runtime with its endpoints
    pub fn new(
        runtime: impl EmulatorRuntime + 'static,
        grpc_host: impl Into<String>,
        rest_host: impl Into<String>,
    ) -> Self {
        Self {
            runtime: Box::new(runtime),
            grpc_host: grpc_host.into(),
            rest_host: rest_host.into(),
        }
    }

    /// The emulator image run as a local container
    pub fn docker(config: &EmulatorConfig) -> Self {
        Self::new(
            DockerContainer::new(&config.container_name, &config.image),
            &config.grpc_host,
            &config.rest_host,
        )
    }

    /// An emulator that is already running at the configured endpoints
    pub fn external(config: &EmulatorConfig) -> Self {
        Self::new(ExternalEmulator, &config.grpc_host, &config.rest_host)
    }

    /// `(grpc, rest)` endpoints
    pub fn hosts(&self) -> (&str, &str) {
        (&self.grpc_host, &self.rest_host)
    }

    /// Resolve where clients should connect
    pub fn target(&self) -> Result<ConnectionTarget> {
        ConnectionTarget::resolve(&self.grpc_host, &self.rest_host)
    }

    /// Start the emulator
    pub async fn run(&self) -> Result<()> {
        let (grpc, rest) = self.hosts();
        self.runtime.run(grpc, rest).await
    }

    /// Stop the emulator, best effort
    pub async fn close(&self) {
        self.runtime.close_best_effort().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder {
        runs: Mutex<Vec<(String, String)>>,
        closes: AtomicUsize,
    }

    #[async_trait]
    impl EmulatorRuntime for Arc<Recorder> {
        async fn run(&self, grpc_host: &str, rest_host: &str) -> Result<()> {
            self.runs
                .lock()
                .unwrap()
                .push((grpc_host.to_string(), rest_host.to_string()));
            Ok(())
        }

        async fn close_best_effort(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_facade_delegates_with_stored_hosts() {
        let recorder = Arc::new(Recorder::default());
        let emulator = Emulator::new(recorder.clone(), "localhost:9010", "localhost:9020");

        assert_eq!(emulator.hosts(), ("localhost:9010", "localhost:9020"));

        emulator.run().await.unwrap();
        emulator.close().await;
        emulator.close().await;

        assert_eq!(
            *recorder.runs.lock().unwrap(),
            vec![("localhost:9010".to_string(), "localhost:9020".to_string())]
        );
        assert_eq!(recorder.closes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_external_emulator_is_noop() {
        let emulator = Emulator::external(&EmulatorConfig::default());
        emulator.run().await.unwrap();
        emulator.close().await;
        assert_eq!(emulator.target().unwrap().probe, "localhost:9010");
    }
}
