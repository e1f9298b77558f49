//! Container runner for the emulator image.

use crate::endpoint::port;
use crate::{Error, Result};
use command_executor::{Command, Executor, LocalLauncher};
use tracing::{debug, info, warn};

/// Starts and stops one named container through the container runtime CLI
pub struct DockerContainer {
    name: String,
    image: String,
    program: String,
    executor: Executor<LocalLauncher>,
}

impl DockerContainer {
    /// Create a runner for `image`, started under `name`
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            program: "docker".to_string(),
            executor: Executor::local("container-runner"),
        }
    }

    /// Use a different CLI with docker-compatible arguments (e.g. `podman`)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Container name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Container image
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Arguments for `run`, publishing each endpoint's port on the same host port.
    ///
    /// Fails on the first endpoint without a numeric port.
    pub fn run_args(&self, endpoints: &[&str]) -> Result<Vec<String>> {
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            self.name.clone(),
        ];
        for endpoint in endpoints {
            let port = port(endpoint)?;
            args.push("-p".to_string());
            args.push(format!("{}:{}", port, port));
        }
        args.push(self.image.clone());
        Ok(args)
    }

    /// Start the container in the background.
    ///
    /// Returns once the runtime has accepted the container; the service
    /// inside may not be ready yet.
    pub async fn start(&self, endpoints: &[&str]) -> Result<()> {
        let args = self.run_args(endpoints)?;

        info!("Starting container '{}' from {}", self.name, self.image);
        let cmd = Command::builder(&self.program).args(&args).build();
        let result = self.executor.execute(cmd).await?;

        if !result.success() {
            return Err(Error::Container {
                name: self.name.clone(),
                output: result.output.trim().to_string(),
            });
        }

        debug!("Container '{}' id: {}", self.name, result.output.trim());
        Ok(())
    }

    /// Kill and remove the container, ignoring failures.
    ///
    /// Safe to call when the container is absent or never started.
    pub async fn close_best_effort(&self) {
        for action in ["kill", "rm"] {
            let cmd = Command::builder(&self.program)
                .arg(action)
                .arg(&self.name)
                .build();
            match self.executor.execute(cmd).await {
                Ok(result) if result.success() => {
                    debug!("{} {}: ok", action, self.name);
                }
                Ok(result) => {
                    debug!("{} {} ignored: {}", action, self.name, result.output.trim());
                }
                Err(e) => {
                    warn!("{} {} ignored: {}", action, self.name, e);
                }
            }
        }
        info!("Container '{}' removed", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args_publish_both_ports() {
        let container = DockerContainer::new("spanner-emulator", "emulator:latest");
        let args = container
            .run_args(&["localhost:9010", "localhost:9020"])
            .unwrap();

        assert_eq!(
            args,
            vec![
                "run",
                "-d",
                "--name",
                "spanner-emulator",
                "-p",
                "9010:9010",
                "-p",
                "9020:9020",
                "emulator:latest",
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_endpoint_fails_before_spawning() {
        // A missing program would surface as Error::Command if anything ran
        let container = DockerContainer::new("emu", "image").with_program("no-such-runtime-cli");

        let err = container
            .start(&["localhost:9010", "localhost"])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint { .. }));
    }

    #[tokio::test]
    async fn test_start_reports_runtime_failure() {
        let container = DockerContainer::new("emu", "image").with_program("false");

        let err = container.start(&["localhost:9010"]).await.unwrap_err();
        assert!(matches!(err, Error::Container { .. }));
    }

    #[tokio::test]
    async fn test_start_succeeds_when_runtime_accepts() {
        let container = DockerContainer::new("emu", "image").with_program("true");
        container.start(&["localhost:9010"]).await.unwrap();
    }

    #[tokio::test]
    async fn test_close_swallows_failures() {
        DockerContainer::new("emu", "image")
            .with_program("false")
            .close_best_effort()
            .await;
        DockerContainer::new("emu", "image")
            .with_program("no-such-runtime-cli")
            .close_best_effort()
            .await;
    }
}
