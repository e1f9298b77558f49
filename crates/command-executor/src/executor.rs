//! Named executor wrapping a launcher

use crate::backends::LocalLauncher;
use crate::command::Command;
use crate::error::Result;
use crate::launcher::Launcher;
use crate::process::ExitResult;
use tracing::debug;

/// An executor that runs commands through a specific launcher
pub struct Executor<L: Launcher> {
    name: String,
    launcher: L,
}

impl<L: Launcher> Executor<L> {
    /// Create a new executor with the given launcher
    pub fn new(name: impl Into<String>, launcher: L) -> Self {
        Self {
            name: name.into(),
            launcher,
        }
    }

    /// Execute a command and wait for it to complete
    pub async fn execute(&self, command: Command) -> Result<ExitResult> {
        debug!("[{}] running: {}", self.name, command);
        let result = self.launcher.execute(command).await?;
        debug!(
            "[{}] exited with {:?}: {}",
            self.name,
            result.status.code,
            result.output.trim()
        );
        Ok(result)
    }
}

impl Executor<LocalLauncher> {
    /// Create an executor for local process execution
    pub fn local(name: impl Into<String>) -> Self {
        Self::new(name, LocalLauncher)
    }
}
