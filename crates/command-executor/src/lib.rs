//! Runtime-agnostic command execution library
//!
//! This crate runs local programs (the container runtime CLI in practice),
//! streams their output line by line and reports how they exited. It does not
//! depend on a particular async runtime: processes are driven by
//! `async-process`, so callers on tokio or smol can both use it.

pub mod backends;
pub mod command;
pub mod error;
pub mod event;
pub mod executor;
pub mod launcher;
pub mod process;

pub use backends::LocalLauncher;
pub use command::Command;
pub use error::{Error, Result};
pub use event::{ProcessEvent, ProcessEventType};
pub use executor::Executor;
pub use launcher::Launcher;
pub use process::{ExitResult, ExitStatus, ProcessHandle};
