//! # Spanner emulator harness
//!
//! Stands up a local Cloud Spanner emulator, makes sure an instance and a
//! database (with its schema) exist, and gives a small client for
//! read-write transactions against it.
//!
//! The pieces, leaf first:
//!
//! - [`endpoint`]: `host:port` parsing and TCP reachability probes
//! - [`DockerContainer`]: starts and removes the emulator container
//! - [`Emulator`]: pairs a runtime with the endpoints it listens on
//! - [`Bootstrapper`]: create-if-absent for instance and database
//! - [`parse_ddl`]: splits schema text into statements
//! - [`database`]: sessions, transactions, mutations, SQL
//!
//! ## Example
//!
//! ```rust,no_run
//! use spanner_emulator::{Bootstrapper, DatabaseConfig, Emulator, EmulatorConfig};
//!
//! # async fn example() -> spanner_emulator::Result<()> {
//! let config = DatabaseConfig::default().with_ddl(spanner_emulator::parse_ddl(
//!     "CREATE TABLE t (id INT64 NOT NULL) PRIMARY KEY (id);",
//! ));
//! let bootstrapper = Bootstrapper::new(config, Emulator::docker(&EmulatorConfig::default()));
//! let target = bootstrapper.run().await?;
//! println!("emulator ready at {}", target.base_url());
//! bootstrapper.close().await;
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod bootstrap;
pub mod config;
pub mod container;
pub mod database;
pub mod ddl;
pub mod emulator;
pub mod endpoint;
pub mod error;
pub mod operation;
pub mod rest;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use admin::{DatabaseAdmin, DatabaseAdminClient, InstanceAdmin, InstanceAdminClient};
pub use bootstrap::{Bootstrapper, Provisioned};
pub use config::{DatabaseConfig, EmulatorConfig, HarnessConfig, Timeouts};
pub use container::DockerContainer;
pub use database::DatabaseClient;
pub use ddl::{load_ddl_file, parse_ddl};
pub use emulator::{Emulator, EmulatorRuntime, ExternalEmulator};
pub use endpoint::{is_running, ConnectionTarget};
pub use error::{Error, Result};
pub use operation::{wait_for_operation, Operation, Operations};
