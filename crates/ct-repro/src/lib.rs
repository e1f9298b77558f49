//! Reproduction harness for commit-timestamp updates on a local Spanner
//! emulator.
//!
//! Boots the emulator with the production schema, inserts a `machines` row,
//! reads it back and asks the store to stamp `created_on` / `ended_on` with
//! the commit timestamp. The binary prints `ok` or `!ok: <error>`.

pub mod cli;
pub mod demo;
pub mod machine;
pub mod schema;

pub use cli::{Cli, Settings};
pub use demo::{DemoOptions, InsertTimestamps, UpdateTimestamps};
pub use machine::Machine;

use anyhow::Context;
use spanner_emulator::{Bootstrapper, DatabaseClient};
use tracing::info;

/// Bootstrap the emulator, run the demo and tear down unless asked not to.
///
/// Errors from bootstrapping are returned as-is; the demo's own outcome is
/// the inner result so the caller can tell "could not start" from "!ok".
pub async fn run(settings: Settings) -> anyhow::Result<spanner_emulator::Result<Machine>> {
    let bootstrapper = Bootstrapper::new(settings.database.clone(), settings.emulator())
        .with_timeouts(settings.timeouts);

    let target = match bootstrapper.run().await {
        Ok(target) => target,
        Err(e) => {
            if !settings.keep_running {
                bootstrapper.close().await;
            }
            return Err(e).context("Can't start spanner emulator");
        }
    };
    info!("Emulator ready at {}", target.base_url());

    let outcome = match DatabaseClient::connect(&target, settings.database.database_path()).await {
        Ok(client) => {
            let outcome = demo::run(&client, settings.demo).await;
            client.close().await;
            outcome
        }
        Err(e) => Err(e),
    };

    if settings.keep_running {
        info!("Leaving emulator running at {}", target.base_url());
    } else {
        bootstrapper.close().await;
    }
    Ok(outcome)
}
