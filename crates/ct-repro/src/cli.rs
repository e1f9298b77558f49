//! Command line and its merge with the optional config file.

use crate::demo::{DemoOptions, InsertTimestamps, UpdateTimestamps};
use crate::schema::live_schema;
use anyhow::{Context, Result};
use clap::Parser;
use spanner_emulator::{DatabaseConfig, Emulator, EmulatorConfig, HarnessConfig, Timeouts};
use std::path::PathBuf;

/// Database the demo uses when neither flag nor file names one
pub const DEMO_DATABASE: &str = "testdb";

/// Command line flags; each one overrides the config file
#[derive(Debug, Parser)]
#[command(name = "ct-repro")]
#[command(about = "Reproduce the commit-timestamp update failure against a local Spanner emulator")]
#[command(version)]
pub struct Cli {
    /// YAML config file; flags override its values
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Project id
    #[arg(long)]
    pub project: Option<String>,

    /// Instance id
    #[arg(long)]
    pub instance: Option<String>,

    /// Database id
    #[arg(long)]
    pub database: Option<String>,

    /// Schema file used instead of the built-in schema
    #[arg(long, value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// gRPC endpoint of the emulator (empty to skip)
    #[arg(long, value_name = "HOST:PORT")]
    pub grpc_host: Option<String>,

    /// REST endpoint of the emulator
    #[arg(long, value_name = "HOST:PORT")]
    pub rest_host: Option<String>,

    /// Emulator image
    #[arg(long)]
    pub image: Option<String>,

    /// Emulator container name
    #[arg(long)]
    pub container_name: Option<String>,

    /// Use an emulator that is already running instead of starting a container
    #[arg(long)]
    pub external: bool,

    /// Bound on instance and database creation, in milliseconds
    #[arg(long, value_name = "MS")]
    pub operation_timeout_ms: Option<u64>,

    /// Timestamps written by the insert
    #[arg(long, value_enum, default_value_t = InsertTimestamps::Fixed)]
    pub insert_timestamps: InsertTimestamps,

    /// How the update requests the commit timestamp
    #[arg(long, value_enum, default_value_t = UpdateTimestamps::Parameter)]
    pub update_timestamps: UpdateTimestamps,

    /// Leave the emulator running on exit
    #[arg(long)]
    pub keep_running: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Everything a run needs, after defaults, file and flags are layered
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Container and endpoints
    pub emulator: EmulatorConfig,
    /// Target database with its schema loaded
    pub database: DatabaseConfig,
    /// Startup, operation and polling bounds
    pub timeouts: Timeouts,
    /// Skip the container and use whatever listens on the endpoints
    pub external: bool,
    /// Leave the container up after the run
    pub keep_running: bool,
    /// Insert and update modes of the script
    pub demo: DemoOptions,
}

impl Settings {
    /// The emulator runtime these settings select
    pub fn emulator(&self) -> Emulator {
        if self.external {
            Emulator::external(&self.emulator)
        } else {
            Emulator::docker(&self.emulator)
        }
    }
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl Cli {
    /// Layer defaults, the config file and the flags.
    ///
    /// Schema precedence: `--schema`, then the file's schema and inline DDL,
    /// then the built-in schema.
    pub fn settings(&self) -> Result<Settings> {
        let mut file = match &self.config {
            Some(path) => HarnessConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => {
                let mut config = HarnessConfig::default();
                config.database.database.database = DEMO_DATABASE.to_string();
                config
            }
        };

        let emulator = &mut file.emulator;
        override_with(&mut emulator.grpc_host, self.grpc_host.clone());
        override_with(&mut emulator.rest_host, self.rest_host.clone());
        override_with(&mut emulator.image, self.image.clone());
        override_with(&mut emulator.container_name, self.container_name.clone());
        emulator.validate().context("Invalid emulator endpoints")?;

        let database = &mut file.database.database;
        override_with(&mut database.project, self.project.clone());
        override_with(&mut database.instance, self.instance.clone());
        override_with(&mut database.database, self.database.clone());

        override_with(&mut file.timeouts.operation_ms, self.operation_timeout_ms.map(Some));

        let database = match &self.schema {
            Some(path) => file.database.database.clone().with_ddl(
                spanner_emulator::load_ddl_file(path)
                    .with_context(|| format!("Failed to read schema {}", path.display()))?,
            ),
            None => {
                let database = file.database_config().context("Failed to read schema")?;
                if database.ddl.is_empty() {
                    database.with_ddl(live_schema())
                } else {
                    database
                }
            }
        };

        Ok(Settings {
            emulator: file.emulator,
            database,
            timeouts: file.timeouts.resolve(),
            external: self.external,
            keep_running: self.keep_running,
            demo: DemoOptions {
                insert: self.insert_timestamps,
                update: self.update_timestamps,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ct-repro").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = parse(&[]).settings().unwrap();

        assert_eq!(settings.database.database, "testdb");
        assert_eq!(settings.database.project, "test-project");
        assert_eq!(settings.database.ddl, live_schema());
        assert_eq!(settings.emulator, EmulatorConfig::default());
        assert_eq!(settings.timeouts, Timeouts::default());
        assert_eq!(settings.demo, DemoOptions::default());
        assert!(!settings.external);
        assert!(!settings.keep_running);
    }

    #[test]
    fn test_flags() {
        let cli = parse(&[
            "--database",
            "other",
            "--rest-host",
            "127.0.0.1:19020",
            "--grpc-host",
            "",
            "--operation-timeout-ms",
            "5000",
            "--insert-timestamps",
            "commit-timestamp",
            "--update-timestamps",
            "inline",
            "--external",
            "--keep-running",
        ]);
        let settings = cli.settings().unwrap();

        assert_eq!(settings.database.database, "other");
        assert_eq!(settings.emulator.rest_host, "127.0.0.1:19020");
        assert_eq!(settings.emulator.grpc_host, "");
        assert_eq!(settings.timeouts.operation, Duration::from_millis(5000));
        assert_eq!(settings.demo.insert, InsertTimestamps::CommitTimestamp);
        assert_eq!(settings.demo.update, UpdateTimestamps::Inline);
        assert!(settings.external);
        assert!(settings.keep_running);
    }

    #[test]
    fn test_bad_endpoint_rejected() {
        assert!(parse(&["--rest-host", "localhost"]).settings().is_err());
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(Cli::try_parse_from(["ct-repro", "--insert-timestamps", "later"]).is_err());
    }

    #[test]
    fn test_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.sql");
        std::fs::write(&schema, "CREATE TABLE a (id INT64) PRIMARY KEY (id);").unwrap();

        let config = dir.path().join("harness.yaml");
        let mut f = std::fs::File::create(&config).unwrap();
        writeln!(
            f,
            "database:\n  instance: from-file\n  database: from-file\n  schema_file: schema.sql\ntimeouts:\n  operation_ms: 750"
        )
        .unwrap();

        let cli = parse(&[
            "--config",
            config.to_str().unwrap(),
            "--database",
            "from-flag",
        ]);
        let settings = cli.settings().unwrap();

        assert_eq!(settings.database.instance, "from-file");
        assert_eq!(settings.database.database, "from-flag");
        assert_eq!(
            settings.database.ddl,
            vec!["CREATE TABLE a (id INT64) PRIMARY KEY (id)".to_string()]
        );
        assert_eq!(settings.timeouts.operation, Duration::from_millis(750));
    }

    #[test]
    fn test_schema_flag_wins() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("only.sql");
        std::fs::write(&schema, "CREATE TABLE b (id INT64) PRIMARY KEY (id)").unwrap();

        let settings = parse(&["--schema", schema.to_str().unwrap()]).settings().unwrap();
        assert_eq!(settings.database.ddl.len(), 1);
        assert!(settings.database.ddl[0].starts_with("CREATE TABLE b"));
    }
}
