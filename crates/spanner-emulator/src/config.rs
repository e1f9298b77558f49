//! Emulator, database and timeout configuration.
//!
//! Values are plain data, built once per run. [`HarnessConfig`] can be
//! read from a YAML file; every field has a default so a file only needs
//! the keys it overrides:
//!
//! ```yaml
//! emulator:
//!   grpc_host: localhost:9010
//!   rest_host: localhost:9020
//! database:
//!   database: testdb
//!   schema_file: schema.sql
//! timeouts:
//!   operation_ms: 2000
//! ```

use crate::ddl::load_ddl_file;
use crate::endpoint::port;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default project id
pub const DEFAULT_PROJECT: &str = "test-project";
/// Default instance id
pub const DEFAULT_INSTANCE: &str = "test-instance";
/// Default database id
pub const DEFAULT_DATABASE: &str = "test-database";

/// Default gRPC endpoint of the emulator
pub const DEFAULT_GRPC_HOST: &str = "localhost:9010";
/// Default REST endpoint of the emulator
pub const DEFAULT_REST_HOST: &str = "localhost:9020";
/// Default container name
pub const DEFAULT_CONTAINER_NAME: &str = "spanner-emulator";
/// Default emulator image
pub const DEFAULT_IMAGE: &str = "gcr.io/cloud-spanner-emulator/emulator";

/// Bound on instance/database creation. Tuned for the local emulator only.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(2);
/// Bound on waiting for a freshly started container to accept connections
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(30);
/// Delay between polls of an operation or an endpoint
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Identifies one emulator process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Container name
    pub container_name: String,
    /// Container image
    pub image: String,
    /// gRPC endpoint (`host:port`)
    pub grpc_host: String,
    /// REST endpoint (`host:port`)
    pub rest_host: String,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            container_name: DEFAULT_CONTAINER_NAME.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            grpc_host: DEFAULT_GRPC_HOST.to_string(),
            rest_host: DEFAULT_REST_HOST.to_string(),
        }
    }
}

impl EmulatorConfig {
    /// Check that every configured endpoint has a numeric port
    pub fn validate(&self) -> Result<()> {
        for host in [&self.grpc_host, &self.rest_host] {
            if !host.is_empty() {
                port(host)?;
            }
        }
        if self.grpc_host.is_empty() && self.rest_host.is_empty() {
            return Err(Error::NoEndpoint);
        }
        Ok(())
    }
}

/// Identifies the target database and the schema applied when it is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Project id
    pub project: String,
    /// Instance id
    pub instance: String,
    /// Database id
    pub database: String,
    /// Schema statements, applied once at creation
    pub ddl: Vec<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            project: DEFAULT_PROJECT.to_string(),
            instance: DEFAULT_INSTANCE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            ddl: Vec::new(),
        }
    }
}

impl DatabaseConfig {
    /// `projects/{project}`
    pub fn project_path(&self) -> String {
        format!("projects/{}", self.project)
    }

    /// `projects/{project}/instances/{instance}`
    pub fn instance_path(&self) -> String {
        format!("projects/{}/instances/{}", self.project, self.instance)
    }

    /// `projects/{project}/instances/{instance}/databases/{database}`
    pub fn database_path(&self) -> String {
        format!(
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }

    /// Replace the schema
    pub fn with_ddl(mut self, ddl: Vec<String>) -> Self {
        self.ddl = ddl;
        self
    }
}

/// Time bounds used by the bootstrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Bound on each create-instance / create-database operation
    pub operation: Duration,
    /// Bound on the emulator accepting connections after `docker run`
    pub startup: Duration,
    /// Delay between polls
    pub poll_interval: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            operation: DEFAULT_OPERATION_TIMEOUT,
            startup: DEFAULT_STARTUP_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Timeout section of the config file, in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutSettings {
    /// Operation bound in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_ms: Option<u64>,
    /// Startup bound in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup_ms: Option<u64>,
    /// Poll interval in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
}

impl TimeoutSettings {
    /// Apply the configured values over the defaults
    pub fn resolve(&self) -> Timeouts {
        let defaults = Timeouts::default();
        Timeouts {
            operation: self
                .operation_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.operation),
            startup: self
                .startup_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.startup),
            poll_interval: self
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
        }
    }
}

/// Database section of the config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Project, instance, database and inline DDL
    #[serde(flatten)]
    pub database: DatabaseConfig,
    /// Schema file, split with [`crate::parse_ddl`]; appended after inline DDL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_file: Option<PathBuf>,
}

/// Root of the YAML config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Emulator container and endpoints
    pub emulator: EmulatorConfig,
    /// Target database
    pub database: DatabaseSettings,
    /// Time bounds
    pub timeouts: TimeoutSettings,
}

impl HarnessConfig {
    /// Read and validate a config file.
    ///
    /// A relative `schema_file` is resolved against the config file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&text)?;

        if let Some(schema) = &config.database.schema_file {
            if schema.is_relative() {
                if let Some(dir) = path.parent() {
                    config.database.schema_file = Some(dir.join(schema));
                }
            }
        }
        Ok(config)
    }

    /// Parse and validate YAML text
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.emulator.validate()?;
        Ok(config)
    }

    /// The database config with the schema file (if any) loaded
    pub fn database_config(&self) -> Result<DatabaseConfig> {
        let mut database = self.database.database.clone();
        if let Some(schema) = &self.database.schema_file {
            database.ddl.extend(load_ddl_file(schema)?);
        }
        Ok(database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.emulator.grpc_host, "localhost:9010");
        assert_eq!(config.emulator.rest_host, "localhost:9020");
        assert_eq!(config.emulator.container_name, "spanner-emulator");
        assert_eq!(config.timeouts.resolve(), Timeouts::default());
        assert_eq!(Timeouts::default().operation, Duration::from_secs(2));
    }

    #[test]
    fn test_database_paths() {
        let db = DatabaseConfig {
            database: "testdb".to_string(),
            ..Default::default()
        };
        assert_eq!(db.project_path(), "projects/test-project");
        assert_eq!(db.instance_path(), "projects/test-project/instances/test-instance");
        assert_eq!(
            db.database_path(),
            "projects/test-project/instances/test-instance/databases/testdb"
        );
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
emulator:
  rest_host: localhost:19020
database:
  database: testdb
  ddl:
    - CREATE TABLE t (id INT64) PRIMARY KEY (id)
timeouts:
  operation_ms: 5000
"#;
        let config = HarnessConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.emulator.grpc_host, DEFAULT_GRPC_HOST);
        assert_eq!(config.emulator.rest_host, "localhost:19020");
        assert_eq!(config.database.database.project, DEFAULT_PROJECT);
        assert_eq!(config.database.database.database, "testdb");
        assert_eq!(config.database.database.ddl.len(), 1);

        let timeouts = config.timeouts.resolve();
        assert_eq!(timeouts.operation, Duration::from_millis(5000));
        assert_eq!(timeouts.startup, DEFAULT_STARTUP_TIMEOUT);
    }

    #[test]
    fn test_malformed_endpoint_is_rejected() {
        let yaml = "emulator:\n  grpc_host: localhost\n";
        let err = HarnessConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, Error::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_schema_file_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut schema = std::fs::File::create(dir.path().join("schema.sql")).unwrap();
        writeln!(schema, "CREATE TABLE a (id INT64) PRIMARY KEY (id);").unwrap();
        writeln!(schema, "CREATE INDEX idx_a ON a(id);").unwrap();

        let config_path = dir.path().join("harness.yaml");
        std::fs::write(
            &config_path,
            "database:\n  ddl:\n    - CREATE TABLE z (id INT64) PRIMARY KEY (id)\n  schema_file: schema.sql\n",
        )
        .unwrap();

        let config = HarnessConfig::from_file(&config_path).unwrap();
        let database = config.database_config().unwrap();

        assert_eq!(database.ddl.len(), 3);
        assert!(database.ddl[0].starts_with("CREATE TABLE z"));
        assert_eq!(database.ddl[2], "CREATE INDEX idx_a ON a(id)");
    }
}
