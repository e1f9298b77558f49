//! Brings the emulator up and makes sure the instance and database exist.

use crate::admin::{DatabaseAdmin, DatabaseAdminClient, InstanceAdmin, InstanceAdminClient};
use crate::config::{DatabaseConfig, Timeouts};
use crate::emulator::Emulator;
use crate::endpoint::{is_running, wait_until_running, ConnectionTarget};
use crate::operation::wait_for_operation;
use crate::rest::RestClient;
use crate::Result;
use tracing::info;

/// What [`Bootstrapper::provision`] had to create
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Provisioned {
    /// The instance was absent and got created
    pub created_instance: bool,
    /// The database was absent and got created
    pub created_database: bool,
}

/// One-shot setup of an emulator, an instance and a database.
///
/// Any administrative error other than the two "absent" signals aborts the
/// run. Nothing is rolled back: an instance created before a failed
/// database creation stays in place.
pub struct Bootstrapper {
    config: DatabaseConfig,
    emulator: Emulator,
    timeouts: Timeouts,
}

impl Bootstrapper {
    /// Create a bootstrapper with default timeouts
    pub fn new(config: DatabaseConfig, emulator: Emulator) -> Self {
        Self {
            config,
            emulator,
            timeouts: Timeouts::default(),
        }
    }

    /// Override the time bounds
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// The database this bootstrapper provisions
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Start the emulator if needed, then ensure instance and database exist.
    ///
    /// Returns the target every client should connect to.
    pub async fn run(&self) -> Result<ConnectionTarget> {
        let target = self.emulator.target()?;

        if is_running(&target.probe).await {
            info!("Emulator already running at {}", target.probe);
        } else {
            info!("Emulator not reachable at {}, starting it", target.probe);
            self.emulator.run().await?;
            for endpoint in [&target.probe, &target.rest_host] {
                wait_until_running(endpoint, self.timeouts.startup, self.timeouts.poll_interval)
                    .await?;
            }
            // A published port accepts before the gateway behind it is up
            RestClient::new(&target)?
                .wait_until_serving(
                    &format!("{}/instances", self.config.project_path()),
                    self.timeouts.startup,
                    self.timeouts.poll_interval,
                )
                .await?;
        }

        let instances = InstanceAdminClient::new(&target)?;
        let databases = DatabaseAdminClient::new(&target)?;
        self.provision(&instances, &databases).await?;

        Ok(target)
    }

    /// Create the instance and the database if they are absent
    pub async fn provision<I, D>(&self, instances: &I, databases: &D) -> Result<Provisioned>
    where
        I: InstanceAdmin + ?Sized,
        D: DatabaseAdmin + ?Sized,
    {
        let cfg = &self.config;
        let mut provisioned = Provisioned::default();

        if instances.instance_exists(&cfg.project, &cfg.instance).await? {
            info!("Instance {} exists", cfg.instance_path());
        } else {
            info!("Creating instance {}", cfg.instance_path());
            let op = instances
                .create_instance(&cfg.project, &cfg.instance)
                .await?;
            wait_for_operation(
                instances,
                op,
                "instance creation",
                self.timeouts.operation,
                self.timeouts.poll_interval,
            )
            .await?;
            provisioned.created_instance = true;
        }

        if databases
            .database_exists(&cfg.project, &cfg.instance, &cfg.database)
            .await?
        {
            info!("Database {} exists", cfg.database_path());
        } else {
            info!(
                "Creating database {} with {} schema statements",
                cfg.database_path(),
                cfg.ddl.len()
            );
            let op = databases
                .create_database(&cfg.project, &cfg.instance, &cfg.database, &cfg.ddl)
                .await?;
            wait_for_operation(
                databases,
                op,
                "database creation",
                self.timeouts.operation,
                self.timeouts.poll_interval,
            )
            .await?;
            provisioned.created_database = true;
        }

        Ok(provisioned)
    }

    /// Tear the emulator down, best effort
    pub async fn close(&self) {
        self.emulator.close().await
    }
}
