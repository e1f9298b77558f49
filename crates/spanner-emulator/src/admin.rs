//! Instance and database administration.
//!
//! The bootstrapper only sees the [`InstanceAdmin`] and [`DatabaseAdmin`]
//! traits; [`InstanceAdminClient`] and [`DatabaseAdminClient`] implement
//! them against the emulator's REST gateway.

use crate::endpoint::ConnectionTarget;
use crate::operation::{Operation, Operations};
use crate::rest::RestClient;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Instance config name the emulator accepts
pub const EMULATOR_INSTANCE_CONFIG: &str = "emulator-config";
/// Display name given to created instances
pub const INSTANCE_DISPLAY_NAME: &str = "Test Instance";
/// Node count given to created instances
pub const INSTANCE_NODE_COUNT: i32 = 1;

/// Instance-level administrative calls
#[async_trait]
pub trait InstanceAdmin: Operations {
    /// Whether an instance with this id exists in the project.
    ///
    /// An empty listing is "absent"; listing errors are returned.
    async fn instance_exists(&self, project: &str, instance: &str) -> Result<bool>;

    /// Start creating an instance
    async fn create_instance(&self, project: &str, instance: &str) -> Result<Operation>;
}

/// Database-level administrative calls
#[async_trait]
pub trait DatabaseAdmin: Operations {
    /// Whether the database exists. "Not found" is `Ok(false)`.
    async fn database_exists(&self, project: &str, instance: &str, database: &str)
    -> Result<bool>;

    /// Start creating a database with `ddl` applied atomically at creation
    async fn create_database(
        &self,
        project: &str,
        instance: &str,
        database: &str,
        ddl: &[String],
    ) -> Result<Operation>;
}

/// An instance resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    /// `projects/{p}/instances/{i}`; empty in create requests
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// `projects/{p}/instanceConfigs/{c}`
    #[serde(default)]
    pub config: String,
    /// Display name
    #[serde(default)]
    pub display_name: String,
    /// Node count
    #[serde(default)]
    pub node_count: i32,
}

/// A database resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    /// `projects/{p}/instances/{i}/databases/{d}`
    #[serde(default)]
    pub name: String,
    /// Lifecycle state, e.g. `READY`
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListInstancesResponse {
    #[serde(default)]
    instances: Vec<Instance>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateInstanceRequest<'a> {
    instance_id: &'a str,
    instance: Instance,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateDatabaseRequest<'a> {
    create_statement: String,
    extra_statements: &'a [String],
}

/// REST implementation of [`InstanceAdmin`]
#[derive(Debug, Clone)]
pub struct InstanceAdminClient {
    rest: RestClient,
}

impl InstanceAdminClient {
    /// Create a client for the target emulator
    pub fn new(target: &ConnectionTarget) -> Result<Self> {
        Ok(Self {
            rest: RestClient::new(target)?,
        })
    }
}

#[async_trait]
impl Operations for InstanceAdminClient {
    async fn get_operation(&self, name: &str) -> Result<Operation> {
        self.rest.get(name, &[]).await
    }
}

#[async_trait]
impl InstanceAdmin for InstanceAdminClient {
    async fn instance_exists(&self, project: &str, instance: &str) -> Result<bool> {
        let response: ListInstancesResponse = self
            .rest
            .get(
                &format!("projects/{}/instances", project),
                &[
                    ("pageSize", "1".to_string()),
                    ("filter", format!("name:{}", instance)),
                ],
            )
            .await?;
        Ok(!response.instances.is_empty())
    }

    async fn create_instance(&self, project: &str, instance: &str) -> Result<Operation> {
        let request = CreateInstanceRequest {
            instance_id: instance,
            instance: Instance {
                name: String::new(),
                config: format!(
                    "projects/{}/instanceConfigs/{}",
                    project, EMULATOR_INSTANCE_CONFIG
                ),
                display_name: INSTANCE_DISPLAY_NAME.to_string(),
                node_count: INSTANCE_NODE_COUNT,
            },
        };
        self.rest
            .post(&format!("projects/{}/instances", project), &request)
            .await
    }
}

/// REST implementation of [`DatabaseAdmin`]
#[derive(Debug, Clone)]
pub struct DatabaseAdminClient {
    rest: RestClient,
}

impl DatabaseAdminClient {
    /// Create a client for the target emulator
    pub fn new(target: &ConnectionTarget) -> Result<Self> {
        Ok(Self {
            rest: RestClient::new(target)?,
        })
    }

    /// Fetch a database by name
    pub async fn get_database(&self, name: &str) -> Result<Database> {
        self.rest.get(name, &[]).await
    }
}

#[async_trait]
impl Operations for DatabaseAdminClient {
    async fn get_operation(&self, name: &str) -> Result<Operation> {
        self.rest.get(name, &[]).await
    }
}

#[async_trait]
impl DatabaseAdmin for DatabaseAdminClient {
    async fn database_exists(
        &self,
        project: &str,
        instance: &str,
        database: &str,
    ) -> Result<bool> {
        let name = format!(
            "projects/{}/instances/{}/databases/{}",
            project, instance, database
        );
        match self.get_database(&name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn create_database(
        &self,
        project: &str,
        instance: &str,
        database: &str,
        ddl: &[String],
    ) -> Result<Operation> {
        let request = CreateDatabaseRequest {
            create_statement: create_database_statement(database),
            extra_statements: ddl,
        };
        self.rest
            .post(
                &format!("projects/{}/instances/{}/databases", project, instance),
                &request,
            )
            .await
    }
}

/// ``CREATE DATABASE `name` ``
pub fn create_database_statement(database: &str) -> String {
    format!("CREATE DATABASE `{}`", database)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_instance_request_shape() {
        let request = CreateInstanceRequest {
            instance_id: "test-instance",
            instance: Instance {
                name: String::new(),
                config: "projects/p/instanceConfigs/emulator-config".to_string(),
                display_name: INSTANCE_DISPLAY_NAME.to_string(),
                node_count: 1,
            },
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "instanceId": "test-instance",
                "instance": {
                    "config": "projects/p/instanceConfigs/emulator-config",
                    "displayName": "Test Instance",
                    "nodeCount": 1
                }
            })
        );
    }

    #[test]
    fn test_create_database_request_shape() {
        let ddl = vec!["CREATE TABLE t (id INT64) PRIMARY KEY (id)".to_string()];
        let request = CreateDatabaseRequest {
            create_statement: create_database_statement("testdb"),
            extra_statements: &ddl,
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["createStatement"], "CREATE DATABASE `testdb`");
        assert_eq!(json["extraStatements"][0], ddl[0].as_str());
    }

    #[test]
    fn test_empty_listing_decodes() {
        let empty: ListInstancesResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.instances.is_empty());

        let one: ListInstancesResponse = serde_json::from_str(
            r#"{"instances":[{"name":"projects/p/instances/i","config":"c","displayName":"Test Instance","nodeCount":1}]}"#,
        )
        .unwrap();
        assert_eq!(one.instances[0].name, "projects/p/instances/i");
    }
}
