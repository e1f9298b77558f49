//! Read-write transactions.

use super::mutation::Mutation;
use super::row::{Field, Row};
use super::statement::Statement;
use crate::rest::RestClient;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSet {
    #[serde(default)]
    metadata: Option<ResultSetMetadata>,
    #[serde(default)]
    rows: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    stats: Option<ResultSetStats>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSetMetadata {
    #[serde(default)]
    row_type: Option<StructType>,
}

#[derive(Debug, Default, Deserialize)]
struct StructType {
    #[serde(default)]
    fields: Vec<Field>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSetStats {
    #[serde(default)]
    row_count_exact: Option<Int64>,
}

/// INT64 arrives as a decimal string, but tolerate a bare number
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Int64 {
    Text(String),
    Number(i64),
}

impl Int64 {
    fn value(&self) -> Result<i64> {
        match self {
            Int64::Text(s) => s
                .parse()
                .map_err(|_| Error::decode(format!("invalid row count {:?}", s))),
            Int64::Number(n) => Ok(*n),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BeginTransactionResponse {
    pub(crate) id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommitResponse {
    #[serde(default)]
    pub(crate) commit_timestamp: Option<DateTime<Utc>>,
}

/// A transaction in progress.
///
/// Mutations are buffered locally and sent with the commit; statements run
/// immediately inside the transaction.
pub struct ReadWriteTransaction<'c> {
    rest: &'c RestClient,
    session: &'c str,
    id: String,
    seqno: i64,
    mutations: Vec<Mutation>,
}

impl<'c> ReadWriteTransaction<'c> {
    pub(crate) async fn begin(rest: &'c RestClient, session: &'c str) -> Result<Self> {
        let response: BeginTransactionResponse = rest
            .post(
                &format!("{}:beginTransaction", session),
                &json!({ "options": { "readWrite": {} } }),
            )
            .await?;
        debug!("began transaction {}", response.id);
        Ok(Self {
            rest,
            session,
            id: response.id,
            seqno: 0,
            mutations: Vec::new(),
        })
    }

    /// Queue mutations to be applied at commit
    pub fn buffer_write(&mut self, mutations: impl IntoIterator<Item = Mutation>) {
        self.mutations.extend(mutations);
    }

    /// Number of queued mutations
    pub fn buffered(&self) -> usize {
        self.mutations.len()
    }

    async fn execute_sql(&mut self, statement: &Statement) -> Result<ResultSet> {
        self.seqno += 1;
        let (params, param_types) = statement.wire_params();
        let body = json!({
            "transaction": { "id": self.id },
            "sql": statement.sql,
            "params": params,
            "paramTypes": param_types,
            "seqno": self.seqno.to_string(),
        });
        debug!("executeSql: {}", statement.sql);
        self.rest
            .post(&format!("{}:executeSql", self.session), &body)
            .await
    }

    /// Run a query and return all rows
    pub async fn query(&mut self, statement: &Statement) -> Result<Vec<Row>> {
        let result = self.execute_sql(statement).await?;
        let fields: Arc<[Field]> = result
            .metadata
            .and_then(|m| m.row_type)
            .map(|t| t.fields)
            .unwrap_or_default()
            .into();
        result
            .rows
            .into_iter()
            .map(|values| Row::new(fields.clone(), values))
            .collect()
    }

    /// Run a DML statement and return the number of affected rows
    pub async fn update(&mut self, statement: &Statement) -> Result<i64> {
        let result = self.execute_sql(statement).await?;
        match result.stats.and_then(|s| s.row_count_exact) {
            Some(count) => count.value(),
            None => Err(Error::decode("DML result carried no exact row count")),
        }
    }

    pub(crate) async fn commit(self) -> Result<Option<DateTime<Utc>>> {
        let mutations: Vec<_> = self.mutations.iter().map(Mutation::to_json).collect();
        let response: CommitResponse = self
            .rest
            .post(
                &format!("{}:commit", self.session),
                &json!({ "transactionId": self.id, "mutations": mutations }),
            )
            .await?;
        debug!(
            "committed transaction {} at {:?}",
            self.id, response.commit_timestamp
        );
        Ok(response.commit_timestamp)
    }

    /// Roll back, ignoring failures
    pub(crate) async fn rollback_best_effort(self) {
        let result: Result<serde_json::Value> = self
            .rest
            .post(
                &format!("{}:rollback", self.session),
                &json!({ "transactionId": self.id }),
            )
            .await;
        if let Err(e) = result {
            debug!("rollback of {} ignored: {}", self.id, e);
        }
    }
}
