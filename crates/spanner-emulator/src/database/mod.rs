//! Data access: sessions, read-write transactions, mutations and SQL.

mod mutation;
mod row;
mod statement;
mod transaction;
mod value;

pub use mutation::{Mutation, Write};
pub use row::{Field, FieldType, FromRow, Row, ToRow};
pub use statement::Statement;
pub use transaction::ReadWriteTransaction;
pub use value::{FromValue, TypeCode, Value, COMMIT_TIMESTAMP_SENTINEL, PENDING_COMMIT_TIMESTAMP};

use crate::endpoint::ConnectionTarget;
use crate::rest::RestClient;
use crate::Result;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct Session {
    name: String,
}

/// Outcome of a committed transaction
#[derive(Debug, Clone, PartialEq)]
pub struct Committed<T> {
    /// Whatever the transaction body returned
    pub value: T,
    /// Commit timestamp reported by the store
    pub commit_timestamp: Option<DateTime<Utc>>,
}

/// Client bound to one database over one session
pub struct DatabaseClient {
    rest: RestClient,
    session: String,
}

impl DatabaseClient {
    /// Open a session on `database` (`projects/p/instances/i/databases/d`)
    pub async fn connect(target: &ConnectionTarget, database: impl Into<String>) -> Result<Self> {
        let rest = RestClient::new(target)?;
        let database = database.into();
        let session: Session = rest
            .post(&format!("{}/sessions", database), &json!({}))
            .await?;
        debug!("opened session {} on {}", session.name, database);

        Ok(Self {
            rest,
            session: session.name,
        })
    }

    /// Run `body` in a read-write transaction and commit it.
    ///
    /// If `body` fails the transaction is rolled back and the error returned.
    /// Aborted commits are not retried.
    pub async fn read_write_transaction<T, F>(&self, body: F) -> Result<Committed<T>>
    where
        T: Send,
        F: for<'t> FnOnce(&'t mut ReadWriteTransaction<'_>) -> BoxFuture<'t, Result<T>> + Send,
    {
        let mut txn = ReadWriteTransaction::begin(&self.rest, &self.session).await?;
        match body(&mut txn).await {
            Ok(value) => {
                let commit_timestamp = txn.commit().await?;
                Ok(Committed {
                    value,
                    commit_timestamp,
                })
            }
            Err(e) => {
                txn.rollback_best_effort().await;
                Err(e)
            }
        }
    }

    /// Run one DML statement in its own transaction, e.g. to seed data.
    ///
    /// Returns the number of affected rows.
    pub async fn load_dml(&self, dml: &str) -> Result<i64> {
        let statement = Statement::new(dml);
        let committed = self
            .read_write_transaction(|txn| Box::pin(async move { txn.update(&statement).await }))
            .await?;
        info!("DML affected {} rows", committed.value);
        Ok(committed.value)
    }

    /// Delete the session, ignoring failures
    pub async fn close(self) {
        if let Err(e) = self.rest.delete(&self.session).await {
            debug!("deleting session {} ignored: {}", self.session, e);
        }
    }
}
