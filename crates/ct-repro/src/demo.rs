//! The two-transaction script: insert a machine, read it back, stamp it.

use crate::machine::{fixed_timestamp, Machine, TIMESTAMP_COLUMNS};
use crate::schema::MACHINES_TABLE;
use clap::ValueEnum;
use futures::FutureExt;
use spanner_emulator::database::{
    FromRow, Mutation, Statement, ToRow, Value, PENDING_COMMIT_TIMESTAMP,
};
use spanner_emulator::{DatabaseClient, Error, Result};
use tracing::{debug, info};

/// What the insert writes into the timestamp columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum InsertTimestamps {
    /// 1970-01-01T01:01:01.000000001Z
    #[default]
    Fixed,
    /// The commit-timestamp sentinel
    CommitTimestamp,
}

/// How the update asks for the commit timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum UpdateTimestamps {
    /// `PENDING_COMMIT_TIMESTAMP()` bound as a STRING parameter
    #[default]
    Parameter,
    /// `PENDING_COMMIT_TIMESTAMP()` written into the SQL text
    Inline,
}

/// Which variant of the script to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemoOptions {
    /// Insert mode of the first transaction
    pub insert: InsertTimestamps,
    /// Update mode of the second transaction
    pub update: UpdateTimestamps,
}

/// Insert mutation for `machine` under the chosen timestamp mode
pub fn insert_mutation(machine: &Machine, mode: InsertTimestamps) -> Mutation {
    let mut row = machine.to_row();
    if mode == InsertTimestamps::CommitTimestamp {
        for (column, value) in row.iter_mut() {
            if TIMESTAMP_COLUMNS.contains(column) {
                *value = Value::CommitTimestamp;
            }
        }
    }
    let (columns, values): (Vec<&str>, Vec<Value>) = row.into_iter().unzip();
    Mutation::insert(MACHINES_TABLE, &columns, values)
}

/// The lookup by primary key
pub fn select_statement(id: &str) -> Statement {
    Statement::new(format!("SELECT * FROM {} WHERE id = @id", MACHINES_TABLE)).bind("id", id)
}

/// The update of `created_on` and `ended_on` under the chosen mode
pub fn update_statement(id: &str, mode: UpdateTimestamps) -> Statement {
    match mode {
        UpdateTimestamps::Parameter => Statement::new(format!(
            "UPDATE {} SET created_on = @created_on, ended_on = @ended_on WHERE id = @id",
            MACHINES_TABLE
        ))
        .bind("id", id)
        .bind("created_on", PENDING_COMMIT_TIMESTAMP)
        .bind("ended_on", PENDING_COMMIT_TIMESTAMP),
        UpdateTimestamps::Inline => Statement::new(format!(
            "UPDATE {table} SET created_on = {ts}, ended_on = {ts} WHERE id = @id",
            table = MACHINES_TABLE,
            ts = PENDING_COMMIT_TIMESTAMP
        ))
        .bind("id", id),
    }
}

/// Run both transactions and return the machine as read back.
///
/// The read happens in the second transaction, before the update, so the
/// returned machine carries the inserted timestamps.
pub async fn run(client: &DatabaseClient, options: DemoOptions) -> Result<Machine> {
    let id = uuid::Uuid::new_v4().to_string();
    let machine = Machine::sample(&id, fixed_timestamp());
    let insert = insert_mutation(&machine, options.insert);

    let inserted = client
        .read_write_transaction(move |txn| {
            async move {
                txn.buffer_write([insert]);
                Ok(())
            }
            .boxed()
        })
        .await?;
    info!(
        "Inserted machine {} (commit timestamp {:?})",
        id, inserted.commit_timestamp
    );

    let select = select_statement(&id);
    let update = update_statement(&id, options.update);
    let updated = client
        .read_write_transaction(move |txn| {
            async move {
                let rows = txn.query(&select).await?;
                let row = rows
                    .first()
                    .ok_or_else(|| Error::RowNotFound(format!("machine {}", id)))?;
                let machine = Machine::from_row(row)?;
                println!("get machine:\n{}", machine);

                debug!("update: {}", update.sql);
                let count = txn.update(&update).await?;
                if count == 0 {
                    return Err(Error::NoRowsUpdated);
                }
                Ok(machine)
            }
            .boxed()
        })
        .await?;
    info!(
        "Updated machine {} (commit timestamp {:?})",
        updated.value.id, updated.commit_timestamp
    );

    Ok(updated.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_insert_keeps_timestamps() {
        let machine = Machine::sample("m-1", fixed_timestamp());
        let Mutation::Insert(write) = insert_mutation(&machine, InsertTimestamps::Fixed) else {
            panic!("expected an insert");
        };
        assert_eq!(write.table, "machines");
        let created = write.columns.iter().position(|c| c == "created_on").unwrap();
        assert_eq!(write.values[0][created], Value::Timestamp(fixed_timestamp()));
    }

    #[test]
    fn test_commit_timestamp_insert_replaces_every_timestamp() {
        let machine = Machine::sample("m-1", fixed_timestamp());
        let Mutation::Insert(write) = insert_mutation(&machine, InsertTimestamps::CommitTimestamp)
        else {
            panic!("expected an insert");
        };
        for (column, value) in write.columns.iter().zip(&write.values[0]) {
            if TIMESTAMP_COLUMNS.contains(&column.as_str()) {
                assert_eq!(*value, Value::CommitTimestamp);
            } else {
                assert!(matches!(value, Value::String(_)));
            }
        }
    }

    #[test]
    fn test_parameter_update_binds_function_text_as_string() {
        let statement = update_statement("m-1", UpdateTimestamps::Parameter);
        assert_eq!(
            statement.params.get("created_on"),
            Some(&Value::String("PENDING_COMMIT_TIMESTAMP()".to_string()))
        );
        assert!(statement.sql.contains("created_on = @created_on"));
    }

    #[test]
    fn test_inline_update_puts_function_in_sql() {
        let statement = update_statement("m-1", UpdateTimestamps::Inline);
        assert_eq!(
            statement.sql,
            "UPDATE machines SET created_on = PENDING_COMMIT_TIMESTAMP(), \
             ended_on = PENDING_COMMIT_TIMESTAMP() WHERE id = @id"
        );
        assert_eq!(statement.params.len(), 1);
    }

    #[test]
    fn test_select_binds_id() {
        let statement = select_statement("m-1");
        assert_eq!(statement.params.get("id"), Some(&Value::String("m-1".into())));
    }
}
