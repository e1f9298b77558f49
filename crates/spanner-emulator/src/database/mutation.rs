//! Buffered row mutations.

use super::row::ToRow;
use super::value::Value;
use serde_json::json;

/// Table, column list and rows of a write mutation
#[derive(Debug, Clone, PartialEq)]
pub struct Write {
    /// Target table
    pub table: String,
    /// Column names, in the order of each row's values
    pub columns: Vec<String>,
    /// One entry per row
    pub values: Vec<Vec<Value>>,
}

/// A row-level change applied atomically at commit
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Insert; fails if the row exists
    Insert(Write),
    /// Delete rows by primary key
    Delete {
        /// Target table
        table: String,
        /// Primary keys of the rows to delete
        keys: Vec<Vec<Value>>,
    },
}

fn write_of<T: ToRow + ?Sized>(table: &str, row: &T) -> Write {
    let (columns, values): (Vec<String>, Vec<Value>) = row
        .to_row()
        .into_iter()
        .map(|(column, value)| (column.to_string(), value))
        .unzip();
    Write {
        table: table.to_string(),
        columns,
        values: vec![values],
    }
}

impl Mutation {
    /// Insert one row given as parallel column and value lists
    pub fn insert(table: impl Into<String>, columns: &[&str], values: Vec<Value>) -> Self {
        Mutation::Insert(Write {
            table: table.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values: vec![values],
        })
    }

    /// Insert every column of `row`
    pub fn insert_struct<T: ToRow + ?Sized>(table: &str, row: &T) -> Self {
        Mutation::Insert(write_of(table, row))
    }

    /// Delete a single row by primary key
    pub fn delete(table: impl Into<String>, key: Vec<Value>) -> Self {
        Mutation::Delete {
            table: table.into(),
            keys: vec![key],
        }
    }

    /// JSON form used in a commit request
    pub(crate) fn to_json(&self) -> serde_json::Value {
        let write = |w: &Write| {
            json!({
                "table": w.table,
                "columns": w.columns,
                "values": w.values
                    .iter()
                    .map(|row| row.iter().map(Value::to_json).collect::<Vec<_>>())
                    .collect::<Vec<_>>(),
            })
        };
        match self {
            Mutation::Insert(w) => json!({ "insert": write(w) }),
            Mutation::Delete { table, keys } => json!({
                "delete": {
                    "table": table,
                    "keySet": {
                        "keys": keys
                            .iter()
                            .map(|key| key.iter().map(Value::to_json).collect::<Vec<_>>())
                            .collect::<Vec<_>>(),
                    },
                },
            }),
        }
    }
}
