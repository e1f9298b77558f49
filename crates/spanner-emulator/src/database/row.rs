//! Result rows and struct mapping.

use super::value::{FromValue, TypeCode, Value};
use crate::{Error, Result};
use serde::Deserialize;
use std::sync::Arc;

/// Column metadata of a result set
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Field {
    /// Column name
    #[serde(default)]
    pub name: String,
    /// Column type
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
}

/// Type descriptor of a column
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FieldType {
    /// Type code
    #[serde(default)]
    pub code: TypeCode,
}

/// One row of a query result
#[derive(Debug, Clone)]
pub struct Row {
    fields: Arc<[Field]>,
    values: Vec<serde_json::Value>,
}

impl Row {
    /// Pair column metadata with one row of wire values
    pub fn new(fields: Arc<[Field]>, values: Vec<serde_json::Value>) -> Result<Self> {
        if fields.len() != values.len() {
            return Err(Error::decode(format!(
                "row has {} values for {} columns",
                values.len(),
                fields.len()
            )));
        }
        Ok(Self { fields, values })
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no columns
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Column names in result order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Decode the named column
    pub fn get<T: FromValue>(&self, column: &str) -> Result<T> {
        let index = self
            .fields
            .iter()
            .position(|f| f.name == column)
            .ok_or_else(|| Error::decode(format!("no column named {:?}", column)))?;
        T::from_value(&self.values[index], self.fields[index].field_type.code)
            .map_err(|e| match e {
                Error::Decode(message) => {
                    Error::decode(format!("column {:?}: {}", column, message))
                }
                other => other,
            })
    }
}

/// Types that can be built from a result row
pub trait FromRow: Sized {
    /// Decode the row
    fn from_row(row: &Row) -> Result<Self>;
}

/// Types that map one-to-one onto a table's columns
pub trait ToRow {
    /// `(column, value)` pairs in column order
    fn to_row(&self) -> Vec<(&'static str, Value)>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields() -> Arc<[Field]> {
        serde_json::from_value::<Vec<Field>>(json!([
            {"name": "id", "type": {"code": "STRING"}},
            {"name": "ended_on", "type": {"code": "TIMESTAMP"}},
        ]))
        .unwrap()
        .into()
    }

    #[test]
    fn test_get_by_name() {
        let row = Row::new(fields(), vec![json!("m-1"), serde_json::Value::Null]).unwrap();

        assert_eq!(row.get::<String>("id").unwrap(), "m-1");
        assert_eq!(
            row.get::<Option<chrono::DateTime<chrono::Utc>>>("ended_on")
                .unwrap(),
            None
        );
        assert_eq!(row.column_names().collect::<Vec<_>>(), vec!["id", "ended_on"]);
    }

    #[test]
    fn test_missing_column_and_bad_shape() {
        let row = Row::new(fields(), vec![json!("m-1"), json!("not a time")]).unwrap();
        assert!(row.get::<String>("zone").is_err());
        assert!(row
            .get::<Option<chrono::DateTime<chrono::Utc>>>("ended_on")
            .is_err());

        assert!(Row::new(fields(), vec![json!("m-1")]).is_err());
    }
}
