//! Parameterized SQL statements.

use super::value::Value;
use serde_json::{json, Map};
use std::collections::BTreeMap;

/// A SQL statement with named `@param` bindings
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// SQL text
    pub sql: String,
    /// Parameter values by name (without the `@`)
    pub params: BTreeMap<String, Value>,
}

impl Statement {
    /// A statement without parameters
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: BTreeMap::new(),
        }
    }

    /// Bind `@name` to `value`
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// `params` and `paramTypes` objects of an executeSql request
    pub(crate) fn wire_params(
        &self,
    ) -> (Map<String, serde_json::Value>, Map<String, serde_json::Value>) {
        let mut params = Map::new();
        let mut types = Map::new();
        for (name, value) in &self.params {
            params.insert(name.clone(), value.to_json());
            types.insert(name.clone(), json!({ "code": value.type_code() }));
        }
        (params, types)
    }
}
