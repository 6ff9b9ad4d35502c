//! Loosely typed rows.

use std::collections::HashMap;
use std::sync::Arc;

use rowbind_proto::Value;

/// A row materialized as a name to value map.
///
/// Column names are shared by every row produced from the same plan. Database
/// nulls are kept as [`Value::Null`] rather than dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicRow {
    names: Arc<[String]>,
    values: Vec<Value>,
}

impl DynamicRow {
    pub(crate) fn new(names: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { names, values }
    }

    /// Get a value by column name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .and_then(|i| self.values.get(i))
    }

    /// Check if the row has a column, even when its value is null.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    /// Column names in ordinal order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Iterate over `(name, value)` pairs in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Convert into an owned map.
    pub fn into_map(self) -> HashMap<String, Value> {
        self.names.iter().cloned().zip(self.values).collect()
    }
}
