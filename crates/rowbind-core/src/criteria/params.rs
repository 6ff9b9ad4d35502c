//! Parameter collection for one render pass.

use std::collections::HashSet;

use rowbind_proto::Value;

use crate::error::{Error, Result};

/// Prefix of generated parameter names.
pub const PARAMETER_PREFIX: &str = "p_";

/// Named parameters registered while rendering, in registration order.
///
/// Generated names come from an incrementing counter and are never reused
/// within one set, even when the same value is registered twice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    entries: Vec<(String, Value)>,
    names: HashSet<String>,
    counter: usize,
}

impl ParameterSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value under the next generated name and return the name.
    pub fn register(&mut self, value: Value) -> Result<String> {
        let name = format!("{PARAMETER_PREFIX}{}", self.counter);
        self.counter += 1;
        self.register_named(name.clone(), value)?;
        Ok(name)
    }

    /// Register a value under an explicit name.
    pub fn register_named(&mut self, name: impl Into<String>, value: Value) -> Result<()> {
        let name = name.into();
        if !self.names.insert(name.clone()) {
            return Err(Error::DuplicateParameter(name));
        }
        self.entries.push((name, value));
        Ok(())
    }

    /// Get a parameter value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Iterate over parameters in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Parameter names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Number of registered parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no parameters are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume into `(name, value)` pairs.
    pub fn into_vec(self) -> Vec<(String, Value)> {
        self.entries
    }
}
