//! SQL type name registry.

use std::collections::{BTreeMap, HashMap};

use crate::catalog::DbType;

/// Precision used when a sized lookup is made without one.
pub const DEFAULT_PRECISION: u8 = 19;

/// Scale used when a sized lookup is made without one.
pub const DEFAULT_SCALE: u8 = 5;

/// Maps logical types to SQL type names.
///
/// Each type has an optional default name and any number of capacity-bound
/// names. A sized lookup picks the smallest registered capacity that can hold
/// the requested length, falling back to the default. Templates may contain
/// `$l`, `$p` and `$s`, replaced by length, precision and scale.
#[derive(Debug, Clone, Default)]
pub struct TypeNames {
    defaults: HashMap<DbType, String>,
    sized: HashMap<DbType, BTreeMap<u32, String>>,
}

impl TypeNames {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the default name for a type.
    pub fn put(&mut self, db_type: DbType, template: impl Into<String>) -> &mut Self {
        self.defaults.insert(db_type, template.into());
        self
    }

    /// Register a name used for lengths up to `capacity`.
    pub fn put_sized(
        &mut self,
        db_type: DbType,
        capacity: u32,
        template: impl Into<String>,
    ) -> &mut Self {
        self.sized
            .entry(db_type)
            .or_default()
            .insert(capacity, template.into());
        self
    }

    /// Remove every registration for a type.
    pub fn clear(&mut self, db_type: DbType) -> &mut Self {
        self.defaults.remove(&db_type);
        self.sized.remove(&db_type);
        self
    }

    /// Look up the default name for a type.
    pub fn get(&self, db_type: DbType) -> Option<&str> {
        self.defaults.get(&db_type).map(String::as_str)
    }

    /// Look up the name for a type holding `length`, substituting placeholders.
    pub fn get_sized(&self, db_type: DbType, length: u32, precision: u8, scale: u8) -> Option<String> {
        let template = self
            .sized
            .get(&db_type)
            .and_then(|by_capacity| by_capacity.range(length..).next())
            .map(|(_, template)| template.as_str())
            .or_else(|| self.get(db_type))?;
        Some(substitute(template, length, precision, scale))
    }

    /// Check if any name is registered for a type.
    pub fn contains(&self, db_type: DbType) -> bool {
        self.defaults.contains_key(&db_type) || self.sized.contains_key(&db_type)
    }
}

fn substitute(template: &str, length: u32, precision: u8, scale: u8) -> String {
    template
        .replace("$l", &length.to_string())
        .replace("$p", &precision.to_string())
        .replace("$s", &scale.to_string())
}
