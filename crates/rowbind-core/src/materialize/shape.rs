//! Result set shapes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rowbind_proto::ValueKind;

use super::cursor::RowCursor;
use crate::error::Result;

/// Ordered column names of a result set, with driver-reported kinds when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowShape {
    names: Vec<String>,
    kinds: Vec<Option<ValueKind>>,
}

impl RowShape {
    /// Create a shape from column names with unknown kinds.
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        Self {
            kinds: vec![None; names.len()],
            names,
        }
    }

    /// Capture the shape of a cursor.
    pub fn from_cursor(cursor: &dyn RowCursor) -> Result<Self> {
        let count = cursor.field_count();
        let mut names = Vec::with_capacity(count);
        let mut kinds = Vec::with_capacity(count);
        for ordinal in 0..count {
            names.push(cursor.name(ordinal)?.to_string());
            kinds.push(cursor.field_kind(ordinal));
        }
        Ok(Self { names, kinds })
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if the shape has no columns.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column names in ordinal order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Column name at an ordinal.
    pub fn name(&self, ordinal: usize) -> Option<&str> {
        self.names.get(ordinal).map(String::as_str)
    }

    /// Reported kind at an ordinal.
    pub fn kind(&self, ordinal: usize) -> Option<ValueKind> {
        self.kinds.get(ordinal).copied().flatten()
    }

    /// Order-sensitive hash of the column count and names.
    ///
    /// Kinds are excluded: drivers may report different kinds for the same
    /// named columns across executions, and bindings depend on names only.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.names.len().hash(&mut hasher);
        for name in &self.names {
            name.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Signature the shape proposes, e.g. `(Int32 id, String name)`.
    pub fn signature(&self) -> String {
        let params = self
            .names
            .iter()
            .zip(&self.kinds)
            .map(|(name, kind)| {
                let ty = kind.map_or("Object", ValueKind::type_name);
                format!("{ty} {name}")
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("({params})")
    }
}
