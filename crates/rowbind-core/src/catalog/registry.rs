//! Table metadata lookup.

use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::table::Table;

/// Source of table metadata for renderers and materializers.
///
/// Implementations must be safe for concurrent lookup. The core treats them as
/// read-mostly and never mutates what they return.
pub trait MetadataProvider: Send + Sync {
    /// Find a table by name, ignoring case.
    fn find_table(&self, name: &str) -> Option<Arc<Table>>;

    /// Find the table a Rust type is mapped to.
    fn find_table_for(&self, type_id: TypeId) -> Option<Arc<Table>>;
}

/// In-memory metadata provider.
///
/// Tables are registered once, usually at startup, and then looked up
/// concurrently from any thread.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    by_name: DashMap<String, Arc<Table>>,
    by_type: DashMap<TypeId, Arc<Table>>,
}

impl MetadataRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table under its name.
    pub fn register(&self, table: Table) -> Arc<Table> {
        let table = Arc::new(table);
        let key = table.name.name.to_ascii_lowercase();
        debug!(table = %table.name.name, "Registered table metadata");
        self.by_name.insert(key, Arc::clone(&table));
        table
    }

    /// Register a table and map a Rust type to it.
    pub fn register_for<T: 'static>(&self, table: Table) -> Arc<Table> {
        let table = self.register(table);
        self.by_type.insert(TypeId::of::<T>(), Arc::clone(&table));
        table
    }

    /// Number of registered tables.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Check if no tables are registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl MetadataProvider for MetadataRegistry {
    fn find_table(&self, name: &str) -> Option<Arc<Table>> {
        self.by_name
            .get(&name.to_ascii_lowercase())
            .map(|entry| Arc::clone(entry.value()))
    }

    fn find_table_for(&self, type_id: TypeId) -> Option<Arc<Table>> {
        self.by_type
            .get(&type_id)
            .map(|entry| Arc::clone(entry.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, DbType};

    struct Account;

    #[test]
    fn test_register_and_find() {
        let registry = MetadataRegistry::new();
        let table = Table::builder("Accounts")
            .column(Column::new("id", DbType::Int64))
            .build()
            .unwrap();
        registry.register_for::<Account>(table);

        assert_eq!(registry.len(), 1);
        assert!(registry.find_table("accounts").is_some());
        assert!(registry.find_table("ACCOUNTS").is_some());
        assert!(registry.find_table_for(TypeId::of::<Account>()).is_some());
        assert!(registry.find_table_for(TypeId::of::<String>()).is_none());
    }
}
