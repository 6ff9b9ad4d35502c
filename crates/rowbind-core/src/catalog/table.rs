//! Table definitions.

use std::collections::HashSet;

use super::column::Column;
use super::constraint::{Index, PrimaryKey, UniqueKey};
use crate::error::{Error, Result};

/// A possibly quoted SQL identifier.
///
/// Names are stored without their quote characters. `quoted` records that the
/// source spelled the name quoted; [`Dialect::quote_identifier`] then quotes
/// the stored name verbatim instead of stripping quotes a second time.
///
/// [`Dialect::quote_identifier`]: crate::dialect::Dialect::quote_identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    /// Unquoted name.
    pub name: String,
    /// Whether the name was written quoted.
    pub quoted: bool,
}

const QUOTE_PAIRS: [(char, char); 3] = [('"', '"'), ('[', ']'), ('`', '`')];

impl Identifier {
    /// Parse a name, stripping one layer of `"..."`, `[...]` or `` `...` ``.
    pub fn parse(raw: &str) -> Self {
        match strip_quotes(raw) {
            Some(name) => Self { name, quoted: true },
            None => Self {
                name: raw.to_string(),
                quoted: false,
            },
        }
    }

    /// Create an unquoted identifier.
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quoted: false,
        }
    }
}

/// Strip one layer of quoting, undoubling escaped close quotes.
///
/// Returns `None` when the text is not quoted.
pub fn strip_quotes(raw: &str) -> Option<String> {
    let mut chars = raw.chars();
    let first = chars.next()?;
    let last = chars.next_back()?;
    QUOTE_PAIRS
        .iter()
        .find(|(open, close)| *open == first && *close == last)
        .map(|(_, close)| {
            let inner = &raw[first.len_utf8()..raw.len() - last.len_utf8()];
            let doubled = format!("{close}{close}");
            inner.replace(&doubled, &close.to_string())
        })
}

/// A mapped table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Table name.
    pub name: Identifier,
    /// Owning schema.
    pub schema: Option<Identifier>,
    /// Owning catalog.
    pub catalog: Option<Identifier>,
    /// Columns in declaration order.
    pub columns: Vec<Column>,
    /// Primary key.
    pub primary_key: Option<PrimaryKey>,
    /// Unique keys.
    pub unique_keys: Vec<UniqueKey>,
    /// Secondary indexes.
    pub indexes: Vec<Index>,
}

impl Table {
    /// Start building a table.
    pub fn builder(name: &str) -> TableBuilder {
        TableBuilder::new(name)
    }

    /// Get a column by name, ignoring case.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_named(name))
    }

    /// Get the identity column, if any.
    pub fn identity_column(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.is_identity())
    }

    /// Check if a column is part of the primary key.
    pub fn is_key_column(&self, name: &str) -> bool {
        self.primary_key.as_ref().is_some_and(|pk| pk.contains(name))
    }

    /// Columns listed by INSERT statements; the identity column is excluded.
    pub fn insert_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.is_identity())
    }

    /// Columns assigned by UPDATE statements; identity and key columns are excluded.
    pub fn update_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(move |c| !c.is_identity() && !self.is_key_column(&c.name))
    }

    /// Primary key columns in key order.
    pub fn key_columns(&self) -> Vec<&Column> {
        self.primary_key
            .iter()
            .flat_map(|pk| pk.columns.iter())
            .filter_map(|name| self.column(name))
            .collect()
    }
}

/// Builder that validates table invariants.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    table: Table,
}

impl TableBuilder {
    /// Create a builder for a table name, which may be quoted.
    pub fn new(name: &str) -> Self {
        Self {
            table: Table {
                name: Identifier::parse(name),
                schema: None,
                catalog: None,
                columns: Vec::new(),
                primary_key: None,
                unique_keys: Vec::new(),
                indexes: Vec::new(),
            },
        }
    }

    /// Set the schema.
    pub fn schema(mut self, schema: &str) -> Self {
        self.table.schema = Some(Identifier::parse(schema));
        self
    }

    /// Set the catalog.
    pub fn catalog(mut self, catalog: &str) -> Self {
        self.table.catalog = Some(Identifier::parse(catalog));
        self
    }

    /// Add a column.
    pub fn column(mut self, column: Column) -> Self {
        self.table.columns.push(column);
        self
    }

    /// Add multiple columns.
    pub fn columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.table.columns.extend(columns);
        self
    }

    /// Set the primary key.
    pub fn primary_key(mut self, key: PrimaryKey) -> Self {
        self.table.primary_key = Some(key);
        self
    }

    /// Add a unique key.
    pub fn unique_key(mut self, key: UniqueKey) -> Self {
        self.table.unique_keys.push(key);
        self
    }

    /// Add an index.
    pub fn index(mut self, index: Index) -> Self {
        self.table.indexes.push(index);
        self
    }

    /// Validate and build the table.
    pub fn build(self) -> Result<Table> {
        let table = self.table;
        let table_name = table.name.name.clone();

        let mut seen = HashSet::new();
        for column in &table.columns {
            if !seen.insert(column.name.to_ascii_lowercase()) {
                return Err(Error::DuplicateColumn {
                    table: table_name,
                    column: column.name.clone(),
                });
            }
        }

        if table.columns.iter().filter(|c| c.is_identity()).count() > 1 {
            return Err(Error::MultipleIdentityColumns { table: table_name });
        }

        let referenced = table
            .primary_key
            .iter()
            .map(|pk| &pk.columns)
            .chain(table.unique_keys.iter().map(|uk| &uk.columns))
            .chain(table.indexes.iter().map(|ix| &ix.columns));
        for columns in referenced {
            if columns.is_empty() {
                return Err(Error::InvalidArgument(format!(
                    "key on table '{table_name}' has no columns"
                )));
            }
            if let Some(missing) = columns.iter().find(|name| table.column(name).is_none()) {
                return Err(Error::UnknownColumn {
                    table: table_name,
                    column: missing.clone(),
                });
            }
        }

        Ok(table)
    }
}
