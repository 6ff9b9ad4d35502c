//! Forward-only row cursors.

use rowbind_proto::{Value, ValueKind};

use crate::error::{Error, Result};

/// Sequential access to a result set.
///
/// Drivers implement this over their native reader. Columns are addressed by
/// ordinal; the materializer reads each column of the current row at most
/// once and never seeks backward.
pub trait RowCursor {
    /// Number of columns in the result.
    fn field_count(&self) -> usize;

    /// Column name at an ordinal.
    fn name(&self, ordinal: usize) -> Result<&str>;

    /// Value of a column in the current row.
    fn value(&self, ordinal: usize) -> Result<Value>;

    /// Kind the driver reports for a column, when known.
    fn field_kind(&self, _ordinal: usize) -> Option<ValueKind> {
        None
    }

    /// Advance to the next row. Returns `false` when exhausted.
    fn read(&mut self) -> Result<bool>;
}

/// Cursor over rows already held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCursor {
    names: Vec<String>,
    kinds: Vec<Option<ValueKind>>,
    rows: Vec<Vec<Value>>,
    position: Option<usize>,
}

impl MemoryCursor {
    /// Create a cursor with the given column names and no rows.
    pub fn new(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        Self {
            kinds: vec![None; names.len()],
            names,
            rows: Vec::new(),
            position: None,
        }
    }

    /// Declare the kind of every column.
    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = ValueKind>) -> Self {
        self.kinds = kinds.into_iter().map(Some).collect();
        self.kinds.resize(self.names.len(), None);
        self
    }

    /// Append a row. Rows shorter than the column list are padded with nulls.
    pub fn with_row(mut self, row: impl IntoIterator<Item = Value>) -> Self {
        let mut row: Vec<Value> = row.into_iter().collect();
        row.resize(self.names.len(), Value::Null);
        self.rows.push(row);
        self
    }

    /// Number of rows held.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Rewind before the first row.
    pub fn reset(&mut self) {
        self.position = None;
    }

    fn current(&self) -> Result<&[Value]> {
        self.position
            .and_then(|p| self.rows.get(p))
            .map(Vec::as_slice)
            .ok_or_else(|| Error::Cursor("no current row".into()))
    }
}

impl RowCursor for MemoryCursor {
    fn field_count(&self) -> usize {
        self.names.len()
    }

    fn name(&self, ordinal: usize) -> Result<&str> {
        self.names
            .get(ordinal)
            .map(String::as_str)
            .ok_or_else(|| Error::Cursor(format!("ordinal {ordinal} out of range")))
    }

    fn value(&self, ordinal: usize) -> Result<Value> {
        self.current()?
            .get(ordinal)
            .cloned()
            .ok_or_else(|| Error::Cursor(format!("ordinal {ordinal} out of range")))
    }

    fn field_kind(&self, ordinal: usize) -> Option<ValueKind> {
        self.kinds.get(ordinal).copied().flatten()
    }

    fn read(&mut self) -> Result<bool> {
        let next = self.position.map_or(0, |p| p + 1);
        if next < self.rows.len() {
            self.position = Some(next);
            Ok(true)
        } else {
            self.position = Some(self.rows.len());
            Ok(false)
        }
    }
}
