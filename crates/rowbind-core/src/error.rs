//! Core error types.

use std::fmt;

use rowbind_proto::ValueKind;
use thiserror::Error;

/// Core errors.
///
/// Every failure is raised where rendering or materialization happens and is
/// returned to the caller unchanged; nothing in this crate retries.
#[derive(Debug, Error)]
pub enum Error {
    /// No constructor or member binding fits the result shape.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// Expression references a function missing from the dialect registry.
    #[error("function '{name}' is not registered in the {dialect} dialect")]
    UnsupportedFunction { name: String, dialect: String },

    /// Column value cannot be converted to the bound member type.
    #[error(transparent)]
    TypeCoercion(#[from] TypeCoercionError),

    /// Generated parameter name collided with one already registered.
    #[error("parameter '{0}' is already registered")]
    DuplicateParameter(String),

    /// The dialect has no SQL type name for a logical type.
    #[error("no type name registered for {db_type} in the {dialect} dialect")]
    UnregisteredType { db_type: String, dialect: String },

    /// Two columns share a name (case-insensitive).
    #[error("table '{table}' already has a column named '{column}'")]
    DuplicateColumn { table: String, column: String },

    /// More than one identity column was declared.
    #[error("table '{table}' declares more than one identity column")]
    MultipleIdentityColumns { table: String },

    /// A key or index names a column the table does not have.
    #[error("table '{table}' has no column named '{column}'")]
    UnknownColumn { table: String, column: String },

    /// Statement needs a primary key but the table has none.
    #[error("table '{0}' has no primary key")]
    NoPrimaryKey(String),

    /// Invalid argument passed to a builder.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Row cursor failure reported by the driver.
    #[error("cursor error: {0}")]
    Cursor(String),

    /// Value extraction error.
    #[error("value error: {0}")]
    Value(#[from] rowbind_proto::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Materialization could not bind a result shape to a target type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct MappingError {
    /// Name of the target type.
    pub type_name: String,
    /// Signature proposed by the result shape, e.g. `(Int32 id, String name)`.
    pub shape_signature: String,
    /// Constructor signatures that were tried and rejected.
    pub attempted: Vec<String>,
    /// Additional detail, such as the unbound column.
    pub detail: Option<String>,
}

impl MappingError {
    /// Create a mapping error for a type and the signature the shape proposed.
    pub fn new(type_name: impl Into<String>, shape_signature: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            shape_signature: shape_signature.into(),
            attempted: Vec::new(),
            detail: None,
        }
    }

    /// Record the constructor signatures that were tried.
    pub fn with_attempted(mut self, attempted: Vec<String>) -> Self {
        self.attempted = attempted;
        self
    }

    /// Add detail to the error.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "a parameterless constructor or one matching signature {} is required for {} materialization",
            self.shape_signature, self.type_name
        )?;
        if !self.attempted.is_empty() {
            write!(f, "; attempted: {}", self.attempted.join(", "))?;
        }
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

/// A column value could not be converted to its member's type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {value_kind} value of column '{column}' to {target} for member {type_name}.{member}")]
pub struct TypeCoercionError {
    /// Name of the target type.
    pub type_name: String,
    /// Member receiving the value.
    pub member: String,
    /// Column the value came from.
    pub column: String,
    /// Kind of the offending value.
    pub value_kind: ValueKind,
    /// Display name of the member type.
    pub target: String,
}
