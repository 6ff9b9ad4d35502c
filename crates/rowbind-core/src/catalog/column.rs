//! Column definitions.

use rowbind_proto::Value;

use super::types::DbType;

/// How a column is bound to the mapped type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Settable property.
    Property,
    /// Plain field.
    Field,
    /// Constructor parameter.
    ConstructorParameter,
}

/// Binding of a column to a member of the mapped type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberBinding {
    /// Member kind.
    pub kind: MemberKind,
    /// Member name on the mapped type.
    pub name: String,
}

impl MemberBinding {
    /// Bind to a property.
    pub fn property(name: impl Into<String>) -> Self {
        Self {
            kind: MemberKind::Property,
            name: name.into(),
        }
    }

    /// Bind to a field.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            kind: MemberKind::Field,
            name: name.into(),
        }
    }

    /// Bind to a constructor parameter.
    pub fn constructor_parameter(name: impl Into<String>) -> Self {
        Self {
            kind: MemberKind::ConstructorParameter,
            name: name.into(),
        }
    }
}

/// Default value for a column.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// A literal value.
    Value(Value),
    /// A raw SQL expression such as `current_timestamp`.
    Expression(String),
}

/// A column of a mapped table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name; compared case-insensitively.
    pub name: String,
    /// Declared logical type.
    pub db_type: DbType,
    /// Declared length for string and binary types.
    pub length: Option<u32>,
    /// Declared precision for decimal types.
    pub precision: Option<u8>,
    /// Declared scale for decimal types.
    pub scale: Option<u8>,
    /// Whether the column accepts null.
    pub nullable: bool,
    /// Whether the column carries a single-column unique constraint.
    pub unique: bool,
    /// Default value.
    pub default: Option<DefaultValue>,
    /// Check constraint expression.
    pub check: Option<String>,
    /// Member of the mapped type this column binds to.
    pub member: Option<MemberBinding>,
}

impl Column {
    /// Create a new non-nullable column.
    pub fn new(name: impl Into<String>, db_type: DbType) -> Self {
        Self {
            name: name.into(),
            db_type,
            length: None,
            precision: None,
            scale: None,
            nullable: false,
            unique: false,
            default: None,
            check: None,
            member: None,
        }
    }

    /// Create a nullable column.
    pub fn nullable(name: impl Into<String>, db_type: DbType) -> Self {
        Self {
            nullable: true,
            ..Self::new(name, db_type)
        }
    }

    /// Create an identity column.
    pub fn identity(name: impl Into<String>) -> Self {
        Self::new(name, DbType::Identity)
    }

    /// Set the declared length.
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Set the declared precision and scale.
    pub fn with_precision(mut self, precision: u8, scale: u8) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    /// Mark as unique.
    pub fn with_unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set the default value.
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Set a check constraint.
    pub fn with_check(mut self, check: impl Into<String>) -> Self {
        self.check = Some(check.into());
        self
    }

    /// Bind to a member of the mapped type.
    pub fn with_member(mut self, member: MemberBinding) -> Self {
        self.member = Some(member);
        self
    }

    /// Check if this is the identity column.
    pub fn is_identity(&self) -> bool {
        self.db_type == DbType::Identity
    }

    /// Check if this column has the given name, ignoring case.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Member name this column binds to, falling back to the column name.
    pub fn member_name(&self) -> &str {
        self.member
            .as_ref()
            .map(|m| m.name.as_str())
            .unwrap_or(&self.name)
    }
}
