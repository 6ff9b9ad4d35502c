//! Logical column types.

use std::fmt;

use rowbind_proto::ValueKind;
use serde::{Deserialize, Serialize};

/// Logical database types a column can be declared with.
///
/// Dialects translate these into concrete SQL type names. `Identity` marks an
/// auto-generated integer key; a table has at most one such column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DbType {
    /// Non-unicode variable-length string.
    AnsiString,
    /// Non-unicode fixed-length string.
    AnsiStringFixedLength,
    /// Unicode variable-length string.
    String,
    /// Unicode fixed-length string.
    StringFixedLength,
    /// Variable-length binary data.
    Binary,
    /// Boolean.
    Boolean,
    /// Unsigned 8-bit integer.
    Byte,
    /// 16-bit integer.
    Int16,
    /// 32-bit integer.
    Int32,
    /// 64-bit integer.
    Int64,
    /// Single precision float.
    Single,
    /// Double precision float.
    Double,
    /// Fixed precision decimal.
    Decimal,
    /// Money amount.
    Currency,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Date and time.
    DateTime,
    /// Date and time with offset.
    DateTimeOffset,
    /// 128-bit unique identifier.
    Guid,
    /// XML document.
    Xml,
    /// Auto-generated integer key.
    Identity,
}

impl DbType {
    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            DbType::Byte
                | DbType::Int16
                | DbType::Int32
                | DbType::Int64
                | DbType::Single
                | DbType::Double
                | DbType::Decimal
                | DbType::Currency
                | DbType::Identity
        )
    }

    /// Check if this type is a string-like type.
    pub fn is_string_like(&self) -> bool {
        matches!(
            self,
            DbType::AnsiString
                | DbType::AnsiStringFixedLength
                | DbType::String
                | DbType::StringFixedLength
                | DbType::Xml
        )
    }

    /// Check if this type is a date or time type.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            DbType::Date | DbType::Time | DbType::DateTime | DbType::DateTimeOffset
        )
    }

    /// The value kind a driver is expected to produce for this type.
    pub fn value_kind(&self) -> ValueKind {
        match self {
            DbType::AnsiString
            | DbType::AnsiStringFixedLength
            | DbType::String
            | DbType::StringFixedLength
            | DbType::Xml => ValueKind::String,
            DbType::Binary => ValueKind::Bytes,
            DbType::Boolean => ValueKind::Bool,
            DbType::Byte => ValueKind::UInt8,
            DbType::Int16 => ValueKind::Int16,
            DbType::Int32 | DbType::Identity => ValueKind::Int32,
            DbType::Int64 => ValueKind::Int64,
            DbType::Single => ValueKind::Float32,
            DbType::Double => ValueKind::Float64,
            DbType::Decimal | DbType::Currency => ValueKind::Decimal,
            DbType::Date | DbType::Time | DbType::DateTime | DbType::DateTimeOffset => {
                ValueKind::Timestamp
            }
            DbType::Guid => ValueKind::Uuid,
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_checks() {
        assert!(DbType::Int32.is_numeric());
        assert!(DbType::Identity.is_numeric());
        assert!(!DbType::String.is_numeric());

        assert!(DbType::AnsiString.is_string_like());
        assert!(!DbType::Binary.is_string_like());
        assert!(DbType::DateTimeOffset.is_temporal());
    }

    #[test]
    fn test_value_kind() {
        assert_eq!(DbType::Identity.value_kind(), ValueKind::Int32);
        assert_eq!(DbType::Currency.value_kind(), ValueKind::Decimal);
        assert_eq!(DbType::Guid.value_kind(), ValueKind::Uuid);
    }
}
