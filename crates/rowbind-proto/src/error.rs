//! Value conversion errors.

use thiserror::Error;

use crate::value::ValueKind;

/// Errors raised when extracting Rust primitives from a [`Value`](crate::Value).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The value holds a different kind than the one requested.
    #[error("expected {expected} value, got {actual}")]
    UnexpectedValue {
        expected: ValueKind,
        actual: ValueKind,
    },

    /// The value is of the right family but does not fit the requested width.
    #[error("{kind} value {value} is out of range for {target}")]
    OutOfRange {
        kind: ValueKind,
        value: String,
        target: &'static str,
    },
}
