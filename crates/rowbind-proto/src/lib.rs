//! rowbind protocol types.
//!
//! This crate defines the runtime [`Value`] model shared by the renderer and the
//! row materializer, and the immutable [`Expr`] tree that criteria are built
//! from.
//!
//! # Modules
//!
//! - [`value`] - Runtime values for parameters and result rows
//! - [`expr`] - SQL expression tree and its builder functions
//! - [`error`] - Value conversion errors

pub mod error;
pub mod expr;
pub mod value;

pub use error::Error;

// Re-export commonly used types at crate root
pub use expr::{CompareOp, Expr, LogicalOp, MatchMode};
pub use value::{Value, ValueKind};
