//! Table-level statements derived from catalog metadata.

pub mod ddl;
mod dml;

pub use dml::{delete, insert, select_by_key, update, Statement};
