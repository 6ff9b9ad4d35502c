//! Table and column metadata.
//!
//! The catalog describes mapped tables: their columns, keys and the members of
//! the mapped type each column binds to. It is produced by an external
//! metadata source and consumed read-only by the renderer and the materializer.

mod column;
mod constraint;
mod registry;
mod table;
mod types;

pub use column::{Column, DefaultValue, MemberBinding, MemberKind};
pub use constraint::{Index, PrimaryKey, UniqueKey};
pub use registry::{MetadataProvider, MetadataRegistry};
pub use table::{strip_quotes, Identifier, Table, TableBuilder};
pub use types::DbType;
