//! rowbind core - SQL rendering and row materialization.
//!
//! This crate renders expression trees and criteria into dialect-specific SQL,
//! builds table-level statements from catalog metadata, and compiles cached
//! materializers that turn driver rows into Rust values.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod criteria;
pub mod dialect;
pub mod error;
pub mod materialize;
pub mod statement;

pub use cache::{CacheStats, CachedPlan, CommandKind, PlanCache, QueryIdentity, RowMapper};
pub use catalog::{
    Column, DbType, DefaultValue, Identifier, Index, MemberBinding, MemberKind, MetadataProvider,
    MetadataRegistry, PrimaryKey, Table, UniqueKey,
};
pub use config::{CacheConfig, MapperConfig};
pub use criteria::{build_count, build_select, render_criteria, Criteria, ParameterSet, RenderedQuery};
pub use dialect::{
    AnsiDialect, Dialect, MySqlDialect, OracleDialect, PostgresDialect, SqlServerDialect,
    SqliteDialect,
};
pub use error::{Error, MappingError, Result, TypeCoercionError};
pub use materialize::{
    DynamicRow, Mapped, Materializer, MemberType, MemoryCursor, ParameterBinder, RowCursor,
    RowShape, TypeInfo, Visibility,
};

/// Re-export protocol types.
pub use rowbind_proto as proto;
