//! Query plan caching.
//!
//! Compiled materializers are kept per [`QueryIdentity`] in a [`PlanCache`].
//! [`RowMapper`] combines the cache with table metadata and is the usual
//! entry point for reading rows.

mod identity;
mod mapper;
mod plan_cache;

pub use identity::{CommandKind, QueryIdentity, TargetType};
pub use mapper::RowMapper;
pub use plan_cache::{CacheStats, CachedPlan, PlanCache};
