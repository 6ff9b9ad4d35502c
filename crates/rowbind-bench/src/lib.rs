//! rowbind Benchmark Suite
//!
//! Criterion benchmarks for the rowbind core.
//!
//! # Benchmark Categories
//!
//! - **Render**: Expression rendering and select assembly per dialect
//! - **Materialize**: Plan compilation, cache lookups and per-row conversion

pub mod fixtures;

pub use fixtures::{generate_users, user_cursor, users_table, Scale, User};

/// Install a tracing subscriber honoring `RUST_LOG`, once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
