//! Criteria rendering.
//!
//! Expression trees from `rowbind_proto` are rendered here against a
//! [`Dialect`](crate::dialect::Dialect) and optional table metadata. The
//! renderer is an exhaustive `match` over [`Expr`](rowbind_proto::Expr);
//! [`Criteria`] accumulates conditions, order terms and projections and
//! assembles complete SELECT and COUNT statements.

mod builder;
mod params;
mod renderer;

pub use builder::{build_count, build_select, render_criteria, Criteria, RenderedQuery};
pub use params::{ParameterSet, PARAMETER_PREFIX};
pub use renderer::RenderContext;
