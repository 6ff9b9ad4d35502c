//! Criteria builder and statement assembly.

use std::sync::Arc;

use rowbind_proto::Expr;
use tracing::trace;

use super::params::ParameterSet;
use super::renderer::RenderContext;
use crate::catalog::Table;
use crate::dialect::{with_order_by, Dialect};
use crate::error::Result;

/// Rendered SQL text with its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQuery {
    /// SQL text.
    pub sql: String,
    /// Parameters referenced by the SQL text.
    pub params: ParameterSet,
}

/// A renderable query over one table.
///
/// Conditions are ANDed together. Without projections the select lists every
/// column of the table in declaration order.
#[derive(Debug, Clone)]
pub struct Criteria {
    table: Arc<Table>,
    conditions: Vec<Expr>,
    orders: Vec<Expr>,
    projections: Vec<Expr>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Criteria {
    /// Create criteria for a table.
    pub fn new(table: Arc<Table>) -> Self {
        Self {
            table,
            conditions: Vec::new(),
            orders: Vec::new(),
            projections: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Add a condition.
    pub fn with_condition(mut self, condition: Expr) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add an order term. Expressions that are not order terms sort ascending.
    pub fn with_order(mut self, order: Expr) -> Self {
        let order = if order.is_order() {
            order
        } else {
            Expr::Order {
                expr: Box::new(order),
                ascending: true,
            }
        };
        self.orders.push(order);
        self
    }

    /// Add a projection.
    pub fn with_projection(mut self, projection: Expr) -> Self {
        self.projections.push(projection);
        self
    }

    /// Limit the number of rows returned.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip rows before the first one returned.
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Table these criteria select from.
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// Accumulated conditions.
    pub fn conditions(&self) -> &[Expr] {
        &self.conditions
    }

    /// Render the full select, paginated when a window is set.
    pub fn to_sql(&self, dialect: &dyn Dialect) -> Result<RenderedQuery> {
        self.render_select(dialect, self.limit, self.offset)
    }

    /// Render `select count(*)` over the unordered, unpaginated select.
    pub fn to_count_sql(&self, dialect: &dyn Dialect) -> Result<RenderedQuery> {
        let mut ctx = RenderContext::new(dialect, Some(&self.table), true);
        let select = self.base_select(&mut ctx)?;
        let sql = format!("select count(*) from ({select}) t");
        trace!(dialect = dialect.name(), sql = %sql, "Rendered count");
        Ok(RenderedQuery {
            sql,
            params: ctx.into_params(),
        })
    }

    fn render_select(
        &self,
        dialect: &dyn Dialect,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<RenderedQuery> {
        let mut ctx = RenderContext::new(dialect, Some(&self.table), true);
        let select = self.base_select(&mut ctx)?;

        let order = self
            .orders
            .iter()
            .map(|o| ctx.render(o))
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        let order = (!order.is_empty()).then_some(order.as_str());

        let sql = if limit.is_some() || offset.is_some() {
            dialect.paginate(&select, order, limit, offset)
        } else {
            with_order_by(&select, order)
        };

        trace!(dialect = dialect.name(), sql = %sql, "Rendered select");
        Ok(RenderedQuery {
            sql,
            params: ctx.into_params(),
        })
    }

    /// `select <list> from <table> [where ...]`, without order or window.
    fn base_select(&self, ctx: &mut RenderContext<'_>) -> Result<String> {
        let dialect = ctx.dialect();
        let list = if self.projections.is_empty() {
            if self.table.columns.is_empty() {
                "*".to_string()
            } else {
                self.table
                    .columns
                    .iter()
                    .map(|c| dialect.quote(&c.name))
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        } else {
            self.projections
                .iter()
                .map(|p| ctx.render(p))
                .collect::<Result<Vec<_>>>()?
                .join(", ")
        };

        let mut sql = format!("select {list} from {}", dialect.qualify(&self.table));
        if !self.conditions.is_empty() {
            let conditions = self
                .conditions
                .iter()
                .map(|c| ctx.render(c))
                .collect::<Result<Vec<_>>>()?;
            sql.push_str(" where ");
            sql.push_str(&conditions.join(" and "));
        }
        Ok(sql)
    }
}

/// Render an expression tree against a dialect and optional table metadata.
pub fn render_criteria(
    expr: &Expr,
    dialect: &dyn Dialect,
    table: Option<&Table>,
    parameterized: bool,
) -> Result<RenderedQuery> {
    let mut ctx = RenderContext::new(dialect, table, parameterized);
    let sql = ctx.render(expr)?;
    trace!(dialect = dialect.name(), sql = %sql, "Rendered criteria");
    Ok(RenderedQuery {
        sql,
        params: ctx.into_params(),
    })
}

/// Render a select, overriding the criteria's window with `page_size`/`offset`.
pub fn build_select(
    criteria: &Criteria,
    dialect: &dyn Dialect,
    page_size: Option<u64>,
    offset: Option<u64>,
) -> Result<RenderedQuery> {
    criteria.render_select(
        dialect,
        page_size.or(criteria.limit),
        offset.or(criteria.offset),
    )
}

/// Render the count statement for criteria.
pub fn build_count(criteria: &Criteria, dialect: &dyn Dialect) -> Result<RenderedQuery> {
    criteria.to_count_sql(dialect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, DbType};
    use crate::dialect::{AnsiDialect, SqlServerDialect, SqliteDialect};
    use rowbind_proto::expr::{asc, count_all, desc, eq, gt};
    use rowbind_proto::Value;

    fn orders() -> Arc<Table> {
        Arc::new(
            Table::builder("orders")
                .schema("sales")
                .column(Column::identity("id"))
                .column(Column::new("customer", DbType::String))
                .column(Column::new("total", DbType::Decimal))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_full_projection_and_where() {
        let criteria = Criteria::new(orders())
            .with_condition(eq("customer", "acme"))
            .with_condition(gt("total", 10))
            .with_order(desc("total"));
        let query = criteria.to_sql(&AnsiDialect::new()).unwrap();
        assert_eq!(
            query.sql,
            "select \"id\", \"customer\", \"total\" from \"sales\".\"orders\" \
             where \"customer\" = :p_0 and \"total\" > :p_1 order by \"total\" desc"
        );
        assert_eq!(query.params.get("p_1"), Some(&Value::Int32(10)));
    }

    #[test]
    fn test_every_render_starts_at_p0() {
        let criteria = Criteria::new(orders()).with_condition(eq("customer", "acme"));
        let dialect = SqliteDialect::new();
        let first = criteria.to_sql(&dialect).unwrap();
        let second = criteria.to_sql(&dialect).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.params.names(), vec!["p_0"]);
    }

    #[test]
    fn test_paginated_select_delegates_to_dialect() {
        let criteria = Criteria::new(orders())
            .with_order(Expr::field("id"))
            .with_limit(10)
            .with_offset(20);
        let query = criteria.to_sql(&SqlServerDialect::new()).unwrap();
        assert_eq!(
            query.sql,
            "select [id], [customer], [total] from [sales].[orders] \
             order by [id] asc offset 20 rows fetch next 10 rows only"
        );

        let query = build_select(&criteria, &SqlServerDialect::new(), Some(5), Some(0)).unwrap();
        assert_eq!(
            query.sql,
            "select top 5 [id], [customer], [total] from [sales].[orders] order by [id] asc"
        );
    }

    #[test]
    fn test_count_drops_order_and_window() {
        let criteria = Criteria::new(orders())
            .with_condition(eq("customer", "acme"))
            .with_order(asc("id"))
            .with_limit(10);
        let query = build_count(&criteria, &AnsiDialect::new()).unwrap();
        assert_eq!(
            query.sql,
            "select count(*) from (select \"id\", \"customer\", \"total\" \
             from \"sales\".\"orders\" where \"customer\" = :p_0) t"
        );
        assert_eq!(query.params.len(), 1);
    }

    #[test]
    fn test_projections() {
        let criteria = Criteria::new(orders())
            .with_projection(count_all().alias("n"))
            .with_projection(Expr::field("customer").select());
        let query = criteria.to_sql(&AnsiDialect::new()).unwrap();
        assert_eq!(
            query.sql,
            "select count(*) as \"n\", \"customer\" from \"sales\".\"orders\""
        );
    }

    #[test]
    fn test_render_criteria_without_table() {
        let query = render_criteria(&eq("age", 30), &AnsiDialect::new(), None, true).unwrap();
        assert_eq!(query.sql, "age = :p_0");
    }
}
