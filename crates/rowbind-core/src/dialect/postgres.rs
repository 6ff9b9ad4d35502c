//! PostgreSQL dialect.

use super::{with_order_by, Dialect, DialectRegistry, SqlFunction};
use crate::catalog::{Column, DbType};
use crate::error::Result;

/// PostgreSQL: native `ilike`, `LIMIT/OFFSET` and `serial` identities.
#[derive(Debug, Clone)]
pub struct PostgresDialect {
    registry: DialectRegistry,
}

impl PostgresDialect {
    pub fn new() -> Self {
        let mut registry = DialectRegistry::ansi();
        registry
            .types
            .put(DbType::Binary, "bytea")
            .put(DbType::Byte, "smallint")
            .put(DbType::Double, "float8")
            .put(DbType::Single, "float4")
            .put(DbType::Guid, "uuid")
            .put(DbType::Xml, "xml")
            .put(DbType::Currency, "money")
            .put(DbType::DateTimeOffset, "timestamptz")
            .put(DbType::Identity, "serial");
        registry
            .functions
            .register("length", SqlFunction::standard("length"))
            .register("locate", SqlFunction::template("position(?1 in ?2)"))
            .register("current_timestamp", SqlFunction::no_args("now", true))
            .register("random", SqlFunction::no_args("random", true));
        Self { registry }
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgres"
    }

    fn registry(&self) -> &DialectRegistry {
        &self.registry
    }

    fn supports_ilike(&self) -> bool {
        true
    }

    fn identity_column_ddl(&self, column: &Column) -> Result<String> {
        // Identities declared wider than nine digits need a 64-bit sequence.
        if column.precision.is_some_and(|p| p > 9) {
            return Ok("bigserial".to_string());
        }
        self.type_name(DbType::Identity)
    }

    fn paginate(&self, sql: &str, order_by: Option<&str>, limit: Option<u64>, offset: Option<u64>) -> String {
        let mut out = with_order_by(sql, order_by);
        if let Some(limit) = limit {
            out.push_str(&format!(" limit {limit}"));
        }
        if let Some(offset) = offset.filter(|o| *o > 0) {
            out.push_str(&format!(" offset {offset}"));
        }
        out
    }

    fn bytes_literal(&self, value: &[u8]) -> String {
        format!("'\\x{}'::bytea", hex::encode(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_pagination() {
        let d = PostgresDialect::new();
        assert_eq!(
            d.paginate("select * from t", Some("\"id\""), Some(10), Some(30)),
            "select * from t order by \"id\" limit 10 offset 30"
        );
        assert_eq!(
            d.paginate("select * from t", None, None, Some(5)),
            "select * from t offset 5"
        );
    }

    #[test]
    fn test_postgres_types_and_functions() {
        let d = PostgresDialect::new();
        assert_eq!(d.type_name(DbType::Guid).unwrap(), "uuid");
        assert_eq!(d.identity_column_ddl(&Column::identity("id")).unwrap(), "serial");
        assert_eq!(
            d.identity_column_ddl(&Column::identity("id").with_precision(18, 0))
                .unwrap(),
            "bigserial"
        );
        assert_eq!(
            d.find_function("current_timestamp").unwrap().render(&[]).unwrap(),
            "now()"
        );
        assert!(d.supports_ilike());
        assert_eq!(d.parameter("p_1"), ":p_1");
    }
}
