//! MySQL dialect.

use super::{with_order_by, Dialect, DialectRegistry, SqlFunction};
use crate::catalog::{Column, DbType};
use crate::error::Result;

/// MySQL rejects an offset without a row count, so this stands in for "all".
const ALL_ROWS: u64 = u64::MAX;

/// MySQL: backtick quoting, positional `?` parameters and `LIMIT n, m`.
#[derive(Debug, Clone)]
pub struct MySqlDialect {
    registry: DialectRegistry,
}

impl MySqlDialect {
    pub fn new() -> Self {
        let mut registry = DialectRegistry::ansi();
        registry
            .types
            .put(DbType::String, "varchar(255)")
            .put_sized(DbType::String, 65_535, "varchar($l)")
            .put_sized(DbType::String, 16_777_215, "mediumtext")
            .put_sized(DbType::String, u32::MAX, "longtext")
            .put(DbType::Binary, "longblob")
            .put_sized(DbType::Binary, 255, "tinyblob")
            .put_sized(DbType::Binary, 65_535, "blob")
            .put(DbType::Boolean, "bit")
            .put(DbType::Byte, "tinyint unsigned")
            .put(DbType::Int32, "integer")
            .put(DbType::Single, "float")
            .put(DbType::Double, "double precision")
            .put(DbType::DateTime, "datetime")
            .put(DbType::DateTimeOffset, "datetime")
            .put(DbType::Guid, "varchar(40)")
            .put(DbType::Xml, "text")
            .put(DbType::Identity, "integer");
        registry
            .functions
            .register("length", SqlFunction::standard("length"))
            .register("locate", SqlFunction::template("locate(?1, ?2)"))
            .register("concat", SqlFunction::standard("concat"))
            .register("current_timestamp", SqlFunction::no_args("now", true));
        Self { registry }
    }
}

impl Default for MySqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &str {
        "mysql"
    }

    fn registry(&self) -> &DialectRegistry {
        &self.registry
    }

    fn open_quote(&self) -> char {
        '`'
    }

    fn close_quote(&self) -> char {
        '`'
    }

    fn parameter_prefix(&self) -> &str {
        "?"
    }

    fn parenthesize_not(&self) -> bool {
        true
    }

    fn identity_column_ddl(&self, column: &Column) -> Result<String> {
        let base = if column.precision.is_some_and(|p| p > 9) {
            self.type_name(DbType::Int64)?
        } else {
            self.type_name(DbType::Identity)?
        };
        Ok(format!("{base} not null auto_increment"))
    }

    fn paginate(&self, sql: &str, order_by: Option<&str>, limit: Option<u64>, offset: Option<u64>) -> String {
        let mut out = with_order_by(sql, order_by);
        match (limit, offset.filter(|o| *o > 0)) {
            (Some(limit), Some(offset)) => out.push_str(&format!(" limit {offset}, {limit}")),
            (Some(limit), None) => out.push_str(&format!(" limit {limit}")),
            (None, Some(offset)) => out.push_str(&format!(" limit {offset}, {ALL_ROWS}")),
            (None, None) => {}
        }
        out
    }

    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_limit_forms() {
        let d = MySqlDialect::new();
        assert_eq!(
            d.paginate("select * from `t`", Some("`id`"), Some(10), Some(20)),
            "select * from `t` order by `id` limit 20, 10"
        );
        assert_eq!(d.paginate("select * from `t`", None, Some(10), None), "select * from `t` limit 10");
        assert_eq!(
            d.paginate("select * from `t`", None, None, Some(7)),
            "select * from `t` limit 7, 18446744073709551615"
        );
    }

    #[test]
    fn test_mysql_quoting() {
        let d = MySqlDialect::new();
        assert_eq!(d.quote("order"), "`order`");
        assert_eq!(d.quote("[order]"), "`order`");
        assert_eq!(d.quote("a`b"), "`a``b`");
        assert_eq!(d.parameter("p_2"), "?p_2");
        assert!(d.parenthesize_not());
        assert_eq!(d.string_literal("c:\\tmp"), "'c:\\\\tmp'");
    }

    #[test]
    fn test_mysql_identity() {
        let d = MySqlDialect::new();
        assert_eq!(
            d.identity_column_ddl(&Column::identity("id")).unwrap(),
            "integer not null auto_increment"
        );
    }
}
