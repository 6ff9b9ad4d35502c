//! SQLite dialect.

use super::{with_order_by, Dialect, DialectRegistry, SqlFunction};
use crate::catalog::{Column, DbType};
use crate::error::Result;

/// SQLite: `@` parameters, `LIMIT/OFFSET` and inline autoincrement keys.
#[derive(Debug, Clone)]
pub struct SqliteDialect {
    registry: DialectRegistry,
}

impl SqliteDialect {
    pub fn new() -> Self {
        let mut registry = DialectRegistry::ansi();
        for (ty, name) in [
            (DbType::Boolean, "integer"),
            (DbType::Byte, "integer"),
            (DbType::Int16, "integer"),
            (DbType::Int32, "integer"),
            (DbType::Int64, "integer"),
            (DbType::Single, "real"),
            (DbType::Double, "real"),
            (DbType::Decimal, "numeric"),
            (DbType::Currency, "numeric"),
            (DbType::AnsiString, "text"),
            (DbType::AnsiStringFixedLength, "text"),
            (DbType::String, "text"),
            (DbType::StringFixedLength, "text"),
            (DbType::Xml, "text"),
            (DbType::Binary, "blob"),
            (DbType::Guid, "blob"),
            (DbType::Date, "datetime"),
            (DbType::Time, "datetime"),
            (DbType::DateTime, "datetime"),
            (DbType::DateTimeOffset, "datetime"),
            (DbType::Identity, "integer"),
        ] {
            registry.types.put(ty, name);
        }

        let functions = &mut registry.functions;
        functions
            .register("substring", SqlFunction::standard("substr"))
            .register("length", SqlFunction::standard("length"))
            .register("locate", SqlFunction::template("instr(?2, ?1)"))
            .register("mod", SqlFunction::template("(?1 % ?2)"))
            .register("current_timestamp", SqlFunction::template("datetime('now')"))
            .register("current_date", SqlFunction::template("date('now')"));
        for (part, format) in [
            ("second", "%S"),
            ("minute", "%M"),
            ("hour", "%H"),
            ("day", "%d"),
            ("month", "%m"),
            ("year", "%Y"),
        ] {
            functions.register(
                part,
                SqlFunction::template(format!("cast(strftime('{format}', ?1) as integer)")),
            );
        }

        Self { registry }
    }
}

impl Default for SqliteDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn registry(&self) -> &DialectRegistry {
        &self.registry
    }

    fn parameter_prefix(&self) -> &str {
        "@"
    }

    /// SQLite column types carry no length or precision.
    fn type_name_sized(&self, db_type: DbType, _length: u32, _precision: u8, _scale: u8) -> Result<String> {
        self.type_name(db_type)
    }

    fn identity_includes_primary_key(&self) -> bool {
        true
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn identity_column_ddl(&self, _column: &Column) -> Result<String> {
        Ok(format!(
            "{} primary key autoincrement",
            self.type_name(DbType::Identity)?
        ))
    }

    fn paginate(&self, sql: &str, order_by: Option<&str>, limit: Option<u64>, offset: Option<u64>) -> String {
        let mut out = with_order_by(sql, order_by);
        match (limit, offset.filter(|o| *o > 0)) {
            (Some(limit), Some(offset)) => out.push_str(&format!(" limit {limit} offset {offset}")),
            (Some(limit), None) => out.push_str(&format!(" limit {limit}")),
            (None, Some(offset)) => out.push_str(&format!(" limit -1 offset {offset}")),
            (None, None) => {}
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_pagination() {
        let d = SqliteDialect::new();
        assert_eq!(
            d.paginate("select * from \"t\"", None, Some(10), Some(20)),
            "select * from \"t\" limit 10 offset 20"
        );
        assert_eq!(
            d.paginate("select * from \"t\"", None, None, Some(20)),
            "select * from \"t\" limit -1 offset 20"
        );
    }

    #[test]
    fn test_sqlite_types_ignore_length() {
        let d = SqliteDialect::new();
        assert_eq!(d.type_name_sized(DbType::String, 100, 0, 0).unwrap(), "text");
        assert_eq!(d.type_name_sized(DbType::Decimal, 10, 10, 2).unwrap(), "numeric");
        assert_eq!(
            d.identity_column_ddl(&Column::identity("id")).unwrap(),
            "integer primary key autoincrement"
        );
        assert!(d.identity_includes_primary_key());
    }

    #[test]
    fn test_sqlite_date_parts() {
        let d = SqliteDialect::new();
        let args = vec!["\"created\"".to_string()];
        assert_eq!(
            d.find_function("year").unwrap().render(&args).unwrap(),
            "cast(strftime('%Y', \"created\") as integer)"
        );
        assert_eq!(d.find_function("substring").unwrap().render(&args).unwrap(), "substr(\"created\")");
    }
}
