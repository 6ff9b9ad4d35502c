//! Microsoft SQL Server dialect.

use super::{with_order_by, Dialect, DialectRegistry, SqlFunction};
use crate::catalog::{Column, DbType};
use crate::error::Result;

/// Largest lengths served by sized types before falling over to `(max)`.
const MAX_NVARCHAR: u32 = 4000;
const MAX_VARCHAR: u32 = 8000;

/// SQL Server: bracket quoting, `@` parameters, `TOP` and `OFFSET FETCH`.
#[derive(Debug, Clone)]
pub struct SqlServerDialect {
    registry: DialectRegistry,
}

impl SqlServerDialect {
    pub fn new() -> Self {
        let mut registry = DialectRegistry::ansi();
        registry
            .types
            .put(DbType::String, "nvarchar(255)")
            .put_sized(DbType::String, MAX_NVARCHAR, "nvarchar($l)")
            .put_sized(DbType::String, u32::MAX, "nvarchar(max)")
            .put(DbType::AnsiString, "varchar(255)")
            .put_sized(DbType::AnsiString, MAX_VARCHAR, "varchar($l)")
            .put_sized(DbType::AnsiString, u32::MAX, "varchar(max)")
            .put(DbType::Binary, "varbinary(max)")
            .put_sized(DbType::Binary, MAX_VARCHAR, "varbinary($l)")
            .put(DbType::Boolean, "bit")
            .put(DbType::Byte, "tinyint")
            .put(DbType::Int32, "int")
            .put(DbType::Single, "real")
            .put(DbType::Double, "float")
            .put(DbType::Currency, "money")
            .put(DbType::DateTime, "datetime2")
            .put(DbType::DateTimeOffset, "datetimeoffset")
            .put(DbType::Guid, "uniqueidentifier")
            .put(DbType::Xml, "xml")
            .put(DbType::Identity, "int");

        let functions = &mut registry.functions;
        functions
            .register("length", SqlFunction::standard("len"))
            .register("locate", SqlFunction::template("charindex(?1, ?2)"))
            .register("mod", SqlFunction::template("(?1 % ?2)"))
            .register("concat", SqlFunction::var_args("(", " + ", ")"))
            .register("bit_length", SqlFunction::template("(datalength(?1) * 8)"))
            .register("current_timestamp", SqlFunction::no_args("getdate", true))
            .register("current_date", SqlFunction::template("cast(getdate() as date)"))
            .register("trim", SqlFunction::template("ltrim(rtrim(?1))"));
        for part in ["second", "minute", "hour", "day", "month", "year"] {
            functions.register(part, SqlFunction::template(format!("datepart({part}, ?1)")));
        }

        Self { registry }
    }
}

impl Default for SqlServerDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for SqlServerDialect {
    fn name(&self) -> &str {
        "sqlserver"
    }

    fn registry(&self) -> &DialectRegistry {
        &self.registry
    }

    fn open_quote(&self) -> char {
        '['
    }

    fn close_quote(&self) -> char {
        ']'
    }

    fn parameter_prefix(&self) -> &str {
        "@"
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn identity_column_ddl(&self, column: &Column) -> Result<String> {
        let base = if column.precision.is_some_and(|p| p > 9) {
            "bigint".to_string()
        } else {
            self.type_name(DbType::Identity)?
        };
        Ok(format!("{base} identity(1,1)"))
    }

    fn paginate(&self, sql: &str, order_by: Option<&str>, limit: Option<u64>, offset: Option<u64>) -> String {
        match offset.filter(|o| *o > 0) {
            None => {
                let sql = match limit {
                    Some(limit) => insert_top(sql, limit),
                    None => sql.to_string(),
                };
                with_order_by(&sql, order_by)
            }
            Some(offset) => {
                // OFFSET requires an ORDER BY clause.
                let order = order_by.filter(|o| !o.is_empty()).unwrap_or("(select null)");
                let mut out = format!("{sql} order by {order} offset {offset} rows");
                if let Some(limit) = limit {
                    out.push_str(&format!(" fetch next {limit} rows only"));
                }
                out
            }
        }
    }

    fn bytes_literal(&self, value: &[u8]) -> String {
        format!("0x{}", hex::encode(value))
    }
}

/// Insert `top n` after the leading `select` (and `distinct`).
fn insert_top(sql: &str, limit: u64) -> String {
    let lower = sql.to_ascii_lowercase();
    let head = ["select distinct ", "select "]
        .into_iter()
        .find(|prefix| lower.starts_with(prefix))
        .map(str::len);
    match head {
        Some(at) => format!("{}top {limit} {}", &sql[..at], &sql[at..]),
        None => sql.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlserver_top_without_offset() {
        let d = SqlServerDialect::new();
        assert_eq!(
            d.paginate("select [id] from [t]", Some("[id]"), Some(10), None),
            "select top 10 [id] from [t] order by [id]"
        );
        assert_eq!(
            d.paginate("SELECT DISTINCT [id] from [t]", None, Some(3), Some(0)),
            "SELECT DISTINCT top 3 [id] from [t]"
        );
    }

    #[test]
    fn test_sqlserver_offset_fetch() {
        let d = SqlServerDialect::new();
        assert_eq!(
            d.paginate("select [id] from [t]", Some("[id] desc"), Some(10), Some(20)),
            "select [id] from [t] order by [id] desc offset 20 rows fetch next 10 rows only"
        );
        assert_eq!(
            d.paginate("select [id] from [t]", None, Some(10), Some(20)),
            "select [id] from [t] order by (select null) offset 20 rows fetch next 10 rows only"
        );
    }

    #[test]
    fn test_sqlserver_quoting_and_types() {
        let d = SqlServerDialect::new();
        assert_eq!(d.quote("Order Details"), "[Order Details]");
        assert_eq!(d.quote("\"Orders\""), "[Orders]");
        assert_eq!(d.quote("a]b"), "[a]]b]");
        assert_eq!(d.parameter("p_0"), "@p_0");
        assert_eq!(d.type_name_sized(DbType::String, 50, 0, 0).unwrap(), "nvarchar(50)");
        assert_eq!(d.type_name_sized(DbType::String, 5000, 0, 0).unwrap(), "nvarchar(max)");
        assert_eq!(
            d.identity_column_ddl(&Column::identity("id")).unwrap(),
            "int identity(1,1)"
        );
    }

    #[test]
    fn test_sqlserver_functions() {
        let d = SqlServerDialect::new();
        let args = vec!["[name]".to_string()];
        assert_eq!(d.find_function("length").unwrap().render(&args).unwrap(), "len([name])");
        assert_eq!(
            d.find_function("YEAR").unwrap().render(&args).unwrap(),
            "datepart(year, [name])"
        );
        let concat = vec!["[a]".to_string(), "[b]".to_string()];
        assert_eq!(d.find_function("concat").unwrap().render(&concat).unwrap(), "([a] + [b])");
    }
}
