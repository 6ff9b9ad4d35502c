//! Oracle dialect.

use super::{with_order_by, Dialect, DialectRegistry, SqlFunction};
use crate::catalog::DbType;

/// Oracle: `number` types and `rownum` subselect pagination.
///
/// Identity columns need sequences, which are not generated here; DDL renders
/// them as plain integer columns.
#[derive(Debug, Clone)]
pub struct OracleDialect {
    registry: DialectRegistry,
}

impl OracleDialect {
    pub fn new() -> Self {
        let mut registry = DialectRegistry::ansi();
        registry
            .types
            .clear(DbType::String)
            .clear(DbType::Binary)
            .put(DbType::AnsiString, "varchar2(255)")
            .put_sized(DbType::AnsiString, 4000, "varchar2($l)")
            .put(DbType::String, "nvarchar2(255)")
            .put_sized(DbType::String, 2000, "nvarchar2($l)")
            .put_sized(DbType::String, u32::MAX, "nclob")
            .put(DbType::Binary, "blob")
            .put_sized(DbType::Binary, 2000, "raw($l)")
            .put(DbType::Boolean, "number(1,0)")
            .put(DbType::Byte, "number(3,0)")
            .put(DbType::Int16, "number(5,0)")
            .put(DbType::Int32, "number(10,0)")
            .put(DbType::Int64, "number(19,0)")
            .put(DbType::Single, "float(24)")
            .put(DbType::Double, "double precision")
            .put(DbType::Decimal, "number(19,5)")
            .put_sized(DbType::Decimal, 38, "number($p,$s)")
            .put(DbType::Currency, "number(20,2)")
            .put(DbType::Date, "date")
            .put(DbType::Time, "date")
            .put(DbType::DateTime, "timestamp(4)")
            .put(DbType::Guid, "raw(16)")
            .put(DbType::Xml, "xmltype")
            .put(DbType::Identity, "number(10,0)");
        registry
            .functions
            .register("substring", SqlFunction::standard("substr"))
            .register("length", SqlFunction::standard("length"))
            .register("locate", SqlFunction::template("instr(?2, ?1)"))
            .register("bit_length", SqlFunction::template("(vsize(?1) * 8)"))
            .register("current_date", SqlFunction::no_args("sysdate", false));
        Self { registry }
    }
}

impl Default for OracleDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for OracleDialect {
    fn name(&self) -> &str {
        "oracle"
    }

    fn registry(&self) -> &DialectRegistry {
        &self.registry
    }

    fn parenthesize_not(&self) -> bool {
        true
    }

    fn supports_identity_columns(&self) -> bool {
        false
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn paginate(&self, sql: &str, order_by: Option<&str>, limit: Option<u64>, offset: Option<u64>) -> String {
        let inner = with_order_by(sql, order_by);
        match (limit, offset.filter(|o| *o > 0)) {
            (None, None) => inner,
            (Some(limit), None) => format!("select * from ({inner}) where rownum <= {limit}"),
            (Some(limit), Some(offset)) => format!(
                "select * from (select row_.*, rownum rownum_ from ({inner}) row_ where rownum <= {}) where rownum_ > {offset}",
                offset.saturating_add(limit)
            ),
            (None, Some(offset)) => format!(
                "select * from (select row_.*, rownum rownum_ from ({inner}) row_) where rownum_ > {offset}"
            ),
        }
    }

    fn bytes_literal(&self, value: &[u8]) -> String {
        format!("hextoraw('{}')", hex::encode(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_rownum_wrapping() {
        let d = OracleDialect::new();
        assert_eq!(
            d.paginate("select \"id\" from \"t\"", Some("\"id\""), Some(10), None),
            "select * from (select \"id\" from \"t\" order by \"id\") where rownum <= 10"
        );
        assert_eq!(
            d.paginate("select \"id\" from \"t\"", None, Some(10), Some(20)),
            "select * from (select row_.*, rownum rownum_ from (select \"id\" from \"t\") row_ where rownum <= 30) where rownum_ > 20"
        );
    }

    #[test]
    fn test_oracle_types() {
        let d = OracleDialect::new();
        assert_eq!(d.type_name(DbType::Int32).unwrap(), "number(10,0)");
        assert_eq!(d.type_name_sized(DbType::Decimal, 12, 12, 2).unwrap(), "number(12,2)");
        assert_eq!(d.type_name_sized(DbType::String, 3000, 0, 0).unwrap(), "nclob");
        assert!(!d.supports_identity_columns());
        assert!(d.parenthesize_not());
    }
}
