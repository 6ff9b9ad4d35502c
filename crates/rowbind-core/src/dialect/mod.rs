//! SQL dialects.
//!
//! A [`Dialect`] is a strategy object holding one database family's syntax
//! rules: identifier quoting, parameter prefix, type names, function
//! templates, literal spelling and pagination. Every rule has an ANSI default on
//! the trait, so concrete dialects override only where their database
//! diverges.
//!
//! # Available dialects
//!
//! - [`AnsiDialect`]: standard SQL, also the base registry for the others
//! - [`PostgresDialect`]: native `ilike`, `LIMIT/OFFSET`, `serial` identities
//! - [`SqlServerDialect`]: bracket quoting, `@` parameters, `TOP` / `OFFSET FETCH`
//! - [`MySqlDialect`]: backtick quoting, parenthesized `not`, `LIMIT n, m`
//! - [`SqliteDialect`]: `LIMIT/OFFSET`, inline `autoincrement` keys
//! - [`OracleDialect`]: `rownum` subselect pagination

mod ansi;
mod function;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;
mod sqlserver;
mod types;

use std::fmt;

use chrono::DateTime;
use rowbind_proto::Value;

use crate::catalog::{strip_quotes, Column, DbType, Identifier, Table};
use crate::error::{Error, Result};

pub use ansi::AnsiDialect;
pub use function::{FunctionRegistry, SqlFunction};
pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;
pub use types::{TypeNames, DEFAULT_PRECISION, DEFAULT_SCALE};

/// Type names and functions registered for a dialect.
#[derive(Debug, Clone, Default)]
pub struct DialectRegistry {
    /// Logical type to SQL type name mapping.
    pub types: TypeNames,
    /// Function templates by name.
    pub functions: FunctionRegistry,
}

impl DialectRegistry {
    /// Registry pre-populated with ANSI types and functions.
    pub fn ansi() -> Self {
        let mut registry = Self::default();
        registry.register_ansi_types();
        registry.register_ansi_functions();
        registry
    }

    fn register_ansi_types(&mut self) {
        self.types
            .put(DbType::AnsiStringFixedLength, "char(255)")
            .put_sized(DbType::AnsiStringFixedLength, 255, "char($l)")
            .put(DbType::AnsiString, "varchar(255)")
            .put_sized(DbType::AnsiString, 4000, "varchar($l)")
            .put(DbType::StringFixedLength, "nchar(255)")
            .put_sized(DbType::StringFixedLength, 255, "nchar($l)")
            .put(DbType::String, "varchar(255)")
            .put_sized(DbType::String, 4000, "varchar($l)")
            .put(DbType::Binary, "blob")
            .put_sized(DbType::Binary, 8000, "varbinary($l)")
            .put(DbType::Boolean, "boolean")
            .put(DbType::Byte, "smallint")
            .put(DbType::Int16, "smallint")
            .put(DbType::Int32, "integer")
            .put(DbType::Int64, "bigint")
            .put(DbType::Single, "real")
            .put(DbType::Double, "double precision")
            .put(DbType::Decimal, "decimal(19,5)")
            .put_sized(DbType::Decimal, 38, "decimal($p,$s)")
            .put(DbType::Currency, "decimal(19,4)")
            .put(DbType::Date, "date")
            .put(DbType::Time, "time")
            .put(DbType::DateTime, "timestamp")
            .put(DbType::DateTimeOffset, "timestamp with time zone")
            .put(DbType::Guid, "char(36)")
            .put(DbType::Xml, "clob")
            .put(DbType::Identity, "integer");
    }

    fn register_ansi_functions(&mut self) {
        let f = &mut self.functions;
        for name in [
            "abs", "sqrt", "upper", "lower", "trim", "coalesce", "nullif", "mod", "substring",
        ] {
            f.register(name, SqlFunction::standard(name));
        }
        for name in ["count", "sum", "avg", "min", "max"] {
            f.register(name, SqlFunction::standard(name));
        }
        f.register("length", SqlFunction::standard("char_length"))
            .register("bit_length", SqlFunction::standard("bit_length"))
            .register("cast", SqlFunction::template("cast(?1 as ?2)"))
            .register("locate", SqlFunction::template("position(?1 in ?2)"))
            .register("concat", SqlFunction::var_args("(", " || ", ")"))
            .register("current_timestamp", SqlFunction::no_args("current_timestamp", false))
            .register("current_date", SqlFunction::no_args("current_date", false));
        for part in ["second", "minute", "hour", "day", "month", "year"] {
            f.register(part, SqlFunction::template(format!("extract({part} from ?1)")));
        }
    }
}

/// Per-database SQL syntax rules.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Short dialect name used in errors and logs.
    fn name(&self) -> &str;

    /// Registered type names and functions.
    fn registry(&self) -> &DialectRegistry;

    /// Opening identifier quote.
    fn open_quote(&self) -> char {
        '"'
    }

    /// Closing identifier quote.
    fn close_quote(&self) -> char {
        '"'
    }

    /// Prefix for named parameters.
    fn parameter_prefix(&self) -> &str {
        ":"
    }

    /// Whether `not` must wrap its operand in parentheses.
    fn parenthesize_not(&self) -> bool {
        false
    }

    /// Whether the database has a native case-insensitive `ilike`.
    fn supports_ilike(&self) -> bool {
        false
    }

    /// Whether the database has identity columns at all.
    fn supports_identity_columns(&self) -> bool {
        true
    }

    /// Whether identity columns carry their primary key inline.
    fn identity_includes_primary_key(&self) -> bool {
        false
    }

    /// Quote an identifier.
    ///
    /// Existing quoting of any supported style is stripped first, so quoting an
    /// already-quoted name is idempotent.
    fn quote(&self, name: &str) -> String {
        let bare = strip_quotes(name).unwrap_or_else(|| name.to_string());
        self.quote_bare(&bare)
    }

    /// Quote a name taken verbatim, escaping embedded close quotes.
    fn quote_bare(&self, name: &str) -> String {
        let close = self.close_quote();
        let escaped = name.replace(close, &format!("{close}{close}"));
        format!("{}{}{}", self.open_quote(), escaped, close)
    }

    /// Quote a parsed identifier.
    ///
    /// A name parsed from quoted text already lost its quotes, so its content
    /// is quoted verbatim rather than stripped a second time.
    fn quote_identifier(&self, ident: &Identifier) -> String {
        if ident.quoted {
            self.quote_bare(&ident.name)
        } else {
            self.quote(&ident.name)
        }
    }

    /// Fully qualified, quoted table name.
    fn qualify(&self, table: &Table) -> String {
        [table.catalog.as_ref(), table.schema.as_ref(), Some(&table.name)]
            .into_iter()
            .flatten()
            .map(|ident| self.quote_identifier(ident))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Placeholder text for a named parameter.
    fn parameter(&self, name: &str) -> String {
        format!("{}{}", self.parameter_prefix(), name)
    }

    /// Default SQL type name for a logical type.
    fn type_name(&self, db_type: DbType) -> Result<String> {
        self.registry()
            .types
            .get(db_type)
            .map(str::to_string)
            .ok_or_else(|| Error::UnregisteredType {
                db_type: db_type.to_string(),
                dialect: self.name().to_string(),
            })
    }

    /// SQL type name for a logical type holding `length` (or `precision` digits).
    fn type_name_sized(&self, db_type: DbType, length: u32, precision: u8, scale: u8) -> Result<String> {
        self.registry()
            .types
            .get_sized(db_type, length, precision, scale)
            .ok_or_else(|| Error::UnregisteredType {
                db_type: db_type.to_string(),
                dialect: self.name().to_string(),
            })
    }

    /// SQL type for a column, honouring its declared length and precision.
    fn column_type(&self, column: &Column) -> Result<String> {
        let size = column
            .length
            .or_else(|| column.precision.map(u32::from));
        match size {
            Some(size) => self.type_name_sized(
                column.db_type,
                size,
                column.precision.unwrap_or(DEFAULT_PRECISION),
                column.scale.unwrap_or(DEFAULT_SCALE),
            ),
            None => self.type_name(column.db_type),
        }
    }

    /// Column definition fragment for an identity column, without its name.
    fn identity_column_ddl(&self, _column: &Column) -> Result<String> {
        Ok(format!(
            "{} generated by default as identity",
            self.type_name(DbType::Identity)?
        ))
    }

    /// Find a registered function, ignoring case.
    fn find_function(&self, name: &str) -> Option<&SqlFunction> {
        self.registry().functions.find(name)
    }

    /// Rewrite a select into its paginated form.
    ///
    /// `sql` has no ORDER BY; `order_by` is the rendered order list without the
    /// keyword. The dialect owns the complete transform.
    fn paginate(&self, sql: &str, order_by: Option<&str>, limit: Option<u64>, offset: Option<u64>) -> String {
        let mut out = with_order_by(sql, order_by);
        if let Some(offset) = offset.filter(|o| *o > 0) {
            out.push_str(&format!(" offset {offset} rows"));
        }
        if let Some(limit) = limit {
            out.push_str(&format!(" fetch first {limit} rows only"));
        }
        out
    }

    /// SQL spelling of a boolean literal.
    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }

    /// Single-quoted string literal.
    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Binary literal.
    fn bytes_literal(&self, value: &[u8]) -> String {
        format!("X'{}'", hex::encode(value))
    }

    /// Timestamp literal from microseconds since the Unix epoch.
    fn timestamp_literal(&self, micros: i64) -> Result<String> {
        let ts = DateTime::from_timestamp_micros(micros).ok_or_else(|| {
            Error::InvalidArgument(format!("timestamp {micros}us is out of range"))
        })?;
        Ok(format!("'{}'", ts.format("%Y-%m-%d %H:%M:%S%.6f")))
    }

    /// Inline literal for a value, used when rendering without parameters.
    fn literal(&self, value: &Value) -> Result<String> {
        Ok(match value {
            Value::Null => "null".to_string(),
            Value::Bool(b) => self.boolean_literal(*b).to_string(),
            Value::Int8(i) => i.to_string(),
            Value::Int16(i) => i.to_string(),
            Value::Int32(i) => i.to_string(),
            Value::Int64(i) => i.to_string(),
            Value::UInt8(i) => i.to_string(),
            Value::Float32(f) => float_literal(f.is_finite(), f)?,
            Value::Float64(f) => float_literal(f.is_finite(), f)?,
            Value::Decimal(d) => d.clone(),
            Value::String(s) => self.string_literal(s),
            Value::Bytes(b) => self.bytes_literal(b),
            Value::Timestamp(t) => self.timestamp_literal(*t)?,
            Value::Uuid(u) => self.string_literal(&format_uuid(u)),
        })
    }
}

fn float_literal(finite: bool, f: &dyn fmt::Display) -> Result<String> {
    if finite {
        Ok(f.to_string())
    } else {
        Err(Error::InvalidArgument(format!("{f} has no SQL literal form")))
    }
}

/// Append an ORDER BY clause when one is given.
pub(crate) fn with_order_by(sql: &str, order_by: Option<&str>) -> String {
    match order_by {
        Some(order) if !order.is_empty() => format!("{sql} order by {order}"),
        _ => sql.to_string(),
    }
}

/// Canonical hyphenated form of a UUID.
pub fn format_uuid(uuid: &[u8; 16]) -> String {
    let hex = hex::encode(uuid);
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Column;

    #[test]
    fn test_quote_is_idempotent() {
        let dialect = AnsiDialect::new();
        assert_eq!(dialect.quote("users"), "\"users\"");
        assert_eq!(dialect.quote("\"users\""), "\"users\"");
        assert_eq!(dialect.quote("[users]"), "\"users\"");
        assert_eq!(dialect.quote("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(dialect.quote(&dialect.quote("we\"ird")), "\"we\"\"ird\"");
    }

    #[test]
    fn test_qualify() {
        let dialect = AnsiDialect::new();
        let table = Table::builder("orders")
            .schema("[sales]")
            .catalog("shop")
            .build()
            .unwrap();
        assert_eq!(dialect.qualify(&table), "\"shop\".\"sales\".\"orders\"");
    }

    #[test]
    fn test_qualify_keeps_quoted_content() {
        let dialect = AnsiDialect::new();
        let table = Table::builder("[\"odd\"]").build().unwrap();
        assert!(table.name.quoted);
        assert_eq!(dialect.qualify(&table), "\"\"\"odd\"\"\"");

        let plain = Table::builder("odd").build().unwrap();
        assert_eq!(dialect.qualify(&plain), "\"odd\"");
    }

    #[test]
    fn test_unregistered_type() {
        #[derive(Debug)]
        struct Bare(DialectRegistry);
        impl Dialect for Bare {
            fn name(&self) -> &str {
                "bare"
            }
            fn registry(&self) -> &DialectRegistry {
                &self.0
            }
        }

        let err = Bare(DialectRegistry::default())
            .type_name(DbType::Int32)
            .unwrap_err();
        assert!(matches!(err, Error::UnregisteredType { dialect, .. } if dialect == "bare"));
    }

    #[test]
    fn test_column_type_uses_capacity() {
        let dialect = AnsiDialect::new();
        let name = Column::new("name", DbType::String).with_length(80);
        let price = Column::new("price", DbType::Decimal).with_precision(10, 2);
        let id = Column::new("id", DbType::Int64);
        assert_eq!(dialect.column_type(&name).unwrap(), "varchar(80)");
        assert_eq!(dialect.column_type(&price).unwrap(), "decimal(10,2)");
        assert_eq!(dialect.column_type(&id).unwrap(), "bigint");
    }

    #[test]
    fn test_literals() {
        let dialect = AnsiDialect::new();
        assert_eq!(dialect.literal(&Value::from("O'Brien")).unwrap(), "'O''Brien'");
        assert_eq!(dialect.literal(&Value::Null).unwrap(), "null");
        assert_eq!(dialect.literal(&Value::Bytes(vec![0xab, 0x01])).unwrap(), "X'ab01'");
        assert_eq!(
            dialect.literal(&Value::Timestamp(1_704_067_200_000_000)).unwrap(),
            "'2024-01-01 00:00:00.000000'"
        );
        assert_eq!(
            dialect.literal(&Value::Uuid([0x11; 16])).unwrap(),
            "'11111111-1111-1111-1111-111111111111'"
        );
        assert_eq!(dialect.literal(&Value::Float64(1.5)).unwrap(), "1.5");
    }

    #[test]
    fn test_non_finite_floats_have_no_literal() {
        let dialect = AnsiDialect::new();
        for value in [
            Value::Float64(f64::NAN),
            Value::Float64(f64::INFINITY),
            Value::Float32(f32::NEG_INFINITY),
        ] {
            assert!(matches!(dialect.literal(&value), Err(Error::InvalidArgument(_))));
        }
    }

    #[test]
    fn test_ansi_functions_registered() {
        let dialect = AnsiDialect::new();
        for name in ["SUBSTRING", "coalesce", "Abs", "mod", "cast", "year", "count"] {
            assert!(dialect.find_function(name).is_some(), "{name} missing");
        }
        assert!(dialect.find_function("soundex").is_none());
    }
}
