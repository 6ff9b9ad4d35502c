//! Schema statements.

use crate::catalog::{Column, DbType, DefaultValue, Index, Table};
use crate::dialect::Dialect;
use crate::error::Result;

/// Render `create table` with column types, constraints and keys.
pub fn create_table(table: &Table, dialect: &dyn Dialect) -> Result<String> {
    let inline_key = match &table.primary_key {
        Some(pk) => {
            dialect.supports_identity_columns()
                && dialect.identity_includes_primary_key()
                && pk.columns.len() == 1
                && table.identity_column().is_some_and(|c| pk.contains(&c.name))
        }
        None => true,
    };

    let mut parts = table
        .columns
        .iter()
        .map(|c| column_definition(c, dialect, inline_key))
        .collect::<Result<Vec<_>>>()?;

    if let Some(pk) = table.primary_key.as_ref().filter(|_| !inline_key) {
        parts.push(format!(
            "{}primary key ({})",
            constraint_name(&pk.name, dialect),
            quote_list(&pk.columns, dialect)
        ));
    }
    for uk in &table.unique_keys {
        parts.push(format!(
            "{}unique ({})",
            constraint_name(&uk.name, dialect),
            quote_list(&uk.columns, dialect)
        ));
    }

    Ok(format!(
        "create table {} ({})",
        dialect.qualify(table),
        parts.join(", ")
    ))
}

/// Render `create [unique] index` for one of the table's indexes.
pub fn create_index(table: &Table, index: &Index, dialect: &dyn Dialect) -> String {
    format!(
        "create {}index {} on {} ({})",
        if index.unique { "unique " } else { "" },
        dialect.quote(&index.name),
        dialect.qualify(table),
        quote_list(&index.columns, dialect)
    )
}

/// Render `drop table`.
pub fn drop_table(table: &Table, dialect: &dyn Dialect) -> String {
    format!("drop table {}", dialect.qualify(table))
}

/// `inline_key` is false when a table-level primary key constraint follows,
/// so identity fragments that declare their own key must not be used.
fn column_definition(column: &Column, dialect: &dyn Dialect, inline_key: bool) -> Result<String> {
    let name = dialect.quote(&column.name);
    if column.is_identity() {
        if dialect.identity_includes_primary_key() && !inline_key {
            return Ok(format!("{name} {} not null", dialect.type_name(DbType::Identity)?));
        }
        if dialect.supports_identity_columns() {
            return Ok(format!("{name} {}", dialect.identity_column_ddl(column)?));
        }
        return Ok(format!("{name} {} not null", dialect.type_name(DbType::Int32)?));
    }

    let mut out = format!("{name} {}", dialect.column_type(column)?);
    match &column.default {
        Some(DefaultValue::Value(value)) => {
            out.push_str(" default ");
            out.push_str(&dialect.literal(value)?);
        }
        Some(DefaultValue::Expression(sql)) => {
            out.push_str(" default ");
            out.push_str(sql);
        }
        None => {}
    }
    if !column.nullable {
        out.push_str(" not null");
    }
    if column.unique {
        out.push_str(" unique");
    }
    if let Some(check) = &column.check {
        out.push_str(&format!(" check ({check})"));
    }
    Ok(out)
}

fn constraint_name(name: &str, dialect: &dyn Dialect) -> String {
    if name.is_empty() {
        String::new()
    } else {
        format!("constraint {} ", dialect.quote(name))
    }
}

fn quote_list(columns: &[String], dialect: &dyn Dialect) -> String {
    columns
        .iter()
        .map(|c| dialect.quote(c))
        .collect::<Vec<_>>()
        .join(", ")
}
