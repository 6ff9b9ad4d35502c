//! Parameterized INSERT, UPDATE, DELETE and key lookup statements.
//!
//! Parameters are named after the member each column binds to, so a
//! [`ParameterBinder`](crate::materialize::ParameterBinder) compiled for the
//! mapped type fills them without further mapping.

use crate::catalog::{Column, Table};
use crate::dialect::Dialect;
use crate::error::{Error, Result};

/// SQL text with the parameter names it references, in order of appearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub parameters: Vec<String>,
}

/// `insert into t (cols) values (params)`; the identity column is left to the database.
pub fn insert(table: &Table, dialect: &dyn Dialect) -> Result<Statement> {
    let target = dialect.qualify(table);
    let columns: Vec<&Column> = table.insert_columns().collect();
    if columns.is_empty() {
        return Ok(Statement {
            sql: format!("insert into {target} default values"),
            parameters: Vec::new(),
        });
    }

    let names = columns
        .iter()
        .map(|c| dialect.quote(&c.name))
        .collect::<Vec<_>>()
        .join(", ");
    let parameters: Vec<String> = columns.iter().map(|c| c.member_name().to_string()).collect();
    let values = parameters
        .iter()
        .map(|p| dialect.parameter(p))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(Statement {
        sql: format!("insert into {target} ({names}) values ({values})"),
        parameters,
    })
}

/// `update t set ... where <key>`.
pub fn update(table: &Table, dialect: &dyn Dialect) -> Result<Statement> {
    let keys = require_key(table)?;
    let columns: Vec<&Column> = table.update_columns().collect();
    if columns.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "table '{}' has no updatable columns",
            table.name.name
        )));
    }

    let mut parameters = Vec::with_capacity(columns.len() + keys.len());
    let set_list = assignments(&columns, dialect, &mut parameters).join(", ");
    let predicate = assignments(&keys, dialect, &mut parameters).join(" and ");

    Ok(Statement {
        sql: format!(
            "update {} set {set_list} where {predicate}",
            dialect.qualify(table)
        ),
        parameters,
    })
}

/// `delete from t where <key>`.
pub fn delete(table: &Table, dialect: &dyn Dialect) -> Result<Statement> {
    let keys = require_key(table)?;
    let mut parameters = Vec::with_capacity(keys.len());
    let predicate = assignments(&keys, dialect, &mut parameters).join(" and ");
    Ok(Statement {
        sql: format!("delete from {} where {predicate}", dialect.qualify(table)),
        parameters,
    })
}

/// `select <all columns> from t where <key>`.
pub fn select_by_key(table: &Table, dialect: &dyn Dialect) -> Result<Statement> {
    let keys = require_key(table)?;
    let list = table
        .columns
        .iter()
        .map(|c| dialect.quote(&c.name))
        .collect::<Vec<_>>()
        .join(", ");
    let mut parameters = Vec::with_capacity(keys.len());
    let predicate = assignments(&keys, dialect, &mut parameters).join(" and ");
    Ok(Statement {
        sql: format!(
            "select {list} from {} where {predicate}",
            dialect.qualify(table)
        ),
        parameters,
    })
}

fn require_key(table: &Table) -> Result<Vec<&Column>> {
    let keys = table.key_columns();
    if keys.is_empty() {
        return Err(Error::NoPrimaryKey(table.name.name.clone()));
    }
    Ok(keys)
}

/// `col = <param>` fragments, recording parameter names.
fn assignments(columns: &[&Column], dialect: &dyn Dialect, parameters: &mut Vec<String>) -> Vec<String> {
    columns
        .iter()
        .map(|c| {
            let name = c.member_name().to_string();
            let fragment = format!("{} = {}", dialect.quote(&c.name), dialect.parameter(&name));
            parameters.push(name);
            fragment
        })
        .collect()
}
