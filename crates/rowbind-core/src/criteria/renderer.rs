//! Expression rendering.

use rowbind_proto::{CompareOp, Expr, LogicalOp, MatchMode, Value};

use super::params::ParameterSet;
use crate::catalog::Table;
use crate::dialect::Dialect;
use crate::error::{Error, Result};

/// State of one render pass over an expression tree.
///
/// A context renders any number of expressions; all of them share its
/// parameter set, so names stay unique across the whole statement.
pub struct RenderContext<'a> {
    dialect: &'a dyn Dialect,
    table: Option<&'a Table>,
    parameterized: bool,
    params: ParameterSet,
}

impl<'a> RenderContext<'a> {
    /// Start a render pass.
    ///
    /// With `parameterized` set, literals become named parameters; otherwise
    /// they are inlined as SQL literals.
    pub fn new(dialect: &'a dyn Dialect, table: Option<&'a Table>, parameterized: bool) -> Self {
        Self {
            dialect,
            table,
            parameterized,
            params: ParameterSet::new(),
        }
    }

    /// Active dialect.
    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    /// Parameters registered so far.
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Finish the pass, returning the registered parameters.
    pub fn into_params(self) -> ParameterSet {
        self.params
    }

    /// Render an expression to SQL text.
    pub fn render(&mut self, expr: &Expr) -> Result<String> {
        match expr {
            Expr::Field { name, table } => Ok(self.field(name, table.as_deref())),
            Expr::Literal(value) => self.value(value),
            Expr::Plain(sql) => Ok(sql.clone()),
            Expr::Compare { left, op, right } => self.compare(left, *op, right),
            Expr::Logical { left, op, right } => {
                let left = self.render(left)?;
                let right = self.render(right)?;
                Ok(format!("({left} {} {right})", op.as_sql()))
            }
            Expr::Junction { op, exprs } => self.junction(*op, exprs),
            Expr::Not(inner) => {
                let inner = self.render(inner)?;
                Ok(if self.dialect.parenthesize_not() {
                    format!("not ({inner})")
                } else {
                    format!("not {inner}")
                })
            }
            Expr::IsNull { expr, negated } => {
                let expr = self.render(expr)?;
                Ok(if *negated {
                    format!("{expr} is not null")
                } else {
                    format!("{expr} is null")
                })
            }
            Expr::Between { expr, low, high } => {
                let expr = self.render(expr)?;
                let low = self.render(low)?;
                let high = self.render(high)?;
                Ok(format!("{expr} between {low} and {high}"))
            }
            Expr::In {
                expr,
                values,
                negated,
            } => self.in_list(expr, values, *negated),
            Expr::Like {
                expr,
                pattern,
                mode,
                escape,
                ignore_case,
            } => self.like(expr, pattern, *mode, *escape, *ignore_case),
            Expr::Function { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| self.render(arg))
                    .collect::<Result<Vec<_>>>()?;
                self.call(name, &args)
            }
            Expr::Aggregate { function, field } => {
                let arg = match field {
                    Some(field) => self.field(field, None),
                    None => "*".to_string(),
                };
                self.call(function, &[arg])
            }
            Expr::PropertyCompare { left, right, op } => Ok(format!(
                "{} {} {}",
                self.field(left, None),
                op.as_sql(),
                self.field(right, None)
            )),
            Expr::Select {
                expr,
                alias,
                distinct,
            } => {
                let mut out = String::new();
                if *distinct {
                    out.push_str("distinct ");
                }
                out.push_str(&self.render(expr)?);
                if let Some(alias) = alias {
                    out.push_str(" as ");
                    out.push_str(&self.dialect.quote(alias));
                }
                Ok(out)
            }
            Expr::Order { expr, ascending } => {
                let expr = self.render(expr)?;
                Ok(format!("{expr} {}", if *ascending { "asc" } else { "desc" }))
            }
        }
    }

    /// Resolve a field against the table; unknown names are emitted raw.
    fn field(&self, name: &str, qualifier: Option<&str>) -> String {
        match self.table.and_then(|table| table.column(name)) {
            Some(column) => {
                let quoted = self.dialect.quote(&column.name);
                match qualifier {
                    Some(qualifier) => format!("{}.{quoted}", self.dialect.quote(qualifier)),
                    None => quoted,
                }
            }
            None => match qualifier {
                Some(qualifier) => format!("{qualifier}.{name}"),
                None => name.to_string(),
            },
        }
    }

    fn value(&mut self, value: &Value) -> Result<String> {
        if value.is_null() {
            return Ok("null".to_string());
        }
        if self.parameterized {
            let name = self.params.register(value.clone())?;
            Ok(self.dialect.parameter(&name))
        } else {
            self.dialect.literal(value)
        }
    }

    fn compare(&mut self, left: &Expr, op: CompareOp, right: &Expr) -> Result<String> {
        let is_null_literal = matches!(right, Expr::Literal(v) if v.is_null());
        let left = self.render(left)?;
        match op {
            CompareOp::Eq if is_null_literal => Ok(format!("{left} is null")),
            CompareOp::Ne if is_null_literal => Ok(format!("{left} is not null")),
            _ => {
                let right = self.render(right)?;
                Ok(format!("{left} {} {right}", op.as_sql()))
            }
        }
    }

    fn junction(&mut self, op: LogicalOp, exprs: &[Expr]) -> Result<String> {
        if exprs.is_empty() {
            return Ok("1=1".to_string());
        }
        let parts = exprs
            .iter()
            .map(|e| self.render(e))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("({})", parts.join(&format!(" {} ", op.as_sql()))))
    }

    fn in_list(&mut self, expr: &Expr, values: &[Expr], negated: bool) -> Result<String> {
        if values.is_empty() {
            return Ok(if negated { "1=1" } else { "1=0" }.to_string());
        }
        let expr = self.render(expr)?;
        let values = values
            .iter()
            .map(|v| self.render(v))
            .collect::<Result<Vec<_>>>()?;
        let keyword = if negated { "not in" } else { "in" };
        Ok(format!("{expr} {keyword} ({})", values.join(", ")))
    }

    fn like(
        &mut self,
        expr: &Expr,
        pattern: &str,
        mode: MatchMode,
        escape: Option<char>,
        ignore_case: bool,
    ) -> Result<String> {
        let expr = self.render(expr)?;
        let pattern = self.value(&Value::String(mode.apply(pattern)))?;

        let mut out = if !ignore_case {
            format!("{expr} like {pattern}")
        } else if self.dialect.supports_ilike() {
            format!("{expr} ilike {pattern}")
        } else {
            let lower_expr = self.call("lower", &[expr])?;
            let lower_pattern = self.call("lower", &[pattern])?;
            format!("{lower_expr} like {lower_pattern}")
        };

        if let Some(escape) = escape {
            out.push_str(" escape ");
            out.push_str(&self.dialect.string_literal(&escape.to_string()));
        }
        Ok(out)
    }

    fn call(&self, name: &str, args: &[String]) -> Result<String> {
        self.dialect
            .find_function(name)
            .ok_or_else(|| Error::UnsupportedFunction {
                name: name.to_string(),
                dialect: self.dialect.name().to_string(),
            })?
            .render(args)
    }
}
