//! SQL expression tree.
//!
//! Expressions are immutable once built. A tree can be shared between threads
//! and rendered any number of times against different dialects; rendering never
//! mutates it. The free functions at the bottom of this module are the fluent
//! entry points used by criteria builders.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// SQL spelling of the operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Logical connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    /// SQL spelling of the connective.
    pub fn as_sql(self) -> &'static str {
        match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
        }
    }
}

/// Where the wildcard goes when a LIKE pattern is built from plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MatchMode {
    /// Pattern is used as given.
    #[default]
    Exact,
    /// `pattern%`
    Start,
    /// `%pattern`
    End,
    /// `%pattern%`
    Anywhere,
}

impl MatchMode {
    /// Decorate a pattern with wildcards for this mode.
    pub fn apply(self, pattern: &str) -> String {
        match self {
            MatchMode::Exact => pattern.to_string(),
            MatchMode::Start => format!("{pattern}%"),
            MatchMode::End => format!("%{pattern}"),
            MatchMode::Anywhere => format!("%{pattern}%"),
        }
    }
}

/// A node of the SQL expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Reference to a field, optionally qualified by a table or alias.
    Field {
        name: String,
        table: Option<String>,
    },
    /// Literal value; becomes a bound parameter when rendering parameterized.
    Literal(Value),
    /// Raw SQL text emitted verbatim.
    Plain(String),
    /// Binary comparison.
    Compare {
        left: Box<Expr>,
        op: CompareOp,
        right: Box<Expr>,
    },
    /// Binary logical connective.
    Logical {
        left: Box<Expr>,
        op: LogicalOp,
        right: Box<Expr>,
    },
    /// N-ary logical connective (conjunction or disjunction).
    Junction { op: LogicalOp, exprs: Vec<Expr> },
    /// Logical negation.
    Not(Box<Expr>),
    /// `IS NULL` / `IS NOT NULL`.
    IsNull { expr: Box<Expr>, negated: bool },
    /// `expr BETWEEN low AND high`.
    Between {
        expr: Box<Expr>,
        low: Box<Expr>,
        high: Box<Expr>,
    },
    /// `expr [NOT] IN (values...)`.
    In {
        expr: Box<Expr>,
        values: Vec<Expr>,
        negated: bool,
    },
    /// LIKE pattern match, case-insensitive when `ignore_case` is set.
    Like {
        expr: Box<Expr>,
        pattern: String,
        mode: MatchMode,
        escape: Option<char>,
        ignore_case: bool,
    },
    /// Call of a function registered in the dialect.
    Function { name: String, args: Vec<Expr> },
    /// Aggregate over a field, `None` meaning `*`.
    Aggregate {
        function: String,
        field: Option<String>,
    },
    /// Comparison between two fields of the same row.
    PropertyCompare {
        left: String,
        right: String,
        op: CompareOp,
    },
    /// Projection term of a SELECT list.
    Select {
        expr: Box<Expr>,
        alias: Option<String>,
        distinct: bool,
    },
    /// ORDER BY term.
    Order { expr: Box<Expr>, ascending: bool },
}

impl Expr {
    /// Create a field reference.
    pub fn field(name: impl Into<String>) -> Self {
        Expr::Field {
            name: name.into(),
            table: None,
        }
    }

    /// Create a table-qualified field reference.
    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Expr::Field {
            name: name.into(),
            table: Some(table.into()),
        }
    }

    /// Create a literal.
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    /// Create a raw SQL fragment.
    pub fn plain(sql: impl Into<String>) -> Self {
        Expr::Plain(sql.into())
    }

    /// Combine with another expression using `and`.
    pub fn and(self, other: Expr) -> Self {
        Expr::Logical {
            left: Box::new(self),
            op: LogicalOp::And,
            right: Box::new(other),
        }
    }

    /// Combine with another expression using `or`.
    pub fn or(self, other: Expr) -> Self {
        Expr::Logical {
            left: Box::new(self),
            op: LogicalOp::Or,
            right: Box::new(other),
        }
    }

    /// Wrap as a projection term.
    pub fn select(self) -> Self {
        Expr::Select {
            expr: Box::new(self),
            alias: None,
            distinct: false,
        }
    }

    /// Wrap as an aliased projection term.
    pub fn alias(self, alias: impl Into<String>) -> Self {
        match self {
            Expr::Select { expr, distinct, .. } => Expr::Select {
                expr,
                alias: Some(alias.into()),
                distinct,
            },
            other => Expr::Select {
                expr: Box::new(other),
                alias: Some(alias.into()),
                distinct: false,
            },
        }
    }

    /// Wrap as a distinct projection term.
    pub fn distinct(self) -> Self {
        match self {
            Expr::Select { expr, alias, .. } => Expr::Select {
                expr,
                alias,
                distinct: true,
            },
            other => Expr::Select {
                expr: Box::new(other),
                alias: None,
                distinct: true,
            },
        }
    }

    /// Check if this is an ORDER BY term.
    pub fn is_order(&self) -> bool {
        matches!(self, Expr::Order { .. })
    }

    /// Check if this is a projection term.
    pub fn is_select(&self) -> bool {
        matches!(self, Expr::Select { .. })
    }

    /// Count the literal nodes in this tree.
    ///
    /// This is the number of parameters a parameterized render registers,
    /// not counting LIKE patterns.
    pub fn literal_count(&self) -> usize {
        match self {
            Expr::Literal(_) => 1,
            Expr::Field { .. }
            | Expr::Plain(_)
            | Expr::Aggregate { .. }
            | Expr::PropertyCompare { .. } => 0,
            Expr::Compare { left, right, .. } | Expr::Logical { left, right, .. } => {
                left.literal_count() + right.literal_count()
            }
            Expr::Junction { exprs, .. } => exprs.iter().map(Expr::literal_count).sum(),
            Expr::Not(expr)
            | Expr::IsNull { expr, .. }
            | Expr::Like { expr, .. }
            | Expr::Select { expr, .. }
            | Expr::Order { expr, .. } => expr.literal_count(),
            Expr::Between { expr, low, high } => {
                expr.literal_count() + low.literal_count() + high.literal_count()
            }
            Expr::In { expr, values, .. } => {
                expr.literal_count() + values.iter().map(Expr::literal_count).sum::<usize>()
            }
            Expr::Function { args, .. } => args.iter().map(Expr::literal_count).sum(),
        }
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Literal(value)
    }
}

fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Expr {
    Expr::Compare {
        left: Box::new(Expr::field(field)),
        op,
        right: Box::new(Expr::Literal(value.into())),
    }
}

/// `field = value`
pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Expr {
    compare(field, CompareOp::Eq, value)
}

/// `field <> value`
pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Expr {
    compare(field, CompareOp::Ne, value)
}

/// `field < value`
pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Expr {
    compare(field, CompareOp::Lt, value)
}

/// `field <= value`
pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Expr {
    compare(field, CompareOp::Le, value)
}

/// `field > value`
pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Expr {
    compare(field, CompareOp::Gt, value)
}

/// `field >= value`
pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Expr {
    compare(field, CompareOp::Ge, value)
}

/// `field between low and high`
pub fn between(field: impl Into<String>, low: impl Into<Value>, high: impl Into<Value>) -> Expr {
    Expr::Between {
        expr: Box::new(Expr::field(field)),
        low: Box::new(Expr::Literal(low.into())),
        high: Box::new(Expr::Literal(high.into())),
    }
}

/// `field in (values...)`
pub fn in_values<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Expr {
    Expr::In {
        expr: Box::new(Expr::field(field)),
        values: values.into_iter().map(|v| Expr::Literal(v.into())).collect(),
        negated: false,
    }
}

/// `field not in (values...)`
pub fn not_in_values<V: Into<Value>>(
    field: impl Into<String>,
    values: impl IntoIterator<Item = V>,
) -> Expr {
    Expr::In {
        expr: Box::new(Expr::field(field)),
        values: values.into_iter().map(|v| Expr::Literal(v.into())).collect(),
        negated: true,
    }
}

/// `field is null`
pub fn is_null(field: impl Into<String>) -> Expr {
    Expr::IsNull {
        expr: Box::new(Expr::field(field)),
        negated: false,
    }
}

/// `field is not null`
pub fn is_not_null(field: impl Into<String>) -> Expr {
    Expr::IsNull {
        expr: Box::new(Expr::field(field)),
        negated: true,
    }
}

/// Case-sensitive LIKE.
pub fn like(field: impl Into<String>, pattern: impl Into<String>, mode: MatchMode) -> Expr {
    Expr::Like {
        expr: Box::new(Expr::field(field)),
        pattern: pattern.into(),
        mode,
        escape: None,
        ignore_case: false,
    }
}

/// Case-insensitive LIKE.
pub fn ilike(field: impl Into<String>, pattern: impl Into<String>, mode: MatchMode) -> Expr {
    Expr::Like {
        expr: Box::new(Expr::field(field)),
        pattern: pattern.into(),
        mode,
        escape: None,
        ignore_case: true,
    }
}

/// LIKE with an escape character.
pub fn like_escaped(
    field: impl Into<String>,
    pattern: impl Into<String>,
    mode: MatchMode,
    escape: char,
    ignore_case: bool,
) -> Expr {
    Expr::Like {
        expr: Box::new(Expr::field(field)),
        pattern: pattern.into(),
        mode,
        escape: Some(escape),
        ignore_case,
    }
}

/// `(left and right)`
pub fn and(left: Expr, right: Expr) -> Expr {
    left.and(right)
}

/// `(left or right)`
pub fn or(left: Expr, right: Expr) -> Expr {
    left.or(right)
}

/// `not expr`
pub fn not(expr: Expr) -> Expr {
    Expr::Not(Box::new(expr))
}

/// All expressions must hold; empty means true.
pub fn conjunction(exprs: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Junction {
        op: LogicalOp::And,
        exprs: exprs.into_iter().collect(),
    }
}

/// At least one expression must hold.
pub fn disjunction(exprs: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Junction {
        op: LogicalOp::Or,
        exprs: exprs.into_iter().collect(),
    }
}

/// Compare two fields of the same row.
pub fn property_compare(left: impl Into<String>, op: CompareOp, right: impl Into<String>) -> Expr {
    Expr::PropertyCompare {
        left: left.into(),
        right: right.into(),
        op,
    }
}

/// `left = right` between two fields.
pub fn property_eq(left: impl Into<String>, right: impl Into<String>) -> Expr {
    property_compare(left, CompareOp::Eq, right)
}

/// Call a dialect function.
pub fn func(name: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Function {
        name: name.into(),
        args: args.into_iter().collect(),
    }
}

/// Aggregate projection over a field.
pub fn aggregate(function: impl Into<String>, field: impl Into<String>) -> Expr {
    Expr::Aggregate {
        function: function.into(),
        field: Some(field.into()),
    }
}

/// `count(*)`
pub fn count_all() -> Expr {
    Expr::Aggregate {
        function: "count".into(),
        field: None,
    }
}

/// `count(field)`
pub fn count(field: impl Into<String>) -> Expr {
    aggregate("count", field)
}

/// `sum(field)`
pub fn sum(field: impl Into<String>) -> Expr {
    aggregate("sum", field)
}

/// `avg(field)`
pub fn avg(field: impl Into<String>) -> Expr {
    aggregate("avg", field)
}

/// `min(field)`
pub fn min(field: impl Into<String>) -> Expr {
    aggregate("min", field)
}

/// `max(field)`
pub fn max(field: impl Into<String>) -> Expr {
    aggregate("max", field)
}

/// Ascending order on a field.
pub fn asc(field: impl Into<String>) -> Expr {
    Expr::Order {
        expr: Box::new(Expr::field(field)),
        ascending: true,
    }
}

/// Descending order on a field.
pub fn desc(field: impl Into<String>) -> Expr {
    Expr::Order {
        expr: Box::new(Expr::field(field)),
        ascending: false,
    }
}
