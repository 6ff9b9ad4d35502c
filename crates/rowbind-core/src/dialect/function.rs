//! SQL function templates.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// How a registered function renders its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlFunction {
    /// `name(arg1, arg2, ...)`
    Standard { name: String },
    /// A function taking no arguments, e.g. `current_timestamp`.
    NoArgs { name: String, parens: bool },
    /// Template with `?1`, `?2`... placeholders, e.g. `extract(year from ?1)`.
    Template { template: String },
    /// Variadic form, e.g. `(a || b || c)`.
    VarArgs {
        begin: String,
        separator: String,
        end: String,
    },
}

impl SqlFunction {
    /// `name(args...)`
    pub fn standard(name: impl Into<String>) -> Self {
        SqlFunction::Standard { name: name.into() }
    }

    /// A function without arguments.
    pub fn no_args(name: impl Into<String>, parens: bool) -> Self {
        SqlFunction::NoArgs {
            name: name.into(),
            parens,
        }
    }

    /// A placeholder template.
    pub fn template(template: impl Into<String>) -> Self {
        SqlFunction::Template {
            template: template.into(),
        }
    }

    /// A variadic function.
    pub fn var_args(
        begin: impl Into<String>,
        separator: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        SqlFunction::VarArgs {
            begin: begin.into(),
            separator: separator.into(),
            end: end.into(),
        }
    }

    /// Render with already-rendered argument fragments.
    pub fn render(&self, args: &[String]) -> Result<String> {
        match self {
            SqlFunction::Standard { name } => Ok(format!("{}({})", name, args.join(", "))),
            SqlFunction::NoArgs { name, parens } => {
                if !args.is_empty() {
                    return Err(Error::InvalidArgument(format!(
                        "function '{name}' takes no arguments, got {}",
                        args.len()
                    )));
                }
                Ok(if *parens {
                    format!("{name}()")
                } else {
                    name.clone()
                })
            }
            SqlFunction::Template { template } => render_template(template, args),
            SqlFunction::VarArgs {
                begin,
                separator,
                end,
            } => Ok(format!("{}{}{}", begin, args.join(separator.as_str()), end)),
        }
    }
}

/// Replace `?N` placeholders (1-based) with the matching argument.
fn render_template(template: &str, args: &[String]) -> Result<String> {
    let mut out = String::with_capacity(template.len() + args.iter().map(String::len).sum::<usize>());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '?' {
            out.push(c);
            continue;
        }
        let mut digits = String::new();
        while let Some(&d) = chars.peek() {
            if !d.is_ascii_digit() {
                break;
            }
            digits.push(d);
            chars.next();
        }
        if digits.is_empty() {
            out.push('?');
            continue;
        }
        let index: usize = digits
            .parse()
            .map_err(|_| Error::InvalidArgument(format!("bad placeholder ?{digits}")))?;
        let arg = index
            .checked_sub(1)
            .and_then(|i| args.get(i))
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "template '{template}' needs argument ?{index}, got {}",
                    args.len()
                ))
            })?;
        out.push_str(arg);
    }

    Ok(out)
}

/// Case-insensitive function name registry.
#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, SqlFunction>,
}

impl FunctionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a function.
    pub fn register(&mut self, name: &str, function: SqlFunction) -> &mut Self {
        self.functions.insert(name.to_ascii_lowercase(), function);
        self
    }

    /// Find a function by name, ignoring case.
    pub fn find(&self, name: &str) -> Option<&SqlFunction> {
        self.functions.get(&name.to_ascii_lowercase())
    }

    /// Number of registered functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
