//! Standard SQL dialect.

use super::{Dialect, DialectRegistry};

/// ANSI SQL with double-quoted identifiers and `:` parameters.
#[derive(Debug, Clone)]
pub struct AnsiDialect {
    registry: DialectRegistry,
}

impl AnsiDialect {
    pub fn new() -> Self {
        Self {
            registry: DialectRegistry::ansi(),
        }
    }
}

impl Default for AnsiDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for AnsiDialect {
    fn name(&self) -> &str {
        "ansi"
    }

    fn registry(&self) -> &DialectRegistry {
        &self.registry
    }
}
