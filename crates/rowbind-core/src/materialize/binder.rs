//! Parameter binding from mapped instances.

use std::fmt;
use std::marker::PhantomData;

use rowbind_proto::Value;
use tracing::debug;

use super::mapped::Mapped;
use crate::error::Result;

/// Binds members of a parameter type to the named parameters of one SQL text.
///
/// Which members the statement references is resolved once; binding an
/// instance only reads those members.
pub struct ParameterBinder<P> {
    /// `(parameter name, member index)` in order of first appearance.
    slots: Vec<(String, usize)>,
    _marker: PhantomData<fn(&P)>,
}

impl<P> fmt::Debug for ParameterBinder<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterBinder")
            .field("slots", &self.slots)
            .finish()
    }
}

impl<P: Mapped> ParameterBinder<P> {
    /// Resolve the members of `P` referenced as `<prefix><member>` in `sql`.
    ///
    /// Names are matched to members ignoring case. Placeholders naming no
    /// member, such as generated `p_N` parameters, are left for the caller.
    pub fn compile(sql: &str, prefix: &str) -> Self {
        let info = P::type_info();
        let mut slots: Vec<(String, usize)> = Vec::new();
        for name in placeholders(sql, prefix) {
            if slots.iter().any(|(n, _)| n.eq_ignore_ascii_case(name)) {
                continue;
            }
            if let Some(member) = info.member_index(name, true) {
                slots.push((name.to_string(), member));
            }
        }
        debug!(
            parameter_type = %info.name,
            bound = slots.len(),
            "Compiled parameter binder"
        );
        Self {
            slots,
            _marker: PhantomData,
        }
    }

    /// Read the referenced members of an instance.
    pub fn bind(&self, params: &P) -> Result<Vec<(String, Value)>> {
        self.slots
            .iter()
            .map(|(name, member)| Ok((name.clone(), params.member_value(*member)?)))
            .collect()
    }

    /// Parameter names this binder fills.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(n, _)| n.as_str())
    }
}

/// Placeholder names following `prefix` outside of string literals.
fn placeholders<'a>(sql: &'a str, prefix: &'a str) -> Vec<&'a str> {
    let mut found = Vec::new();
    if prefix.is_empty() {
        return found;
    }
    let bytes = sql.as_bytes();
    let mut in_literal = false;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            in_literal = !in_literal;
            i += 1;
            continue;
        }
        if in_literal || !bytes[i..].starts_with(prefix.as_bytes()) {
            i += 1;
            continue;
        }
        // `::type` casts share the `:` prefix.
        let doubled = sql[i + prefix.len()..].starts_with(prefix)
            || (i > 0 && sql[..i].ends_with(prefix));
        let start = i + prefix.len();
        let end = sql[start..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .map_or(sql.len(), |n| start + n);
        if !doubled && end > start {
            found.push(&sql[start..end]);
        }
        i = end.max(i + 1);
    }
    found
}
