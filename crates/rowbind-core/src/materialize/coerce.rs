//! Column value conversion.
//!
//! Rules, in order: null becomes the member's default (or stays null for
//! nullable members); a value of the member's kind is passed through; enums
//! accept their variant name or a number of any width; numbers widen or narrow
//! between kinds; anything else goes through a generic textual/structural
//! conversion that fails when no sensible mapping exists.

use chrono::{DateTime, Utc};
use rowbind_proto::{Value, ValueKind};

use super::mapped::{EnumInfo, MemberType};
use crate::dialect::format_uuid;

/// Whether a column of `source` kind may fill a constructor parameter.
///
/// Unknown kinds are accepted; the value is converted per row.
pub(crate) fn accepts(target: &MemberType, source: Option<ValueKind>) -> bool {
    let Some(source) = source else {
        return true;
    };
    match target {
        MemberType::Any => true,
        MemberType::Nullable(inner) => source == ValueKind::Null || accepts(inner, Some(source)),
        MemberType::Primitive(kind) => *kind == source,
        MemberType::Enum(info) => source == info.underlying || source == ValueKind::String,
        MemberType::Binary => source == ValueKind::Bytes,
    }
}

/// Conversion to one member type, resolved once per compiled plan.
#[derive(Debug, Clone)]
pub(crate) struct Converter {
    target: MemberType,
    null: Value,
}

impl Converter {
    pub(crate) fn new(target: MemberType) -> Self {
        let null = target.default_value();
        Self { target, null }
    }

    pub(crate) fn target(&self) -> &MemberType {
        &self.target
    }

    /// Convert a column value. `None` means the value cannot be represented.
    pub(crate) fn convert(&self, value: Value) -> Option<Value> {
        if value.is_null() {
            return Some(self.null.clone());
        }
        convert_to(self.target.underlying(), value)
    }
}

fn convert_to(target: &MemberType, value: Value) -> Option<Value> {
    match target {
        MemberType::Any => Some(value),
        MemberType::Binary => matches!(value, Value::Bytes(_)).then_some(value),
        MemberType::Enum(info) => to_enum(info, value),
        MemberType::Primitive(kind) if value.kind() == *kind => Some(value),
        MemberType::Primitive(kind) if kind.is_numeric() && value.kind().is_numeric() => {
            to_numeric(&value, *kind)
        }
        MemberType::Primitive(kind) => fallback(value, *kind),
        MemberType::Nullable(inner) => convert_to(inner, value),
    }
}

fn to_enum(info: &EnumInfo, value: Value) -> Option<Value> {
    match &value {
        Value::String(s) => match info.discriminant(s) {
            Some(d) => to_numeric(&Value::Int64(d), info.underlying),
            None => s
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(|d| to_numeric(&Value::Int64(d), info.underlying)),
        },
        v if v.kind().is_numeric() => to_numeric(v, info.underlying),
        _ => None,
    }
}

/// Widen or narrow between numeric kinds, failing when out of range.
fn to_numeric(value: &Value, kind: ValueKind) -> Option<Value> {
    if kind.is_integral() {
        let wide = integral(value)?;
        return Some(match kind {
            ValueKind::Int8 => Value::Int8(i8::try_from(wide).ok()?),
            ValueKind::Int16 => Value::Int16(i16::try_from(wide).ok()?),
            ValueKind::Int32 => Value::Int32(i32::try_from(wide).ok()?),
            ValueKind::UInt8 => Value::UInt8(u8::try_from(wide).ok()?),
            _ => Value::Int64(wide),
        });
    }
    match kind {
        ValueKind::Float32 => value.as_f64().map(|f| Value::Float32(f as f32)),
        ValueKind::Float64 => value.as_f64().map(Value::Float64),
        ValueKind::Decimal => match value {
            Value::Decimal(d) => Some(Value::Decimal(d.clone())),
            v if v.as_i64().is_some() || v.as_f64().is_some_and(f64::is_finite) => {
                Some(Value::Decimal(v.to_string()))
            }
            _ => None,
        },
        _ => None,
    }
}

/// Integral view of a number; fractional values round to nearest.
fn integral(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    if let Value::Decimal(d) = value {
        if let Ok(i) = d.trim().parse::<i64>() {
            return Some(i);
        }
    }
    let f = value.as_f64()?.round();
    (f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64).then_some(f as i64)
}

fn fallback(value: Value, kind: ValueKind) -> Option<Value> {
    match kind {
        ValueKind::String => Some(Value::String(match value {
            Value::String(s) => s,
            Value::Uuid(u) => format_uuid(&u),
            Value::Timestamp(t) => DateTime::<Utc>::from_timestamp_micros(t)?.to_rfc3339(),
            Value::Bytes(_) => return None,
            other => other.to_string(),
        })),
        ValueKind::Bool => match value {
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            v => v.as_i64().map(|i| Value::Bool(i != 0)),
        },
        k if k.is_numeric() => match value {
            Value::Bool(b) => to_numeric(&Value::Int64(i64::from(b)), k),
            Value::String(s) => {
                let s = s.trim();
                if let Ok(i) = s.parse::<i64>() {
                    to_numeric(&Value::Int64(i), k)
                } else if k == ValueKind::Decimal {
                    s.parse::<f64>().ok().map(|_| Value::Decimal(s.to_string()))
                } else {
                    s.parse::<f64>()
                        .ok()
                        .and_then(|f| to_numeric(&Value::Float64(f), k))
                }
            }
            _ => None,
        },
        ValueKind::Timestamp => match value {
            Value::Int64(micros) => Some(Value::Timestamp(micros)),
            Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| Value::Timestamp(dt.timestamp_micros())),
            _ => None,
        },
        ValueKind::Uuid => match value {
            Value::Bytes(b) => <[u8; 16]>::try_from(b.as_slice()).ok().map(Value::Uuid),
            Value::String(s) => {
                let digits: String = s.chars().filter(|c| *c != '-').collect();
                let bytes = hex::decode(digits).ok()?;
                <[u8; 16]>::try_from(bytes.as_slice()).ok().map(Value::Uuid)
            }
            _ => None,
        },
        ValueKind::Bytes => match value {
            Value::Uuid(u) => Some(Value::Bytes(u.to_vec())),
            _ => None,
        },
        _ => None,
    }
}
