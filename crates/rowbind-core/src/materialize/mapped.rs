//! Type descriptions for mapped Rust types.
//!
//! A mapped type describes its members and constructors once through
//! [`Mapped::type_info`], and exposes index-based construction and
//! assignment. The compiler resolves names and conversions against the
//! description up front, so per-row work is a sequence of indexed calls.

use std::fmt;

use rowbind_proto::{Value, ValueKind};

use crate::catalog::MemberKind;
use crate::error::Result;

/// Constructor visibility. Higher variants are tried first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Visibility {
    Private,
    Crate,
    Public,
}

/// An enum type and its named discriminants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumInfo {
    pub name: String,
    /// Integral kind discriminants are stored as.
    pub underlying: ValueKind,
    pub variants: Vec<(String, i64)>,
}

impl EnumInfo {
    pub fn new(name: impl Into<String>, underlying: ValueKind) -> Self {
        Self {
            name: name.into(),
            underlying,
            variants: Vec::new(),
        }
    }

    pub fn with_variant(mut self, name: impl Into<String>, discriminant: i64) -> Self {
        self.variants.push((name.into(), discriminant));
        self
    }

    /// Discriminant of a variant, matched by name ignoring case.
    pub fn discriminant(&self, name: &str) -> Option<i64> {
        self.variants
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
            .map(|(_, d)| *d)
    }
}

/// Type of a member or constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberType {
    /// A primitive held directly in a [`Value`] of this kind.
    Primitive(ValueKind),
    /// An enum stored as its underlying integral kind.
    Enum(EnumInfo),
    /// An optional value; null maps to `None`.
    Nullable(Box<MemberType>),
    /// Opaque binary wrapper filled from byte arrays.
    Binary,
    /// Accepts any value unchanged.
    Any,
}

impl MemberType {
    /// Shorthand for `Nullable(Primitive(kind))`.
    pub fn nullable(kind: ValueKind) -> Self {
        MemberType::Nullable(Box::new(MemberType::Primitive(kind)))
    }

    /// The type with any `Nullable` wrapper removed.
    pub fn underlying(&self) -> &MemberType {
        match self {
            MemberType::Nullable(inner) => inner.underlying(),
            other => other,
        }
    }

    /// Check if null is a valid value without substituting a default.
    ///
    /// True for nullable wrappers and for reference-like types.
    pub fn accepts_null(&self) -> bool {
        match self {
            MemberType::Nullable(_) | MemberType::Binary | MemberType::Any => true,
            MemberType::Primitive(kind) => {
                matches!(kind, ValueKind::String | ValueKind::Bytes | ValueKind::Null)
            }
            MemberType::Enum(_) => false,
        }
    }

    /// Value a non-nullable value type receives for a database null.
    pub fn default_value(&self) -> Value {
        if self.accepts_null() {
            return Value::Null;
        }
        match self {
            MemberType::Primitive(kind) => zero(*kind),
            MemberType::Enum(info) => zero(info.underlying),
            _ => Value::Null,
        }
    }
}

fn zero(kind: ValueKind) -> Value {
    match kind {
        ValueKind::Bool => Value::Bool(false),
        ValueKind::Int8 => Value::Int8(0),
        ValueKind::Int16 => Value::Int16(0),
        ValueKind::Int32 => Value::Int32(0),
        ValueKind::Int64 => Value::Int64(0),
        ValueKind::UInt8 => Value::UInt8(0),
        ValueKind::Float32 => Value::Float32(0.0),
        ValueKind::Float64 => Value::Float64(0.0),
        ValueKind::Decimal => Value::Decimal("0".into()),
        ValueKind::Timestamp => Value::Timestamp(0),
        ValueKind::Uuid => Value::Uuid([0; 16]),
        ValueKind::String | ValueKind::Bytes | ValueKind::Null => Value::Null,
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberType::Primitive(kind) => f.write_str(kind.type_name()),
            MemberType::Enum(info) => f.write_str(&info.name),
            MemberType::Nullable(inner) => write!(f, "{inner}?"),
            MemberType::Binary => f.write_str("Binary"),
            MemberType::Any => f.write_str("Object"),
        }
    }
}

/// A settable member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub name: String,
    pub ty: MemberType,
    pub kind: MemberKind,
}

/// A constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    pub name: String,
    pub ty: MemberType,
}

/// A constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorInfo {
    pub visibility: Visibility,
    pub parameters: Vec<ParameterInfo>,
}

impl ConstructorInfo {
    pub fn is_parameterless(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Signature such as `(Int32 id, String name)`.
    pub fn signature(&self) -> String {
        let params = self
            .parameters
            .iter()
            .map(|p| format!("{} {}", p.ty, p.name))
            .collect::<Vec<_>>()
            .join(", ");
        format!("({params})")
    }
}

/// Description of a mapped type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub name: String,
    pub members: Vec<MemberInfo>,
    pub constructors: Vec<ConstructorInfo>,
}

impl TypeInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// Add a settable property.
    pub fn with_property(mut self, name: impl Into<String>, ty: MemberType) -> Self {
        self.members.push(MemberInfo {
            name: name.into(),
            ty,
            kind: MemberKind::Property,
        });
        self
    }

    /// Add a plain field.
    pub fn with_field(mut self, name: impl Into<String>, ty: MemberType) -> Self {
        self.members.push(MemberInfo {
            name: name.into(),
            ty,
            kind: MemberKind::Field,
        });
        self
    }

    /// Add a constructor. Its index is its position in declaration order.
    pub fn with_constructor(
        mut self,
        visibility: Visibility,
        parameters: impl IntoIterator<Item = (&'static str, MemberType)>,
    ) -> Self {
        self.constructors.push(ConstructorInfo {
            visibility,
            parameters: parameters
                .into_iter()
                .map(|(name, ty)| ParameterInfo {
                    name: name.to_string(),
                    ty,
                })
                .collect(),
        });
        self
    }

    /// Add a public parameterless constructor.
    pub fn with_default_constructor(self) -> Self {
        self.with_constructor(Visibility::Public, [])
    }

    /// Index of the parameterless constructor, if declared.
    pub fn parameterless_constructor(&self) -> Option<usize> {
        self.constructors.iter().position(ConstructorInfo::is_parameterless)
    }

    /// Find a member by exact name, then by name ignoring case when allowed.
    pub fn member_index(&self, name: &str, case_insensitive: bool) -> Option<usize> {
        self.members.iter().position(|m| m.name == name).or_else(|| {
            case_insensitive
                .then(|| {
                    self.members
                        .iter()
                        .position(|m| m.name.eq_ignore_ascii_case(name))
                })
                .flatten()
        })
    }
}

/// A Rust type rows can be materialized into.
///
/// Indexes passed to `construct`, `assign` and `member_value` refer to the
/// constructors and members of [`Mapped::type_info`] in declaration order.
/// Arguments arrive already converted to the declared [`MemberType`]: enums
/// as their underlying integral value, nullable members as `Value::Null`
/// when absent.
pub trait Mapped: Sized + 'static {
    /// Describe members and constructors.
    fn type_info() -> TypeInfo;

    /// Build an instance with a constructor.
    fn construct(constructor: usize, args: Vec<Value>) -> Result<Self>;

    /// Set a member.
    fn assign(&mut self, member: usize, value: Value) -> Result<()>;

    /// Read a member, used to bind parameters from an instance.
    fn member_value(&self, member: usize) -> Result<Value>;
}
