//! Materializer compilation.
//!
//! Compilation resolves, once per result shape, which constructor builds the
//! target, which member or parameter each column feeds, and how each value is
//! converted. The returned closure only walks the resolved bindings.

use std::cmp::Reverse;
use std::sync::Arc;

use rowbind_proto::Value;
use tracing::debug;

use super::coerce::{accepts, Converter};
use super::cursor::RowCursor;
use super::dynamic::DynamicRow;
use super::mapped::{Mapped, TypeInfo};
use super::shape::RowShape;
use crate::catalog::{MemberKind, Table};
use crate::config::MapperConfig;
use crate::error::{Error, MappingError, Result, TypeCoercionError};

/// Compiled row-to-value function.
pub type Materializer<T> = Arc<dyn Fn(&dyn RowCursor) -> Result<T> + Send + Sync>;

/// One column feeding one member or constructor parameter.
#[derive(Debug)]
struct Binding {
    ordinal: usize,
    column: String,
    slot: usize,
    member: String,
    converter: Converter,
}

impl Binding {
    fn read(&self, cursor: &dyn RowCursor, type_name: &str) -> Result<Value> {
        let value = cursor.value(self.ordinal)?;
        let kind = value.kind();
        self.converter.convert(value).ok_or_else(|| {
            Error::from(TypeCoercionError {
                type_name: type_name.to_string(),
                member: self.member.clone(),
                column: self.column.clone(),
                value_kind: kind,
                target: self.converter.target().to_string(),
            })
        })
    }
}

/// Member names each column binds to, via table metadata when available.
fn resolve_names(shape: &RowShape, table: Option<&Table>) -> Vec<String> {
    shape
        .names()
        .iter()
        .map(|name| {
            table
                .and_then(|t| t.column(name))
                .map(|c| c.member_name().to_string())
                .unwrap_or_else(|| name.clone())
        })
        .collect()
}

/// Whether table metadata binds any result column to a constructor parameter.
fn binds_constructor(shape: &RowShape, table: Option<&Table>) -> bool {
    table.is_some_and(|t| {
        shape
            .names()
            .iter()
            .filter_map(|name| t.column(name)?.member.as_ref())
            .any(|m| m.kind == MemberKind::ConstructorParameter)
    })
}

/// Compile a materializer for a mapped type.
///
/// A parameterless constructor is preferred; columns are then assigned to
/// members by name. Otherwise constructors are tried by visibility (highest
/// first) and parameter count (fewest first), and the first whose parameters
/// match every column by position, name and kind is used. Columns that table
/// metadata binds to constructor parameters force the constructor path even
/// when a parameterless constructor exists.
pub fn compile<T: Mapped>(
    shape: &RowShape,
    table: Option<&Table>,
    config: &MapperConfig,
) -> Result<Materializer<T>> {
    let info = T::type_info();
    let names = resolve_names(shape, table);

    match info.parameterless_constructor() {
        Some(ctor) if !binds_constructor(shape, table) => {
            compile_assignments::<T>(info, ctor, shape, &names, config)
        }
        _ => compile_constructor::<T>(info, shape, &names),
    }
}

fn compile_assignments<T: Mapped>(
    info: TypeInfo,
    ctor: usize,
    shape: &RowShape,
    names: &[String],
    config: &MapperConfig,
) -> Result<Materializer<T>> {
    let mut bindings = Vec::with_capacity(names.len());
    for (ordinal, name) in names.iter().enumerate() {
        let Some(slot) = info.member_index(name, config.case_insensitive_members) else {
            if config.strict_columns {
                return Err(MappingError::new(&info.name, shape.signature())
                    .with_detail(format!("column '{name}' has no matching member"))
                    .into());
            }
            continue;
        };
        let member = &info.members[slot];
        bindings.push(Binding {
            ordinal,
            column: shape.names()[ordinal].clone(),
            slot,
            member: member.name.clone(),
            converter: Converter::new(member.ty.clone()),
        });
    }

    debug!(
        target_type = %info.name,
        columns = shape.len(),
        bound = bindings.len(),
        "Compiled member-assignment materializer"
    );

    let type_name = info.name;
    Ok(Arc::new(move |cursor: &dyn RowCursor| {
        let mut target = T::construct(ctor, Vec::new())?;
        for binding in &bindings {
            let value = binding.read(cursor, &type_name)?;
            target.assign(binding.slot, value)?;
        }
        Ok(target)
    }))
}

fn compile_constructor<T: Mapped>(
    info: TypeInfo,
    shape: &RowShape,
    names: &[String],
) -> Result<Materializer<T>> {
    let mut order: Vec<usize> = (0..info.constructors.len()).collect();
    order.sort_by_key(|&i| {
        let ctor = &info.constructors[i];
        (Reverse(ctor.visibility), ctor.parameters.len())
    });

    let chosen = order.iter().copied().find(|&i| {
        let params = &info.constructors[i].parameters;
        params.len() == names.len()
            && params.iter().zip(names).enumerate().all(|(ordinal, (param, name))| {
                param.name.eq_ignore_ascii_case(name) && accepts(&param.ty, shape.kind(ordinal))
            })
    });

    let Some(ctor) = chosen else {
        let attempted = order
            .iter()
            .map(|&i| info.constructors[i].signature())
            .collect();
        return Err(MappingError::new(&info.name, shape.signature())
            .with_attempted(attempted)
            .into());
    };

    let bindings: Vec<Binding> = info.constructors[ctor]
        .parameters
        .iter()
        .enumerate()
        .map(|(ordinal, param)| Binding {
            ordinal,
            column: shape.names()[ordinal].clone(),
            slot: ordinal,
            member: param.name.clone(),
            converter: Converter::new(param.ty.clone()),
        })
        .collect();

    debug!(
        target_type = %info.name,
        constructor = %info.constructors[ctor].signature(),
        "Compiled constructor materializer"
    );

    let type_name = info.name;
    Ok(Arc::new(move |cursor: &dyn RowCursor| {
        let args = bindings
            .iter()
            .map(|b| b.read(cursor, &type_name))
            .collect::<Result<Vec<_>>>()?;
        T::construct(ctor, args)
    }))
}

/// Compile a materializer producing [`DynamicRow`]s. Nulls are preserved.
pub fn compile_dynamic(shape: &RowShape, table: Option<&Table>) -> Materializer<DynamicRow> {
    let names: Arc<[String]> = resolve_names(shape, table).into();
    let count = names.len();
    Arc::new(move |cursor: &dyn RowCursor| {
        let values = (0..count)
            .map(|ordinal| cursor.value(ordinal))
            .collect::<Result<Vec<_>>>()?;
        Ok(DynamicRow::new(Arc::clone(&names), values))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, DbType, MemberBinding};
    use crate::materialize::mapped::{MemberType, Visibility};
    use crate::materialize::MemoryCursor;
    use rowbind_proto::ValueKind;

    #[derive(Debug, Default, PartialEq)]
    struct Person {
        id: i32,
        name: String,
        nickname: Option<String>,
    }

    impl Mapped for Person {
        fn type_info() -> TypeInfo {
            TypeInfo::new("Person")
                .with_default_constructor()
                .with_property("Id", MemberType::Primitive(ValueKind::Int32))
                .with_property("Name", MemberType::Primitive(ValueKind::String))
                .with_property("Nickname", MemberType::nullable(ValueKind::String))
        }

        fn construct(_: usize, _: Vec<Value>) -> Result<Self> {
            Ok(Self::default())
        }

        fn assign(&mut self, member: usize, value: Value) -> Result<()> {
            match member {
                0 => self.id = i32::try_from(value)?,
                1 => self.name = String::try_from(value).unwrap_or_default(),
                _ => self.nickname = String::try_from(value).ok(),
            }
            Ok(())
        }

        fn member_value(&self, member: usize) -> Result<Value> {
            Ok(match member {
                0 => self.id.into(),
                1 => self.name.clone().into(),
                _ => self.nickname.clone().into(),
            })
        }
    }

    #[derive(Debug, PartialEq)]
    struct Point {
        id: i32,
        name: String,
    }

    impl Mapped for Point {
        fn type_info() -> TypeInfo {
            TypeInfo::new("Point").with_constructor(
                Visibility::Public,
                [
                    ("id", MemberType::Primitive(ValueKind::Int32)),
                    ("name", MemberType::Primitive(ValueKind::String)),
                ],
            )
        }

        fn construct(_: usize, args: Vec<Value>) -> Result<Self> {
            let mut args = args.into_iter();
            Ok(Self {
                id: i32::try_from(args.next().unwrap_or(Value::Null))?,
                name: String::try_from(args.next().unwrap_or(Value::Null)).unwrap_or_default(),
            })
        }

        fn assign(&mut self, _: usize, _: Value) -> Result<()> {
            Ok(())
        }

        fn member_value(&self, _: usize) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    fn first_row(cursor: &mut MemoryCursor) -> &dyn RowCursor {
        assert!(cursor.read().unwrap());
        cursor
    }

    #[test]
    fn test_member_assignment_case_insensitive() {
        let mut cursor = MemoryCursor::new(["id", "name", "nickname", "ignored"])
            .with_row([Value::Int64(7), Value::from("Ann"), Value::Null, Value::Bool(true)]);
        let shape = RowShape::from_cursor(&cursor).unwrap();
        let materialize = compile::<Person>(&shape, None, &MapperConfig::default()).unwrap();

        let person = materialize(first_row(&mut cursor)).unwrap();
        assert_eq!(
            person,
            Person {
                id: 7,
                name: "Ann".into(),
                nickname: None
            }
        );
    }

    #[test]
    fn test_strict_columns_reject_unbound() {
        let shape = RowShape::new(["id", "ignored"]);
        let config = MapperConfig::default().strict_columns(true);
        let err = compile::<Person>(&shape, None, &config).err().unwrap();
        match err {
            Error::Mapping(e) => assert!(e.detail.unwrap().contains("ignored")),
            other => panic!("Expected mapping error, got {other:?}"),
        }
    }

    #[test]
    fn test_table_metadata_maps_columns_to_members() {
        let table = Table::builder("people")
            .column(Column::new("person_id", DbType::Int32).with_member(MemberBinding::property("Id")))
            .column(Column::new("full_name", DbType::String).with_member(MemberBinding::property("Name")))
            .build()
            .unwrap();
        let mut cursor = MemoryCursor::new(["person_id", "full_name"])
            .with_row([Value::Int32(3), Value::from("Bo")]);
        let shape = RowShape::from_cursor(&cursor).unwrap();
        let materialize = compile::<Person>(&shape, Some(&table), &MapperConfig::default()).unwrap();
        let person = materialize(first_row(&mut cursor)).unwrap();
        assert_eq!(person.id, 3);
        assert_eq!(person.name, "Bo");
    }

    #[test]
    fn test_constructor_selection() {
        let mut cursor = MemoryCursor::new(["ID", "Name"])
            .with_kinds([ValueKind::Int32, ValueKind::String])
            .with_row([Value::Int32(1), Value::from("origin")]);
        let shape = RowShape::from_cursor(&cursor).unwrap();
        let materialize = compile::<Point>(&shape, None, &MapperConfig::default()).unwrap();
        let point = materialize(first_row(&mut cursor)).unwrap();
        assert_eq!(
            point,
            Point {
                id: 1,
                name: "origin".into()
            }
        );
    }

    #[derive(Debug, Default, PartialEq)]
    struct Tag {
        code: String,
        via_constructor: bool,
    }

    impl Mapped for Tag {
        fn type_info() -> TypeInfo {
            TypeInfo::new("Tag")
                .with_default_constructor()
                .with_property("Code", MemberType::Primitive(ValueKind::String))
                .with_constructor(Visibility::Public, [("code", MemberType::Primitive(ValueKind::String))])
        }

        fn construct(ctor: usize, args: Vec<Value>) -> Result<Self> {
            match args.into_iter().next() {
                Some(code) if ctor == 1 => Ok(Self {
                    code: String::try_from(code)?,
                    via_constructor: true,
                }),
                _ => Ok(Self::default()),
            }
        }

        fn assign(&mut self, _: usize, value: Value) -> Result<()> {
            self.code = String::try_from(value)?;
            Ok(())
        }

        fn member_value(&self, _: usize) -> Result<Value> {
            Ok(self.code.clone().into())
        }
    }

    #[test]
    fn test_constructor_parameter_binding_selects_constructor() {
        let by_property = Table::builder("tags")
            .column(Column::new("tag_code", DbType::String).with_member(MemberBinding::property("Code")))
            .build()
            .unwrap();
        let by_parameter = Table::builder("tags")
            .column(
                Column::new("tag_code", DbType::String)
                    .with_member(MemberBinding::constructor_parameter("code")),
            )
            .build()
            .unwrap();
        let config = MapperConfig::default();

        let mut cursor = MemoryCursor::new(["tag_code"]).with_row([Value::from("red")]);
        let shape = RowShape::from_cursor(&cursor).unwrap();
        let assigned = compile::<Tag>(&shape, Some(&by_property), &config).unwrap();
        let constructed = compile::<Tag>(&shape, Some(&by_parameter), &config).unwrap();

        let row = first_row(&mut cursor);
        assert_eq!(
            assigned(row).unwrap(),
            Tag {
                code: "red".into(),
                via_constructor: false
            }
        );
        assert_eq!(
            constructed(row).unwrap(),
            Tag {
                code: "red".into(),
                via_constructor: true
            }
        );
    }

    #[test]
    fn test_constructor_mismatch_names_signature() {
        let shape = RowShape::new(["id", "name", "extra"]);
        let err = compile::<Point>(&shape, None, &MapperConfig::default()).err().unwrap();
        match err {
            Error::Mapping(e) => {
                assert_eq!(e.type_name, "Point");
                assert_eq!(e.attempted, vec!["(Int32 id, String name)".to_string()]);
            }
            other => panic!("Expected mapping error, got {other:?}"),
        }
    }

    #[test]
    fn test_coercion_failure() {
        let mut cursor = MemoryCursor::new(["id"]).with_row([Value::Bytes(vec![1, 2])]);
        let shape = RowShape::from_cursor(&cursor).unwrap();
        let materialize = compile::<Person>(&shape, None, &MapperConfig::default()).unwrap();
        let err = materialize(first_row(&mut cursor)).unwrap_err();
        match err {
            Error::TypeCoercion(e) => {
                assert_eq!(e.member, "Id");
                assert_eq!(e.value_kind, ValueKind::Bytes);
                assert_eq!(e.target, "Int32");
            }
            other => panic!("Expected coercion error, got {other:?}"),
        }
    }

    #[test]
    fn test_dynamic_rows_keep_nulls() {
        let mut cursor = MemoryCursor::new(["a", "b"]).with_row([Value::Int32(1), Value::Null]);
        let shape = RowShape::from_cursor(&cursor).unwrap();
        let materialize = compile_dynamic(&shape, None);
        let row = materialize(first_row(&mut cursor)).unwrap();
        assert_eq!(row.len(), 2);
        assert!(row.contains("b"));
        assert_eq!(row.get("B"), Some(&Value::Null));
        assert_eq!(row.get("a"), Some(&Value::Int32(1)));
    }
}
