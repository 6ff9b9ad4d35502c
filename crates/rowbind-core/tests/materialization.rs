//! Integration tests for cached row materialization.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use rowbind_core::cache::{PlanCache, QueryIdentity, RowMapper};
use rowbind_core::catalog::{Column, DbType, MemberBinding, MetadataRegistry, Table};
use rowbind_core::materialize::{
    compile, EnumInfo, Mapped, MemberType, MemoryCursor, RowShape, TypeInfo, Visibility,
};
use rowbind_core::{CacheConfig, Error, MapperConfig, Result};
use rowbind_proto::{Value, ValueKind};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tier {
    Free = 0,
    Pro = 2,
}

#[derive(Debug, Default, PartialEq)]
struct Member {
    id: i32,
    name: String,
    tier: Option<Tier>,
    avatar: Option<Vec<u8>>,
}

impl Mapped for Member {
    fn type_info() -> TypeInfo {
        TypeInfo::new("Member")
            .with_default_constructor()
            .with_property("Id", MemberType::Primitive(ValueKind::Int32))
            .with_property("Name", MemberType::Primitive(ValueKind::String))
            .with_property(
                "Tier",
                MemberType::Nullable(Box::new(MemberType::Enum(
                    EnumInfo::new("Tier", ValueKind::Int32)
                        .with_variant("Free", 0)
                        .with_variant("Pro", 2),
                ))),
            )
            .with_field("avatar", MemberType::Binary)
    }

    fn construct(_: usize, _: Vec<Value>) -> Result<Self> {
        Ok(Self::default())
    }

    fn assign(&mut self, member: usize, value: Value) -> Result<()> {
        match member {
            0 => self.id = i32::try_from(value)?,
            1 => self.name = String::try_from(value)?,
            2 => {
                self.tier = match value {
                    Value::Null => None,
                    v => Some(match i32::try_from(v)? {
                        2 => Tier::Pro,
                        _ => Tier::Free,
                    }),
                }
            }
            _ => self.avatar = Vec::<u8>::try_from(value).ok(),
        }
        Ok(())
    }

    fn member_value(&self, member: usize) -> Result<Value> {
        Ok(match member {
            0 => self.id.into(),
            1 => self.name.clone().into(),
            2 => self.tier.map(|t| t as i32).into(),
            _ => self.avatar.clone().into(),
        })
    }
}

/// Only constructible through `(Int32 id, String name)`.
#[derive(Debug, PartialEq)]
struct Pair {
    id: i32,
    name: String,
}

impl Mapped for Pair {
    fn type_info() -> TypeInfo {
        TypeInfo::new("Pair").with_constructor(
            Visibility::Public,
            [
                ("id", MemberType::Primitive(ValueKind::Int32)),
                ("name", MemberType::Primitive(ValueKind::String)),
            ],
        )
    }

    fn construct(_: usize, args: Vec<Value>) -> Result<Self> {
        let mut args = args.into_iter();
        let id = i32::try_from(args.next().unwrap_or(Value::Null))?;
        let name = String::try_from(args.next().unwrap_or(Value::Null))?;
        Ok(Self { id, name })
    }

    fn assign(&mut self, _: usize, _: Value) -> Result<()> {
        Ok(())
    }

    fn member_value(&self, member: usize) -> Result<Value> {
        Ok(match member {
            0 => self.id.into(),
            _ => self.name.clone().into(),
        })
    }
}

fn mapper() -> RowMapper {
    let registry = MetadataRegistry::new();
    registry.register_for::<Member>(
        Table::builder("members")
            .column(Column::identity("member_id").with_member(MemberBinding::property("Id")))
            .column(Column::new("name", DbType::String))
            .column(Column::nullable("tier", DbType::Int32))
            .column(Column::nullable("avatar", DbType::Binary).with_member(MemberBinding::field("avatar")))
            .build()
            .unwrap(),
    );
    RowMapper::new(Arc::new(registry), MapperConfig::default()).unwrap()
}

#[test]
fn test_rows_convert_through_member_rules() {
    let mapper = mapper();
    let identity = QueryIdentity::new::<Member>("select * from members", "main");
    let mut cursor = MemoryCursor::new(["member_id", "name", "tier", "avatar"])
        .with_row([Value::Int64(1), Value::from("ann"), Value::from("pro"), Value::Bytes(vec![7])])
        .with_row([Value::Int16(2), Value::from("bo"), Value::Null, Value::Null])
        .with_row([Value::Int32(3), Value::from("cy"), Value::Int64(0), Value::Null]);

    let members: Vec<Member> = mapper.query(&identity, &mut cursor).unwrap();
    assert_eq!(
        members,
        vec![
            Member {
                id: 1,
                name: "ann".into(),
                tier: Some(Tier::Pro),
                avatar: Some(vec![7]),
            },
            Member {
                id: 2,
                name: "bo".into(),
                tier: None,
                avatar: None,
            },
            Member {
                id: 3,
                name: "cy".into(),
                tier: Some(Tier::Free),
                avatar: None,
            },
        ]
    );
}

#[test]
fn test_same_identity_and_shape_reuses_materializer() {
    let mapper = mapper();
    let identity = QueryIdentity::new::<Member>("select member_id, name from members", "main");
    let cursor = MemoryCursor::new(["member_id", "name"]);

    let first = mapper.materializer::<Member>(&identity, &cursor).unwrap();
    let hits = mapper.cache().get(&identity).unwrap().hits();
    let second = mapper.materializer::<Member>(&identity, &cursor).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(mapper.cache().get(&identity).unwrap().hits(), hits + 1);
}

#[test]
fn test_shape_change_yields_new_materializer() {
    let mapper = mapper();
    let identity = QueryIdentity::new::<Member>("select * from members", "main");

    let before = MemoryCursor::new(["member_id", "name"]);
    let first = mapper.materializer::<Member>(&identity, &before).unwrap();
    mapper.materializer::<Member>(&identity, &before).unwrap();

    let reordered = MemoryCursor::new(["name", "member_id"]);
    let second = mapper.materializer::<Member>(&identity, &reordered).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(mapper.cache().get(&identity).unwrap().hits(), 0);
}

#[test]
fn test_collection_after_default_interval() {
    let cache = PlanCache::new(CacheConfig::default()).unwrap();
    let cursor = MemoryCursor::new(["id", "name"]);
    let compile_pair = |shape: &RowShape| compile::<Pair>(shape, None, &MapperConfig::default());

    let cold = QueryIdentity::new::<Pair>("select 'cold'", "main");
    let hot = QueryIdentity::new::<Pair>("select 'hot'", "main");
    cache.get_or_compile(&cold, &cursor, compile_pair).unwrap();
    cache.get_or_compile(&hot, &cursor, compile_pair).unwrap();
    cache.get_or_compile(&hot, &cursor, compile_pair).unwrap();

    for i in 2..999 {
        let identity = QueryIdentity::new::<Pair>(format!("select {i}"), "main");
        cache.get_or_compile(&identity, &cursor, compile_pair).unwrap();
    }
    assert!(cache.get(&cold).is_some());

    let last = QueryIdentity::new::<Pair>("select 'last'", "main");
    cache.get_or_compile(&last, &cursor, compile_pair).unwrap();

    assert!(cache.get(&cold).is_none());
    assert!(cache.get(&hot).is_some());
    assert!(cache.get(&last).is_some());
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_constructor_mismatch_reports_signature() {
    let mapper = mapper();
    let identity = QueryIdentity::new::<Pair>("select id, name, extra from pairs", "main");
    let cursor = MemoryCursor::new(["id", "name", "extra"]);

    let err = mapper.materializer::<Pair>(&identity, &cursor).err().unwrap();
    match &err {
        Error::Mapping(mapping) => {
            assert_eq!(mapping.type_name, "Pair");
            assert_eq!(mapping.attempted, vec!["(Int32 id, String name)".to_string()]);
        }
        other => panic!("Expected mapping error, got {other:?}"),
    }
    assert!(err.to_string().contains("(Int32 id, String name)"));
    assert!(mapper.cache().is_empty());
}

#[test]
fn test_constructor_path_round_trips_rows() {
    let mapper = mapper();
    let identity = QueryIdentity::new::<Pair>("select id, name from pairs", "main");
    let mut cursor = MemoryCursor::new(["id", "name"])
        .with_kinds([ValueKind::Int32, ValueKind::String])
        .with_row([Value::Int32(4), Value::from("dee")]);

    let pairs: Vec<Pair> = mapper.query(&identity, &mut cursor).unwrap();
    assert_eq!(
        pairs,
        vec![Pair {
            id: 4,
            name: "dee".into()
        }]
    );
}

#[test]
fn test_coercion_failure_names_member_and_column() {
    let mapper = mapper();
    let identity = QueryIdentity::new::<Member>("select member_id from members", "main");
    let mut cursor = MemoryCursor::new(["member_id"]).with_row([Value::from("not a number")]);

    let err = mapper.query::<Member>(&identity, &mut cursor).unwrap_err();
    match err {
        Error::TypeCoercion(e) => {
            assert_eq!(e.type_name, "Member");
            assert_eq!(e.member, "Id");
            assert_eq!(e.column, "member_id");
            assert_eq!(e.value_kind, ValueKind::String);
        }
        other => panic!("Expected coercion error, got {other:?}"),
    }
}

#[test]
fn test_concurrent_lookups_share_cache() {
    let mapper = mapper();
    let identity = QueryIdentity::new::<Member>("select member_id, name from members", "main");

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let mapper = mapper.clone();
            let identity = identity.clone();
            scope.spawn(move || {
                let cursor = MemoryCursor::new(["member_id", "name"]);
                for _ in 0..25 {
                    mapper.materializer::<Member>(&identity, &cursor).unwrap();
                }
            });
        }
    });

    assert_eq!(mapper.cache().len(), 1);
    let stats = mapper.cache().stats();
    assert_eq!(stats.hits() + stats.misses(), 100);
}
