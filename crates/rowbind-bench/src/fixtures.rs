//! Test data generation for benchmarks.
//!
//! Generators are seeded so every run sees the same rows.

use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rowbind_core::catalog::{Column, DbType, MemberBinding, PrimaryKey, Table};
use rowbind_core::materialize::{Mapped, MemberType, MemoryCursor, TypeInfo};
use rowbind_core::Result;
use rowbind_proto::{Value, ValueKind};

/// Scale factor for benchmark data generation.
#[derive(Clone, Copy, Debug, Default)]
pub enum Scale {
    /// 10 rows, for quick iteration.
    Tiny,
    Small,
    #[default]
    Medium,
    Large,
}

impl Scale {
    /// Get the row count for this scale.
    pub fn count(&self) -> usize {
        match self {
            Scale::Tiny => 10,
            Scale::Small => 100,
            Scale::Medium => 2_000,
            Scale::Large => 100_000,
        }
    }
}

/// Row type the materializer benchmarks decode into.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub active: bool,
}

impl Mapped for User {
    fn type_info() -> TypeInfo {
        TypeInfo::new("User")
            .with_default_constructor()
            .with_property("Id", MemberType::Primitive(ValueKind::Int64))
            .with_property("Name", MemberType::Primitive(ValueKind::String))
            .with_property("Email", MemberType::Primitive(ValueKind::String))
            .with_property("Age", MemberType::Primitive(ValueKind::Int32))
            .with_property("Active", MemberType::Primitive(ValueKind::Bool))
    }

    fn construct(_: usize, _: Vec<Value>) -> Result<Self> {
        Ok(Self::default())
    }

    fn assign(&mut self, member: usize, value: Value) -> Result<()> {
        match member {
            0 => self.id = i64::try_from(value)?,
            1 => self.name = String::try_from(value)?,
            2 => self.email = String::try_from(value)?,
            3 => self.age = i32::try_from(value)?,
            _ => self.active = bool::try_from(&value)?,
        }
        Ok(())
    }

    fn member_value(&self, member: usize) -> Result<Value> {
        Ok(match member {
            0 => self.id.into(),
            1 => self.name.clone().into(),
            2 => self.email.clone().into(),
            3 => self.age.into(),
            _ => self.active.into(),
        })
    }
}

/// The `users` table with snake_case columns bound to `User` members.
pub fn users_table() -> Arc<Table> {
    let table = Table::builder("users")
        .schema("app")
        .column(Column::identity("user_id").with_member(MemberBinding::property("Id")))
        .column(Column::new("full_name", DbType::String).with_length(120).with_member(MemberBinding::property("Name")))
        .column(Column::new("email", DbType::String).with_length(255))
        .column(Column::new("age", DbType::Int32))
        .column(Column::new("active", DbType::Boolean))
        .primary_key(PrimaryKey::new("pk_users", ["user_id"]))
        .build();
    match table {
        Ok(table) => Arc::new(table),
        Err(e) => panic!("invalid users fixture: {e}"),
    }
}

/// Generate users as raw column values, in `users_table` column order.
pub fn generate_users(count: usize) -> Vec<Vec<Value>> {
    const SEED: u64 = 12345;
    let mut rng = StdRng::seed_from_u64(SEED);
    let names = [
        "Alice", "Bob", "Charlie", "David", "Eve", "Frank", "Grace", "Henry", "Ivy", "Jack",
    ];

    (0..count)
        .map(|i| {
            let suffix: String = (0..6).map(|_| rng.sample(Alphanumeric) as char).collect();
            vec![
                // Drivers often widen identities; the materializer narrows back.
                Value::Int64(i as i64),
                Value::String(format!("{}_{suffix}", names[i % names.len()])),
                Value::String(format!("user{i}@example{}.com", i % 10)),
                Value::Int64(18 + i64::from(rng.gen::<u32>() % 60)),
                Value::Bool(rng.gen_bool(0.8)),
            ]
        })
        .collect()
}

/// An in-memory cursor over generated users.
pub fn user_cursor(count: usize) -> MemoryCursor {
    generate_users(count).into_iter().fold(
        MemoryCursor::new(["user_id", "full_name", "email", "age", "active"]),
        MemoryCursor::with_row,
    )
}
