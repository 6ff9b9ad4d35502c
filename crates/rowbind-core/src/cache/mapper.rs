//! Cached row mapping.

use std::any::TypeId;
use std::sync::Arc;

use rowbind_proto::Value;

use super::identity::QueryIdentity;
use super::plan_cache::PlanCache;
use crate::catalog::MetadataProvider;
use crate::config::MapperConfig;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::materialize::{
    compile, compile_dynamic, DynamicRow, Mapped, Materializer, ParameterBinder, RowCursor,
};

/// Entry point for turning result sets into values.
///
/// Wires a [`PlanCache`] to a metadata source. Cloning is cheap and clones
/// share the cache.
#[derive(Clone)]
pub struct RowMapper {
    cache: Arc<PlanCache>,
    metadata: Arc<dyn MetadataProvider>,
    config: MapperConfig,
}

impl RowMapper {
    /// Create a mapper with its own cache.
    pub fn new(metadata: Arc<dyn MetadataProvider>, config: MapperConfig) -> Result<Self> {
        let cache = Arc::new(PlanCache::new(config.cache.clone())?);
        Ok(Self {
            cache,
            metadata,
            config,
        })
    }

    /// Create a mapper sharing an existing cache.
    pub fn with_cache(
        cache: Arc<PlanCache>,
        metadata: Arc<dyn MetadataProvider>,
        config: MapperConfig,
    ) -> Self {
        Self {
            cache,
            metadata,
            config,
        }
    }

    pub fn cache(&self) -> &PlanCache {
        &self.cache
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Materializer for `T` matching the cursor's current shape.
    pub fn materializer<T: Mapped>(
        &self,
        identity: &QueryIdentity,
        cursor: &dyn RowCursor,
    ) -> Result<Materializer<T>> {
        self.cache.get_or_compile(identity, cursor, |shape| {
            let table = self.metadata.find_table_for(TypeId::of::<T>());
            compile::<T>(shape, table.as_deref(), &self.config)
        })
    }

    /// Read every remaining row of a cursor into `T`.
    pub fn query<T: Mapped>(
        &self,
        identity: &QueryIdentity,
        cursor: &mut dyn RowCursor,
    ) -> Result<Vec<T>> {
        let materialize = self.materializer::<T>(identity, cursor)?;
        let mut rows = Vec::new();
        while cursor.read()? {
            rows.push(materialize(&*cursor)?);
        }
        Ok(rows)
    }

    /// Read every remaining row of a cursor into [`DynamicRow`]s.
    pub fn query_dynamic(
        &self,
        identity: &QueryIdentity,
        cursor: &mut dyn RowCursor,
    ) -> Result<Vec<DynamicRow>> {
        let materialize = self.cache.get_or_compile(identity, cursor, |shape| {
            Ok(compile_dynamic(shape, None))
        })?;
        let mut rows = Vec::new();
        while cursor.read()? {
            rows.push(materialize(&*cursor)?);
        }
        Ok(rows)
    }

    /// Bind the members of `params` referenced by the identity's SQL.
    ///
    /// Placeholders are found with the dialect's parameter prefix, and the
    /// compiled binder is cached per identity and prefix.
    pub fn bind_parameters<P: Mapped>(
        &self,
        identity: &QueryIdentity,
        dialect: &dyn Dialect,
        params: &P,
    ) -> Result<Vec<(String, Value)>> {
        let prefix = dialect.parameter_prefix();
        let binder = self.cache.binder_or_compile(identity, prefix, || {
            ParameterBinder::<P>::compile(identity.sql(), prefix)
        });
        binder.bind(params)
    }
}

impl std::fmt::Debug for RowMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowMapper")
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, DbType, MemberBinding, MetadataRegistry, Table};
    use crate::dialect::{MySqlDialect, SqlServerDialect};
    use crate::materialize::{MemberType, MemoryCursor, TypeInfo};
    use rowbind_proto::ValueKind;

    #[derive(Debug, Default, PartialEq)]
    struct Account {
        id: i64,
        owner: String,
    }

    impl Mapped for Account {
        fn type_info() -> TypeInfo {
            TypeInfo::new("Account")
                .with_default_constructor()
                .with_property("Id", MemberType::Primitive(ValueKind::Int64))
                .with_property("Owner", MemberType::Primitive(ValueKind::String))
        }

        fn construct(_: usize, _: Vec<Value>) -> Result<Self> {
            Ok(Self::default())
        }

        fn assign(&mut self, member: usize, value: Value) -> Result<()> {
            match member {
                0 => self.id = i64::try_from(value)?,
                _ => self.owner = String::try_from(value).unwrap_or_default(),
            }
            Ok(())
        }

        fn member_value(&self, member: usize) -> Result<Value> {
            Ok(match member {
                0 => self.id.into(),
                _ => self.owner.clone().into(),
            })
        }
    }

    fn mapper() -> RowMapper {
        let registry = MetadataRegistry::new();
        registry.register_for::<Account>(
            Table::builder("accounts")
                .column(Column::new("account_id", DbType::Int64).with_member(MemberBinding::property("Id")))
                .column(Column::new("owner_name", DbType::String).with_member(MemberBinding::property("Owner")))
                .build()
                .unwrap(),
        );
        RowMapper::new(Arc::new(registry), MapperConfig::default()).unwrap()
    }

    #[test]
    fn test_query_uses_metadata_bindings() {
        let mapper = mapper();
        let identity = QueryIdentity::new::<Account>("select account_id, owner_name from accounts", "db");
        let mut cursor = MemoryCursor::new(["account_id", "owner_name"])
            .with_row([Value::Int64(1), Value::from("ann")])
            .with_row([Value::Int32(2), Value::Null]);

        let rows: Vec<Account> = mapper.query(&identity, &mut cursor).unwrap();
        assert_eq!(
            rows,
            vec![
                Account {
                    id: 1,
                    owner: "ann".into()
                },
                Account {
                    id: 2,
                    owner: String::new()
                },
            ]
        );
        assert_eq!(mapper.cache().len(), 1);
    }

    #[test]
    fn test_query_dynamic() {
        let mapper = mapper();
        let identity = QueryIdentity::new::<DynamicRow>("select 1 as one", "db");
        let mut cursor = MemoryCursor::new(["one"]).with_row([Value::Int32(1)]);
        let rows = mapper.query_dynamic(&identity, &mut cursor).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("ONE"), Some(&Value::Int32(1)));
    }

    #[test]
    fn test_bind_parameters() {
        let mapper = mapper();
        let dialect = SqlServerDialect::new();
        let identity = QueryIdentity::new::<Account>("select * from accounts where account_id = @Id", "db")
            .with_parameter::<Account>();
        let bound = mapper
            .bind_parameters(
                &identity,
                &dialect,
                &Account {
                    id: 9,
                    owner: "x".into(),
                },
            )
            .unwrap();
        assert_eq!(bound, vec![("Id".to_string(), Value::Int64(9))]);
    }

    #[test]
    fn test_bind_parameters_per_dialect_prefix() {
        let mapper = mapper();
        let sql = "select * from accounts where account_id = @Id or owner_name = ?Owner";
        let identity = QueryIdentity::new::<Account>(sql, "db").with_parameter::<Account>();
        let mut cursor = MemoryCursor::new(["account_id", "owner_name"]);
        mapper.query::<Account>(&identity, &mut cursor).unwrap();

        let account = Account {
            id: 3,
            owner: "bo".into(),
        };
        let sqlserver = mapper
            .bind_parameters(&identity, &SqlServerDialect::new(), &account)
            .unwrap();
        assert_eq!(sqlserver, vec![("Id".to_string(), Value::Int64(3))]);

        let mysql = mapper
            .bind_parameters(&identity, &MySqlDialect::new(), &account)
            .unwrap();
        assert_eq!(mysql, vec![("Owner".to_string(), Value::from("bo"))]);

        let again = mapper
            .bind_parameters(&identity, &SqlServerDialect::new(), &account)
            .unwrap();
        assert_eq!(again, sqlserver);
    }

    #[test]
    fn test_invalid_cache_config_rejected() {
        let config = MapperConfig::default().cache(crate::config::CacheConfig::default().collect_every(0));
        assert!(RowMapper::new(Arc::new(MetadataRegistry::new()), config).is_err());
    }
}
