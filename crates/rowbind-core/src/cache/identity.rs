//! Cache keys.

use std::any::{self, TypeId};
use std::fmt;

/// How the command text is interpreted by the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CommandKind {
    #[default]
    Text,
    StoredProcedure,
    TableDirect,
}

/// A Rust type taking part in a query identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetType {
    id: TypeId,
    name: &'static str,
}

impl TargetType {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identity of a cached query plan.
///
/// Two identities with equal fields always map to the same plan. The target
/// type is part of the key, so one SQL text materialized into two types keeps
/// two plans.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryIdentity {
    sql: String,
    command: CommandKind,
    connection: String,
    target: TargetType,
    parameter: Option<TargetType>,
    grid_index: usize,
}

impl QueryIdentity {
    /// Identity of a text command materializing `T` on a connection.
    pub fn new<T: 'static>(sql: impl Into<String>, connection: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            command: CommandKind::Text,
            connection: connection.into(),
            target: TargetType::of::<T>(),
            parameter: None,
            grid_index: 0,
        }
    }

    pub fn with_command(mut self, command: CommandKind) -> Self {
        self.command = command;
        self
    }

    /// Record the type parameters are bound from.
    pub fn with_parameter<P: 'static>(mut self) -> Self {
        self.parameter = Some(TargetType::of::<P>());
        self
    }

    /// Select one result set of a multi-result command.
    pub fn with_grid_index(mut self, grid_index: usize) -> Self {
        self.grid_index = grid_index;
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn command(&self) -> CommandKind {
        self.command
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn target(&self) -> TargetType {
        self.target
    }

    pub fn parameter(&self) -> Option<TargetType> {
        self.parameter
    }

    pub fn grid_index(&self) -> usize {
        self.grid_index
    }
}
