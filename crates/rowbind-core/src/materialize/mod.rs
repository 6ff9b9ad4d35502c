//! Row materialization.
//!
//! A result set's [`RowShape`] and a target type are compiled once into a
//! [`Materializer`], a closure that converts the cursor's current row. The
//! plan cache keeps compiled materializers per query and shape.

mod binder;
mod coerce;
mod compiler;
mod cursor;
mod dynamic;
mod mapped;
mod shape;

pub use binder::ParameterBinder;
pub use compiler::{compile, compile_dynamic, Materializer};
pub use cursor::{MemoryCursor, RowCursor};
pub use dynamic::DynamicRow;
pub use mapped::{
    ConstructorInfo, EnumInfo, Mapped, MemberInfo, MemberType, ParameterInfo, TypeInfo,
    Visibility,
};
pub use shape::RowShape;
