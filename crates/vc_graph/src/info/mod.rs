//! Static type information.
//!
//! - [`TypePath`] / [`Type`]: stable names and runtime handles of types.
//! - [`GenericTypePathCell`]: cached paths of generic types.
//! - [`parse_generic`] / [`strip_namespace`]: parsing of serialized names.
//! - [`TypeKind`] / [`TypeFlags`] / [`GenericInfo`]: structure of a type.
//! - [`MemberInfo`] / [`BaseInfo`]: registered members and base types.

// -----------------------------------------------------------------------------
// Modules

mod cell;
mod kind;
mod member;
mod type_name;
mod type_path;

// -----------------------------------------------------------------------------
// Exports

pub use cell::{GenericTypePathCell, concat};
pub use kind::{GenericInfo, TypeFlags, TypeKind};
pub use member::{BaseInfo, MemberFlags, MemberInfo};
pub use type_name::{GenericName, parse_generic, strip_namespace};
pub use type_path::{Type, TypePath, TypePathTable};
