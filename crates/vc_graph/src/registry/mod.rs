//! Type registry and name resolution.
//!
//! ## Menu
//!
//! - [`TypeTrait`]: A capability attached to a registered type.
//! - [`FromType`]: Creates a `TypeTrait` from a type.
//! - [`TypeMeta`]: Kind, flags, members, base type and `TypeTrait` table of a type.
//! - [`GetTypeMeta`]: Provides the `TypeMeta` of a type.
//! - [`TypeRegistry`]: The store of `TypeMeta`s, the "type universe".
//! - [`TypeResolver`]: Maps serialized type names back to types.
//! - TypeTraits:
//!     - [`TypeTraitDefault`], [`TypeTraitUninit`], [`TypeTraitHost`]: construction.
//!     - [`TypeTraitLifecycle`]: callbacks run by the built-in lifecycle processor.
//!     - [`TypeTraitCollector`], [`TypeTraitCollectable`]: collection hooks.
//!     - [`TypeTraitConverter`], [`TypeTraitForwardMember`]: converter selection.
//!     - [`TypeTraitProcessor`]: an extra per-type processor.
//!     - [`MigrationChain`], [`ForwardMigration`]: schema evolution, see [`migrate`].
//!
//! [`MigrationChain`]: crate::migrate::MigrationChain
//! [`ForwardMigration`]: crate::migrate::ForwardMigration
//! [`migrate`]: crate::migrate

// -----------------------------------------------------------------------------
// Modules

mod from_type;
mod resolver;
mod traits;
mod type_meta;
mod type_registry;
mod type_trait;

// -----------------------------------------------------------------------------
// Exports

pub(crate) use type_trait::impl_type_trait;

pub use from_type::FromType;
pub use resolver::TypeResolver;
pub use traits::{ConstructBlank, HostObject, SerializationCallbacks, SerializationCollector};
pub use traits::{TypeTraitCollectable, TypeTraitCollector, TypeTraitLifecycle};
pub use traits::{TypeTraitConverter, TypeTraitForwardMember, TypeTraitProcessor};
pub use traits::{TypeTraitDefault, TypeTraitHost, TypeTraitUninit};
pub use type_meta::{GetTypeMeta, TypeMeta};
pub use type_registry::TypeRegistry;
pub use type_trait::TypeTrait;
