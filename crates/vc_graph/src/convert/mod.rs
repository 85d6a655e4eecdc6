//! Conversion strategies between reflected values and [`Value`]s.
//!
//! ## Menu
//!
//! - [`Converter`]: A conversion strategy for a family of types.
//! - [`ConverterOverride`]: Names a converter type in annotations.
//! - [`ConverterChain`]: Priority-ordered converter lookup with a per-type cache.
//! - Built-in converters:
//!     - [`ScalarConverter`]: numbers, `bool`, `char`, `String` and raw [`Value`]s.
//!     - [`ReflectedConverter`]: structs, member by member.
//!     - [`ListConverter`], [`MapConverter`], [`OptionConverter`]: containers.
//!     - [`SharedConverter`]: [`ObjRef`] handles, with reference tracking.
//!     - [`ExternalConverter`]: [`ExternalRef`] handles, by table index.
//!     - [`ForwardConverter`]: a type written as one of its members.
//!
//! [`ObjRef`]: crate::ObjRef
//! [`ExternalRef`]: crate::ExternalRef

// -----------------------------------------------------------------------------
// Modules

mod chain;
mod container;
mod external;
mod forward;
mod reflected;
mod scalar;
mod shared;

// -----------------------------------------------------------------------------
// Exports

pub use chain::ConverterChain;
pub use container::{ListConverter, MapConverter, OptionConverter};
pub use external::ExternalConverter;
pub use forward::ForwardConverter;
pub use reflected::ReflectedConverter;
pub use scalar::{Scalar, ScalarConverter};
pub use shared::SharedConverter;

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::any::TypeId;
use core::fmt;

use crate::info::Type;
use crate::registry::TypeMeta;
use crate::{Declared, Encoded, GraphError, GraphSerializer, Outcome, Reflect, Value};

// -----------------------------------------------------------------------------
// Converter

/// A conversion strategy between reflected values and [`Value`]s.
///
/// Converters hold no state about the graph being processed. They recurse
/// through the [`GraphSerializer`] they are handed, which owns the
/// reference, collector and cache state of the current call.
///
/// # Examples
///
/// ```
/// use vc_graph::{Declared, Encoded, GraphError, GraphSerializer, Outcome, Reflect, Value};
/// use vc_graph::convert::Converter;
/// use vc_graph::registry::TypeMeta;
///
/// /// Writes integers as strings.
/// #[derive(Default)]
/// struct Stringly;
///
/// impl Converter for Stringly {
///     fn can_process(&self, meta: &TypeMeta) -> bool {
///         meta.ty().is::<i32>()
///     }
///
///     fn encode(&self, _: &mut GraphSerializer, value: &dyn Reflect, _: &Declared) -> Encoded {
///         let n = value.downcast_ref::<i32>().copied().unwrap_or_default();
///         Encoded::new(Value::from(n.to_string()))
///     }
///
///     fn decode(
///         &self,
///         _: &mut GraphSerializer,
///         data: &Value,
///         _: &Declared,
///         slot: &mut dyn Reflect,
///     ) -> Result<Outcome, GraphError> {
///         match (data.as_str().and_then(|s| s.parse().ok()), slot.downcast_mut::<i32>()) {
///             (Some(n), Some(slot)) => {
///                 *slot = n;
///                 Ok(Outcome::success())
///             }
///             _ => Ok(Outcome::fail("expected a numeric string")),
///         }
///     }
/// }
/// ```
pub trait Converter: 'static {
    /// Returns `true` if this converter handles the type.
    fn can_process(&self, meta: &TypeMeta) -> bool;

    /// Returns `true` if shared instances of the type must be tracked by
    /// identity even when the type is not flagged `REFERENCE`.
    fn request_cycle_support(&self, _meta: &TypeMeta) -> bool {
        false
    }

    /// Returns `true` if a `$type` tag may be written for the type when
    /// its concrete type differs from the declared one.
    fn request_inheritance_support(&self, _meta: &TypeMeta) -> bool {
        true
    }

    /// Encodes `value`.
    fn encode(&self, ser: &mut GraphSerializer, value: &dyn Reflect, declared: &Declared)
    -> Encoded;

    /// Populates `slot` from `data`.
    ///
    /// `$type` and `$version` were already handled and `$content` wrappers
    /// removed, but `data` may still carry reserved keys. Converters of
    /// shared handles see the whole envelope, including `$id` and `$ref`.
    fn decode(
        &self,
        ser: &mut GraphSerializer,
        data: &Value,
        declared: &Declared,
        slot: &mut dyn Reflect,
    ) -> Result<Outcome, GraphError>;

    /// Creates a fresh instance of `ty` to decode into.
    ///
    /// Uses the instance factory of the type's schema by default.
    fn create_instance(
        &self,
        ser: &mut GraphSerializer,
        ty: Type,
    ) -> Result<Box<dyn Reflect>, GraphError> {
        ser.create_from_schema(ty)
    }
}

// -----------------------------------------------------------------------------
// ConverterOverride

/// Names a converter type, for member and type annotations.
///
/// Instances are created once per serializer and shared.
#[derive(Clone, Copy)]
pub struct ConverterOverride {
    id: TypeId,
    name: &'static str,
    make: fn() -> Rc<dyn Converter>,
}

impl ConverterOverride {
    #[inline]
    pub fn of<C: Converter + Default>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: core::any::type_name::<C>(),
            make: || Rc::new(C::default()),
        }
    }

    /// Identity of the converter type.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn make(&self) -> Rc<dyn Converter> {
        (self.make)()
    }
}

impl fmt::Debug for ConverterOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConverterOverride").field(&self.name).finish()
    }
}

// -----------------------------------------------------------------------------
// Helpers

/// Fails with a message naming the expected and the found node kinds.
pub(crate) fn unexpected(expected: &str, found: &Value, ty: Type) -> Outcome {
    Outcome::fail(alloc::format!(
        "expected {expected} for `{ty}`, found {}",
        found.kind_name()
    ))
}

/// The converter was handed a value of another type.
pub(crate) fn mismatched(converter: &str, ty: Type) -> Outcome {
    Outcome::fail(alloc::format!("{converter} cannot handle a value of `{ty}`"))
}
