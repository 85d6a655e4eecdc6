//! The built-in type traits.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::any::TypeId;

use crate::convert::{Converter, ConverterOverride};
use crate::info::TypePath;
use crate::process::ObjectProcessor;
use crate::registry::{FromType, impl_type_trait};
use crate::{ObjRef, Reflect};

// -----------------------------------------------------------------------------
// Construction

/// Provides [`Default`] construction for reflected types.
///
/// ```
/// use vc_graph::registry::{TypeRegistry, TypeTraitDefault};
///
/// let registry = TypeRegistry::new();
/// let generator = registry
///     .get_with_type_name("String").unwrap()
///     .get_trait::<TypeTraitDefault>().unwrap();
///
/// assert_eq!(generator.default().take::<String>().unwrap(), "");
/// ```
#[derive(Clone)]
pub struct TypeTraitDefault {
    func: fn() -> Box<dyn Reflect>,
}

impl TypeTraitDefault {
    /// Call T's [`Default`]
    #[inline(always)]
    pub fn default(&self) -> Box<dyn Reflect> {
        (self.func)()
    }
}

impl<T: Default + TypePath + Reflect> FromType<T> for TypeTraitDefault {
    fn from_type() -> Self {
        Self {
            func: || Box::<T>::default(),
        }
    }
}

/// Types with a constructor that skips field defaults.
///
/// Used for types flagged [`CONSTRUCT_UNINIT`](crate::info::TypeFlags::CONSTRUCT_UNINIT)
/// and for types without `Default`. Every member is expected to be supplied
/// by the data afterwards.
pub trait ConstructBlank {
    fn construct_blank() -> Self;
}

/// Provides [`ConstructBlank`] construction for reflected types.
#[derive(Clone)]
pub struct TypeTraitUninit {
    func: fn() -> Box<dyn Reflect>,
}

impl TypeTraitUninit {
    #[inline(always)]
    pub fn construct(&self) -> Box<dyn Reflect> {
        (self.func)()
    }
}

impl<T: ConstructBlank + TypePath + Reflect> FromType<T> for TypeTraitUninit {
    fn from_type() -> Self {
        Self {
            func: || Box::new(T::construct_blank()),
        }
    }
}

/// Objects whose instances must be created by the host engine.
pub trait HostObject {
    fn create_host_instance() -> Self;
}

/// Provides host construction for reflected types.
///
/// Takes precedence over every other construction strategy except the
/// refusal to construct interfaces and abstract types.
#[derive(Clone)]
pub struct TypeTraitHost {
    func: fn() -> Box<dyn Reflect>,
}

impl TypeTraitHost {
    #[inline(always)]
    pub fn create(&self) -> Box<dyn Reflect> {
        (self.func)()
    }
}

impl<T: HostObject + TypePath + Reflect> FromType<T> for TypeTraitHost {
    fn from_type() -> Self {
        Self {
            func: || Box::new(T::create_host_instance()),
        }
    }
}

// -----------------------------------------------------------------------------
// Lifecycle

/// Hooks a model type runs on itself around serialization.
pub trait SerializationCallbacks {
    /// Called before the value is encoded.
    fn before_serialize(&self) {}

    /// Called once the value is fully populated.
    fn after_deserialize(&mut self) {}
}

/// Provides [`SerializationCallbacks`] to the built-in lifecycle processor.
#[derive(Clone)]
pub struct TypeTraitLifecycle {
    before_serialize: fn(&dyn Reflect),
    after_deserialize: fn(&mut dyn Reflect),
}

impl TypeTraitLifecycle {
    #[inline]
    pub fn before_serialize(&self, value: &dyn Reflect) {
        (self.before_serialize)(value);
    }

    #[inline]
    pub fn after_deserialize(&self, value: &mut dyn Reflect) {
        (self.after_deserialize)(value);
    }
}

impl<T: SerializationCallbacks + TypePath + Reflect> FromType<T> for TypeTraitLifecycle {
    fn from_type() -> Self {
        Self {
            before_serialize: |value| {
                if let Some(value) = value.downcast_ref::<T>() {
                    value.before_serialize();
                }
            },
            after_deserialize: |value| {
                if let Some(value) = value.downcast_mut::<T>() {
                    value.after_deserialize();
                }
            },
        }
    }
}

// -----------------------------------------------------------------------------
// Collection

/// A shared object receiving every collectable object found beneath it.
///
/// Depths are local: direct collectable children are reported at depth 0,
/// their collectable children at depth 1, and so on. A nested collector
/// starts its own count.
pub trait SerializationCollector {
    /// The collector was entered; `parent` is the enclosing collector.
    fn on_push(&mut self, _parent: Option<&ObjRef>) {}

    /// A collectable object was found beneath the collector.
    fn on_collect(&mut self, object: &ObjRef, depth: i32);

    /// The collector's subtree is complete.
    fn on_pop(&mut self, _parent: Option<&ObjRef>) {}
}

/// Provides [`SerializationCollector`] hooks for reflected types.
#[derive(Clone)]
pub struct TypeTraitCollector {
    on_push: fn(&mut dyn Reflect, Option<&ObjRef>),
    on_collect: fn(&mut dyn Reflect, &ObjRef, i32),
    on_pop: fn(&mut dyn Reflect, Option<&ObjRef>),
}

impl TypeTraitCollector {
    #[inline]
    pub fn on_push(&self, collector: &mut dyn Reflect, parent: Option<&ObjRef>) {
        (self.on_push)(collector, parent);
    }

    #[inline]
    pub fn on_collect(&self, collector: &mut dyn Reflect, object: &ObjRef, depth: i32) {
        (self.on_collect)(collector, object, depth);
    }

    #[inline]
    pub fn on_pop(&self, collector: &mut dyn Reflect, parent: Option<&ObjRef>) {
        (self.on_pop)(collector, parent);
    }
}

impl<T: SerializationCollector + TypePath + Reflect> FromType<T> for TypeTraitCollector {
    fn from_type() -> Self {
        Self {
            on_push: |this, parent| {
                if let Some(this) = this.downcast_mut::<T>() {
                    this.on_push(parent);
                }
            },
            on_collect: |this, object, depth| {
                if let Some(this) = this.downcast_mut::<T>() {
                    this.on_collect(object, depth);
                }
            },
            on_pop: |this, parent| {
                if let Some(this) = this.downcast_mut::<T>() {
                    this.on_pop(parent);
                }
            },
        }
    }
}

/// Marks a type whose shared instances are reported to active collectors.
#[derive(Clone, Default)]
pub struct TypeTraitCollectable;

impl<T: TypePath> FromType<T> for TypeTraitCollectable {
    #[inline]
    fn from_type() -> Self {
        Self
    }
}

// -----------------------------------------------------------------------------
// Dispatch annotations

/// Selects the converter of a type, ahead of the general converter list.
#[derive(Clone)]
pub enum TypeTraitConverter {
    /// Use this converter.
    Specific(ConverterOverride),
    /// Use the member-by-member reflected pipeline, even if another list
    /// converter would accept the type.
    Reflected,
}

impl TypeTraitConverter {
    #[inline]
    pub fn specific<C: Converter + Default>() -> Self {
        Self::Specific(ConverterOverride::of::<C>())
    }
}

/// Serializes a type as one of its members.
///
/// The type is written exactly like the named member, without a map
/// around it.
#[derive(Clone)]
pub struct TypeTraitForwardMember {
    member: &'static str,
}

impl TypeTraitForwardMember {
    #[inline]
    pub const fn new(member: &'static str) -> Self {
        Self { member }
    }

    #[inline]
    pub const fn member(&self) -> &'static str {
        self.member
    }
}

/// Attaches an extra processor to a type.
///
/// It runs after the globally registered processors.
#[derive(Clone)]
pub struct TypeTraitProcessor {
    id: TypeId,
    make: fn() -> Rc<dyn ObjectProcessor>,
}

impl TypeTraitProcessor {
    pub fn of<P: ObjectProcessor + Default>() -> Self {
        Self {
            id: TypeId::of::<P>(),
            make: || Rc::new(P::default()),
        }
    }

    /// Identity of the processor type, instances are shared per identity.
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn make(&self) -> Rc<dyn ObjectProcessor> {
        (self.make)()
    }
}

impl_type_trait!(
    TypeTraitDefault,
    TypeTraitUninit,
    TypeTraitHost,
    TypeTraitLifecycle,
    TypeTraitCollector,
    TypeTraitCollectable,
    TypeTraitConverter,
    TypeTraitForwardMember,
    TypeTraitProcessor,
);
