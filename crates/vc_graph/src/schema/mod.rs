//! Memoized per-type serialization schemas.
//!
//! A [`TypeSchema`] lists the members a type writes and reads, base
//! members first, together with the [`InstanceFactory`] used to create
//! fresh instances.

// -----------------------------------------------------------------------------
// Modules

mod factory;

// -----------------------------------------------------------------------------
// Exports

pub use factory::InstanceFactory;

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;

use vc_utils::TypeIdMap;

use crate::info::{MemberFlags, MemberInfo, Type};
use crate::registry::{TypeMeta, TypeRegistry};
use crate::value::envelope;
use crate::{Declared, GraphError, Reflect};

// -----------------------------------------------------------------------------
// MemberDescriptor

/// A serialized member of a [`TypeSchema`].
///
/// Accessors of base type members are already rebased onto the schema's type.
#[derive(Clone, Debug)]
pub struct MemberDescriptor {
    info: MemberInfo,
}

impl MemberDescriptor {
    /// Declared member name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.info.name()
    }

    /// Key used in serialized maps.
    #[inline]
    pub fn serialized_name(&self) -> &'static str {
        self.info.serialized_name()
    }

    /// Storage type of the member.
    #[inline]
    pub fn storage_type(&self) -> Type {
        self.info.ty()
    }

    /// Declared type of the pointee of a shared handle.
    #[inline]
    pub fn declared_type(&self) -> Option<Type> {
        self.info.content_type()
    }

    #[inline]
    pub fn read_only(&self) -> bool {
        self.info.flags().contains(MemberFlags::READ_ONLY)
    }

    #[inline]
    pub fn write_only(&self) -> bool {
        self.info.flags().contains(MemberFlags::WRITE_ONLY)
    }

    #[inline]
    pub fn auto_instantiate(&self) -> bool {
        self.info.flags().contains(MemberFlags::AUTO_INSTANCE)
    }

    #[inline]
    pub fn serialize_as_reference(&self) -> bool {
        self.info.flags().contains(MemberFlags::AS_REFERENCE)
    }

    /// The declared context handed to converters for this member.
    pub fn declared(&self) -> Declared {
        Declared {
            ty: Some(self.info.ty()),
            content: self.info.content_type(),
            as_reference: self.serialize_as_reference(),
            auto_instantiate: self.auto_instantiate(),
            converter: self.info.converter().cloned(),
        }
    }

    #[inline]
    pub fn get<'a>(&self, owner: &'a dyn Reflect) -> Option<&'a dyn Reflect> {
        self.info.get(owner)
    }

    #[inline]
    pub fn get_mut<'a>(&self, owner: &'a mut dyn Reflect) -> Option<&'a mut dyn Reflect> {
        self.info.get_mut(owner)
    }
}

// -----------------------------------------------------------------------------
// TypeSchema

/// The serialization schema of a registered type.
#[derive(Debug)]
pub struct TypeSchema {
    ty: Type,
    members: Vec<MemberDescriptor>,
    factory: InstanceFactory,
}

impl TypeSchema {
    /// Derives the schema of a registered type.
    ///
    /// A member is serialized if it is neither static, a delegate,
    /// synthesized nor ignored, and is either public or flagged
    /// `SERIALIZE`. Members named like a reserved envelope key are
    /// dropped with a warning.
    pub fn build(registry: &TypeRegistry, meta: &TypeMeta) -> Self {
        let mut members = Vec::new();
        collect_members(registry, meta, &mut members);

        let members = members
            .into_iter()
            .filter(is_serialized)
            .filter(|info| {
                let reserved = envelope::is_reserved(info.serialized_name());
                if reserved {
                    log::warn!(
                        "member `{}` of `{}` uses the reserved key `{}` and is not serialized",
                        info.name(),
                        meta.ty(),
                        info.serialized_name(),
                    );
                }
                !reserved
            })
            .map(|info| MemberDescriptor { info })
            .collect();

        Self {
            ty: meta.ty(),
            members,
            factory: InstanceFactory::select(meta),
        }
    }

    #[inline]
    pub fn ty(&self) -> Type {
        self.ty
    }

    /// Serialized members, base type members first.
    #[inline]
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// Returns the member with the given declared name.
    pub fn member(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name() == name)
    }

    #[inline]
    pub fn factory(&self) -> &InstanceFactory {
        &self.factory
    }

    /// Creates a fresh instance with the factory.
    #[inline]
    pub fn create_instance(&self) -> Result<Box<dyn Reflect>, GraphError> {
        self.factory.create(self.ty)
    }
}

fn collect_members(registry: &TypeRegistry, meta: &TypeMeta, out: &mut Vec<MemberInfo>) {
    if let Some(base) = meta.base()
        && let Some(base_meta) = registry.get(base.ty().id())
    {
        let mut inherited = Vec::new();
        collect_members(registry, base_meta, &mut inherited);
        out.extend(inherited.iter().map(|info| info.through(base)));
    }
    out.extend(meta.members().iter().cloned());
}

fn is_serialized(info: &MemberInfo) -> bool {
    let flags = info.flags();
    let excluded = MemberFlags::STATIC
        | MemberFlags::DELEGATE
        | MemberFlags::SYNTHESIZED
        | MemberFlags::IGNORE;
    !flags.intersects(excluded) && flags.intersects(MemberFlags::PUBLIC | MemberFlags::SERIALIZE)
}

// -----------------------------------------------------------------------------
// SchemaCache

/// Memoizes [`TypeSchema`]s per type, including misses.
#[derive(Default)]
pub struct SchemaCache {
    cache: TypeIdMap<Option<Rc<TypeSchema>>>,
}

impl SchemaCache {
    #[inline]
    pub const fn new() -> Self {
        Self {
            cache: TypeIdMap::new(),
        }
    }

    /// Returns the schema of `ty`, or `None` if it is not registered.
    pub fn get(&mut self, registry: &TypeRegistry, ty: Type) -> Option<Rc<TypeSchema>> {
        self.cache
            .get_or_insert(ty.id(), || {
                registry
                    .get(ty.id())
                    .map(|meta| Rc::new(TypeSchema::build(registry, meta)))
            })
            .clone()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

// -----------------------------------------------------------------------------
// Tests
