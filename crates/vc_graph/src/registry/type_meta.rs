use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;
use core::ops::{Deref, DerefMut};

use vc_utils::TypeIdMap;

use crate::info::{BaseInfo, GenericInfo, MemberInfo, Type, TypeFlags, TypeKind, TypePath};
use crate::registry::{TypeRegistry, TypeTrait};

// -----------------------------------------------------------------------------
// TypeMeta

/// Runtime storage for type metadata, registered into the [`TypeRegistry`].
///
/// Holds everything the serializer knows about a type without inspecting
/// an instance: its [`TypeKind`], [`TypeFlags`], base type, implemented
/// interfaces, members, former names, generic arguments and a table of
/// [`TypeTrait`]s.
///
/// # Example
///
/// ```
/// use vc_graph::info::TypeKind;
/// use vc_graph::registry::{TypeMeta, TypeTraitDefault, FromType};
///
/// let mut meta = TypeMeta::of::<String>(TypeKind::Primitive);
/// meta.insert_trait::<TypeTraitDefault>(FromType::<String>::from_type());
///
/// let f = meta.get_trait::<TypeTraitDefault>().unwrap();
/// let s = f.default().take::<String>().unwrap();
///
/// assert_eq!(s, "");
/// ```
pub struct TypeMeta {
    ty: Type,
    kind: TypeKind,
    flags: TypeFlags,
    generics: Option<GenericInfo>,
    base: Option<BaseInfo>,
    implements: Vec<Type>,
    members: Vec<MemberInfo>,
    former_names: Vec<&'static str>,
    trait_table: TypeIdMap<Box<dyn TypeTrait>>,
}

impl TypeMeta {
    /// Create a [`TypeMeta`] without members or type traits.
    #[inline]
    pub fn of<T: TypePath + ?Sized>(kind: TypeKind) -> Self {
        Self {
            ty: Type::of::<T>(),
            kind,
            flags: TypeFlags::empty(),
            generics: None,
            base: None,
            implements: Vec::new(),
            members: Vec::new(),
            former_names: Vec::new(),
            trait_table: TypeIdMap::new(),
        }
    }

    /// Adds [`TypeFlags`].
    #[inline]
    pub fn with_flags(mut self, flags: TypeFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Declares the generic definition and arguments of a closed generic.
    #[inline]
    pub fn with_generics(mut self, generics: GenericInfo) -> Self {
        self.generics = Some(generics);
        self
    }

    /// Declares the embedded base type.
    #[inline]
    pub fn with_base(mut self, base: BaseInfo) -> Self {
        self.base = Some(base);
        self
    }

    /// Declares that the type can be assigned to the interface `I`.
    #[inline]
    pub fn with_interface<I: TypePath + ?Sized>(mut self) -> Self {
        self.implements.push(Type::of::<I>());
        self
    }

    /// Appends a member, after the already declared ones.
    #[inline]
    pub fn with_member(mut self, member: MemberInfo) -> Self {
        self.members.push(member);
        self
    }

    /// Declares a name the type was serialized under before a rename.
    #[inline]
    pub fn with_former_name(mut self, name: &'static str) -> Self {
        self.former_names.push(name);
        self
    }

    /// Inserts a [`TypeTrait`], builder style.
    #[inline]
    pub fn with_trait<T: TypeTrait>(mut self, data: T) -> Self {
        self.insert_trait(data);
        self
    }

    /// Returns the [`Type`].
    #[inline(always)]
    pub const fn ty(&self) -> Type {
        self.ty
    }

    /// Returns the [`TypeId`] of the type.
    #[inline(always)]
    pub const fn type_id(&self) -> TypeId {
        self.ty.id()
    }

    /// See [`TypePath::type_path`].
    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.ty.path()
    }

    /// See [`TypePath::type_name`].
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.ty.name()
    }

    /// See [`TypePath::type_ident`].
    #[inline]
    pub fn type_ident(&self) -> &'static str {
        self.ty.ident()
    }

    #[inline(always)]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline(always)]
    pub const fn flags(&self) -> TypeFlags {
        self.flags
    }

    /// Returns `true` if every flag of `flags` is set.
    #[inline]
    pub fn has_flags(&self, flags: TypeFlags) -> bool {
        self.flags.contains(flags)
    }

    #[inline]
    pub fn generics(&self) -> Option<&GenericInfo> {
        self.generics.as_ref()
    }

    #[inline]
    pub fn base(&self) -> Option<&BaseInfo> {
        self.base.as_ref()
    }

    /// Interfaces declared by this type, not including the base chain.
    #[inline]
    pub fn implements(&self) -> &[Type] {
        &self.implements
    }

    /// Members declared by this type, not including the base chain.
    #[inline]
    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }

    /// Returns the declared member with the given name.
    pub fn member(&self, name: &str) -> Option<&MemberInfo> {
        self.members.iter().find(|m| m.name() == name)
    }

    #[inline]
    pub fn former_names(&self) -> &[&'static str] {
        &self.former_names
    }

    /// Insert a new [`TypeTrait`].
    #[inline(always)]
    pub fn insert_trait<T: TypeTrait>(&mut self, data: T) {
        self.insert_trait_by_id(TypeId::of::<T>(), Box::new(data));
    }

    /// Block code inline.
    #[inline(never)]
    fn insert_trait_by_id(&mut self, id: TypeId, val: Box<dyn TypeTrait>) {
        self.trait_table.insert(id, val);
    }

    /// Removes a [`TypeTrait`] from the meta.
    pub fn remove_trait<T: TypeTrait>(&mut self) -> Option<Box<T>> {
        let removed: Box<dyn Any> = self.trait_table.remove(&TypeId::of::<T>())?;
        removed.downcast::<T>().ok()
    }

    /// Get a [`TypeTrait`] reference, or return `None` if it's doesn't exist.
    #[inline]
    pub fn get_trait<T: TypeTrait>(&self) -> Option<&T> {
        self.get_trait_by_id(TypeId::of::<T>())
            .and_then(<dyn TypeTrait>::downcast_ref)
    }

    /// Get a [`TypeTrait`] reference, or return `None` if it's doesn't exist.
    pub fn get_trait_by_id(&self, type_id: TypeId) -> Option<&dyn TypeTrait> {
        self.trait_table.get(&type_id).map(Deref::deref)
    }

    /// Get a mutable [`TypeTrait`] reference, or return `None` if it's doesn't exist.
    #[inline]
    pub fn get_trait_mut<T: TypeTrait>(&mut self) -> Option<&mut T> {
        self.trait_table
            .get_mut(&TypeId::of::<T>())
            .map(DerefMut::deref_mut)
            .and_then(<dyn TypeTrait>::downcast_mut)
    }

    /// Return true if specific [`TypeTrait`] is exist.
    #[inline]
    pub fn has_trait<T: TypeTrait>(&self) -> bool {
        self.trait_table.contains(&TypeId::of::<T>())
    }

    /// Return the number of [`TypeTrait`].
    #[inline]
    pub fn trait_len(&self) -> usize {
        self.trait_table.len()
    }
}

impl Clone for TypeMeta {
    fn clone(&self) -> Self {
        let mut trait_table = TypeIdMap::with_capacity(self.trait_len());
        for (id, type_trait) in self.trait_table.iter() {
            trait_table.insert(*id, (**type_trait).clone_type_trait());
        }

        Self {
            ty: self.ty,
            kind: self.kind,
            flags: self.flags,
            generics: self.generics.clone(),
            base: self.base.clone(),
            implements: self.implements.clone(),
            members: self.members.clone(),
            former_names: self.former_names.clone(),
            trait_table,
        }
    }
}

impl fmt::Debug for TypeMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMeta")
            .field("ty", &self.ty)
            .field("kind", &self.kind)
            .field("flags", &self.flags)
            .field("base", &self.base)
            .field("members", &self.members)
            .field("trait_len", &self.trait_len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// GetTypeMeta

/// A trait which allows a type to generate its [`TypeMeta`]
/// for registration into the [`TypeRegistry`].
///
/// # Implementation
///
/// ```
/// use vc_graph::{impl_reflect, impl_type_path};
/// use vc_graph::info::{MemberInfo, TypeKind};
/// use vc_graph::registry::{FromType, GetTypeMeta, TypeMeta, TypeRegistry, TypeTraitDefault};
///
/// #[derive(Default)]
/// struct Player { hp: i32 }
///
/// impl_type_path!((in game) Player);
/// impl_reflect!(Player);
///
/// impl GetTypeMeta for Player {
///     fn get_type_meta() -> TypeMeta {
///         TypeMeta::of::<Self>(TypeKind::Struct)
///             .with_member(MemberInfo::field::<Self, i32>("hp", |p| &p.hp, |p| &mut p.hp))
///             .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
///     }
///
///     fn register_dependencies(registry: &mut TypeRegistry) {
///         registry.register::<i32>();
///     }
/// }
///
/// let mut registry = TypeRegistry::empty();
/// registry.register::<Player>();
///
/// assert!(registry.get_with_type_path("game::Player").is_some());
/// assert!(registry.get_with_type_path("i32").is_some());
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `GetTypeMeta` so cannot provide type registration information",
    note = "consider implementing `GetTypeMeta` with `TypeMeta::of::<{Self}>(..)`"
)]
pub trait GetTypeMeta: TypePath {
    /// Returns the **default** [`TypeMeta`] for this type.
    fn get_type_meta() -> TypeMeta;

    /// Registers other types needed by this type.
    /// **Allow** not to register oneself.
    fn register_dependencies(_registry: &mut TypeRegistry) {}
}
