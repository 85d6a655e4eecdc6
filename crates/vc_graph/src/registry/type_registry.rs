use alloc::string::String;
use alloc::vec::Vec;
use core::any::TypeId;

use vc_utils::TypeIdMap;
use vc_utils::hash::{HashMap, HashSet};

use crate::info::{Type, TypePath};
use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeTrait};
use crate::{ExternalRef, ObjRef, Reflect, Value};

// -----------------------------------------------------------------------------
// TypeRegistry

/// The type universe of a serializer.
///
/// This struct is used as the central store for type metadata.
/// [Registering] a type will generate a new [`TypeMeta`] entry in this store
/// using a type's [`GetTypeMeta`] implementation.
///
/// Besides lookups by [`TypeId`], type path and type name, the registry
/// indexes closed generics by their definition so that the resolver can
/// close a generic definition over resolved arguments.
///
/// # Example
///
/// ```
/// use vc_graph::registry::{TypeRegistry, TypeTraitDefault};
///
/// let input = "String";
/// let registry = TypeRegistry::new();
///
/// let generator = registry
///     .get_with_type_name(input).unwrap()
///     .get_trait::<TypeTraitDefault>().unwrap();
///
/// let s = generator.default();
/// assert_eq!(s.reflect_type().path(), "alloc::string::String");
///
/// let s = s.take::<String>().unwrap();
/// assert_eq!(s, "");
/// ```
///
/// [Registering]: TypeRegistry::register
pub struct TypeRegistry {
    type_meta_table: TypeIdMap<TypeMeta>,
    type_path_to_id: HashMap<&'static str, TypeId>,
    type_name_to_id: HashMap<&'static str, TypeId>,
    ambiguous_names: HashSet<&'static str>,
    generic_index: HashMap<&'static str, Vec<(Vec<TypeId>, TypeId)>>,
}

impl Default for TypeRegistry {
    /// See [`TypeRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a empty [`TypeRegistry`].
    #[inline]
    pub const fn empty() -> Self {
        Self {
            type_meta_table: TypeIdMap::new(),
            type_path_to_id: vc_utils::hash::new_map(),
            type_name_to_id: vc_utils::hash::new_map(),
            ambiguous_names: vc_utils::hash::new_set(),
            generic_index: vc_utils::hash::new_map(),
        }
    }

    /// Create a type registry with default registrations for built-in types.
    ///
    /// - `bool` `char`
    /// - `i8 - i64` `isize`
    /// - `u8 - u64` `usize`
    /// - `f32` `f64`
    /// - `String`
    /// - [`Value`], [`ObjRef`] and [`ExternalRef`]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register::<bool>();
        registry.register::<char>();
        registry.register::<u8>();
        registry.register::<u16>();
        registry.register::<u32>();
        registry.register::<u64>();
        registry.register::<usize>();
        registry.register::<i8>();
        registry.register::<i16>();
        registry.register::<i32>();
        registry.register::<i64>();
        registry.register::<isize>();
        registry.register::<f32>();
        registry.register::<f64>();
        registry.register::<String>();
        registry.register::<Value>();
        registry.register::<ObjRef>();
        registry.register::<ExternalRef>();
        registry
    }

    // # Validity
    // The type must **not** already exist.
    fn add_new_type_indices(
        type_meta: &TypeMeta,
        type_path_to_id: &mut HashMap<&'static str, TypeId>,
        type_name_to_id: &mut HashMap<&'static str, TypeId>,
        ambiguous_names: &mut HashSet<&'static str>,
        generic_index: &mut HashMap<&'static str, Vec<(Vec<TypeId>, TypeId)>>,
    ) {
        let ty = type_meta.ty();
        let type_name = ty.name();

        // Check for duplicate names.
        if !ambiguous_names.contains(type_name) {
            if type_name_to_id.contains_key(type_name) {
                type_name_to_id.remove(type_name);
                ambiguous_names.insert(type_name);
            } else {
                type_name_to_id.insert(type_name, ty.id());
            }
        }

        // For new type, assuming that the full path cannot be duplicated.
        type_path_to_id.insert(ty.path(), ty.id());

        if let Some(generics) = type_meta.generics() {
            let args = generics.args().iter().map(Type::id).collect();
            generic_index
                .entry(generics.definition())
                .or_default()
                .push((args, ty.id()));
        }
    }

    // - If key [`TypeId`] has already exist, the function will do nothing and return `false`.
    // - If the key [`TypeId`] does not exist, the function will insert value and return `true`.
    fn register_internal(
        &mut self,
        type_id: TypeId,
        get_type_meta: impl FnOnce() -> TypeMeta,
    ) -> bool {
        self.type_meta_table.try_insert(type_id, || {
            let meta = get_type_meta();
            Self::add_new_type_indices(
                &meta,
                &mut self.type_path_to_id,
                &mut self.type_name_to_id,
                &mut self.ambiguous_names,
                &mut self.generic_index,
            );
            meta
        })
    }

    /// Try add or do nothing.
    ///
    /// - If key [`TypeId`] has already exist, the function will do nothing and return `false`.
    /// - If the key [`TypeId`] does not exist, the function will insert value and return `true`.
    ///
    /// This method will _not_ register type dependencies.
    /// Use [`register`](Self::register) to register a type with its dependencies.
    #[inline]
    pub fn try_insert_type_meta(&mut self, type_meta: TypeMeta) -> bool {
        self.register_internal(type_meta.type_id(), || type_meta)
    }

    /// Insert or **Overwrite** a [`TypeMeta`].
    ///
    /// - If key [`TypeId`] has already exist, the value will be overwritten.
    ///   But the path, name and generic indices will not be modified.
    /// - If the key [`TypeId`] does not exist, the value will be inserted.
    ///
    /// This method will _not_ register type dependencies.
    pub fn insert_type_meta(&mut self, type_meta: TypeMeta) {
        if !self.type_meta_table.contains(&type_meta.type_id()) {
            Self::add_new_type_indices(
                &type_meta,
                &mut self.type_path_to_id,
                &mut self.type_name_to_id,
                &mut self.ambiguous_names,
                &mut self.generic_index,
            );
        }
        self.type_meta_table.insert(type_meta.type_id(), type_meta);
    }

    /// Attempts to register the type `T` if it has not yet been registered already.
    ///
    /// This will also recursively register any type dependencies as specified
    /// by [`GetTypeMeta::register_dependencies`]. If the meta for type `T`
    /// already exists, it will not be registered again and neither will its
    /// type dependencies.
    ///
    /// # Example
    ///
    /// ```
    /// # use core::any::TypeId;
    /// use vc_graph::registry::TypeRegistry;
    ///
    /// let mut registry = TypeRegistry::empty();
    /// registry.register::<Vec<Option<String>>>();
    ///
    /// // The main type
    /// assert!(registry.contains(TypeId::of::<Vec<Option<String>>>()));
    ///
    /// // Its type dependencies
    /// assert!(registry.contains(TypeId::of::<Option<String>>()));
    /// assert!(registry.contains(TypeId::of::<String>()));
    /// ```
    pub fn register<T: GetTypeMeta>(&mut self) {
        if self.register_internal(TypeId::of::<T>(), T::get_type_meta) {
            T::register_dependencies(self);
        }
    }

    /// Registers the type trait `D` for type `T`.
    ///
    /// # Panics
    ///
    /// Panics if `T` is not registered.
    pub fn register_type_trait<T: TypePath, D: TypeTrait + FromType<T>>(&mut self) {
        match self.type_meta_table.get_mut(&TypeId::of::<T>()) {
            Some(type_meta) => type_meta.insert_trait(D::from_type()),
            None => panic!(
                "Called `TypeRegistry::register_type_trait`, but the type `{}` of type_trait `{}` without registering",
                T::type_path(),
                core::any::type_name::<D>(),
            ),
        }
    }

    /// Whether the type with given [`TypeId`] has been registered in this registry.
    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.type_meta_table.contains(&type_id)
    }

    /// Returns the number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.type_meta_table.len()
    }

    /// Returns a reference to the [`TypeMeta`] of the type with
    /// the given [`TypeId`].
    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&TypeMeta> {
        self.type_meta_table.get(&type_id)
    }

    /// Returns a mutable reference to the [`TypeMeta`] of the type with
    /// the given [`TypeId`].
    #[inline]
    pub fn get_mut(&mut self, type_id: TypeId) -> Option<&mut TypeMeta> {
        self.type_meta_table.get_mut(&type_id)
    }

    /// Returns a reference to the [`TypeMeta`] of the type with
    /// the given [type path].
    ///
    /// [type path]: crate::info::TypePath::type_path
    pub fn get_with_type_path(&self, type_path: &str) -> Option<&TypeMeta> {
        // Manual inline
        match self.type_path_to_id.get(type_path) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Returns a reference to the [`TypeMeta`] of the type with the given [type name].
    ///
    /// If the type name is ambiguous, or if no type with the given path
    /// has been registered, returns `None`.
    ///
    /// [type name]: crate::info::TypePath::type_name
    pub fn get_with_type_name(&self, type_name: &str) -> Option<&TypeMeta> {
        match self.type_name_to_id.get(type_name) {
            Some(id) => self.get(*id),
            None => None,
        }
    }

    /// Returns `true` if the given [type name] matches multiple registered types.
    ///
    /// [type name]: crate::info::TypePath::type_name
    pub fn is_ambiguous(&self, type_name: &str) -> bool {
        self.ambiguous_names.contains(type_name)
    }

    /// Returns a reference to the [`TypeTrait`] of type `T` associated with the given [`TypeId`].
    pub fn get_type_trait<T: TypeTrait>(&self, type_id: TypeId) -> Option<&T> {
        // Manual inline
        match self.get(type_id) {
            Some(type_meta) => type_meta.get_trait::<T>(),
            None => None,
        }
    }

    /// Returns an iterator over the [`TypeMeta`]s of the registered types.
    ///
    /// The order is unspecified but stable for a given set of registrations.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TypeMeta> {
        self.type_meta_table.values()
    }

    /// Returns the registered closed generic with the given definition and arguments.
    ///
    /// ```
    /// use vc_graph::info::Type;
    /// use vc_graph::registry::TypeRegistry;
    ///
    /// let mut registry = TypeRegistry::new();
    /// registry.register::<Vec<i32>>();
    ///
    /// let ty = registry.close_generic("alloc::vec::Vec", &[Type::of::<i32>()]);
    /// assert_eq!(ty, Some(Type::of::<Vec<i32>>()));
    /// assert_eq!(registry.close_generic("alloc::vec::Vec", &[Type::of::<u8>()]), None);
    /// ```
    pub fn close_generic(&self, definition: &str, args: &[Type]) -> Option<Type> {
        let closed = self.generic_index.get(definition)?;
        let (_, id) = closed.iter().find(|(closed_args, _)| {
            closed_args.len() == args.len()
                && closed_args.iter().zip(args).all(|(a, b)| *a == b.id())
        })?;
        self.get(*id).map(TypeMeta::ty)
    }

    /// Returns `true` if a value of `ty` may be stored where `target` is declared.
    ///
    /// That is the case if the types are equal, if `target` is in the base
    /// chain of `ty`, if `target` is an interface of `ty` or of one of its
    /// bases, and for the `dyn Reflect` catch-all.
    pub fn is_assignable(&self, ty: Type, target: Type) -> bool {
        if ty == target || target.is::<dyn Reflect>() {
            return true;
        }
        let mut current = self.get(ty.id());
        while let Some(meta) = current {
            if meta.ty() == target || meta.implements().contains(&target) {
                return true;
            }
            current = meta.base().and_then(|base| self.get(base.ty().id()));
        }
        false
    }
}

impl core::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.type_path_to_id.keys()).finish()
    }
}

impl Clone for TypeRegistry {
    fn clone(&self) -> Self {
        let mut type_meta_table = TypeIdMap::with_capacity(self.type_meta_table.len());
        for (id, meta) in self.type_meta_table.iter() {
            type_meta_table.insert(*id, meta.clone());
        }
        Self {
            type_meta_table,
            type_path_to_id: self.type_path_to_id.clone(),
            type_name_to_id: self.type_name_to_id.clone(),
            ambiguous_names: self.ambiguous_names.clone(),
            generic_index: self.generic_index.clone(),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
