use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::info::{GenericInfo, GenericTypePathCell, Type, TypeKind, TypePath, concat};
use crate::registry::{FromType, GetTypeMeta, TypeMeta, TypeRegistry, TypeTraitDefault};
use crate::{Reflect, ReflectList, ReflectMap, ReflectMut, ReflectOption, ReflectRef};

// -----------------------------------------------------------------------------
// Vec

impl<T: TypePath> TypePath for Vec<T> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["alloc::vec::Vec<", T::type_path(), ">"]))
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["Vec<", T::type_name(), ">"]))
    }

    #[inline]
    fn type_ident() -> &'static str {
        "Vec"
    }

    #[inline]
    fn module_path() -> Option<&'static str> {
        Some("alloc::vec")
    }
}

impl<T: Reflect + TypePath> Reflect for Vec<T> {
    crate::impl_reflect_cast_fn!();

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::List(self)
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::List(self)
    }
}

impl<T: Reflect + TypePath> ReflectList for Vec<T> {
    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|item| item as &dyn Reflect)
    }

    fn push(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
        Vec::push(self, value.take::<T>()?);
        Ok(())
    }

    #[inline]
    fn clear(&mut self) {
        Vec::clear(self);
    }
}

impl<T: GetTypeMeta + Reflect> GetTypeMeta for Vec<T> {
    fn get_type_meta() -> TypeMeta {
        let element = Type::of::<T>();
        TypeMeta::of::<Self>(TypeKind::List { element })
            .with_generics(GenericInfo::of::<Self>(&[element]))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}

// -----------------------------------------------------------------------------
// Option

impl<T: TypePath> TypePath for Option<T> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["core::option::Option<", T::type_path(), ">"]))
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["Option<", T::type_name(), ">"]))
    }

    #[inline]
    fn type_ident() -> &'static str {
        "Option"
    }

    #[inline]
    fn module_path() -> Option<&'static str> {
        Some("core::option")
    }
}

impl<T: Reflect + TypePath> Reflect for Option<T> {
    crate::impl_reflect_cast_fn!();

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Option(self)
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Option(self)
    }
}

impl<T: Reflect + TypePath> ReflectOption for Option<T> {
    #[inline]
    fn get(&self) -> Option<&dyn Reflect> {
        self.as_ref().map(|some| some as &dyn Reflect)
    }

    fn set_some(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
        *self = Some(value.take::<T>()?);
        Ok(())
    }

    #[inline]
    fn set_none(&mut self) {
        *self = None;
    }
}

impl<T: GetTypeMeta + Reflect> GetTypeMeta for Option<T> {
    fn get_type_meta() -> TypeMeta {
        let some = Type::of::<T>();
        TypeMeta::of::<Self>(TypeKind::Option { some })
            .with_generics(GenericInfo::of::<Self>(&[some]))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<T>();
    }
}

// -----------------------------------------------------------------------------
// BTreeMap

// Only string keys have a map representation.
impl<T: TypePath> TypePath for BTreeMap<String, T> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| {
            concat(&[
                "alloc::collections::btree::map::BTreeMap<",
                String::type_path(),
                ", ",
                T::type_path(),
                ">",
            ])
        })
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| {
            concat(&["BTreeMap<", String::type_name(), ", ", T::type_name(), ">"])
        })
    }

    #[inline]
    fn type_ident() -> &'static str {
        "BTreeMap"
    }

    #[inline]
    fn module_path() -> Option<&'static str> {
        Some("alloc::collections::btree::map")
    }
}

impl<T: Reflect + TypePath> Reflect for BTreeMap<String, T> {
    crate::impl_reflect_cast_fn!();

    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Map(self)
    }

    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Map(self)
    }
}

impl<T: Reflect + TypePath> ReflectMap for BTreeMap<String, T> {
    #[inline]
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&str, &dyn Reflect)> + '_> {
        Box::new(BTreeMap::iter(self).map(|(key, value)| (key.as_str(), value as &dyn Reflect)))
    }

    fn insert(&mut self, key: String, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>> {
        BTreeMap::insert(self, key, value.take::<T>()?);
        Ok(())
    }

    #[inline]
    fn clear(&mut self) {
        BTreeMap::clear(self);
    }
}

impl<T: GetTypeMeta + Reflect> GetTypeMeta for BTreeMap<String, T> {
    fn get_type_meta() -> TypeMeta {
        let value = Type::of::<T>();
        TypeMeta::of::<Self>(TypeKind::Map { value })
            .with_generics(GenericInfo::of::<Self>(&[Type::of::<String>(), value]))
            .with_trait::<TypeTraitDefault>(FromType::<Self>::from_type())
    }

    fn register_dependencies(registry: &mut TypeRegistry) {
        registry.register::<String>();
        registry.register::<T>();
    }
}
