use alloc::boxed::Box;
use core::any::{Any, TypeId};
use core::fmt;

// -----------------------------------------------------------------------------
// TypeTrait

/// A capability attached to a registered type.
///
/// Type traits live in the trait table of a [`TypeMeta`] and are looked up
/// by their own type. They are usually built with [`FromType`], which
/// captures type-specific functions as plain function pointers.
///
/// [`TypeMeta`]: crate::registry::TypeMeta
/// [`FromType`]: crate::registry::FromType
pub trait TypeTrait: Any {
    /// Clones the type trait into a new box.
    fn clone_type_trait(&self) -> Box<dyn TypeTrait>;
}

impl dyn TypeTrait {
    /// Returns `true` if the underlying value is of type `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        let any: &dyn Any = self;
        any.type_id() == TypeId::of::<T>()
    }

    /// Downcasts the value to type `T` by reference.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        <dyn Any>::downcast_ref(self)
    }

    /// Downcasts the value to type `T` by mutable reference.
    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        <dyn Any>::downcast_mut(self)
    }
}

impl fmt::Debug for dyn TypeTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn TypeTrait")
    }
}

/// Implements [`TypeTrait`] for `Clone` types.
macro_rules! impl_type_trait {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::registry::TypeTrait for $ty {
                #[inline]
                fn clone_type_trait(&self) -> ::alloc::boxed::Box<dyn $crate::registry::TypeTrait> {
                    ::alloc::boxed::Box::new(::core::clone::Clone::clone(self))
                }
            }
        )+
    };
}

pub(crate) use impl_type_trait;
