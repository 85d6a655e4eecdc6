use alloc::boxed::Box;
use alloc::string::String;
use core::any::{Any, TypeId};
use core::fmt;

use crate::info::{Type, TypePath};

// -----------------------------------------------------------------------------
// Reflect

/// A value the graph serializer can inspect at runtime.
///
/// `Reflect` only provides type identity, [`Any`] casts and, for
/// containers, a structural view. Everything else (members, base type,
/// construction, migration) is statically registered in the
/// [`TypeRegistry`](crate::registry::TypeRegistry).
///
/// Implement it with [`impl_reflect!`](crate::impl_reflect):
///
/// ```
/// use vc_graph::{Reflect, impl_reflect, impl_type_path};
///
/// struct Player { hp: i32 }
///
/// impl_type_path!((in game) Player);
/// impl_reflect!(Player);
///
/// let p: &dyn Reflect = &Player { hp: 3 };
/// assert_eq!(p.reflect_type().path(), "game::Player");
/// assert_eq!(p.downcast_ref::<Player>().unwrap().hp, 3);
/// ```
pub trait Reflect: Any {
    /// Returns the handle of the underlying type.
    fn reflect_type(&self) -> Type;

    /// Replaces `self` with `value` if they have the same type.
    ///
    /// On mismatch the value is given back.
    fn set(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>>;

    /// Casts this type to a reflected value.
    #[inline(always)]
    fn as_reflect(&self) -> &dyn Reflect
    where
        Self: Sized,
    {
        self
    }

    /// Casts this type to a mutable reflected value.
    #[inline(always)]
    fn as_reflect_mut(&mut self) -> &mut dyn Reflect
    where
        Self: Sized,
    {
        self
    }

    /// Returns a structural view for containers.
    #[inline]
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Opaque
    }

    /// Returns a mutable structural view for containers.
    #[inline]
    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Opaque
    }
}

impl dyn Reflect {
    /// Returns `true` if the underlying value is of type `T`.
    #[inline(always)]
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

    /// Downcasts the value to type `T`, consuming the trait object.
    ///
    /// If the underlying value is not of type `T`, returns `Err(self)`.
    #[inline]
    pub fn downcast<T: Any>(self: Box<dyn Reflect>) -> Result<Box<T>, Box<dyn Reflect>> {
        if self.is::<T>() {
            #[expect(unsafe_code, reason = "type is already checked")]
            Ok(unsafe { <Box<dyn Any>>::downcast::<T>(self).unwrap_unchecked() })
        } else {
            Err(self)
        }
    }

    /// Downcasts the value to type `T`, unboxing and consuming the trait object.
    ///
    /// ```
    /// use vc_graph::Reflect;
    ///
    /// let x: Box<dyn Reflect> = Box::new(10_i32);
    /// assert_eq!(x.take::<i32>().ok(), Some(10));
    /// ```
    #[inline]
    pub fn take<T: Any>(self: Box<dyn Reflect>) -> Result<T, Box<dyn Reflect>> {
        self.downcast::<T>().map(|boxed| *boxed)
    }
}

impl fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dyn Reflect({})", self.reflect_type().path())
    }
}

impl TypePath for dyn Reflect {
    #[inline]
    fn type_path() -> &'static str {
        "dyn vc_graph::Reflect"
    }
    #[inline]
    fn type_name() -> &'static str {
        "dyn Reflect"
    }
    #[inline]
    fn type_ident() -> &'static str {
        "dyn Reflect"
    }
}

// -----------------------------------------------------------------------------
// Structural views

/// An immutable structural view, see [`Reflect::reflect_ref`].
pub enum ReflectRef<'a> {
    Opaque,
    List(&'a dyn ReflectList),
    Map(&'a dyn ReflectMap),
    Option(&'a dyn ReflectOption),
}

/// A mutable structural view, see [`Reflect::reflect_mut`].
pub enum ReflectMut<'a> {
    Opaque,
    List(&'a mut dyn ReflectList),
    Map(&'a mut dyn ReflectMap),
    Option(&'a mut dyn ReflectOption),
}

/// Ordered sequences.
pub trait ReflectList {
    fn len(&self) -> usize;

    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    /// Appends an element, giving it back on type mismatch.
    fn push(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>>;

    fn clear(&mut self);
}

/// String-keyed maps.
pub trait ReflectMap {
    fn len(&self) -> usize;

    /// Iterates over entries in key order.
    fn iter(&self) -> Box<dyn Iterator<Item = (&str, &dyn Reflect)> + '_>;

    /// Inserts an entry, giving the value back on type mismatch.
    fn insert(&mut self, key: String, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>>;

    fn clear(&mut self);
}

/// Optional values.
pub trait ReflectOption {
    fn get(&self) -> Option<&dyn Reflect>;

    /// Sets the value, giving it back on type mismatch.
    fn set_some(&mut self, value: Box<dyn Reflect>) -> Result<(), Box<dyn Reflect>>;

    fn set_none(&mut self);
}

// -----------------------------------------------------------------------------
// Macros

/// Implements [`TypePath`] for a non-generic type.
///
/// ```
/// use vc_graph::impl_type_path;
/// use vc_graph::info::TypePath;
///
/// struct Player;
/// struct Hp;
///
/// impl_type_path!((in game::actors) Player);
/// impl_type_path!(Hp);
///
/// assert_eq!(Player::type_path(), "game::actors::Player");
/// assert_eq!(Player::module_path(), Some("game::actors"));
/// assert_eq!(Hp::type_path(), "Hp");
/// ```
#[macro_export]
macro_rules! impl_type_path {
    ((in $first:ident $(:: $rest:ident)*) $ident:ident) => {
        impl $crate::info::TypePath for $ident {
            #[inline]
            fn type_path() -> &'static str {
                ::core::concat!(
                    ::core::stringify!($first),
                    $("::", ::core::stringify!($rest),)*
                    "::",
                    ::core::stringify!($ident)
                )
            }
            #[inline]
            fn type_name() -> &'static str {
                ::core::stringify!($ident)
            }
            #[inline]
            fn type_ident() -> &'static str {
                ::core::stringify!($ident)
            }
            #[inline]
            fn module_path() -> $crate::__macro_exports::Option<&'static str> {
                $crate::__macro_exports::Option::Some(::core::concat!(
                    ::core::stringify!($first)
                    $(, "::", ::core::stringify!($rest))*
                ))
            }
        }
    };
    ($ident:ident) => {
        impl $crate::info::TypePath for $ident {
            #[inline]
            fn type_path() -> &'static str {
                ::core::stringify!($ident)
            }
            #[inline]
            fn type_name() -> &'static str {
                ::core::stringify!($ident)
            }
            #[inline]
            fn type_ident() -> &'static str {
                ::core::stringify!($ident)
            }
        }
    };
}

/// Implements [`Reflect`] for a type that already implements [`TypePath`].
///
/// The type gets no structural view; its members are described by the
/// [`TypeMeta`](crate::registry::TypeMeta) it registers.
#[macro_export]
macro_rules! impl_reflect {
    ($ty:ty) => {
        impl $crate::Reflect for $ty {
            $crate::impl_reflect_cast_fn!();
        }
    };
}

/// The `reflect_type` and `set` methods shared by every implementation.
#[doc(hidden)]
#[macro_export]
macro_rules! impl_reflect_cast_fn {
    () => {
        #[inline]
        fn reflect_type(&self) -> $crate::info::Type {
            $crate::info::Type::of::<Self>()
        }

        fn set(
            &mut self,
            value: $crate::__macro_exports::Box<dyn $crate::Reflect>,
        ) -> $crate::__macro_exports::Result<(), $crate::__macro_exports::Box<dyn $crate::Reflect>>
        {
            *self = value.take::<Self>()?;
            $crate::__macro_exports::Result::Ok(())
        }
    };
}
