use alloc::vec::Vec;

use bitflags::bitflags;

use crate::info::{Type, TypePath};

// -----------------------------------------------------------------------------
// TypeKind

/// The structural category of a registered type.
///
/// Converters dispatch on it, and element types of containers are stored
/// here so that elements can be constructed during decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    /// Scalars with a dedicated converter: numbers, `bool`, `char`, `String`.
    Primitive,
    /// A record whose members are listed in its [`TypeMeta`](crate::registry::TypeMeta).
    Struct,
    /// A growable sequence.
    List { element: Type },
    /// A string-keyed map.
    Map { value: Type },
    /// An optional value.
    Option { some: Type },
    /// A shared, nullable object handle, see [`ObjRef`](crate::ObjRef).
    Shared,
    /// An opaque handle owned by the host, see [`ExternalRef`](crate::ExternalRef).
    External,
    /// A type only used as a declared type or assignment target.
    Interface,
    /// Anything else; needs a custom converter.
    Opaque,
}

impl TypeKind {
    #[inline]
    pub const fn is_list(&self) -> bool {
        matches!(self, TypeKind::List { .. })
    }
}

// -----------------------------------------------------------------------------
// TypeFlags

bitflags! {
    /// Declarative properties of a registered type.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u16 {
        /// Shared instances are tracked by identity and may be written as `$ref`.
        const REFERENCE = 1 << 0;
        /// Cannot be instantiated, only derived from.
        const ABSTRACT = 1 << 1;
        /// Cannot be instantiated, only implemented.
        const INTERFACE = 1 << 2;
        /// Construct through the blank constructor, skipping field defaults.
        const CONSTRUCT_UNINIT = 1 << 3;
        /// Plain data copied by value.
        const VALUE_TYPE = 1 << 4;
    }
}

// -----------------------------------------------------------------------------
// GenericInfo

/// The generic definition and arguments of a closed generic type.
///
/// For `alloc::vec::Vec<i32>` the definition is `alloc::vec::Vec` and the
/// single argument is `i32`.
#[derive(Clone, Debug)]
pub struct GenericInfo {
    definition: &'static str,
    args: Vec<Type>,
}

impl GenericInfo {
    /// Builds the info of `T`, taking the definition from its type path.
    pub fn of<T: TypePath>(args: &[Type]) -> Self {
        let path = T::type_path();
        let definition = match path.find('<') {
            Some(index) => &path[..index],
            None => path,
        };
        Self {
            definition,
            args: args.to_vec(),
        }
    }

    /// Path of the open generic definition.
    #[inline]
    pub fn definition(&self) -> &'static str {
        self.definition
    }

    /// Closed argument types, in declaration order.
    #[inline]
    pub fn args(&self) -> &[Type] {
        &self.args
    }
}
