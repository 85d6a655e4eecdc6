use alloc::borrow::Cow;
use alloc::boxed::Box;

use crate::convert::ConverterOverride;
use crate::info::{Type, TypePath};
use crate::{Outcome, Reflect, Value};

// -----------------------------------------------------------------------------
// Declared

/// What the enclosing context declares about a value.
///
/// Built by the serializer for top-level calls, from
/// [`MemberDescriptor::declared`] for members and with
/// [`Declared::element`] for container elements.
///
/// [`MemberDescriptor::declared`]: crate::schema::MemberDescriptor::declared
#[derive(Clone, Debug, Default)]
pub struct Declared {
    /// The declared type; `$type` is written when the concrete type differs.
    pub ty: Option<Type>,
    /// The declared type of the object behind a shared handle.
    pub content: Option<Type>,
    /// Track the shared object by identity whatever its type.
    pub as_reference: bool,
    /// Fill a null shared handle with a fresh instance when the data has none.
    pub auto_instantiate: bool,
    /// Converter named by an annotation.
    pub converter: Option<ConverterOverride>,
}

impl Declared {
    /// Declares `ty` and nothing else.
    #[inline]
    pub fn of(ty: Type) -> Self {
        Self {
            ty: Some(ty),
            ..Self::default()
        }
    }

    /// Declares `T` and nothing else.
    #[inline]
    pub fn of_type<T: TypePath + ?Sized>() -> Self {
        Self::of(Type::of::<T>())
    }

    /// Declares the elements of a container declared as `parent`.
    ///
    /// The content type and reference tracking of the container apply to
    /// its elements, its converter does not.
    #[inline]
    pub fn element(ty: Type, parent: &Declared) -> Self {
        Self {
            ty: Some(ty),
            content: parent.content,
            as_reference: parent.as_reference,
            auto_instantiate: false,
            converter: None,
        }
    }

    /// Declares the object behind a shared handle declared as `handle`.
    #[inline]
    pub fn content_of(handle: &Declared) -> Self {
        Self {
            ty: handle.content,
            ..Self::default()
        }
    }
}

// -----------------------------------------------------------------------------
// Encoded

/// The result of encoding a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub value: Value,
    pub outcome: Outcome,
}

impl Encoded {
    /// A successful encoding.
    #[inline]
    pub fn new(value: Value) -> Self {
        Self {
            value,
            outcome: Outcome::success(),
        }
    }

    #[inline]
    pub fn with(value: Value, outcome: Outcome) -> Self {
        Self { value, outcome }
    }
}

// -----------------------------------------------------------------------------
// Decoded

/// The result of decoding a fresh instance.
///
/// `instance` is `None` when the data is null or no instance could be
/// created; the outcome says which.
#[derive(Debug)]
pub struct Decoded {
    pub instance: Option<Box<dyn Reflect>>,
    pub outcome: Outcome,
}

impl Decoded {
    /// Takes the instance as a `T`.
    pub fn take<T: Reflect>(self) -> Option<T> {
        self.instance.and_then(|instance| instance.take::<T>().ok())
    }
}

// -----------------------------------------------------------------------------
// Instantiated

/// A fresh, still unpopulated instance and the data left to populate it.
pub(crate) struct Instantiated<'a> {
    pub instance: Option<Box<dyn Reflect>>,
    pub data: Cow<'a, Value>,
    pub outcome: Outcome,
}
