use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Ref, RefCell, RefMut};
use core::fmt;

use crate::Reflect;
use crate::info::Type;

// -----------------------------------------------------------------------------
// ObjRef

/// A shared, nullable, polymorphic object handle.
///
/// Object graphs with sharing and cycles are built from `ObjRef`s. Two
/// handles to the same allocation are the same object: the serializer
/// tracks them by address and writes later occurrences as `$ref` when the
/// pointee type is registered with [`TypeFlags::REFERENCE`].
///
/// The pointee is a `Box<dyn Reflect>`, so a handle declared for an
/// interface may hold any implementing type.
///
/// Cycles of `ObjRef` are reference-counted cycles and are never freed
/// unless the caller breaks them.
///
/// # Examples
///
/// ```
/// use vc_graph::ObjRef;
///
/// let a = ObjRef::new(5_i32);
/// let b = a.clone();
/// *b.get_mut::<i32>().unwrap() += 1;
///
/// assert!(a.ptr_eq(&b));
/// assert_eq!(*a.get::<i32>().unwrap(), 6);
/// ```
///
/// [`TypeFlags::REFERENCE`]: crate::info::TypeFlags::REFERENCE
#[derive(Clone, Default)]
pub struct ObjRef(Option<Rc<RefCell<Box<dyn Reflect>>>>);

impl ObjRef {
    /// Allocates a new shared object.
    #[inline]
    pub fn new<T: Reflect>(value: T) -> Self {
        Self::from_boxed(Box::new(value))
    }

    /// Allocates a new shared object from a boxed value.
    #[inline]
    pub fn from_boxed(value: Box<dyn Reflect>) -> Self {
        Self(Some(Rc::new(RefCell::new(value))))
    }

    /// The null handle.
    #[inline]
    pub const fn null() -> Self {
        Self(None)
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// Returns `true` if both handles point to the same object, or are both null.
    #[inline]
    pub fn ptr_eq(&self, other: &ObjRef) -> bool {
        self.addr() == other.addr()
    }

    /// Identity of the pointee, stable while any handle is alive.
    #[inline]
    pub fn addr(&self) -> Option<usize> {
        self.0.as_ref().map(|rc| Rc::as_ptr(rc) as *const () as usize)
    }

    /// Concrete type of the pointee.
    ///
    /// Returns `None` for null handles and for objects currently borrowed mutably.
    pub fn content_type(&self) -> Option<Type> {
        let rc = self.0.as_ref()?;
        let inner = rc.try_borrow().ok()?;
        Some(inner.reflect_type())
    }

    /// Borrows the pointee.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently borrowed mutably.
    pub fn borrow(&self) -> Option<Ref<'_, dyn Reflect>> {
        let rc = self.0.as_ref()?;
        Some(Ref::map(rc.borrow(), |inner| &**inner))
    }

    /// Borrows the pointee mutably.
    ///
    /// # Panics
    ///
    /// Panics if the object is currently borrowed.
    pub fn borrow_mut(&self) -> Option<RefMut<'_, dyn Reflect>> {
        let rc = self.0.as_ref()?;
        Some(RefMut::map(rc.borrow_mut(), |inner| &mut **inner))
    }

    /// Borrows the pointee mutably, or returns `None` if null or already borrowed.
    pub fn try_borrow_mut(&self) -> Option<RefMut<'_, dyn Reflect>> {
        let rc = self.0.as_ref()?;
        let inner = rc.try_borrow_mut().ok()?;
        Some(RefMut::map(inner, |inner| &mut **inner))
    }

    /// Borrows the pointee as a `T`.
    pub fn get<T: Reflect>(&self) -> Option<Ref<'_, T>> {
        let rc = self.0.as_ref()?;
        Ref::filter_map(rc.borrow(), |inner| inner.downcast_ref::<T>()).ok()
    }

    /// Borrows the pointee mutably as a `T`.
    pub fn get_mut<T: Reflect>(&self) -> Option<RefMut<'_, T>> {
        let rc = self.0.as_ref()?;
        RefMut::filter_map(rc.borrow_mut(), |inner| inner.downcast_mut::<T>()).ok()
    }
}

impl PartialEq for ObjRef {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjRef {}

impl fmt::Debug for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.addr(), self.content_type()) {
            (None, _) => f.write_str("ObjRef(null)"),
            (Some(addr), Some(ty)) => write!(f, "ObjRef({ty} @ {addr:#x})"),
            (Some(addr), None) => write!(f, "ObjRef(<borrowed> @ {addr:#x})"),
        }
    }
}

crate::impl_type_path!((in vc_graph) ObjRef);
crate::impl_reflect!(ObjRef);
