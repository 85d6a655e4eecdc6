use alloc::rc::Rc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

// -----------------------------------------------------------------------------
// ExternalRef

/// A handle to an object owned by the host rather than by the graph.
///
/// External objects are never written inline. Their converter writes the
/// position of the handle in the caller's [`ExternalReferences`] table.
#[derive(Clone, Default)]
pub struct ExternalRef(Option<Rc<dyn Any>>);

impl ExternalRef {
    /// Wraps a new host object.
    #[inline]
    pub fn new<T: Any>(value: T) -> Self {
        Self(Some(Rc::new(value)))
    }

    /// Wraps an existing host handle.
    #[inline]
    pub fn from_rc(handle: Rc<dyn Any>) -> Self {
        Self(Some(handle))
    }

    #[inline]
    pub const fn null() -> Self {
        Self(None)
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0.is_none()
    }

    #[inline]
    pub fn handle(&self) -> Option<&Rc<dyn Any>> {
        self.0.as_ref()
    }

    /// Downcasts the host object.
    #[inline]
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.0.as_deref()?.downcast_ref()
    }

    /// Returns `true` if both handles point to the same host object, or are both null.
    pub fn ptr_eq(&self, other: &ExternalRef) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => same_handle(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

#[inline]
fn same_handle(a: &Rc<dyn Any>, b: &Rc<dyn Any>) -> bool {
    core::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

impl fmt::Debug for ExternalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => f.write_str("ExternalRef(null)"),
            Some(rc) => write!(f, "ExternalRef({:p})", Rc::as_ptr(rc) as *const ()),
        }
    }
}

crate::impl_type_path!((in vc_graph) ExternalRef);
crate::impl_reflect!(ExternalRef);

// -----------------------------------------------------------------------------
// ExternalReferences

/// The ordered table of host objects referenced by a document.
///
/// Filled while serializing (unseen handles are appended) and read while
/// deserializing. The table itself is stored by the caller, next to the
/// serialized document.
#[derive(Clone, Default)]
pub struct ExternalReferences {
    handles: Vec<Rc<dyn Any>>,
}

impl ExternalReferences {
    #[inline]
    pub const fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Builds a table from existing handles.
    #[inline]
    pub fn from_handles(handles: Vec<Rc<dyn Any>>) -> Self {
        Self { handles }
    }

    /// Returns the index of `handle`, appending it if unseen.
    pub fn index_or_push(&mut self, handle: &Rc<dyn Any>) -> usize {
        match self.index_of(handle) {
            Some(index) => index,
            None => {
                self.handles.push(handle.clone());
                self.handles.len() - 1
            }
        }
    }

    /// Returns the index of `handle`.
    pub fn index_of(&self, handle: &Rc<dyn Any>) -> Option<usize> {
        self.handles.iter().position(|h| same_handle(h, handle))
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Rc<dyn Any>> {
        self.handles.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    #[inline]
    pub fn handles(&self) -> &[Rc<dyn Any>] {
        &self.handles
    }
}

impl fmt::Debug for ExternalReferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalReferences")
            .field("len", &self.handles.len())
            .finish()
    }
}
