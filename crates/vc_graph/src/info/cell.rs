//! Static storage for the paths of generic types.
//!
//! A `static CELL` inside a generic function is shared by every
//! instantiation, so the cell is a [`TypeIdMap`] behind a [`RwLock`].
//! Built strings are leaked once per type and live for the whole process.

use alloc::boxed::Box;
use alloc::string::String;
use core::any::{Any, TypeId};
use std::sync::{PoisonError, RwLock};

use vc_utils::TypeIdMap;

// -----------------------------------------------------------------------------
// GenericTypePathCell

/// Container for static storage of type paths with generics.
///
/// See [`TypePath`](crate::info::TypePath) for an example.
pub struct GenericTypePathCell(RwLock<TypeIdMap<&'static str>>);

impl GenericTypePathCell {
    /// Create a empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::new()))
    }

    /// Returns the string stored for `G`, building it with `f` on first use.
    #[inline(always)]
    pub fn get_or_insert<G: Any + ?Sized>(&self, f: impl FnOnce() -> String) -> &'static str {
        // Separate to reduce code compilation times
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    #[inline(never)]
    fn get_or_insert_by_type_id(&self, type_id: TypeId, f: impl FnOnce() -> String) -> &'static str {
        match self.get_by_type_id(type_id) {
            Some(path) => path,
            None => self.insert_by_type_id(type_id, f()),
        }
    }

    #[inline(never)]
    fn get_by_type_id(&self, type_id: TypeId) -> Option<&'static str> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied()
    }

    #[inline(never)]
    fn insert_by_type_id(&self, type_id: TypeId, value: String) -> &'static str {
        *self
            .0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(type_id, || {
                let leaked: &'static str = Box::leak(value.into_boxed_str());
                leaked
            })
    }
}

impl Default for GenericTypePathCell {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// concat

/// Concatenates string slices into one `String` with a single allocation.
///
/// ```
/// use vc_graph::info::concat;
/// assert_eq!(concat(&["Vec", "<", "u8", ">"]), "Vec<u8>");
/// ```
pub fn concat(parts: &[&str]) -> String {
    let len = parts.iter().map(|s| s.len()).sum();
    let mut out = String::with_capacity(len);
    for part in parts {
        out.push_str(part);
    }
    out
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;
    use std::thread;

    use super::GenericTypePathCell;

    static CELL: GenericTypePathCell = GenericTypePathCell::new();

    #[test]
    fn paths_are_built_once_per_type_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| thread::spawn(|| CELL.get_or_insert::<Vec<u8>>(|| String::from("Vec<u8>"))))
            .collect();
        let paths: Vec<&'static str> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(paths.iter().all(|p| *p == "Vec<u8>"));
        assert!(paths.windows(2).all(|w| core::ptr::eq(w[0], w[1])));

        let other = CELL.get_or_insert::<Vec<u16>>(|| String::from("Vec<u16>"));
        assert_eq!(other, "Vec<u16>");
        assert_eq!(CELL.get_or_insert::<Vec<u8>>(|| String::from("unused")), "Vec<u8>");
    }
}
