//! Identity tracking of shared objects within one top-level call.

use alloc::vec::Vec;

use vc_utils::hash::{HashMap, HashSet, new_map, new_set};

use crate::ObjRef;
use crate::value::{Value, envelope};

// -----------------------------------------------------------------------------
// ReferenceManager

/// Per-call identity state of the serializer.
///
/// While encoding, every tracked object gets an id when its definition
/// starts. The definition is stamped with `$id` provisionally; a later
/// occurrence of the object is written as `{"$ref": id}` and marks the id
/// as referenced. [`finalize`](Self::finalize) then strips every `$id`
/// that nothing refers to, so objects that are never shared carry no
/// metadata.
///
/// While decoding, `$id` registers the freshly created instance before its
/// members are populated, which lets `$ref`s inside the object resolve to
/// it.
///
/// The state lives for one top-level call, delimited by
/// [`enter`](Self::enter) and [`exit`](Self::exit).
#[derive(Debug, Default)]
pub struct ReferenceManager {
    depth: usize,
    next_id: i64,
    // encode
    instance_to_id: HashMap<usize, i64>,
    stack: Vec<usize>,
    pending: HashSet<i64>,
    referenced: HashSet<i64>,
    // decode
    id_to_instance: HashMap<i64, ObjRef>,
}

impl ReferenceManager {
    #[inline]
    pub const fn new() -> Self {
        Self {
            depth: 0,
            next_id: 0,
            instance_to_id: new_map(),
            stack: Vec::new(),
            pending: new_set(),
            referenced: new_set(),
            id_to_instance: new_map(),
        }
    }

    /// Enters a call; returns `true` for the outermost one.
    pub fn enter(&mut self) -> bool {
        self.depth += 1;
        self.depth == 1
    }

    /// Leaves a call; returns `true` when the outermost one was left, in
    /// which case the state has been cleared.
    pub fn exit(&mut self) -> bool {
        self.depth = self.depth.saturating_sub(1);
        let outermost = self.depth == 0;
        if outermost {
            self.clear();
        }
        outermost
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Drops the tracked objects but keeps the call depth.
    pub fn clear(&mut self) {
        self.next_id = 0;
        self.instance_to_id.clear();
        self.stack.clear();
        self.pending.clear();
        self.referenced.clear();
        self.id_to_instance.clear();
    }

    /// Drops everything, including the call depth.
    pub fn reset(&mut self) {
        self.depth = 0;
        self.clear();
    }

    // -------------------------------------------------------------------------
    // Encoding

    /// Assigns the next id to an object whose definition starts now.
    pub fn begin_definition(&mut self, addr: usize) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.instance_to_id.insert(addr, id);
        id
    }

    /// The id of an object already defined in this call.
    #[inline]
    pub fn definition_of(&self, addr: usize) -> Option<i64> {
        self.instance_to_id.get(&addr).copied()
    }

    #[inline]
    pub fn mark_referenced(&mut self, id: i64) {
        self.referenced.insert(id);
    }

    #[inline]
    pub fn is_referenced(&self, id: i64) -> bool {
        self.referenced.contains(&id)
    }

    /// Records that the definition of `id` carries a provisional `$id`.
    #[inline]
    pub fn add_pending(&mut self, id: i64) {
        self.pending.insert(id);
    }

    /// Marks an object as being encoded.
    #[inline]
    pub fn push(&mut self, addr: usize) {
        self.stack.push(addr);
    }

    pub fn pop(&mut self, addr: usize) {
        if let Some(pos) = self.stack.iter().rposition(|a| *a == addr) {
            self.stack.remove(pos);
        }
    }

    #[inline]
    pub fn is_on_stack(&self, addr: usize) -> bool {
        self.stack.contains(&addr)
    }

    /// Strips `$id` from every pending definition that was never referenced.
    pub fn finalize(&self, value: &mut Value) {
        if self.pending.is_empty() {
            return;
        }
        self.strip_unreferenced(value);
    }

    fn strip_unreferenced(&self, value: &mut Value) {
        if let Value::Map(map) = value
            && let Ok(Some(id)) = envelope::def_id(map)
            && self.pending.contains(&id)
            && !self.referenced.contains(&id)
        {
            envelope::strip_id(value);
        }
        match value {
            Value::Map(map) => map.values_mut().for_each(|v| self.strip_unreferenced(v)),
            Value::Array(items) => items.iter_mut().for_each(|v| self.strip_unreferenced(v)),
            _ => {}
        }
    }

    // -------------------------------------------------------------------------
    // Decoding

    /// Registers the instance defined under `id`.
    pub fn register(&mut self, id: i64, object: ObjRef) {
        if self.id_to_instance.insert(id, object).is_some() {
            log::warn!("`$id` {id} is defined twice, the later definition wins");
        }
    }

    /// Returns the instance defined under `id` earlier in this call.
    #[inline]
    pub fn resolve(&self, id: i64) -> Option<ObjRef> {
        self.id_to_instance.get(&id).cloned()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::ReferenceManager;
    use crate::value::{Value, envelope};
    use crate::ObjRef;

    fn defined(id: i64, name: &str) -> Value {
        let mut value: Value = [("name", Value::from(name))].into_iter().collect();
        envelope::stamp(&mut value, envelope::ID_KEY, Value::int(id));
        value
    }

    #[test]
    fn only_outermost_exit_clears() {
        let mut refs = ReferenceManager::new();
        assert!(refs.enter());
        assert!(!refs.enter());

        let id = refs.begin_definition(0x10);
        assert_eq!(id, 0);
        assert!(!refs.exit());
        assert_eq!(refs.definition_of(0x10), Some(0));

        assert!(refs.exit());
        assert_eq!(refs.definition_of(0x10), None);
        assert_eq!(refs.begin_definition(0x20), 0);
    }

    #[test]
    fn finalize_keeps_referenced_ids_only() {
        let mut refs = ReferenceManager::new();
        let a = refs.begin_definition(1);
        let b = refs.begin_definition(2);
        refs.add_pending(a);
        refs.add_pending(b);
        refs.mark_referenced(b);

        let mut scalar = Value::int(7);
        envelope::stamp(&mut scalar, envelope::ID_KEY, Value::int(a));

        let mut root = Value::Array(alloc::vec![defined(a, "a"), defined(b, "b"), scalar]);
        refs.finalize(&mut root);

        let items = root.as_array().unwrap();
        assert_eq!(items[0].get("$id"), None);
        assert_eq!(items[1].get("$id"), Some(&Value::int(b)));
        assert_eq!(items[2], Value::int(7));
    }

    #[test]
    fn decode_registration() {
        let mut refs = ReferenceManager::new();
        let object = ObjRef::new(1_i32);
        refs.register(3, object.clone());
        assert!(refs.resolve(3).unwrap().ptr_eq(&object));
        assert!(refs.resolve(4).is_none());
    }

    #[test]
    fn stack_tracks_nesting() {
        let mut refs = ReferenceManager::new();
        refs.push(1);
        refs.push(2);
        assert!(refs.is_on_stack(1));
        refs.pop(2);
        assert!(!refs.is_on_stack(2));
        assert!(refs.is_on_stack(1));
    }
}
