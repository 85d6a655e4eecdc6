use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use vc_utils::TypeIdMap;

use crate::registry::{TypeMeta, TypeTraitLifecycle, TypeTraitProcessor};
use crate::{Reflect, Value};

// -----------------------------------------------------------------------------
// ObjectProcessor

/// Observes and adjusts objects around their encode and decode.
///
/// Processors of a type run in this order: the processors added with
/// [`GraphSerializer::add_processor`] that accept the type, in the order
/// they were added, then the processor annotated on the type with
/// [`TypeTraitProcessor`], then the [`LifecycleProcessor`]. The `before_*`
/// hooks run in that order and the `after_*` hooks in reverse.
///
/// Every hook does nothing by default.
///
/// [`GraphSerializer::add_processor`]: crate::GraphSerializer::add_processor
pub trait ObjectProcessor: 'static {
    /// Returns `true` if this processor applies to the type.
    ///
    /// Only consulted for processors added to the serializer; annotated
    /// processors always apply to their type.
    fn can_process(&self, _meta: &TypeMeta) -> bool {
        true
    }

    /// Called before `value` is encoded.
    fn before_serialize(&self, _meta: &TypeMeta, _value: &dyn Reflect) {}

    /// Called with the encoded data of `value`, before reference ids are
    /// finalized.
    fn after_serialize(&self, _meta: &TypeMeta, _value: &dyn Reflect, _data: &mut Value) {}

    /// Called with the raw data, before migration and population.
    fn before_deserialize(&self, _meta: &TypeMeta, _data: &mut Value) {}

    /// Called once `value` is populated.
    fn after_deserialize(&self, _meta: &TypeMeta, _value: &mut dyn Reflect) {}
}

// -----------------------------------------------------------------------------
// LifecycleProcessor

/// Runs the [`TypeTraitLifecycle`] callbacks of a type.
#[derive(Default)]
pub struct LifecycleProcessor;

impl ObjectProcessor for LifecycleProcessor {
    #[inline]
    fn can_process(&self, meta: &TypeMeta) -> bool {
        meta.has_trait::<TypeTraitLifecycle>()
    }

    fn before_serialize(&self, meta: &TypeMeta, value: &dyn Reflect) {
        if let Some(lifecycle) = meta.get_trait::<TypeTraitLifecycle>() {
            lifecycle.before_serialize(value);
        }
    }

    fn after_deserialize(&self, meta: &TypeMeta, value: &mut dyn Reflect) {
        if let Some(lifecycle) = meta.get_trait::<TypeTraitLifecycle>() {
            lifecycle.after_deserialize(value);
        }
    }
}

// -----------------------------------------------------------------------------
// ProcessorSet

/// The processors of a serializer, resolved per type and cached.
pub struct ProcessorSet {
    global: Vec<Rc<dyn ObjectProcessor>>,
    annotated: TypeIdMap<Rc<dyn ObjectProcessor>>,
    lifecycle: Rc<dyn ObjectProcessor>,
    cache: TypeIdMap<Rc<[Rc<dyn ObjectProcessor>]>>,
}

impl ProcessorSet {
    pub fn new() -> Self {
        Self {
            global: Vec::new(),
            annotated: TypeIdMap::new(),
            lifecycle: Rc::new(LifecycleProcessor),
            cache: TypeIdMap::new(),
        }
    }

    /// Adds a processor after the ones already added.
    pub fn add(&mut self, processor: Rc<dyn ObjectProcessor>) {
        self.global.push(processor);
        self.cache.clear();
    }

    #[inline]
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Returns the processors of a type, in `before_*` order.
    pub fn get(&mut self, meta: &TypeMeta) -> Rc<[Rc<dyn ObjectProcessor>]> {
        if let Some(cached) = self.cache.get(&meta.type_id()) {
            return cached.clone();
        }

        let mut found: Vec<Rc<dyn ObjectProcessor>> = self
            .global
            .iter()
            .filter(|p| p.can_process(meta))
            .cloned()
            .collect();
        if let Some(annotation) = meta.get_trait::<TypeTraitProcessor>() {
            let shared = self
                .annotated
                .get_or_insert(annotation.id(), || annotation.make());
            found.push(shared.clone());
        }
        if self.lifecycle.can_process(meta) {
            found.push(self.lifecycle.clone());
        }

        let found: Rc<[Rc<dyn ObjectProcessor>]> = found.into();
        self.cache.insert(meta.type_id(), found.clone());
        found
    }
}

impl Default for ProcessorSet {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProcessorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorSet")
            .field("global", &self.global.len())
            .field("cached", &self.cache.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
