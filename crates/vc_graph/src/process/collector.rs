use alloc::vec::Vec;

use crate::ObjRef;
use crate::registry::{TypeMeta, TypeTraitCollectable, TypeTraitCollector};

// -----------------------------------------------------------------------------
// CollectorStack

struct Frame {
    collector: ObjRef,
    hooks: TypeTraitCollector,
    parent: Option<ObjRef>,
    depth: i32,
    events: Vec<(ObjRef, i32)>,
}

/// What [`CollectorStack::enter`] did, to be undone by [`CollectorStack::exit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "every entered object must be exited"]
pub struct CollectToken {
    collected: bool,
    pushed: bool,
}

/// The collectors enclosing the shared object being processed.
///
/// Collection events are buffered in the collector's frame and delivered
/// when the collector is left, because the collector itself is borrowed
/// while its members are processed.
#[derive(Default)]
pub struct CollectorStack {
    frames: Vec<Frame>,
}

impl CollectorStack {
    #[inline]
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Number of active collectors.
    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drops every frame without delivering events.
    #[inline]
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Enters a shared object whose type is described by `meta`.
    ///
    /// A collectable object is reported to the innermost collector. A
    /// collector object starts a new frame and receives `on_push`.
    pub fn enter(&mut self, object: &ObjRef, meta: &TypeMeta) -> CollectToken {
        let mut token = CollectToken {
            collected: false,
            pushed: false,
        };

        if meta.has_trait::<TypeTraitCollectable>()
            && let Some(top) = self.frames.last_mut()
        {
            top.depth += 1;
            top.events.push((object.clone(), top.depth));
            token.collected = true;
        }

        if let Some(hooks) = meta.get_trait::<TypeTraitCollector>() {
            let parent = self.frames.last().map(|frame| frame.collector.clone());
            match object.try_borrow_mut() {
                Some(mut collector) => hooks.on_push(&mut *collector, parent.as_ref()),
                None => log::warn!("collector `{}` is borrowed, `on_push` skipped", meta.ty()),
            }
            self.frames.push(Frame {
                collector: object.clone(),
                hooks: hooks.clone(),
                parent,
                depth: -1,
                events: Vec::new(),
            });
            token.pushed = true;
        }

        token
    }

    /// Leaves the object entered with `token`.
    pub fn exit(&mut self, token: CollectToken) {
        if token.pushed
            && let Some(frame) = self.frames.pop()
        {
            deliver(frame);
        }
        if token.collected
            && let Some(top) = self.frames.last_mut()
        {
            top.depth -= 1;
        }
    }
}

fn deliver(frame: Frame) {
    let Some(mut collector) = frame.collector.try_borrow_mut() else {
        log::warn!("collector is borrowed when its subtree completes, events dropped");
        return;
    };
    for (object, depth) in &frame.events {
        frame.hooks.on_collect(&mut *collector, object, *depth);
    }
    frame.hooks.on_pop(&mut *collector, frame.parent.as_ref());
}

// -----------------------------------------------------------------------------
// Tests
