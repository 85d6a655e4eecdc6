//! Hooks around the serialization of individual objects.
//!
//! ## Menu
//!
//! - [`ObjectProcessor`]: Observes and adjusts values and data around encode and decode.
//! - [`LifecycleProcessor`]: Runs the [`SerializationCallbacks`] of a type.
//! - [`ProcessorSet`]: The processors of a serializer, resolved and cached per type.
//! - [`CollectorStack`]: Reports collectable objects to the collectors above them.
//!
//! [`SerializationCallbacks`]: crate::registry::SerializationCallbacks

// -----------------------------------------------------------------------------
// Modules

mod collector;
mod processor;

// -----------------------------------------------------------------------------
// Exports

pub use collector::{CollectToken, CollectorStack};
pub use processor::{LifecycleProcessor, ObjectProcessor, ProcessorSet};
