#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Extern Self

// Lets the exported macros name `vc_graph` both inside this crate and in
// downstream crates.
extern crate self as vc_graph;

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;

// `GenericTypePathCell` stores its table behind `std::sync::RwLock`.
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod external;
mod object;
mod outcome;
mod reflect;
mod serializer;

pub mod convert;
pub mod impls;
pub mod info;
pub mod migrate;
pub mod process;
pub mod reference;
pub mod registry;
pub mod schema;
pub mod value;

#[cfg(test)]
mod fixtures;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use error::GraphError;
pub use external::{ExternalRef, ExternalReferences};
pub use object::ObjRef;
pub use outcome::Outcome;
pub use reflect::{Reflect, ReflectList, ReflectMap, ReflectMut, ReflectOption, ReflectRef};
pub use serializer::{Declared, Decoded, Encoded, GraphSerializer, SerializerConfig};
pub use value::Value;
