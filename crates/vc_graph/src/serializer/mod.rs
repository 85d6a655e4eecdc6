// -----------------------------------------------------------------------------
// Modules

mod context;
mod impls;
mod methods;

// -----------------------------------------------------------------------------
// Exports

pub use context::{Declared, Decoded, Encoded};
pub use impls::{GraphSerializer, SerializerConfig};

pub(crate) use context::Instantiated;
