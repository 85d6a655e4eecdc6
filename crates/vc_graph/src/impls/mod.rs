//! Reflection and registration of built-in types.
//!
//! ## Implemented Menu
//!
//! - native:
//!     - `bool`, `char`
//!     - `i8`-`i64`, `u8`-`u64`, `isize`, `usize`, `f32`, `f64`
//!     - `String`
//! - containers:
//!     - `Vec<T>` as a list
//!     - `Option<T>` as an optional value
//!     - `BTreeMap<String, T>` as a string-keyed map
//! - graph:
//!     - [`Value`], stored as it is
//!     - [`ObjRef`], the shared object handle
//!     - [`ExternalRef`], the host object handle
//!
//! Containers register their element types as dependencies.
//!
//! [`Value`]: crate::Value
//! [`ObjRef`]: crate::ObjRef
//! [`ExternalRef`]: crate::ExternalRef

// -----------------------------------------------------------------------------
// Modules

mod collections;
mod graph;
mod native;

// -----------------------------------------------------------------------------
// Tests
