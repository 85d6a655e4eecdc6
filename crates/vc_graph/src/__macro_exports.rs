//! Paths used by the exported macros.
//!
//! Downstream crates may be `no_std` without `extern crate alloc`,
//! so the macros reach `Box` and friends through here.

pub use alloc::boxed::Box;
pub use core::option::Option;
pub use core::result::Result;
