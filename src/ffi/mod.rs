//! Low-level definitions for the libgit2 boundary.
//!
//! This module contains the C-side types, status codes and the extern call
//! catalogue. Users should prefer the safe interfaces in the parent modules.

pub mod error;
pub mod raw;

pub use error::native;
pub use raw::*;
