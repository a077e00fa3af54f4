//! Handle and resource lifetime bridge over the libgit2 C API.
//!
//! This crate is the core of a host-runtime binding to libgit2: a registry
//! that wraps the native library's opaque objects (repositories, commits,
//! trees, filters, ...) into host-visible integer handles, tracks which
//! handles own their native object, and performs type-correct teardown on
//! release. Composite handles additionally own a callback adapter bridging
//! a native extension point (content filters, object-database backends) to
//! a host closure.
//!
//! The thin call-through wrappers a full binding carries are deliberately
//! out of scope; a representative slice lives in [`calls`] behind the
//! `libgit2` feature.
//!
//! # Example
//!
//! ```no_run
//! use std::ptr::NonNull;
//!
//! use git2_bridge::{NativeVtable, Registry, VariantKind};
//!
//! fn main() -> git2_bridge::Result<()> {
//!     // One registry per embedding host, created at startup.
//!     let registry = Registry::new(NativeVtable::noop());
//!
//!     // A native call produced this pointer; wrap it as an owning handle.
//!     # let produced = Box::into_raw(Box::new(0u64)).cast::<std::ffi::c_void>();
//!     let native = NonNull::new(produced).expect("failed call must not be wrapped");
//!     let handle = registry.wrap(VariantKind::Repository, native, true)?;
//!
//!     // Later accesses resolve against the expected kind.
//!     let ptr = registry.resolve(handle.id(), VariantKind::Repository)?;
//!     assert_eq!(ptr, native);
//!
//!     // Explicit release tears the handle down exactly once.
//!     registry.release(handle.id())?;
//!     assert!(registry.resolve(handle.id(), VariantKind::Repository).is_err());
//!     Ok(())
//! }
//! ```

pub mod adapter;
#[cfg(feature = "libgit2")]
pub mod calls;
pub mod dispatch;
pub mod error;
pub mod ffi;
pub mod kind;
pub mod oid;
pub mod registry;

// Re-export main types at the crate root
pub use adapter::{CallbackAdapter, CallbackArgs, HostClosure, Trampoline};
pub use dispatch::{DestructorTable, NativeVtable, Teardown};
pub use error::{Error, Result};
pub use kind::VariantKind;
pub use oid::{Oid, OidPrefix};
pub use registry::{Handle, HandleId, Registry};

/// Initialize the native library.
///
/// Reference counted: safe to call multiple times, balanced by
/// [`shutdown`].
#[cfg(feature = "libgit2")]
pub fn init() -> Result<()> {
    let code = unsafe { ffi::raw::git_libgit2_init() };
    if code < 0 {
        return unsafe { ffi::error::check(code) };
    }
    Ok(())
}

/// Shut the native library down, releasing its global state once every
/// [`init`] call has been balanced.
#[cfg(feature = "libgit2")]
pub fn shutdown() {
    unsafe {
        ffi::raw::git_libgit2_shutdown();
    }
}
