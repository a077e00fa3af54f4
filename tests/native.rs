//! Smoke tests against the linked libgit2.
//!
//! These require the `libgit2` feature and a system libgit2; they exercise
//! the wrapper flow without needing a repository on disk.
#![cfg(feature = "libgit2")]

use git2_bridge::{calls, NativeVtable, Registry};

#[test]
fn opening_a_missing_repository_surfaces_status_and_message() {
    git2_bridge::init().expect("init should succeed");

    let registry = Registry::new(NativeVtable::libgit2());
    let err = calls::repository_open(&registry, "/nonexistent/definitely-not-a-repo").unwrap_err();
    assert!(err.is_native_call());
    assert!(err.native_code().unwrap() < 0);

    // A failed native call never registers a handle.
    assert_eq!(registry.live_handles(), 0);

    drop(registry);
    git2_bridge::shutdown();
}
