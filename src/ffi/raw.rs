//! Raw C definitions for the libgit2 boundary.
//!
//! Status codes, C structs and opaque object types are always available so
//! the rest of the crate can name them. The extern catalogue itself links
//! the system libgit2 and is gated behind the `libgit2` feature.

#![allow(non_camel_case_types)]

use std::os::raw::{c_char, c_int};

/// Status code returned by native calls. Zero is success.
pub type GitErrorCode = c_int;

// Status codes
pub const GIT_OK: GitErrorCode = 0;
pub const GIT_ERROR: GitErrorCode = -1;
pub const GIT_ENOTFOUND: GitErrorCode = -3;
pub const GIT_EEXISTS: GitErrorCode = -4;
pub const GIT_EAMBIGUOUS: GitErrorCode = -5;
pub const GIT_EBUFS: GitErrorCode = -6;
pub const GIT_EUSER: GitErrorCode = -7;
pub const GIT_EBAREREPO: GitErrorCode = -8;
pub const GIT_EUNBORNBRANCH: GitErrorCode = -9;
pub const GIT_EUNMERGED: GitErrorCode = -10;
pub const GIT_ENONFASTFORWARD: GitErrorCode = -11;
pub const GIT_EINVALIDSPEC: GitErrorCode = -12;
pub const GIT_ECONFLICT: GitErrorCode = -13;
pub const GIT_ELOCKED: GitErrorCode = -14;
pub const GIT_EMODIFIED: GitErrorCode = -15;
pub const GIT_EAUTH: GitErrorCode = -16;
pub const GIT_ITEROVER: GitErrorCode = -31;

// Reset kinds
pub const GIT_RESET_SOFT: c_int = 1;
pub const GIT_RESET_MIXED: c_int = 2;
pub const GIT_RESET_HARD: c_int = 3;

// Object type selector for polymorphic lookups
pub const GIT_OBJECT_ANY: c_int = -2;

/// Raw 20-byte object id.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct git_oid {
    pub id: [u8; 20],
}

impl Default for git_oid {
    fn default() -> Self {
        Self { id: [0; 20] }
    }
}

/// Last-error record retrieved via `git_error_last`.
#[repr(C)]
pub struct git_error {
    pub message: *mut c_char,
    pub klass: c_int,
}

/// Growable buffer owned by the native library.
#[repr(C)]
pub struct git_buf {
    pub ptr: *mut c_char,
    pub reserved: usize,
    pub size: usize,
}

impl Default for git_buf {
    fn default() -> Self {
        Self {
            ptr: std::ptr::null_mut(),
            reserved: 0,
            size: 0,
        }
    }
}

/// Macro to declare an opaque native object type.
macro_rules! opaque_type {
    ($name:ident) => {
        /// Opaque native object. Never dereferenced on this side of the
        /// boundary.
        #[repr(C)]
        pub struct $name {
            _private: [u8; 0],
        }
    };
}

opaque_type!(git_repository);
opaque_type!(git_commit);
opaque_type!(git_tree);
opaque_type!(git_tree_entry);
opaque_type!(git_blob);
opaque_type!(git_revwalk);
opaque_type!(git_treebuilder);
opaque_type!(git_reference);
opaque_type!(git_config);
opaque_type!(git_object);
opaque_type!(git_index);
opaque_type!(git_annotated_commit);
opaque_type!(git_filter_list);
opaque_type!(git_filter);
opaque_type!(git_odb_backend);

// External C functions. Only a representative slice of the catalogue is
// declared: the resource-producing calls exercised by `calls`, the last-error
// accessors, and the destructors the dispatch table actually invokes.
#[cfg(feature = "libgit2")]
#[link(name = "git2")]
extern "C" {
    // Library init/shutdown (reference counted)
    pub fn git_libgit2_init() -> c_int;
    pub fn git_libgit2_shutdown() -> c_int;

    // Last-error retrieval
    pub fn git_error_last() -> *const git_error;
    pub fn git_error_clear();

    // Repository
    pub fn git_repository_open(
        out: *mut *mut git_repository,
        path: *const c_char,
    ) -> GitErrorCode;
    pub fn git_repository_config(
        out: *mut *mut git_config,
        repo: *mut git_repository,
    ) -> GitErrorCode;

    // Lookups
    pub fn git_commit_lookup_prefix(
        out: *mut *mut git_commit,
        repo: *mut git_repository,
        id: *const git_oid,
        len: usize,
    ) -> GitErrorCode;
    pub fn git_object_lookup_prefix(
        out: *mut *mut git_object,
        repo: *mut git_repository,
        id: *const git_oid,
        len: usize,
        kind: c_int,
    ) -> GitErrorCode;
    pub fn git_reference_lookup(
        out: *mut *mut git_reference,
        repo: *mut git_repository,
        name: *const c_char,
    ) -> GitErrorCode;

    // Revision walking
    pub fn git_revwalk_new(
        out: *mut *mut git_revwalk,
        repo: *mut git_repository,
    ) -> GitErrorCode;

    // Merge
    pub fn git_merge_base(
        out: *mut git_oid,
        repo: *mut git_repository,
        one: *const git_oid,
        two: *const git_oid,
    ) -> GitErrorCode;
    pub fn git_annotated_commit_from_ref(
        out: *mut *mut git_annotated_commit,
        repo: *mut git_repository,
        reference: *const git_reference,
    ) -> GitErrorCode;

    // Reset. Checkout options are passed as an opaque pointer; the bridge
    // always passes null for default options.
    pub fn git_reset(
        repo: *mut git_repository,
        target: *mut git_object,
        reset_kind: c_int,
        checkout_opts: *const std::os::raw::c_void,
    ) -> GitErrorCode;

    // Destructors invoked by the dispatch table
    pub fn git_revwalk_free(walk: *mut git_revwalk);
    pub fn git_config_free(config: *mut git_config);
    pub fn git_object_free(object: *mut git_object);
    pub fn git_filter_list_free(filters: *mut git_filter_list);
}
