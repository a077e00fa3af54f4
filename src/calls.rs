//! Representative entry-point wrappers over the native call catalogue.
//!
//! Each wrapper follows the same shape: parse host inputs up front, make a
//! single native call, surface status plus last-error message on failure,
//! and wrap any produced resource through the [`Registry`]. The full
//! catalogue is mechanical repetition of this pattern; the selection here
//! covers the flows the lifetime bridge exists for: opening, prefix lookup,
//! merge-base computation, annotated commits and reset.

use std::ffi::CString;
use std::os::raw::{c_int, c_void};
use std::ptr::{self, NonNull};

use crate::error::{Error, Result};
use crate::ffi::error::check;
use crate::ffi::{native, raw};
use crate::kind::VariantKind;
use crate::oid::{Oid, OidPrefix};
use crate::registry::{Handle, HandleId, Registry};

/// How far a reset moves the working state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetKind {
    /// Move HEAD only.
    Soft,
    /// Move HEAD and reset the index.
    Mixed,
    /// Move HEAD, reset the index and the working tree.
    Hard,
}

impl ResetKind {
    fn as_raw(self) -> c_int {
        match self {
            ResetKind::Soft => raw::GIT_RESET_SOFT,
            ResetKind::Mixed => raw::GIT_RESET_MIXED,
            ResetKind::Hard => raw::GIT_RESET_HARD,
        }
    }
}

fn string_arg(text: &str) -> Result<CString> {
    CString::new(text).map_err(|_| Error::MalformedIdentifier(text.to_owned()))
}

fn wrap_output(
    registry: &Registry,
    kind: VariantKind,
    out: *mut c_void,
) -> Result<Handle> {
    let native_ptr = NonNull::new(out)
        .ok_or_else(|| native(raw::GIT_ERROR, format!("native call produced a null {kind}")))?;
    registry.wrap(kind, native_ptr, true)
}

/// Open the repository at `path`, wrapping it as an owning handle.
pub fn repository_open(registry: &Registry, path: &str) -> Result<Handle> {
    let c_path = string_arg(path)?;
    let mut out: *mut raw::git_repository = ptr::null_mut();
    unsafe { check(raw::git_repository_open(&mut out, c_path.as_ptr()))? };
    wrap_output(registry, VariantKind::Repository, out.cast())
}

/// Open the repository's configuration.
pub fn repository_config(registry: &Registry, repo: HandleId) -> Result<Handle> {
    let repo_ptr = registry.resolve(repo, VariantKind::Repository)?;
    let mut out: *mut raw::git_config = ptr::null_mut();
    unsafe { check(raw::git_repository_config(&mut out, repo_ptr.as_ptr().cast()))? };
    wrap_output(registry, VariantKind::Config, out.cast())
}

/// Start a new revision walk over the repository.
pub fn revwalk_new(registry: &Registry, repo: HandleId) -> Result<Handle> {
    let repo_ptr = registry.resolve(repo, VariantKind::Repository)?;
    let mut out: *mut raw::git_revwalk = ptr::null_mut();
    unsafe { check(raw::git_revwalk_new(&mut out, repo_ptr.as_ptr().cast()))? };
    wrap_output(registry, VariantKind::Revwalk, out.cast())
}

/// Look up a commit by id prefix.
pub fn commit_lookup_prefix(
    registry: &Registry,
    repo: HandleId,
    prefix: &OidPrefix,
) -> Result<Handle> {
    let repo_ptr = registry.resolve(repo, VariantKind::Repository)?;
    let id = raw::git_oid {
        id: *prefix.as_bytes(),
    };
    let mut out: *mut raw::git_commit = ptr::null_mut();
    unsafe {
        check(raw::git_commit_lookup_prefix(
            &mut out,
            repo_ptr.as_ptr().cast(),
            &id,
            prefix.hex_len(),
        ))?
    };
    wrap_output(registry, VariantKind::Commit, out.cast())
}

/// Look up any object by id prefix, wrapped polymorphically.
pub fn object_lookup_prefix(
    registry: &Registry,
    repo: HandleId,
    prefix: &OidPrefix,
) -> Result<Handle> {
    let repo_ptr = registry.resolve(repo, VariantKind::Repository)?;
    let id = raw::git_oid {
        id: *prefix.as_bytes(),
    };
    let mut out: *mut raw::git_object = ptr::null_mut();
    unsafe {
        check(raw::git_object_lookup_prefix(
            &mut out,
            repo_ptr.as_ptr().cast(),
            &id,
            prefix.hex_len(),
            raw::GIT_OBJECT_ANY,
        ))?
    };
    wrap_output(registry, VariantKind::Object, out.cast())
}

/// Look up a reference by its full name.
pub fn reference_lookup(registry: &Registry, repo: HandleId, name: &str) -> Result<Handle> {
    let repo_ptr = registry.resolve(repo, VariantKind::Repository)?;
    let c_name = string_arg(name)?;
    let mut out: *mut raw::git_reference = ptr::null_mut();
    unsafe {
        check(raw::git_reference_lookup(
            &mut out,
            repo_ptr.as_ptr().cast(),
            c_name.as_ptr(),
        ))?
    };
    wrap_output(registry, VariantKind::Reference, out.cast())
}

/// Annotate the commit a reference points at, for merge and rebase flows.
pub fn annotated_commit_from_ref(
    registry: &Registry,
    repo: HandleId,
    reference: HandleId,
) -> Result<Handle> {
    let repo_ptr = registry.resolve(repo, VariantKind::Repository)?;
    let ref_ptr = registry.resolve(reference, VariantKind::Reference)?;
    let mut out: *mut raw::git_annotated_commit = ptr::null_mut();
    unsafe {
        check(raw::git_annotated_commit_from_ref(
            &mut out,
            repo_ptr.as_ptr().cast(),
            ref_ptr.as_ptr().cast(),
        ))?
    };
    wrap_output(registry, VariantKind::AnnotatedCommit, out.cast())
}

/// Compute the merge base of two commits, returned as a content hash.
pub fn merge_base(registry: &Registry, repo: HandleId, one: &Oid, two: &Oid) -> Result<Oid> {
    let repo_ptr = registry.resolve(repo, VariantKind::Repository)?;
    let one = raw::git_oid { id: *one.as_bytes() };
    let two = raw::git_oid { id: *two.as_bytes() };
    let mut out = raw::git_oid::default();
    unsafe {
        check(raw::git_merge_base(
            &mut out,
            repo_ptr.as_ptr().cast(),
            &one,
            &two,
        ))?
    };
    Ok(Oid::from_raw(out.id))
}

/// Reset the repository to a target object, with default checkout options.
pub fn reset(
    registry: &Registry,
    repo: HandleId,
    target: HandleId,
    kind: ResetKind,
) -> Result<()> {
    let repo_ptr = registry.resolve(repo, VariantKind::Repository)?;
    let target_ptr = registry.resolve(target, VariantKind::Object)?;
    unsafe {
        check(raw::git_reset(
            repo_ptr.as_ptr().cast(),
            target_ptr.as_ptr().cast(),
            kind.as_raw(),
            ptr::null(),
        ))
    }
}
