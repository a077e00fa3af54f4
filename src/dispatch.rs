//! Per-kind teardown actions.
//!
//! Release-time behavior is driven by a [`DestructorTable`] fixed at
//! registry construction: each kind maps to at most one [`Teardown`] action,
//! and a kind with no entry cannot be wrapped at all. Native destructors are
//! not hard-wired; they arrive through a [`NativeVtable`] so the table can
//! be built against the real library or against test doubles.

use std::os::raw::c_void;

use crate::kind::VariantKind;

/// A native destructor for one resource kind.
pub type NativeFree = unsafe extern "C" fn(obj: *mut c_void);

/// What releasing a handle of a given kind does, beyond freeing the wrapper
/// record itself.
#[derive(Clone, Copy)]
pub enum Teardown {
    /// Free only the wrapper record; the native object is left alone.
    None,
    /// Invoke the native destructor, iff the handle owns the native object.
    Native(NativeFree),
    /// Release the callback adapter's closure reference and free the
    /// adapter. The native object is not freed; its ownership rests with
    /// the native library once the extension point is registered.
    Composite,
}

/// Native destructors for the kinds the dispatch table actively frees.
pub struct NativeVtable {
    /// Destructor for revision walkers.
    pub revwalk_free: NativeFree,
    /// Destructor for configuration accessors.
    pub config_free: NativeFree,
    /// Destructor for generic objects.
    pub object_free: NativeFree,
    /// Destructor for filter lists.
    pub filter_list_free: NativeFree,
}

impl NativeVtable {
    /// A vtable whose destructors do nothing.
    ///
    /// For hosts that delegate all native teardown elsewhere, and for tests
    /// that only exercise registry bookkeeping.
    pub fn noop() -> Self {
        unsafe extern "C" fn ignore(_obj: *mut c_void) {}
        Self {
            revwalk_free: ignore,
            config_free: ignore,
            object_free: ignore,
            filter_list_free: ignore,
        }
    }

    /// The real destructors from the linked libgit2.
    #[cfg(feature = "libgit2")]
    pub fn libgit2() -> Self {
        use crate::ffi::raw;

        unsafe extern "C" fn revwalk(obj: *mut c_void) {
            raw::git_revwalk_free(obj.cast())
        }
        unsafe extern "C" fn config(obj: *mut c_void) {
            raw::git_config_free(obj.cast())
        }
        unsafe extern "C" fn object(obj: *mut c_void) {
            raw::git_object_free(obj.cast())
        }
        unsafe extern "C" fn filter_list(obj: *mut c_void) {
            raw::git_filter_list_free(obj.cast())
        }

        Self {
            revwalk_free: revwalk,
            config_free: config,
            object_free: object,
            filter_list_free: filter_list,
        }
    }
}

/// Maps every supported kind to its teardown action.
pub struct DestructorTable {
    entries: [Option<Teardown>; VariantKind::COUNT],
}

impl DestructorTable {
    /// The full catalogue.
    ///
    /// Revwalk, config, object and filter_list handles free their native
    /// object on release when they own it. Filter and odb_backend handles
    /// tear down their adapter. Every other kind frees only the wrapper
    /// record: for repository, commit, tree, tree_entry, blob, reference and
    /// treebuilder the native destructor is deliberately left unwired, since
    /// whether those objects may be freed here is unresolved against the
    /// engine's ownership contract.
    pub fn new(vtable: &NativeVtable) -> Self {
        let mut table = Self::empty();
        for kind in VariantKind::ALL {
            let action = match kind {
                VariantKind::Revwalk => Teardown::Native(vtable.revwalk_free),
                VariantKind::Config => Teardown::Native(vtable.config_free),
                VariantKind::Object => Teardown::Native(vtable.object_free),
                VariantKind::FilterList => Teardown::Native(vtable.filter_list_free),
                VariantKind::Filter | VariantKind::OdbBackend => Teardown::Composite,
                _ => Teardown::None,
            };
            table = table.with(kind, action);
        }
        table
    }

    /// A table with no entries. Wrapping any kind against it fails with
    /// `UnsupportedVariant`.
    pub fn empty() -> Self {
        Self {
            entries: [None; VariantKind::COUNT],
        }
    }

    /// Set the action for one kind.
    pub fn with(mut self, kind: VariantKind, action: Teardown) -> Self {
        self.entries[kind.as_raw() as usize] = Some(action);
        self
    }

    /// Whether the kind can be wrapped at all.
    pub fn supports(&self, kind: VariantKind) -> bool {
        self.entries[kind.as_raw() as usize].is_some()
    }

    /// The action for a kind, if it has an entry.
    pub fn action_for(&self, kind: VariantKind) -> Option<Teardown> {
        self.entries[kind.as_raw() as usize]
    }
}
