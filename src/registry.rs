//! The handle table: wrap, resolve, release.
//!
//! A [`Registry`] is an explicit service object rather than ambient global
//! state: the host embedding this bridge creates one at startup, threads it
//! through every operation, and tears it down (or lets it drop) at shutdown.
//! All mutations go through one mutex, so wrap/resolve/release stay atomic
//! even when the host runtime is multi-threaded.
//!
//! Release removes the slot from the table outright, which is what makes a
//! second native free unrepresentable: the pointer is gone from the table
//! before any destructor runs. Ids are sequential and never reused, so a
//! missing id below the high-water mark can only be one that was already
//! released; no per-handle bookkeeping outlives the handle.

use std::collections::HashMap;
use std::fmt;
use std::os::raw::c_void;
use std::ptr::NonNull;

use parking_lot::Mutex;
use tracing::{error, trace};

use crate::adapter::CallbackAdapter;
use crate::dispatch::{DestructorTable, NativeVtable, Teardown};
use crate::error::{Error, Result};
use crate::kind::VariantKind;

/// Opaque handle id exposed to the host runtime.
///
/// Ids start at 1 and are never reused within a registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

impl HandleId {
    /// The raw integer the host runtime sees.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Rebuild an id from the host-side integer.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host-visible view of a registered handle.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    id: HandleId,
    kind: VariantKind,
}

impl Handle {
    /// The opaque id.
    #[inline]
    pub const fn id(&self) -> HandleId {
        self.id
    }

    /// The kind fixed at creation.
    #[inline]
    pub const fn kind(&self) -> VariantKind {
        self.kind
    }
}

/// What a live slot holds.
enum Payload {
    /// A bare native pointer.
    Native(NonNull<c_void>),
    /// A native pointer plus the callback adapter the handle owns.
    Composite {
        native: NonNull<c_void>,
        adapter: Box<CallbackAdapter>,
    },
}

impl Payload {
    fn native(&self) -> NonNull<c_void> {
        match self {
            Payload::Native(ptr) => *ptr,
            Payload::Composite { native, .. } => *native,
        }
    }
}

/// The wrapper record for one live handle.
struct Slot {
    kind: VariantKind,
    payload: Payload,
    owns_native: bool,
}

struct Table {
    /// Live handles only; released ids are absent.
    entries: HashMap<u64, Slot>,
    next_id: u64,
}

/// The process- or test-scoped handle registry.
pub struct Registry {
    dispatch: DestructorTable,
    table: Mutex<Table>,
}

// The registry never dereferences the native pointers it stores; they are
// opaque tokens handed back to the native library. Cross-thread use of the
// underlying objects is governed by the host runtime's serialization
// discipline, and the table itself is behind a mutex.
unsafe impl Send for Registry {}
unsafe impl Sync for Registry {}

impl Registry {
    /// Registry over the full kind catalogue, freeing natively through the
    /// given vtable.
    pub fn new(vtable: NativeVtable) -> Self {
        Self::with_table(DestructorTable::new(&vtable))
    }

    /// Registry over an explicit dispatch table.
    pub fn with_table(dispatch: DestructorTable) -> Self {
        Self {
            dispatch,
            table: Mutex::new(Table {
                entries: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Wrap a native object into a host-visible handle.
    ///
    /// `owns_native` records whether releasing the handle may destroy the
    /// native object. A kind with no dispatch-table entry, or a composite
    /// kind (which must carry an adapter, see [`Registry::wrap_with_adapter`]),
    /// is a defect in the binding: reported loudly and rejected without
    /// registering anything.
    pub fn wrap(
        &self,
        kind: VariantKind,
        native: NonNull<c_void>,
        owns_native: bool,
    ) -> Result<Handle> {
        if !self.dispatch.supports(kind) {
            error!(%kind, "kind missing from dispatch table");
            return Err(Error::UnsupportedVariant(kind));
        }
        if kind.is_composite() {
            error!(%kind, "composite kind wrapped without an adapter");
            return Err(Error::UnsupportedVariant(kind));
        }
        Ok(self.insert(kind, Payload::Native(native), owns_native))
    }

    /// Wrap a native object together with the callback adapter it owns.
    ///
    /// Only the composite kinds (filter, odb_backend) carry adapters; any
    /// other kind is rejected as a binding defect.
    pub fn wrap_with_adapter(
        &self,
        kind: VariantKind,
        native: NonNull<c_void>,
        adapter: Box<CallbackAdapter>,
    ) -> Result<Handle> {
        if !kind.is_composite() {
            error!(%kind, "adapter attached to a non-composite kind");
            return Err(Error::UnsupportedVariant(kind));
        }
        if !self.dispatch.supports(kind) {
            error!(%kind, "kind missing from dispatch table");
            return Err(Error::UnsupportedVariant(kind));
        }
        Ok(self.insert(kind, Payload::Composite { native, adapter }, true))
    }

    fn insert(&self, kind: VariantKind, payload: Payload, owns_native: bool) -> Handle {
        let mut table = self.table.lock();
        let id = HandleId(table.next_id);
        table.next_id += 1;
        table.entries.insert(
            id.raw(),
            Slot {
                kind,
                payload,
                owns_native,
            },
        );
        trace!(%id, %kind, owns_native, "wrapped native object");
        Handle { id, kind }
    }

    /// Resolve a handle id to its native pointer.
    ///
    /// Callers always state the kind they expect; an unknown id, a released
    /// id, or a kind mismatch is [`Error::InvalidHandle`].
    pub fn resolve(&self, id: HandleId, expected: VariantKind) -> Result<NonNull<c_void>> {
        let table = self.table.lock();
        match table.entries.get(&id.raw()) {
            Some(slot) if slot.kind == expected => Ok(slot.payload.native()),
            _ => Err(Error::InvalidHandle { id }),
        }
    }

    /// The kind a live handle wraps.
    pub fn kind_of(&self, id: HandleId) -> Result<VariantKind> {
        let table = self.table.lock();
        match table.entries.get(&id.raw()) {
            Some(slot) => Ok(slot.kind),
            _ => Err(Error::InvalidHandle { id }),
        }
    }

    /// The payload pointer to register with the native callback extension
    /// point, for a live composite handle.
    ///
    /// Stable for as long as the handle is live; the native library passes
    /// it back into the adapter's trampoline.
    pub fn adapter_ptr(&self, id: HandleId) -> Result<NonNull<c_void>> {
        let mut table = self.table.lock();
        match table.entries.get_mut(&id.raw()) {
            Some(Slot {
                payload: Payload::Composite { adapter, .. },
                ..
            }) => Ok(NonNull::from(&mut **adapter).cast()),
            _ => Err(Error::InvalidHandle { id }),
        }
    }

    /// Release a handle: run its teardown action exactly once and free the
    /// wrapper record.
    ///
    /// The slot is removed from the table before any destructor runs, so the
    /// native destructor can fire at most once per handle no matter what. A
    /// second release of the same id is [`Error::DoubleRelease`]; an id that
    /// was never issued is [`Error::InvalidHandle`]. The two stay
    /// distinguishable without retaining anything per released handle: ids
    /// are sequential and never reused, so a missing id below the
    /// high-water mark must have been released already.
    pub fn release(&self, id: HandleId) -> Result<()> {
        let slot = {
            let mut table = self.table.lock();
            match table.entries.remove(&id.raw()) {
                Some(slot) => slot,
                None if id.raw() >= 1 && id.raw() < table.next_id => {
                    return Err(Error::DoubleRelease { id })
                }
                None => return Err(Error::InvalidHandle { id }),
            }
        };
        trace!(%id, kind = %slot.kind, "releasing handle");
        // Teardown runs outside the table lock: a closure dropped during
        // adapter teardown must not be able to deadlock the registry.
        self.teardown(slot);
        Ok(())
    }

    /// Number of live handles. Every table entry is a live handle, so this
    /// is also the number of wrapper records the registry retains.
    pub fn live_handles(&self) -> usize {
        let table = self.table.lock();
        table.entries.len()
    }

    /// Release every live handle.
    ///
    /// Part of the explicit lifecycle for hosts that shut the binding down
    /// before process exit; also invoked on drop as a backstop.
    pub fn shutdown(&self) {
        let slots: Vec<Slot> = {
            let mut table = self.table.lock();
            table.entries.drain().map(|(_, slot)| slot).collect()
        };
        if !slots.is_empty() {
            trace!(count = slots.len(), "releasing live handles at shutdown");
        }
        for slot in slots {
            self.teardown(slot);
        }
    }

    /// Run the kind's teardown action on a slot already removed from the
    /// table, then free the wrapper record by dropping it.
    fn teardown(&self, slot: Slot) {
        let Slot {
            kind,
            payload,
            owns_native,
        } = slot;
        let Some(action) = self.dispatch.action_for(kind) else {
            // Unreachable: wrap refuses kinds without an entry.
            error!(%kind, "released handle has no dispatch entry");
            debug_assert!(false, "released handle has no dispatch entry");
            return;
        };
        match (action, payload) {
            // Free the wrapper only.
            (Teardown::None, _) => {}
            (Teardown::Native(free), Payload::Native(ptr)) => {
                if owns_native {
                    unsafe { free(ptr.as_ptr()) };
                }
            }
            (Teardown::Composite, Payload::Composite { mut adapter, .. }) => {
                if adapter.is_torn_down() {
                    // Should be unreachable: teardown runs once per slot and
                    // nothing else reaches the adapter mutably.
                    error!(%kind, "adapter already torn down at release");
                    debug_assert!(false, "adapter already torn down at release");
                    return;
                }
                adapter.teardown();
                drop(adapter);
                // The native filter/backend object is not freed here; its
                // ownership rests with the native library.
            }
            (_, _) => {
                error!(%kind, "payload shape does not match teardown action");
                debug_assert!(false, "payload shape does not match teardown action");
            }
        }
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        self.shutdown();
    }
}
