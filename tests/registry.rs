//! End-to-end registry behavior against counting native destructors.
//!
//! The native vtable is replaced by test doubles that count invocations and
//! reclaim the fake objects, so every teardown guarantee is observable.

use std::os::raw::c_void;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use git2_bridge::{DestructorTable, NativeVtable, Registry, Teardown, VariantKind};

/// A fake native object. Leaked on purpose for kinds whose teardown never
/// frees natively; reclaimed by the counting destructors otherwise.
fn fake_native() -> NonNull<c_void> {
    NonNull::new(Box::into_raw(Box::new(0u64)).cast()).unwrap()
}

unsafe fn reclaim(obj: *mut c_void) {
    drop(Box::from_raw(obj.cast::<u64>()));
}

#[test]
fn owning_release_frees_each_active_kind_exactly_once() {
    static REVWALK: AtomicUsize = AtomicUsize::new(0);
    static CONFIG: AtomicUsize = AtomicUsize::new(0);
    static OBJECT: AtomicUsize = AtomicUsize::new(0);
    static FILTER_LIST: AtomicUsize = AtomicUsize::new(0);
    unsafe extern "C" fn revwalk_free(obj: *mut c_void) {
        REVWALK.fetch_add(1, Ordering::SeqCst);
        reclaim(obj);
    }
    unsafe extern "C" fn config_free(obj: *mut c_void) {
        CONFIG.fetch_add(1, Ordering::SeqCst);
        reclaim(obj);
    }
    unsafe extern "C" fn object_free(obj: *mut c_void) {
        OBJECT.fetch_add(1, Ordering::SeqCst);
        reclaim(obj);
    }
    unsafe extern "C" fn filter_list_free(obj: *mut c_void) {
        FILTER_LIST.fetch_add(1, Ordering::SeqCst);
        reclaim(obj);
    }

    let registry = Registry::new(NativeVtable {
        revwalk_free,
        config_free,
        object_free,
        filter_list_free,
    });

    // Releasing an owning revwalk handle fires the revwalk destructor only.
    let handle = registry
        .wrap(VariantKind::Revwalk, fake_native(), true)
        .unwrap();
    registry.release(handle.id()).unwrap();
    assert_eq!(REVWALK.load(Ordering::SeqCst), 1);
    assert_eq!(CONFIG.load(Ordering::SeqCst), 0);
    assert_eq!(OBJECT.load(Ordering::SeqCst), 0);
    assert_eq!(FILTER_LIST.load(Ordering::SeqCst), 0);

    // And likewise for the remaining active kinds.
    for (kind, counter) in [
        (VariantKind::Config, &CONFIG),
        (VariantKind::Object, &OBJECT),
        (VariantKind::FilterList, &FILTER_LIST),
    ] {
        let handle = registry.wrap(kind, fake_native(), true).unwrap();
        registry.release(handle.id()).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1, "one free for {kind}");
    }
    assert_eq!(REVWALK.load(Ordering::SeqCst), 1);
}

#[test]
fn simple_kinds_never_fire_a_native_destructor() {
    static FREES: AtomicUsize = AtomicUsize::new(0);
    unsafe extern "C" fn counting_free(_obj: *mut c_void) {
        FREES.fetch_add(1, Ordering::SeqCst);
    }

    let registry = Registry::new(NativeVtable {
        revwalk_free: counting_free,
        config_free: counting_free,
        object_free: counting_free,
        filter_list_free: counting_free,
    });

    // Repeated wrap/release cycles: no destructor fires and the live set
    // does not grow.
    for _ in 0..100 {
        let handle = registry
            .wrap(VariantKind::Repository, fake_native(), true)
            .unwrap();
        registry.release(handle.id()).unwrap();
    }
    assert_eq!(FREES.load(Ordering::SeqCst), 0);
    assert_eq!(registry.live_handles(), 0);
}

#[test]
fn double_release_is_rejected_and_frees_at_most_once() {
    static CONFIG: AtomicUsize = AtomicUsize::new(0);
    unsafe extern "C" fn config_free(obj: *mut c_void) {
        CONFIG.fetch_add(1, Ordering::SeqCst);
        reclaim(obj);
    }
    unsafe extern "C" fn ignore(_obj: *mut c_void) {}

    let registry = Registry::new(NativeVtable {
        revwalk_free: ignore,
        config_free,
        object_free: ignore,
        filter_list_free: ignore,
    });
    let handle = registry
        .wrap(VariantKind::Config, fake_native(), true)
        .unwrap();

    registry.release(handle.id()).unwrap();
    let err = registry.release(handle.id()).unwrap_err();
    assert!(err.is_double_release());
    assert_eq!(CONFIG.load(Ordering::SeqCst), 1);
}

#[test]
fn borrowed_handles_never_free_natively() {
    static FREES: AtomicUsize = AtomicUsize::new(0);
    unsafe extern "C" fn counting_free(_obj: *mut c_void) {
        FREES.fetch_add(1, Ordering::SeqCst);
    }

    let registry = Registry::new(NativeVtable {
        revwalk_free: counting_free,
        config_free: counting_free,
        object_free: counting_free,
        filter_list_free: counting_free,
    });
    for kind in [
        VariantKind::Revwalk,
        VariantKind::Config,
        VariantKind::Object,
        VariantKind::FilterList,
    ] {
        let native = fake_native();
        let handle = registry.wrap(kind, native, false).unwrap();
        registry.release(handle.id()).unwrap();
        unsafe { reclaim(native.as_ptr()) };
    }
    assert_eq!(FREES.load(Ordering::SeqCst), 0);
}

#[test]
fn resolve_checks_the_expected_kind() {
    let registry = Registry::new(NativeVtable::noop());
    let native = fake_native();
    let handle = registry.wrap(VariantKind::Commit, native, false).unwrap();

    let err = registry
        .resolve(handle.id(), VariantKind::Blob)
        .unwrap_err();
    assert!(err.is_invalid_handle());

    // The id itself is still live and resolvable under its real kind.
    assert_eq!(
        registry.resolve(handle.id(), VariantKind::Commit).unwrap(),
        native
    );
}

#[test]
fn wrap_resolve_release_end_to_end() {
    let registry = Registry::new(NativeVtable::noop());
    let native = fake_native();

    let handle = registry
        .wrap(VariantKind::Repository, native, true)
        .unwrap();
    assert_eq!(handle.id().raw(), 1);
    assert_eq!(handle.kind(), VariantKind::Repository);

    let resolved = registry
        .resolve(handle.id(), VariantKind::Repository)
        .unwrap();
    assert_eq!(resolved, native);

    registry.release(handle.id()).unwrap();
    let err = registry
        .resolve(handle.id(), VariantKind::Repository)
        .unwrap_err();
    assert!(err.is_invalid_handle());
}

#[test]
fn handle_churn_retains_no_table_entries() {
    let registry = Registry::new(NativeVtable::noop());

    let first = registry
        .wrap(VariantKind::Blob, fake_native(), false)
        .unwrap();
    registry.release(first.id()).unwrap();

    for _ in 0..10_000 {
        let handle = registry
            .wrap(VariantKind::Blob, fake_native(), false)
            .unwrap();
        registry.release(handle.id()).unwrap();
    }
    // Every table entry is a live handle, so an empty live set means the
    // registry kept nothing for the 10,001 released ids.
    assert_eq!(registry.live_handles(), 0);

    // Released ids keep their classification without per-handle bookkeeping.
    assert!(registry.release(first.id()).unwrap_err().is_double_release());
    assert!(registry
        .resolve(first.id(), VariantKind::Blob)
        .unwrap_err()
        .is_invalid_handle());
    let unissued = git2_bridge::HandleId::from_raw(1_000_000);
    assert!(registry.release(unissued).unwrap_err().is_invalid_handle());
}

#[test]
fn unknown_ids_are_invalid_handles() {
    let registry = Registry::new(NativeVtable::noop());
    let bogus = git2_bridge::HandleId::from_raw(42);
    assert!(registry
        .resolve(bogus, VariantKind::Repository)
        .unwrap_err()
        .is_invalid_handle());
    assert!(registry.release(bogus).unwrap_err().is_invalid_handle());
    assert!(registry.kind_of(bogus).unwrap_err().is_invalid_handle());

    // Id zero is never issued.
    let zero = git2_bridge::HandleId::from_raw(0);
    assert!(registry.release(zero).unwrap_err().is_invalid_handle());
}

#[test]
fn kinds_outside_the_table_are_unsupported() {
    let table = DestructorTable::empty().with(VariantKind::Repository, Teardown::None);
    let registry = Registry::with_table(table);

    let native = fake_native();
    let err = registry.wrap(VariantKind::Commit, native, true).unwrap_err();
    assert!(matches!(
        err,
        git2_bridge::Error::UnsupportedVariant(VariantKind::Commit)
    ));
    // Nothing was registered by the failed wrap.
    assert_eq!(registry.live_handles(), 0);

    assert!(registry
        .wrap(VariantKind::Repository, native, true)
        .is_ok());
}

#[test]
fn shutdown_and_drop_release_each_handle_once() {
    static OBJECT: AtomicUsize = AtomicUsize::new(0);
    unsafe extern "C" fn object_free(obj: *mut c_void) {
        OBJECT.fetch_add(1, Ordering::SeqCst);
        reclaim(obj);
    }
    unsafe extern "C" fn ignore(_obj: *mut c_void) {}

    let registry = Registry::new(NativeVtable {
        revwalk_free: ignore,
        config_free: ignore,
        object_free,
        filter_list_free: ignore,
    });
    for _ in 0..3 {
        registry
            .wrap(VariantKind::Object, fake_native(), true)
            .unwrap();
    }

    registry.shutdown();
    assert_eq!(OBJECT.load(Ordering::SeqCst), 3);
    assert_eq!(registry.live_handles(), 0);

    // Drop runs shutdown again as a backstop; nothing fires twice.
    drop(registry);
    assert_eq!(OBJECT.load(Ordering::SeqCst), 3);
}

#[test]
fn table_mutations_are_atomic_across_threads() {
    let registry = Arc::new(Registry::new(NativeVtable::noop()));

    let mut workers = Vec::new();
    for _ in 0..8 {
        let registry = Arc::clone(&registry);
        workers.push(std::thread::spawn(move || {
            for _ in 0..100 {
                let handle = registry
                    .wrap(VariantKind::TreeEntry, fake_native(), false)
                    .unwrap();
                let resolved = registry
                    .resolve(handle.id(), VariantKind::TreeEntry)
                    .unwrap();
                assert!(!resolved.as_ptr().is_null());
                registry.release(handle.id()).unwrap();
                assert!(registry.release(handle.id()).unwrap_err().is_double_release());
            }
        }));
    }
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(registry.live_handles(), 0);
}
