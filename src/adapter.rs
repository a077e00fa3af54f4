//! Bridges native callback extension points to host closures.
//!
//! The native library exposes two extension points the host can plug code
//! into: content filters (clean/smudge style transforms) and object-database
//! backend enumeration. A [`CallbackAdapter`] owns the host closure for one
//! such extension point together with the native-facing trampoline, and is
//! itself owned by exactly one composite handle in the registry.
//!
//! The trampolines recover the adapter from the `payload` pointer the native
//! library carries alongside the callback, the same shape as any C callback
//! with a `user_data` argument.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};

use tracing::error;

use crate::ffi::raw::GIT_EUSER;
use crate::oid::{Oid, RAW_LEN};

/// Arguments delivered to a host closure, one variant per extension point.
pub enum CallbackArgs<'a> {
    /// A filter is being applied to one item of content.
    FilterApply {
        /// Repository-relative path of the item being filtered.
        path: &'a str,
        /// Content as the native library sees it.
        input: &'a [u8],
        /// Replacement content; left untouched to pass the input through.
        output: &'a mut Vec<u8>,
    },
    /// A backend enumeration is visiting one object id.
    OdbForeach {
        /// Id of the visited object.
        oid: &'a Oid,
    },
}

/// A host callback. Returns zero to continue, any non-zero status to abort
/// the surrounding native operation.
pub type HostClosure = Box<dyn FnMut(CallbackArgs<'_>) -> i32 + Send>;

/// Native-facing entry point for filter application.
pub type FilterApplyFn = unsafe extern "C" fn(
    payload: *mut c_void,
    path: *const c_char,
    input: *const u8,
    input_len: usize,
    output: *mut c_void,
) -> c_int;

/// Native-facing entry point for object-database enumeration.
pub type OdbForeachFn = unsafe extern "C" fn(oid: *const u8, payload: *mut c_void) -> c_int;

/// The trampoline a [`CallbackAdapter`] registers with the native library.
#[derive(Clone, Copy)]
pub enum Trampoline {
    /// Filter application entry point.
    FilterApply(FilterApplyFn),
    /// Enumeration entry point.
    OdbForeach(OdbForeachFn),
}

/// Owns one host closure and the trampoline that reaches it.
///
/// Created boxed so its address is stable for the lifetime of the owning
/// handle; the box pointer doubles as the `payload` the native library
/// passes back into the trampoline.
pub struct CallbackAdapter {
    trampoline: Trampoline,
    closure: Option<HostClosure>,
}

impl CallbackAdapter {
    /// Adapter for the content-filter extension point.
    pub fn for_filter(closure: HostClosure) -> Box<Self> {
        Box::new(Self {
            trampoline: Trampoline::FilterApply(filter_apply_trampoline),
            closure: Some(closure),
        })
    }

    /// Adapter for the object-database enumeration extension point.
    pub fn for_odb_backend(closure: HostClosure) -> Box<Self> {
        Box::new(Self {
            trampoline: Trampoline::OdbForeach(odb_foreach_trampoline),
            closure: Some(closure),
        })
    }

    /// The trampoline to hand to the native library.
    pub fn trampoline(&self) -> Trampoline {
        self.trampoline
    }

    /// Whether teardown has already begun.
    pub fn is_torn_down(&self) -> bool {
        self.closure.is_none()
    }

    /// Invoke the host closure synchronously.
    ///
    /// Invocation after teardown has begun indicates a defect in the binding
    /// (the native object outlived its handle); it is reported loudly and
    /// aborts the surrounding native operation instead of touching a dropped
    /// closure.
    pub fn invoke(&mut self, args: CallbackArgs<'_>) -> c_int {
        match self.closure.as_mut() {
            Some(closure) => closure(args),
            None => {
                error!("callback invoked after adapter teardown");
                GIT_EUSER
            }
        }
    }

    /// Release the closure reference. Called exactly once, from the owning
    /// handle's destructor dispatch; the adapter allocation is freed by the
    /// caller immediately afterwards.
    pub(crate) fn teardown(&mut self) {
        if self.closure.take().is_none() {
            error!("adapter torn down twice");
            debug_assert!(false, "adapter torn down twice");
        }
    }
}

/// Trampoline for filter application.
///
/// # Safety
///
/// `payload` must point to a live [`CallbackAdapter`]; `output` must point
/// to a live `Vec<u8>` owned by the bridge-side glue that registered the
/// filter; `input` must be valid for `input_len` bytes when non-null.
pub unsafe extern "C" fn filter_apply_trampoline(
    payload: *mut c_void,
    path: *const c_char,
    input: *const u8,
    input_len: usize,
    output: *mut c_void,
) -> c_int {
    if payload.is_null() || output.is_null() {
        return GIT_EUSER;
    }
    let adapter = &mut *(payload as *mut CallbackAdapter);
    let path = if path.is_null() {
        ""
    } else {
        match CStr::from_ptr(path).to_str() {
            Ok(s) => s,
            Err(_) => return GIT_EUSER,
        }
    };
    let input = if input.is_null() {
        &[][..]
    } else {
        std::slice::from_raw_parts(input, input_len)
    };
    let output = &mut *(output as *mut Vec<u8>);
    adapter.invoke(CallbackArgs::FilterApply {
        path,
        input,
        output,
    })
}

/// Trampoline for object-database enumeration.
///
/// # Safety
///
/// `payload` must point to a live [`CallbackAdapter`]; `oid` must point to a
/// raw 20-byte object id.
pub unsafe extern "C" fn odb_foreach_trampoline(oid: *const u8, payload: *mut c_void) -> c_int {
    if payload.is_null() || oid.is_null() {
        return GIT_EUSER;
    }
    let adapter = &mut *(payload as *mut CallbackAdapter);
    let mut raw = [0u8; RAW_LEN];
    raw.copy_from_slice(std::slice::from_raw_parts(oid, RAW_LEN));
    let oid = Oid::from_raw(raw);
    adapter.invoke(CallbackArgs::OdbForeach { oid: &oid })
}

#[cfg(test)]
mod tests {
    use std::ffi::CString;
    use std::os::raw::c_void;

    use super::*;

    #[test]
    fn filter_trampoline_reaches_closure() {
        let mut adapter = CallbackAdapter::for_filter(Box::new(|args| {
            if let CallbackArgs::FilterApply {
                path,
                input,
                output,
            } = args
            {
                assert_eq!(path, "src/main.rs");
                output.extend(input.iter().rev());
            }
            0
        }));

        let path = CString::new("src/main.rs").unwrap();
        let input = b"abc";
        let mut output: Vec<u8> = Vec::new();
        let code = unsafe {
            filter_apply_trampoline(
                (&mut *adapter as *mut CallbackAdapter).cast(),
                path.as_ptr(),
                input.as_ptr(),
                input.len(),
                (&mut output as *mut Vec<u8>).cast::<c_void>(),
            )
        };
        assert_eq!(code, 0);
        assert_eq!(output, b"cba");
    }

    #[test]
    fn odb_trampoline_delivers_oid() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut adapter = CallbackAdapter::for_odb_backend(Box::new(move |args| {
            if let CallbackArgs::OdbForeach { oid } = args {
                sink.lock().unwrap().push(oid.to_string());
            }
            0
        }));

        let raw = [0xabu8; RAW_LEN];
        let code = unsafe {
            odb_foreach_trampoline(raw.as_ptr(), (&mut *adapter as *mut CallbackAdapter).cast())
        };
        assert_eq!(code, 0);
        assert_eq!(*seen.lock().unwrap(), ["ab".repeat(RAW_LEN)]);
    }

    #[test]
    fn closure_return_code_propagates() {
        let mut adapter = CallbackAdapter::for_odb_backend(Box::new(|_| -1));
        let raw = [0u8; RAW_LEN];
        let code = unsafe {
            odb_foreach_trampoline(raw.as_ptr(), (&mut *adapter as *mut CallbackAdapter).cast())
        };
        assert_eq!(code, -1);
    }

    #[test]
    fn invoke_after_teardown_aborts_without_touching_closure() {
        let mut adapter = CallbackAdapter::for_filter(Box::new(|_| 0));
        adapter.teardown();
        assert!(adapter.is_torn_down());

        let mut output: Vec<u8> = Vec::new();
        let code = adapter.invoke(CallbackArgs::FilterApply {
            path: "",
            input: b"",
            output: &mut output,
        });
        assert_eq!(code, GIT_EUSER);
        assert!(output.is_empty());
    }

    #[test]
    fn null_payload_is_rejected() {
        let mut output: Vec<u8> = Vec::new();
        let code = unsafe {
            filter_apply_trampoline(
                std::ptr::null_mut(),
                std::ptr::null(),
                std::ptr::null(),
                0,
                (&mut output as *mut Vec<u8>).cast::<c_void>(),
            )
        };
        assert_eq!(code, GIT_EUSER);
    }
}
