//! Status and last-error surfacing for the native boundary.
//!
//! Every native failure is reported as two pieces: the integer status the
//! call returned and the message retrievable from the library afterwards.
//! Both travel in [`Error::NativeCall`].

use crate::error::Error;

/// Build a native call failure from a status code and message.
pub fn native(code: i32, message: impl Into<String>) -> Error {
    Error::NativeCall {
        code,
        message: message.into(),
    }
}

/// Check a native status code, retrieving the last-error message on failure.
///
/// The message slot is cleared after retrieval so a stale message can never
/// be attributed to a later call.
///
/// # Safety
///
/// Must only be called on the thread that performed the failing native call;
/// the last-error slot is thread-local inside the native library.
#[cfg(feature = "libgit2")]
pub unsafe fn check(code: super::raw::GitErrorCode) -> crate::error::Result<()> {
    use std::ffi::CStr;

    use super::raw;

    if code == raw::GIT_OK {
        return Ok(());
    }

    let last = raw::git_error_last();
    let message = if last.is_null() || (*last).message.is_null() {
        "no error message set".to_owned()
    } else {
        CStr::from_ptr((*last).message)
            .to_string_lossy()
            .into_owned()
    };
    raw::git_error_clear();

    Err(native(code, message))
}
