//! Error types for the git2-bridge crate.

use thiserror::Error;

use crate::kind::VariantKind;
use crate::registry::HandleId;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for bridge operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The native library returned a non-zero status.
    ///
    /// Carries the raw status code together with the library's last-error
    /// message so the host runtime can surface both.
    #[error("native call failed with status {code}: {message}")]
    NativeCall {
        /// Raw status code.
        code: i32,
        /// Last-error message retrieved from the native library.
        message: String,
    },

    /// Unknown id, already-released id, or kind mismatch.
    ///
    /// Always caller-correctable: the host passed a handle that does not
    /// refer to a live resource of the expected kind.
    #[error("invalid handle {id}")]
    InvalidHandle {
        /// The offending handle id.
        id: HandleId,
    },

    /// `wrap()` was given a kind absent from the dispatch table.
    ///
    /// Indicates a defect in the binding itself rather than caller misuse;
    /// reported loudly at the point of failure.
    #[error("unsupported variant kind: {0}")]
    UnsupportedVariant(VariantKind),

    /// A supplied object id failed to parse as hex.
    ///
    /// Reported before any native call is made.
    #[error("malformed identifier: {0:?}")]
    MalformedIdentifier(String),

    /// Second `release()` on the same handle id.
    ///
    /// Rejected so a native destructor can never fire twice.
    #[error("handle {id} already released")]
    DoubleRelease {
        /// The already-released handle id.
        id: HandleId,
    },
}

impl Error {
    /// Check if this is a native call failure.
    pub fn is_native_call(&self) -> bool {
        matches!(self, Error::NativeCall { .. })
    }

    /// Check if this is an invalid handle error.
    pub fn is_invalid_handle(&self) -> bool {
        matches!(self, Error::InvalidHandle { .. })
    }

    /// Check if this is a malformed identifier error.
    pub fn is_malformed_identifier(&self) -> bool {
        matches!(self, Error::MalformedIdentifier(_))
    }

    /// Check if this is a double release error.
    pub fn is_double_release(&self) -> bool {
        matches!(self, Error::DoubleRelease { .. })
    }

    /// Raw native status code, if this is a native call failure.
    pub fn native_code(&self) -> Option<i32> {
        match self {
            Error::NativeCall { code, .. } => Some(*code),
            _ => None,
        }
    }
}
