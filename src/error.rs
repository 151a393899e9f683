//! Error and status types for parablas
//!
//! Internally the crate uses [`Error`] with `Result<T>` and `?` propagation.
//! The public boundary is status-based: every public operation returns a
//! [`Status`], and any panic escaping an internal layer is caught at the
//! boundary and mapped to [`Status::InternalError`].

use thiserror::Error;

/// Result type alias using parablas's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur inside parablas operations
#[derive(Error, Debug)]
pub enum Error {
    /// Operation issued without a usable execution handle
    #[error("Invalid handle")]
    InvalidHandle,

    /// An enumerated mode argument is outside its legal set
    #[error("Invalid value for '{arg}': {reason}")]
    InvalidValue {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: &'static str,
    },

    /// Shape or stride violates geometric constraints
    #[error("Invalid size for '{arg}': {reason}")]
    InvalidSize {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: &'static str,
    },

    /// Required buffer is null on a non-degenerate problem
    #[error("Null pointer for required argument '{arg}'")]
    InvalidPointer {
        /// The argument name
        arg: &'static str,
    },

    /// Workspace acquisition failed
    #[error("Out of memory: failed to acquire {size} byte workspace")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },

    /// A NaN or Inf was detected by the numerics check
    #[error("Numerical check failed in '{op}' (is_input={is_input})")]
    CheckNumericsFail {
        /// The operation name
        op: &'static str,
        /// True when detected on an input operand, false on an output
        is_input: bool,
    },

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The closed public status this error maps to
    pub fn status(&self) -> Status {
        match self {
            Error::InvalidHandle => Status::InvalidHandle,
            Error::InvalidValue { .. } => Status::InvalidValue,
            Error::InvalidSize { .. } => Status::InvalidSize,
            Error::InvalidPointer { .. } => Status::InvalidPointer,
            Error::OutOfMemory { .. } => Status::MemoryError,
            Error::CheckNumericsFail { .. } => Status::CheckNumericsFail,
            Error::Internal(_) => Status::InternalError,
        }
    }
}

/// Outcome of one public operation
///
/// A closed enumeration threaded through every layer. Terminal for the
/// call; never silently downgraded. The discriminant values are stable.
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// The operation completed (including degenerate quick returns)
    Success = 0,
    /// Missing or unusable execution context
    InvalidHandle = 1,
    /// An enumerated mode argument outside its legal set
    InvalidValue = 2,
    /// Shape/stride violates geometric constraints
    InvalidSize = 3,
    /// Required buffer missing on a non-degenerate call
    InvalidPointer = 4,
    /// Workspace acquisition failed
    MemoryError = 5,
    /// Non-finite value detected on an input or output operand
    CheckNumericsFail = 6,
    /// Unexpected fault caught at the public boundary
    InternalError = 7,
}

impl Status {
    /// True iff the status is `Success`
    #[inline]
    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Success => "success",
            Status::InvalidHandle => "invalid_handle",
            Status::InvalidValue => "invalid_value",
            Status::InvalidSize => "invalid_size",
            Status::InvalidPointer => "invalid_pointer",
            Status::MemoryError => "memory_error",
            Status::CheckNumericsFail => "check_numerics_fail",
            Status::InternalError => "internal_error",
        };
        f.write_str(s)
    }
}

/// Run an operation body and fold its outcome into a [`Status`].
///
/// Panics are caught here so no language-level fault crosses the public
/// boundary.
pub(crate) fn status_boundary<F>(f: F) -> Status
where
    F: FnOnce() -> Result<()>,
{
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(Ok(())) => Status::Success,
        Ok(Err(e)) => e.status(),
        Err(_) => Status::InternalError,
    }
}
