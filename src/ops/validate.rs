//! Shared argument-validation helpers
//!
//! Each operation's `*_arg_check` composes these in the strict order the
//! interface contract fixes: mode values, then sizes, then the degenerate
//! quick return, then pointers. Size errors are reported even when data
//! pointers are null (callers probe legal shapes with null pointers for
//! logging-only dry runs), so no helper here ever dereferences anything.

use crate::error::{Error, Result};

/// Reject a negative extent
#[inline]
pub(crate) fn check_dim(arg: &'static str, v: i32) -> Result<()> {
    if v < 0 {
        return Err(Error::InvalidSize {
            arg,
            reason: "negative extent",
        });
    }
    Ok(())
}

/// Reject a zero increment
#[inline]
pub(crate) fn check_inc(arg: &'static str, inc: i32) -> Result<()> {
    if inc == 0 {
        return Err(Error::InvalidSize {
            arg,
            reason: "zero increment",
        });
    }
    Ok(())
}

/// Reject a leading dimension below its governing extent (or below 1)
#[inline]
pub(crate) fn check_ld(arg: &'static str, ld: i32, governing: i32) -> Result<()> {
    if ld < 1 || ld < governing {
        return Err(Error::InvalidSize {
            arg,
            reason: "leading dimension below governing extent",
        });
    }
    Ok(())
}

/// Reject a negative batch count
#[inline]
pub(crate) fn check_batch(batch_count: i32) -> Result<()> {
    if batch_count < 0 {
        return Err(Error::InvalidSize {
            arg: "batch_count",
            reason: "negative batch count",
        });
    }
    Ok(())
}

/// Reject a null required pointer (only reached on non-degenerate calls)
#[inline]
pub(crate) fn check_ptr(arg: &'static str, is_null: bool) -> Result<()> {
    if is_null {
        return Err(Error::InvalidPointer { arg });
    }
    Ok(())
}
