//! Numerics sanitation pass
//!
//! When enabled on the handle, every operation scans its operands twice:
//! inputs before dispatch, outputs after. The scan classifies elements into
//! zero / NaN / Inf without mutating anything; zeros are diagnostic only,
//! any NaN or Inf fails the enclosing call with `check_numerics_fail`. A
//! post-dispatch failure still means the output buffer was consumed and
//! must not be used.
//!
//! Complex elements are checked per part: either part non-finite fails the
//! element.

use crate::batch::{inc_shift, BatchRead};
use crate::context::{Handle, LogArg};
use crate::dtype::Scalar;
use crate::error::{Error, Result};
use crate::launch::{launch, tiles_for, Grid};
use crate::ops::Fill;
use smallvec::smallvec;
use std::sync::atomic::{AtomicBool, Ordering};

/// Elements scanned per work-group
const NB: i32 = 1024;

/// Aggregated classification of one scan
#[derive(Debug, Default)]
struct NumericsFlags {
    zero: AtomicBool,
    nan: AtomicBool,
    inf: AtomicBool,
}

impl NumericsFlags {
    #[inline]
    fn record<T: Scalar>(&self, v: T) {
        if v.is_nan() {
            self.nan.store(true, Ordering::Relaxed);
        } else if v.is_inf() {
            self.inf.store(true, Ordering::Relaxed);
        } else if v.is_zero() {
            self.zero.store(true, Ordering::Relaxed);
        }
    }

    fn finish(&self, op: &'static str, handle: &Handle, is_input: bool) -> Result<()> {
        let nan = self.nan.load(Ordering::Relaxed);
        let inf = self.inf.load(Ordering::Relaxed);
        handle.log_call(op, || {
            smallvec![
                LogArg::Str("check", if is_input { "input" } else { "output" }),
                LogArg::Int("has_zero", self.zero.load(Ordering::Relaxed) as i64),
                LogArg::Int("has_nan", nan as i64),
                LogArg::Int("has_inf", inf as i64),
            ]
        });
        if nan || inf {
            return Err(Error::CheckNumericsFail { op, is_input });
        }
        Ok(())
    }
}

/// Scan a batched vector operand for non-finite values
///
/// # Safety
/// `x` must cover `n` elements at increment `inc` for every batch item.
pub(crate) unsafe fn check_numerics_vector<T, X>(
    op: &'static str,
    handle: &Handle,
    n: i32,
    x: X,
    inc: i32,
    batch_count: i32,
    is_input: bool,
) -> Result<()>
where
    T: Scalar,
    X: BatchRead<T>,
{
    if !handle.check_numerics().is_enabled() || n <= 0 || batch_count <= 0 {
        return Ok(());
    }

    let flags = NumericsFlags::default();
    let shift = inc_shift(inc, n);
    let grid = Grid::new(tiles_for(n, NB), 1, batch_count as u32);

    launch(grid, |g| {
        let ptr = unsafe { x.load(g.z as i32, shift) };
        let start = g.x as i32 * NB;
        let end = (start + NB).min(n);
        for i in start..end {
            let v = unsafe { *ptr.offset((i as i64 * inc as i64) as isize) };
            flags.record(v);
        }
    });

    flags.finish(op, handle, is_input)
}

/// Scan a batched general-matrix operand (m × n, leading dimension lda)
///
/// # Safety
/// `a` must cover an `lda × n` column-major panel for every batch item.
pub(crate) unsafe fn check_numerics_matrix<T, A>(
    op: &'static str,
    handle: &Handle,
    m: i32,
    n: i32,
    a: A,
    lda: i32,
    batch_count: i32,
    is_input: bool,
) -> Result<()>
where
    T: Scalar,
    A: BatchRead<T>,
{
    if !handle.check_numerics().is_enabled() || m <= 0 || n <= 0 || batch_count <= 0 {
        return Ok(());
    }

    let flags = NumericsFlags::default();
    let grid = Grid::new(tiles_for(m, NB), n as u32, batch_count as u32);

    launch(grid, |g| {
        let ptr = unsafe { a.load(g.z as i32, 0) };
        let col = g.y as i64;
        let start = g.x as i32 * NB;
        let end = (start + NB).min(m);
        for i in start..end {
            let v = unsafe { *ptr.offset((i as i64 + col * lda as i64) as isize) };
            flags.record(v);
        }
    });

    flags.finish(op, handle, is_input)
}

/// Scan the referenced triangle of a batched triangular operand
///
/// Only the triangle selected by `uplo` is inspected; the opposite
/// triangle is not referenced by the operation and may hold anything.
///
/// # Safety
/// `a` must cover an `lda × n` column-major panel for every batch item.
pub(crate) unsafe fn check_numerics_tri_matrix<T, A>(
    op: &'static str,
    handle: &Handle,
    uplo: Fill,
    n: i32,
    a: A,
    lda: i32,
    batch_count: i32,
    is_input: bool,
) -> Result<()>
where
    T: Scalar,
    A: BatchRead<T>,
{
    if !handle.check_numerics().is_enabled() || n <= 0 || batch_count <= 0 {
        return Ok(());
    }

    let flags = NumericsFlags::default();
    let grid = Grid::new(1, n as u32, batch_count as u32);

    launch(grid, |g| {
        let ptr = unsafe { a.load(g.z as i32, 0) };
        let col = g.y as i32;
        let (start, end) = match uplo {
            Fill::Upper => (0, col + 1),
            Fill::Lower => (col, n),
        };
        for i in start..end {
            let v = unsafe { *ptr.offset((i as i64 + col as i64 * lda as i64) as isize) };
            flags.record(v);
        }
    });

    flags.finish(op, handle, is_input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::StridedRead;
    use crate::context::CheckNumerics;

    fn checking_handle() -> Handle {
        let mut h = Handle::new();
        h.set_check_numerics(CheckNumerics::Enabled);
        h
    }

    #[test]
    fn test_vector_all_finite() {
        let handle = checking_handle();
        let data = [1.0f32, 0.0, -2.0, 3.5];
        let x = StridedRead::new(data.as_ptr(), 0);
        let r = unsafe { check_numerics_vector("test", &handle, 4, x, 1, 1, true) };
        assert!(r.is_ok());
    }

    #[test]
    fn test_vector_nan_fails() {
        let handle = checking_handle();
        let data = [1.0f32, f32::NAN, 2.0];
        let x = StridedRead::new(data.as_ptr(), 0);
        let r = unsafe { check_numerics_vector("test", &handle, 3, x, 1, 1, true) };
        assert!(matches!(
            r,
            Err(Error::CheckNumericsFail {
                is_input: true,
                ..
            })
        ));
    }

    #[test]
    fn test_vector_respects_increment() {
        let handle = checking_handle();
        // NaN sits between the strided elements, never read
        let data = [1.0f32, f32::NAN, 2.0, f32::NAN, 3.0];
        let x = StridedRead::new(data.as_ptr(), 0);
        let r = unsafe { check_numerics_vector("test", &handle, 3, x, 2, 1, true) };
        assert!(r.is_ok());
    }

    #[test]
    fn test_disabled_handle_skips_scan() {
        let handle = Handle::new();
        let data = [f32::NAN];
        let x = StridedRead::new(data.as_ptr(), 0);
        let r = unsafe { check_numerics_vector("test", &handle, 1, x, 1, 1, true) };
        assert!(r.is_ok());
    }

    #[test]
    fn test_triangle_scan_skips_other_triangle() {
        let handle = checking_handle();
        // 2x2 column-major, NaN in the strictly-lower part
        let data = [1.0f64, f64::NAN, 3.0, 4.0];
        let a = StridedRead::new(data.as_ptr(), 0);
        let upper =
            unsafe { check_numerics_tri_matrix("test", &handle, Fill::Upper, 2, a, 2, 1, true) };
        assert!(upper.is_ok());
        let lower =
            unsafe { check_numerics_tri_matrix("test", &handle, Fill::Lower, 2, a, 2, 1, true) };
        assert!(lower.is_err());
    }
}
