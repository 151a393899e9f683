//! Vector scaling: `x = alpha * x`
//!
//! A non-positive increment quick-returns success per the reference
//! convention for this operation. In host pointer mode `alpha == 1` is a
//! no-op shortcut; `alpha == 0` still runs the kernel because it must
//! write zeros.

use super::validate::{check_batch, check_dim, check_inc, check_ptr};
use super::ArgCheck;
use crate::batch::{load_scalar, ArrayWrite, BatchRead, BatchWrite, StridedWrite};
use crate::check::check_numerics_vector;
use crate::context::{Handle, LogArg, PointerMode};
use crate::dtype::Scalar;
use crate::error::{status_boundary, Result, Status};
use crate::launch::{launch, launch_batch_seq, tiles_for, Grid};
use smallvec::smallvec;

/// Elements per work-group
const NB: i32 = 256;

fn scal_arg_check(
    n: i32,
    incx: i32,
    batch_count: i32,
    alpha_null: bool,
    x_null: bool,
) -> Result<ArgCheck> {
    check_dim("n", n)?;
    check_inc("incx", incx)?;
    check_batch(batch_count)?;
    if n == 0 || incx < 0 || batch_count == 0 {
        return Ok(ArgCheck::QuickReturn);
    }
    check_ptr("alpha", alpha_null)?;
    check_ptr("x", x_null)?;
    Ok(ArgCheck::Continue)
}

unsafe fn scal_impl<T, X>(
    handle: &Handle,
    op: &'static str,
    n: i32,
    alpha: *const T,
    x: X,
    incx: i32,
    batch_count: i32,
) -> Result<()>
where
    T: Scalar,
    X: BatchWrite<T>,
{
    handle.log_call(op, || {
        smallvec![
            LogArg::ch("precision", T::DTYPE.letter()),
            LogArg::int("n", n as i64),
            LogArg::int("incx", incx as i64),
            LogArg::int("batch_count", batch_count as i64),
        ]
    });

    if handle.record_size_query(0) {
        return Ok(());
    }

    match scal_arg_check(n, incx, batch_count, alpha.is_null(), x.is_null())? {
        ArgCheck::QuickReturn => return Ok(()),
        ArgCheck::Continue => {}
    }

    let a = load_scalar(alpha);
    if handle.pointer_mode() == PointerMode::Host && a == T::one() {
        return Ok(());
    }

    check_numerics_vector(op, handle, n, x, incx, batch_count, true)?;

    let grid = Grid::new(tiles_for(n, NB), 1, batch_count as u32);
    let body = |g: crate::launch::GroupId| {
        let ptr = unsafe { x.load_mut(g.z as i32, 0) };
        let start = g.x as i32 * NB;
        let end = (start + NB).min(n);
        for i in start..end {
            let p = unsafe { ptr.offset(i as isize * incx as isize) };
            unsafe { *p = a * *p };
        }
    };
    let footprint = 1 + (n as i64 - 1) * incx.abs() as i64;
    if x.disjoint(footprint, batch_count) {
        launch(grid, body);
    } else {
        launch_batch_seq(grid, body);
    }

    check_numerics_vector(op, handle, n, x, incx, batch_count, false)
}

/// Scale a vector in place: `x = alpha * x`.
///
/// # Safety
/// When non-null, `x` must cover `n` elements at increment `incx` and
/// `alpha` one element.
pub unsafe fn scal<T: Scalar>(
    handle: &Handle,
    n: i32,
    alpha: *const T,
    x: *mut T,
    incx: i32,
) -> Status {
    status_boundary(|| {
        scal_impl(handle, "scal", n, alpha, StridedWrite::new(x, 0), incx, 1)
    })
}

/// Scale a batch of vectors in place (pointer-array form).
///
/// # Safety
/// When non-null, `x` must hold `batch_count` per-item pointers each
/// covering `n` elements at increment `incx`; `alpha` must cover one
/// element.
pub unsafe fn scal_batched<T: Scalar>(
    handle: &Handle,
    n: i32,
    alpha: *const T,
    x: *const *mut T,
    incx: i32,
    batch_count: i32,
) -> Status {
    status_boundary(|| {
        scal_impl(
            handle,
            "scal_batched",
            n,
            alpha,
            ArrayWrite::new(x),
            incx,
            batch_count,
        )
    })
}

/// Scale a batch of vectors in place (strided form).
///
/// # Safety
/// When non-null, `x` must cover every batch item addressed by `stridex`;
/// `alpha` must cover one element.
pub unsafe fn scal_strided_batched<T: Scalar>(
    handle: &Handle,
    n: i32,
    alpha: *const T,
    x: *mut T,
    incx: i32,
    stridex: i64,
    batch_count: i32,
) -> Status {
    status_boundary(|| {
        scal_impl(
            handle,
            "scal_strided_batched",
            n,
            alpha,
            StridedWrite::new(x, stridex),
            incx,
            batch_count,
        )
    })
}
