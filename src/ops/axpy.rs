//! Scaled vector addition: `y = alpha * x + y`
//!
//! Negative increments are legal and address the respective vector from
//! its end. In host pointer mode `alpha == 0` quick-returns without
//! touching `y`.

use super::validate::{check_batch, check_dim, check_inc, check_ptr};
use super::ArgCheck;
use crate::batch::{
    inc_shift, load_scalar, ArrayRead, ArrayWrite, BatchRead, BatchWrite, StridedRead,
    StridedWrite,
};
use crate::check::check_numerics_vector;
use crate::context::{Handle, LogArg, PointerMode};
use crate::dtype::Scalar;
use crate::error::{status_boundary, Result, Status};
use crate::launch::{launch, launch_batch_seq, tiles_for, Grid};
use smallvec::smallvec;

/// Elements per work-group
const NB: i32 = 256;

#[allow(clippy::too_many_arguments)]
fn axpy_arg_check(
    n: i32,
    incx: i32,
    incy: i32,
    batch_count: i32,
    alpha_null: bool,
    x_null: bool,
    y_null: bool,
) -> Result<ArgCheck> {
    check_dim("n", n)?;
    check_inc("incx", incx)?;
    check_inc("incy", incy)?;
    check_batch(batch_count)?;
    if n == 0 || batch_count == 0 {
        return Ok(ArgCheck::QuickReturn);
    }
    check_ptr("alpha", alpha_null)?;
    check_ptr("x", x_null)?;
    check_ptr("y", y_null)?;
    Ok(ArgCheck::Continue)
}

#[allow(clippy::too_many_arguments)]
unsafe fn axpy_impl<T, X, Y>(
    handle: &Handle,
    op: &'static str,
    n: i32,
    alpha: *const T,
    x: X,
    incx: i32,
    y: Y,
    incy: i32,
    batch_count: i32,
) -> Result<()>
where
    T: Scalar,
    X: BatchRead<T>,
    Y: BatchWrite<T>,
{
    handle.log_call(op, || {
        smallvec![
            LogArg::ch("precision", T::DTYPE.letter()),
            LogArg::int("n", n as i64),
            LogArg::int("incx", incx as i64),
            LogArg::int("incy", incy as i64),
            LogArg::int("batch_count", batch_count as i64),
        ]
    });

    if handle.record_size_query(0) {
        return Ok(());
    }

    match axpy_arg_check(
        n,
        incx,
        incy,
        batch_count,
        alpha.is_null(),
        x.is_null(),
        y.is_null(),
    )? {
        ArgCheck::QuickReturn => return Ok(()),
        ArgCheck::Continue => {}
    }

    let a = load_scalar(alpha);
    if handle.pointer_mode() == PointerMode::Host && a.is_zero() {
        return Ok(());
    }

    check_numerics_vector(op, handle, n, x, incx, batch_count, true)?;
    check_numerics_vector(op, handle, n, y, incy, batch_count, true)?;

    let shiftx = inc_shift(incx, n);
    let shifty = inc_shift(incy, n);
    let grid = Grid::new(tiles_for(n, NB), 1, batch_count as u32);
    let body = |g: crate::launch::GroupId| {
        if a.is_zero() {
            // Device-mode zero coefficient: nothing to accumulate.
            return;
        }
        let px = unsafe { x.load(g.z as i32, shiftx) };
        let py = unsafe { y.load_mut(g.z as i32, shifty) };
        let start = g.x as i32 * NB;
        let end = (start + NB).min(n);
        for i in start..end {
            let xv = unsafe { *px.offset(i as isize * incx as isize) };
            let p = unsafe { py.offset(i as isize * incy as isize) };
            unsafe { *p = a * xv + *p };
        }
    };
    let footprint = 1 + (n as i64 - 1) * incy.abs() as i64;
    if y.disjoint(footprint, batch_count) {
        launch(grid, body);
    } else {
        launch_batch_seq(grid, body);
    }

    check_numerics_vector(op, handle, n, y, incy, batch_count, false)
}

/// Scaled vector addition: `y = alpha * x + y`.
///
/// # Safety
/// When non-null, `x` and `y` must each cover `n` elements at their
/// increments and `alpha` one element.
pub unsafe fn axpy<T: Scalar>(
    handle: &Handle,
    n: i32,
    alpha: *const T,
    x: *const T,
    incx: i32,
    y: *mut T,
    incy: i32,
) -> Status {
    status_boundary(|| {
        axpy_impl(
            handle,
            "axpy",
            n,
            alpha,
            StridedRead::new(x, 0),
            incx,
            StridedWrite::new(y, 0),
            incy,
            1,
        )
    })
}

/// Scaled vector addition over a batch (pointer-array form).
///
/// # Safety
/// When non-null, `x` and `y` must each hold `batch_count` per-item
/// pointers; `alpha` must cover one element.
#[allow(clippy::too_many_arguments)]
pub unsafe fn axpy_batched<T: Scalar>(
    handle: &Handle,
    n: i32,
    alpha: *const T,
    x: *const *const T,
    incx: i32,
    y: *const *mut T,
    incy: i32,
    batch_count: i32,
) -> Status {
    status_boundary(|| {
        axpy_impl(
            handle,
            "axpy_batched",
            n,
            alpha,
            ArrayRead::new(x),
            incx,
            ArrayWrite::new(y),
            incy,
            batch_count,
        )
    })
}

/// Scaled vector addition over a batch (strided form).
///
/// # Safety
/// When non-null, `x` and `y` must cover every batch item addressed by
/// their strides; `alpha` must cover one element.
#[allow(clippy::too_many_arguments)]
pub unsafe fn axpy_strided_batched<T: Scalar>(
    handle: &Handle,
    n: i32,
    alpha: *const T,
    x: *const T,
    incx: i32,
    stridex: i64,
    y: *mut T,
    incy: i32,
    stridey: i64,
    batch_count: i32,
) -> Status {
    status_boundary(|| {
        axpy_impl(
            handle,
            "axpy_strided_batched",
            n,
            alpha,
            StridedRead::new(x, stridex),
            incx,
            StridedWrite::new(y, stridey),
            incy,
            batch_count,
        )
    })
}
