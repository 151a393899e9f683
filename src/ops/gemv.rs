//! Matrix-vector multiply: `y = alpha * op(A) * x + beta * y`
//!
//! Two kernels, selected by the transpose mode: the non-transposed form
//! tiles output rows, the (conjugate-)transposed form tiles output
//! columns. Both march the contracted dimension in fixed chunks, staging
//! the `x` slice of each chunk once per work-group. `beta == 0` overwrites
//! `y` without reading it.

use super::validate::{check_batch, check_dim, check_inc, check_ld, check_ptr};
use super::{ArgCheck, Transpose};
use crate::batch::{
    host_scalar, inc_shift, load_scalar, ArrayRead, ArrayWrite, BatchRead, BatchWrite,
    StridedRead, StridedWrite,
};
use crate::check::{check_numerics_matrix, check_numerics_vector};
use crate::context::{Handle, LogArg};
use crate::dtype::Scalar;
use crate::error::{status_boundary, Result, Status};
use crate::launch::{launch, launch_batch_seq, tiles_for, Grid};
use smallvec::smallvec;

/// Output lanes per work-group
const DIM_X: i32 = 64;
/// Contracted-dimension chunk staged per step
const CHUNK: i32 = 64;

#[allow(clippy::too_many_arguments)]
fn gemv_arg_check(
    trans: Transpose,
    m: i32,
    n: i32,
    incx: i32,
    incy: i32,
    lda: i32,
    batch_count: i32,
) -> Result<ArgCheck> {
    // trans is a closed enum; its mere presence is the mode check. Sizes
    // follow, then the degenerate quick return; pointers are the caller's
    // concern (they depend on coefficient values and pointer mode).
    let _ = trans;
    check_dim("m", m)?;
    check_dim("n", n)?;
    check_inc("incx", incx)?;
    check_inc("incy", incy)?;
    check_ld("lda", lda, m)?;
    check_batch(batch_count)?;
    if m == 0 || n == 0 || batch_count == 0 {
        return Ok(ArgCheck::QuickReturn);
    }
    Ok(ArgCheck::Continue)
}

/// Scale-only path: `y = beta * y`, used when `alpha == 0`
unsafe fn gemv_scale_kernel<T, Y>(
    out_len: i32,
    beta: T,
    y: Y,
    incy: i32,
    batch_count: i32,
) where
    T: Scalar,
    Y: BatchWrite<T>,
{
    let shifty = inc_shift(incy, out_len);
    let grid = Grid::new(tiles_for(out_len, DIM_X), 1, batch_count as u32);
    let body = move |g: crate::launch::GroupId| {
        let py = unsafe { y.load_mut(g.z as i32, shifty) };
        let start = g.x as i32 * DIM_X;
        let end = (start + DIM_X).min(out_len);
        for i in start..end {
            let p = unsafe { py.offset(i as isize * incy as isize) };
            unsafe { *p = if beta.is_zero() { T::zero() } else { beta * *p } };
        }
    };
    let footprint = 1 + (out_len as i64 - 1) * incy.abs() as i64;
    if unsafe { y.disjoint(footprint, batch_count) } {
        launch(grid, body);
    } else {
        launch_batch_seq(grid, body);
    }
}

/// Non-transposed kernel: one lane per output row
#[allow(clippy::too_many_arguments)]
unsafe fn gemvn_kernel<T, X, Y, A>(
    m: i32,
    n: i32,
    alpha: T,
    beta: T,
    a: A,
    lda: i32,
    x: X,
    incx: i32,
    y: Y,
    incy: i32,
    batch_count: i32,
) where
    T: Scalar,
    X: BatchRead<T>,
    Y: BatchWrite<T>,
    A: BatchRead<T>,
{
    let shiftx = inc_shift(incx, n);
    let shifty = inc_shift(incy, m);
    let grid = Grid::new(tiles_for(m, DIM_X), 1, batch_count as u32);

    let body = move |g: crate::launch::GroupId| {
        let pa = unsafe { a.load(g.z as i32, 0) };
        let px = unsafe { x.load(g.z as i32, shiftx) };
        let py = unsafe { y.load_mut(g.z as i32, shifty) };

        let row0 = g.x as i32 * DIM_X;
        let rows = (m - row0).min(DIM_X);
        let mut acc = [T::zero(); DIM_X as usize];

        let mut col0 = 0;
        while col0 < n {
            let cols = (n - col0).min(CHUNK);
            // Stage this chunk of x once for all lanes of the tile
            let mut xdata = [T::zero(); CHUNK as usize];
            for (j, slot) in xdata.iter_mut().enumerate().take(cols as usize) {
                let col = col0 + j as i32;
                *slot = unsafe { *px.offset(col as isize * incx as isize) };
            }
            for t in 0..rows {
                let row = (row0 + t) as isize;
                let mut sum = T::zero();
                for j in 0..cols as usize {
                    let col = (col0 + j as i32) as isize;
                    let av = unsafe { *pa.offset(row + col * lda as isize) };
                    sum = sum + av * xdata[j];
                }
                acc[t as usize] = acc[t as usize] + sum;
            }
            col0 += CHUNK;
        }

        for t in 0..rows {
            let row = row0 + t;
            let p = unsafe { py.offset(row as isize * incy as isize) };
            let v = alpha * acc[t as usize];
            unsafe { *p = if beta.is_zero() { v } else { v + beta * *p } };
        }
    };

    let footprint = 1 + (m as i64 - 1) * incy.abs() as i64;
    if unsafe { y.disjoint(footprint, batch_count) } {
        launch(grid, body);
    } else {
        launch_batch_seq(grid, body);
    }
}

/// (Conjugate-)transposed kernel: one lane per output column
#[allow(clippy::too_many_arguments)]
unsafe fn gemvt_kernel<T, X, Y, A, const CONJ: bool>(
    m: i32,
    n: i32,
    alpha: T,
    beta: T,
    a: A,
    lda: i32,
    x: X,
    incx: i32,
    y: Y,
    incy: i32,
    batch_count: i32,
) where
    T: Scalar,
    X: BatchRead<T>,
    Y: BatchWrite<T>,
    A: BatchRead<T>,
{
    let shiftx = inc_shift(incx, m);
    let shifty = inc_shift(incy, n);
    let grid = Grid::new(tiles_for(n, DIM_X), 1, batch_count as u32);

    let body = move |g: crate::launch::GroupId| {
        let pa = unsafe { a.load(g.z as i32, 0) };
        let px = unsafe { x.load(g.z as i32, shiftx) };
        let py = unsafe { y.load_mut(g.z as i32, shifty) };

        let col0 = g.x as i32 * DIM_X;
        let cols = (n - col0).min(DIM_X);
        let mut acc = [T::zero(); DIM_X as usize];

        let mut row0 = 0;
        while row0 < m {
            let rows = (m - row0).min(CHUNK);
            let mut xdata = [T::zero(); CHUNK as usize];
            for (j, slot) in xdata.iter_mut().enumerate().take(rows as usize) {
                let row = row0 + j as i32;
                *slot = unsafe { *px.offset(row as isize * incx as isize) };
            }
            for t in 0..cols {
                let col = (col0 + t) as isize;
                let mut sum = T::zero();
                for j in 0..rows as usize {
                    let row = (row0 + j as i32) as isize;
                    let av = unsafe { *pa.offset(row + col * lda as isize) };
                    let av = if CONJ { av.conj() } else { av };
                    sum = sum + av * xdata[j];
                }
                acc[t as usize] = acc[t as usize] + sum;
            }
            row0 += CHUNK;
        }

        for t in 0..cols {
            let col = col0 + t;
            let p = unsafe { py.offset(col as isize * incy as isize) };
            let v = alpha * acc[t as usize];
            unsafe { *p = if beta.is_zero() { v } else { v + beta * *p } };
        }
    };

    let footprint = 1 + (n as i64 - 1) * incy.abs() as i64;
    if unsafe { y.disjoint(footprint, batch_count) } {
        launch(grid, body);
    } else {
        launch_batch_seq(grid, body);
    }
}

#[allow(clippy::too_many_arguments)]
unsafe fn gemv_impl<T, X, Y, A>(
    handle: &Handle,
    op: &'static str,
    trans: Transpose,
    m: i32,
    n: i32,
    alpha: *const T,
    a: A,
    lda: i32,
    x: X,
    incx: i32,
    beta: *const T,
    y: Y,
    incy: i32,
    batch_count: i32,
) -> Result<()>
where
    T: Scalar,
    X: BatchRead<T>,
    Y: BatchWrite<T>,
    A: BatchRead<T>,
{
    handle.log_call(op, || {
        smallvec![
            LogArg::ch("precision", T::DTYPE.letter()),
            LogArg::ch("trans", trans.letter()),
            LogArg::int("m", m as i64),
            LogArg::int("n", n as i64),
            LogArg::int("lda", lda as i64),
            LogArg::int("incx", incx as i64),
            LogArg::int("incy", incy as i64),
            LogArg::int("batch_count", batch_count as i64),
        ]
    });

    if handle.record_size_query(0) {
        return Ok(());
    }

    match gemv_arg_check(trans, m, n, incx, incy, lda, batch_count)? {
        ArgCheck::QuickReturn => return Ok(()),
        ArgCheck::Continue => {}
    }

    check_ptr("alpha", alpha.is_null())?;
    check_ptr("beta", beta.is_null())?;

    let (in_len, out_len) = match trans {
        Transpose::None => (n, m),
        Transpose::Trans | Transpose::ConjTrans => (m, n),
    };

    // Host-mode coefficient shortcuts: alpha == 0 degenerates to a scale
    // of y, and additionally beta == 1 to a full no-op. A and x are not
    // required on those paths.
    if let Some(a0) = host_scalar(handle, alpha) {
        if a0.is_zero() {
            let b0 = load_scalar(beta);
            if b0 == T::one() {
                return Ok(());
            }
            check_ptr("y", y.is_null())?;
            check_numerics_vector(op, handle, out_len, y, incy, batch_count, true)?;
            gemv_scale_kernel(out_len, b0, y, incy, batch_count);
            return check_numerics_vector(op, handle, out_len, y, incy, batch_count, false);
        }
    }

    check_ptr("a", a.is_null())?;
    check_ptr("x", x.is_null())?;
    check_ptr("y", y.is_null())?;

    let alpha_v = load_scalar(alpha);
    let beta_v = load_scalar(beta);

    check_numerics_matrix(op, handle, m, n, a, lda, batch_count, true)?;
    check_numerics_vector(op, handle, in_len, x, incx, batch_count, true)?;
    check_numerics_vector(op, handle, out_len, y, incy, batch_count, true)?;

    if alpha_v.is_zero() {
        // Device-mode zero coefficient discovered at launch time
        gemv_scale_kernel(out_len, beta_v, y, incy, batch_count);
    } else {
        match trans {
            Transpose::None => gemvn_kernel(
                m,
                n,
                alpha_v,
                beta_v,
                a,
                lda,
                x,
                incx,
                y,
                incy,
                batch_count,
            ),
            Transpose::Trans => gemvt_kernel::<T, X, Y, A, false>(
                m,
                n,
                alpha_v,
                beta_v,
                a,
                lda,
                x,
                incx,
                y,
                incy,
                batch_count,
            ),
            Transpose::ConjTrans => gemvt_kernel::<T, X, Y, A, true>(
                m,
                n,
                alpha_v,
                beta_v,
                a,
                lda,
                x,
                incx,
                y,
                incy,
                batch_count,
            ),
        }
    }

    check_numerics_matrix(op, handle, m, n, a, lda, batch_count, false)?;
    check_numerics_vector(op, handle, in_len, x, incx, batch_count, false)?;
    check_numerics_vector(op, handle, out_len, y, incy, batch_count, false)
}

/// Matrix-vector multiply `y = alpha * op(A) * x + beta * y`.
///
/// # Safety
/// When non-null, `a` must cover an `lda x n` column-major panel, `x` the
/// contracted extent, `y` the output extent, and `alpha`/`beta` one
/// element each.
#[allow(clippy::too_many_arguments)]
pub unsafe fn gemv<T: Scalar>(
    handle: &Handle,
    trans: Transpose,
    m: i32,
    n: i32,
    alpha: *const T,
    a: *const T,
    lda: i32,
    x: *const T,
    incx: i32,
    beta: *const T,
    y: *mut T,
    incy: i32,
) -> Status {
    status_boundary(|| {
        gemv_impl(
            handle,
            "gemv",
            trans,
            m,
            n,
            alpha,
            StridedRead::new(a, 0),
            lda,
            StridedRead::new(x, 0),
            incx,
            beta,
            StridedWrite::new(y, 0),
            incy,
            1,
        )
    })
}

/// Matrix-vector multiply over a batch (pointer-array form).
///
/// # Safety
/// When non-null, each table must hold `batch_count` per-item pointers
/// with the plain-form coverage per item.
#[allow(clippy::too_many_arguments)]
pub unsafe fn gemv_batched<T: Scalar>(
    handle: &Handle,
    trans: Transpose,
    m: i32,
    n: i32,
    alpha: *const T,
    a: *const *const T,
    lda: i32,
    x: *const *const T,
    incx: i32,
    beta: *const T,
    y: *const *mut T,
    incy: i32,
    batch_count: i32,
) -> Status {
    status_boundary(|| {
        gemv_impl(
            handle,
            "gemv_batched",
            trans,
            m,
            n,
            alpha,
            ArrayRead::new(a),
            lda,
            ArrayRead::new(x),
            incx,
            beta,
            ArrayWrite::new(y),
            incy,
            batch_count,
        )
    })
}

/// Matrix-vector multiply over a batch (strided form).
///
/// # Safety
/// When non-null, each operand must cover every batch item addressed by
/// its stride.
#[allow(clippy::too_many_arguments)]
pub unsafe fn gemv_strided_batched<T: Scalar>(
    handle: &Handle,
    trans: Transpose,
    m: i32,
    n: i32,
    alpha: *const T,
    a: *const T,
    lda: i32,
    stridea: i64,
    x: *const T,
    incx: i32,
    stridex: i64,
    beta: *const T,
    y: *mut T,
    incy: i32,
    stridey: i64,
    batch_count: i32,
) -> Status {
    status_boundary(|| {
        gemv_impl(
            handle,
            "gemv_strided_batched",
            trans,
            m,
            n,
            alpha,
            StridedRead::new(a, stridea),
            lda,
            StridedRead::new(x, stridex),
            incx,
            beta,
            StridedWrite::new(y, stridey),
            incy,
            batch_count,
        )
    })
}
