//! Triangular matrix-vector multiply: `x = op(A) * x`
//!
//! The update is in place, so the kernel works from a workspace copy of
//! `x`: one pass snapshots every batch item into scratch, a second pass
//! computes each output lane from the snapshot. Size-query mode reports
//! the `n * batch_count` element snapshot without executing.
//!
//! Fill, unit-diagonal, transpose, and conjugate variants are
//! monomorphized; the triangle bounds fold to constants inside each
//! instantiation.

use super::validate::{check_batch, check_dim, check_inc, check_ld, check_ptr};
use super::{ArgCheck, Diagonal, Fill, Transpose};
use crate::batch::{
    inc_shift, ArrayRead, ArrayWrite, BatchRead, BatchWrite, StridedRead, StridedWrite,
};
use crate::check::{check_numerics_tri_matrix, check_numerics_vector};
use crate::context::{Handle, LogArg};
use crate::dtype::Scalar;
use crate::error::{status_boundary, Result, Status};
use crate::launch::{launch, tiles_for, Grid};
use smallvec::smallvec;

/// Output lanes per work-group
const DIM_X: i32 = 64;

fn trmv_workspace_bytes<T>(n: i32, batch_count: i32) -> usize {
    n.max(0) as usize * batch_count.max(0) as usize * std::mem::size_of::<T>()
}

fn trmv_arg_check(
    n: i32,
    incx: i32,
    lda: i32,
    batch_count: i32,
    a_null: bool,
    x_null: bool,
) -> Result<ArgCheck> {
    check_dim("n", n)?;
    check_inc("incx", incx)?;
    check_ld("lda", lda, n)?;
    check_batch(batch_count)?;
    if n == 0 || batch_count == 0 {
        return Ok(ArgCheck::QuickReturn);
    }
    check_ptr("a", a_null)?;
    check_ptr("x", x_null)?;
    Ok(ArgCheck::Continue)
}

/// Snapshot pass: `w[z*n + i] = x_z[i * incx]`
unsafe fn trmv_snapshot<T, X>(n: i32, x: X, incx: i32, ws_addr: usize, z0: i32, batches: u32)
where
    T: Scalar,
    X: BatchRead<T>,
{
    let shift = inc_shift(incx, n);
    launch(Grid::new(tiles_for(n, DIM_X), 1, batches), |g| {
        let z = z0 + g.z as i32;
        let px = unsafe { x.load(z, shift) };
        let w = (ws_addr as *mut T).wrapping_add(z as usize * n as usize);
        let start = g.x as i32 * DIM_X;
        let end = (start + DIM_X).min(n);
        for i in start..end {
            unsafe { *w.add(i as usize) = *px.offset(i as isize * incx as isize) };
        }
    });
}

/// Compute pass from the snapshot
#[allow(clippy::too_many_arguments)]
unsafe fn trmv_compute<T, A, X, const UPPER: bool, const UNIT: bool, const CONJ: bool, const TRANS: bool>(
    n: i32,
    a: A,
    lda: i32,
    x: X,
    incx: i32,
    ws_addr: usize,
    z0: i32,
    batches: u32,
) where
    T: Scalar,
    A: BatchRead<T>,
    X: BatchWrite<T>,
{
    let shift = inc_shift(incx, n);
    launch(Grid::new(tiles_for(n, DIM_X), 1, batches), |g| {
        let z = z0 + g.z as i32;
        let pa = unsafe { a.load(z, 0) };
        let px = unsafe { x.load_mut(z, shift) };
        let w = (ws_addr as *const T).wrapping_add(z as usize * n as usize);

        let start = g.x as i32 * DIM_X;
        let end = (start + DIM_X).min(n);
        for i in start..end {
            // Triangle bounds fold per instantiation: the stored triangle
            // seen through op() is upper-like iff UPPER differs from TRANS.
            let (lo, hi) = if UPPER != TRANS {
                (i, n)
            } else {
                (0, i + 1)
            };
            let mut sum = if UNIT {
                unsafe { *w.add(i as usize) }
            } else {
                T::zero()
            };
            for j in lo..hi {
                if UNIT && j == i {
                    continue;
                }
                let idx = if TRANS {
                    j as isize + i as isize * lda as isize
                } else {
                    i as isize + j as isize * lda as isize
                };
                let av = unsafe { *pa.offset(idx) };
                let av = if CONJ { av.conj() } else { av };
                sum = sum + av * unsafe { *w.add(j as usize) };
            }
            unsafe { *px.offset(i as isize * incx as isize) = sum };
        }
    });
}

#[allow(clippy::too_many_arguments)]
unsafe fn trmv_impl<T, A, X>(
    handle: &Handle,
    op: &'static str,
    uplo: Fill,
    trans: Transpose,
    diag: Diagonal,
    n: i32,
    a: A,
    lda: i32,
    x: X,
    incx: i32,
    batch_count: i32,
) -> Result<()>
where
    T: Scalar,
    A: BatchRead<T>,
    X: BatchWrite<T>,
{
    handle.log_call(op, || {
        smallvec![
            LogArg::ch("precision", T::DTYPE.letter()),
            LogArg::ch("uplo", uplo.letter()),
            LogArg::ch("trans", trans.letter()),
            LogArg::ch("diag", diag.letter()),
            LogArg::int("n", n as i64),
            LogArg::int("lda", lda as i64),
            LogArg::int("incx", incx as i64),
            LogArg::int("batch_count", batch_count as i64),
        ]
    });

    if handle.record_size_query(trmv_workspace_bytes::<T>(n, batch_count)) {
        return Ok(());
    }

    match trmv_arg_check(n, incx, lda, batch_count, a.is_null(), x.is_null())? {
        ArgCheck::QuickReturn => return Ok(()),
        ArgCheck::Continue => {}
    }

    check_numerics_tri_matrix(op, handle, uplo, n, a, lda, batch_count, true)?;
    check_numerics_vector(op, handle, n, x, incx, batch_count, true)?;

    let ws = handle.workspace(trmv_workspace_bytes::<T>(n, batch_count))?;
    let ws_addr = ws.as_mut_ptr::<T>() as usize;

    macro_rules! compute {
        ($upper:expr, $unit:expr, $conj:expr, $trans:expr, $z0:expr, $batches:expr) => {
            trmv_compute::<T, A, X, { $upper }, { $unit }, { $conj }, { $trans }>(
                n, a, lda, x, incx, ws_addr, $z0, $batches,
            )
        };
    }
    macro_rules! run {
        ($z0:expr, $batches:expr) => {
            match (uplo, trans, diag) {
                (Fill::Upper, Transpose::None, Diagonal::NonUnit) => {
                    compute!(true, false, false, false, $z0, $batches)
                }
                (Fill::Upper, Transpose::None, Diagonal::Unit) => {
                    compute!(true, true, false, false, $z0, $batches)
                }
                (Fill::Upper, Transpose::Trans, Diagonal::NonUnit) => {
                    compute!(true, false, false, true, $z0, $batches)
                }
                (Fill::Upper, Transpose::Trans, Diagonal::Unit) => {
                    compute!(true, true, false, true, $z0, $batches)
                }
                (Fill::Upper, Transpose::ConjTrans, Diagonal::NonUnit) => {
                    compute!(true, false, true, true, $z0, $batches)
                }
                (Fill::Upper, Transpose::ConjTrans, Diagonal::Unit) => {
                    compute!(true, true, true, true, $z0, $batches)
                }
                (Fill::Lower, Transpose::None, Diagonal::NonUnit) => {
                    compute!(false, false, false, false, $z0, $batches)
                }
                (Fill::Lower, Transpose::None, Diagonal::Unit) => {
                    compute!(false, true, false, false, $z0, $batches)
                }
                (Fill::Lower, Transpose::Trans, Diagonal::NonUnit) => {
                    compute!(false, false, false, true, $z0, $batches)
                }
                (Fill::Lower, Transpose::Trans, Diagonal::Unit) => {
                    compute!(false, true, false, true, $z0, $batches)
                }
                (Fill::Lower, Transpose::ConjTrans, Diagonal::NonUnit) => {
                    compute!(false, false, true, true, $z0, $batches)
                }
                (Fill::Lower, Transpose::ConjTrans, Diagonal::Unit) => {
                    compute!(false, true, true, true, $z0, $batches)
                }
            }
        };
    }

    let footprint = 1 + (n as i64 - 1) * incx.abs() as i64;
    if x.disjoint(footprint, batch_count) {
        trmv_snapshot(n, x, incx, ws_addr, 0, batch_count as u32);
        run!(0, batch_count as u32);
    } else {
        // Aliased output batches: each item must observe the results of
        // the previous one, so snapshot and compute run per item.
        for b in 0..batch_count {
            trmv_snapshot(n, x, incx, ws_addr, b, 1);
            run!(b, 1);
        }
    }

    check_numerics_tri_matrix(op, handle, uplo, n, a, lda, batch_count, false)?;
    check_numerics_vector(op, handle, n, x, incx, batch_count, false)
}

/// Triangular matrix-vector multiply `x = op(A) * x`.
///
/// # Safety
/// When non-null, `a` must cover an `lda x n` column-major panel and `x`
/// `n` elements at increment `incx`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trmv<T: Scalar>(
    handle: &Handle,
    uplo: Fill,
    trans: Transpose,
    diag: Diagonal,
    n: i32,
    a: *const T,
    lda: i32,
    x: *mut T,
    incx: i32,
) -> Status {
    status_boundary(|| {
        trmv_impl(
            handle,
            "trmv",
            uplo,
            trans,
            diag,
            n,
            StridedRead::new(a, 0),
            lda,
            StridedWrite::new(x, 0),
            incx,
            1,
        )
    })
}

/// Triangular matrix-vector multiply over a batch (pointer-array form).
///
/// # Safety
/// When non-null, each table must hold `batch_count` per-item pointers
/// with the plain-form coverage per item.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trmv_batched<T: Scalar>(
    handle: &Handle,
    uplo: Fill,
    trans: Transpose,
    diag: Diagonal,
    n: i32,
    a: *const *const T,
    lda: i32,
    x: *const *mut T,
    incx: i32,
    batch_count: i32,
) -> Status {
    status_boundary(|| {
        trmv_impl(
            handle,
            "trmv_batched",
            uplo,
            trans,
            diag,
            n,
            ArrayRead::new(a),
            lda,
            ArrayWrite::new(x),
            incx,
            batch_count,
        )
    })
}

/// Triangular matrix-vector multiply over a batch (strided form).
///
/// # Safety
/// When non-null, each operand must cover every batch item addressed by
/// its stride.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trmv_strided_batched<T: Scalar>(
    handle: &Handle,
    uplo: Fill,
    trans: Transpose,
    diag: Diagonal,
    n: i32,
    a: *const T,
    lda: i32,
    stridea: i64,
    x: *mut T,
    incx: i32,
    stridex: i64,
    batch_count: i32,
) -> Status {
    status_boundary(|| {
        trmv_impl(
            handle,
            "trmv_strided_batched",
            uplo,
            trans,
            diag,
            n,
            StridedRead::new(a, stridea),
            lda,
            StridedWrite::new(x, stridex),
            incx,
            batch_count,
        )
    })
}
