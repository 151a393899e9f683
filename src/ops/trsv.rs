//! Triangular solve: `op(A) * x = b`, solved in place over `x`
//!
//! Substitution carries a loop dependency across rows, so parallelism
//! comes from the batch axis only: one work-group owns one batch item and
//! walks the rows in dependency order. A zero on a non-unit diagonal
//! produces non-finite lanes, which the post-dispatch numerics scan
//! reports when enabled.

use super::validate::{check_batch, check_dim, check_inc, check_ld, check_ptr};
use super::{ArgCheck, Diagonal, Fill, Transpose};
use crate::batch::{
    inc_shift, ArrayRead, ArrayWrite, BatchRead, BatchWrite, StridedRead, StridedWrite,
};
use crate::check::{check_numerics_tri_matrix, check_numerics_vector};
use crate::context::{Handle, LogArg};
use crate::dtype::Scalar;
use crate::error::{status_boundary, Result, Status};
use crate::launch::{launch, launch_batch_seq, Grid};
use smallvec::smallvec;

fn trsv_arg_check(
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

#[allow(clippy::too_many_arguments)]
unsafe fn trsv_kernel<T, A, X, const UPPER: bool, const UNIT: bool, const CONJ: bool, const TRANS: bool>(
    n: i32,
    a: A,
    lda: i32,
    x: X,
    incx: i32,
    batch_count: i32,
) where
    T: Scalar,
    A: BatchRead<T>,
    X: BatchWrite<T>,
{
    let shift = inc_shift(incx, n);
    let grid = Grid::new(1, 1, batch_count as u32);

    let body = move |g: crate::launch::GroupId| {
        let pa = unsafe { a.load(g.z as i32, 0) };
        let px = unsafe { x.load_mut(g.z as i32, shift) };

        let at = |i: i32, j: i32| {
            let idx = if TRANS {
                j as isize + i as isize * lda as isize
            } else {
                i as isize + j as isize * lda as isize
            };
            let v = unsafe { *pa.offset(idx) };
            if CONJ {
                v.conj()
            } else {
                v
            }
        };
        let xe = |i: i32| unsafe { px.offset(i as isize * incx as isize) };

        // op(A) is upper triangular iff the stored fill and the transpose
        // disagree; that fixes the substitution direction.
        let upper_system = UPPER != TRANS;
        let step = |i: i32| {
            let (lo, hi) = if upper_system { (i + 1, n) } else { (0, i) };
            let mut sum = unsafe { *xe(i) };
            for j in lo..hi {
                sum = sum - at(i, j) * unsafe { *xe(j) };
            }
            let v = if UNIT { sum } else { sum / at(i, i) };
            unsafe { *xe(i) = v };
        };
        if upper_system {
            for i in (0..n).rev() {
                step(i);
            }
        } else {
            for i in 0..n {
                step(i);
            }
        }
    };

    let footprint = 1 + (n as i64 - 1) * incx.abs() as i64;
    if unsafe { x.disjoint(footprint, batch_count) } {
        launch(grid, body);
    } else {
        launch_batch_seq(grid, body);
    }
}

#[allow(clippy::too_many_arguments)]
unsafe fn trsv_impl<T, A, X>(
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

    if handle.record_size_query(0) {
        return Ok(());
    }

    match trsv_arg_check(n, incx, lda, batch_count, a.is_null(), x.is_null())? {
        ArgCheck::QuickReturn => return Ok(()),
        ArgCheck::Continue => {}
    }

    check_numerics_tri_matrix(op, handle, uplo, n, a, lda, batch_count, true)?;
    check_numerics_vector(op, handle, n, x, incx, batch_count, true)?;

    macro_rules! solve {
        ($upper:expr, $unit:expr, $conj:expr, $trans:expr) => {
            trsv_kernel::<T, A, X, { $upper }, { $unit }, { $conj }, { $trans }>(
                n,
                a,
                lda,
                x,
                incx,
                batch_count,
            )
        };
    }
    match (uplo, trans, diag) {
        (Fill::Upper, Transpose::None, Diagonal::NonUnit) => solve!(true, false, false, false),
        (Fill::Upper, Transpose::None, Diagonal::Unit) => solve!(true, true, false, false),
        (Fill::Upper, Transpose::Trans, Diagonal::NonUnit) => solve!(true, false, false, true),
        (Fill::Upper, Transpose::Trans, Diagonal::Unit) => solve!(true, true, false, true),
        (Fill::Upper, Transpose::ConjTrans, Diagonal::NonUnit) => solve!(true, false, true, true),
        (Fill::Upper, Transpose::ConjTrans, Diagonal::Unit) => solve!(true, true, true, true),
        (Fill::Lower, Transpose::None, Diagonal::NonUnit) => solve!(false, false, false, false),
        (Fill::Lower, Transpose::None, Diagonal::Unit) => solve!(false, true, false, false),
        (Fill::Lower, Transpose::Trans, Diagonal::NonUnit) => solve!(false, false, false, true),
        (Fill::Lower, Transpose::Trans, Diagonal::Unit) => solve!(false, true, false, true),
        (Fill::Lower, Transpose::ConjTrans, Diagonal::NonUnit) => solve!(false, false, true, true),
        (Fill::Lower, Transpose::ConjTrans, Diagonal::Unit) => solve!(false, true, true, true),
    }

    check_numerics_tri_matrix(op, handle, uplo, n, a, lda, batch_count, false)?;
    check_numerics_vector(op, handle, n, x, incx, batch_count, false)
}

/// Triangular solve `op(A) * x = b` in place (`x` holds `b` on entry).
///
/// # Safety
/// When non-null, `a` must cover an `lda x n` column-major panel and `x`
/// `n` elements at increment `incx`.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trsv<T: Scalar>(
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
        trsv_impl(
            handle,
            "trsv",
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

/// Triangular solve over a batch (pointer-array form).
///
/// # Safety
/// When non-null, each table must hold `batch_count` per-item pointers
/// with the plain-form coverage per item.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trsv_batched<T: Scalar>(
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
        trsv_impl(
            handle,
            "trsv_batched",
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

/// Triangular solve over a batch (strided form).
///
/// # Safety
/// When non-null, each operand must cover every batch item addressed by
/// its stride.
#[allow(clippy::too_many_arguments)]
pub unsafe fn trsv_strided_batched<T: Scalar>(
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
        trsv_impl(
            handle,
            "trsv_strided_batched",
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
