//! Symmetric rank-k update: `C = alpha * op(A) * op(A)^T + beta * C`
//!
//! Only the selected triangle of `C` is referenced and updated. For
//! complex element types the transpose mode is restricted to `None` and
//! `Trans`; `ConjTrans` belongs to the hermitian variant of the
//! operation and is rejected as an invalid mode value.
//!
//! Tiling mirrors the general matrix product with two differences: the
//! output grid covers `n x n`, and tiles entirely outside the triangle
//! are skipped before any staging.

use super::validate::{check_batch, check_dim, check_ld, check_ptr};
use super::{ArgCheck, Fill, Transpose};
use crate::batch::{
    host_scalar, load_scalar, ArrayRead, ArrayWrite, BatchRead, BatchWrite, StridedRead,
    StridedWrite,
};
use crate::check::{check_numerics_matrix, check_numerics_tri_matrix};
use crate::context::{Handle, LogArg, PointerMode};
use crate::dtype::Scalar;
use crate::error::{status_boundary, Error, Result, Status};
use crate::launch::{launch, launch_batch_seq, tiles_for, Grid};
use smallvec::smallvec;

/// Output tile edge and contraction step
const TILE: i32 = 32;

#[allow(clippy::too_many_arguments)]
fn syrk_arg_check<T: Scalar>(
    trans: Transpose,
    n: i32,
    k: i32,
    lda: i32,
    ldc: i32,
    batch_count: i32,
) -> Result<ArgCheck> {
    if T::DTYPE.is_complex() && trans == Transpose::ConjTrans {
        return Err(Error::InvalidValue {
            arg: "trans",
            reason: "conjugate transpose is not a symmetric rank-k mode",
        });
    }
    check_dim("n", n)?;
    check_dim("k", k)?;
    let a_rows = if trans == Transpose::None { n } else { k };
    check_ld("lda", lda, a_rows)?;
    check_ld("ldc", ldc, n)?;
    check_batch(batch_count)?;
    if n == 0 || batch_count == 0 {
        return Ok(ArgCheck::QuickReturn);
    }
    Ok(ArgCheck::Continue)
}

/// Scale path over the selected triangle: `C = beta * C`
unsafe fn syrk_scale_kernel<T, C, const UPPER: bool>(
    n: i32,
    beta: T,
    c: C,
    ldc: i32,
    batch_count: i32,
) where
    T: Scalar,
    C: BatchWrite<T>,
{
    let grid = Grid::new(1, n as u32, batch_count as u32);
    let body = move |g: crate::launch::GroupId| {
        let pc = unsafe { c.load_mut(g.z as i32, 0) };
        let col = g.y as i32;
        let (lo, hi) = if UPPER { (0, col + 1) } else { (col, n) };
        for row in lo..hi {
            let p = unsafe { pc.offset(row as isize + col as isize * ldc as isize) };
            unsafe { *p = if beta.is_zero() { T::zero() } else { beta * *p } };
        }
    };
    let footprint = ldc as i64 * n as i64;
    if unsafe { c.disjoint(footprint, batch_count) } {
        launch(grid, body);
    } else {
        launch_batch_seq(grid, body);
    }
}

#[allow(clippy::too_many_arguments)]
unsafe fn syrk_kernel<T, A, C, const UPPER: bool, const TRANS: bool>(
    n: i32,
    k: i32,
    alpha: T,
    a: A,
    lda: i32,
    beta: T,
    c: C,
    ldc: i32,
    batch_count: i32,
) where
    T: Scalar,
    A: BatchRead<T>,
    C: BatchWrite<T>,
{
    let grid = Grid::new(tiles_for(n, TILE), tiles_for(n, TILE), batch_count as u32);

    let body = move |g: crate::launch::GroupId| {
        let row0 = g.x as i32 * TILE;
        let col0 = g.y as i32 * TILE;
        let rows = (n - row0).min(TILE);
        let cols = (n - col0).min(TILE);

        // Skip tiles with no element in the selected triangle
        if UPPER {
            if row0 > col0 + cols - 1 {
                return;
            }
        } else if row0 + rows - 1 < col0 {
            return;
        }

        let pa = unsafe { a.load(g.z as i32, 0) };
        let pc = unsafe { c.load_mut(g.z as i32, 0) };

        // op(A)(i, kk): A is n x k as stored (TRANS stores it k x n)
        let fetch = |i: i32, kk: i32| {
            let idx = if TRANS {
                kk as isize + i as isize * lda as isize
            } else {
                i as isize + kk as isize * lda as isize
            };
            unsafe { *pa.offset(idx) }
        };

        let mut acc = [T::zero(); (TILE * TILE) as usize];
        let mut k0 = 0;
        while k0 < k {
            let ks = (k - k0).min(TILE);
            let mut rtile = [T::zero(); (TILE * TILE) as usize];
            for t in 0..rows {
                for kk in 0..ks {
                    rtile[(t * TILE + kk) as usize] = fetch(row0 + t, k0 + kk);
                }
            }
            let mut ctile = [T::zero(); (TILE * TILE) as usize];
            for t in 0..cols {
                for kk in 0..ks {
                    ctile[(t * TILE + kk) as usize] = fetch(col0 + t, k0 + kk);
                }
            }
            for i in 0..rows {
                for j in 0..cols {
                    let mut sum = T::zero();
                    for kk in 0..ks {
                        sum = sum
                            + rtile[(i * TILE + kk) as usize] * ctile[(j * TILE + kk) as usize];
                    }
                    let slot = (i * TILE + j) as usize;
                    acc[slot] = acc[slot] + sum;
                }
            }
            k0 += TILE;
        }

        for i in 0..rows {
            for j in 0..cols {
                let row = row0 + i;
                let col = col0 + j;
                let in_triangle = if UPPER { row <= col } else { row >= col };
                if !in_triangle {
                    continue;
                }
                let p = unsafe { pc.offset(row as isize + col as isize * ldc as isize) };
                let v = alpha * acc[(i * TILE + j) as usize];
                unsafe { *p = if beta.is_zero() { v } else { v + beta * *p } };
            }
        }
    };

    let footprint = ldc as i64 * n as i64;
    if unsafe { c.disjoint(footprint, batch_count) } {
        launch(grid, body);
    } else {
        launch_batch_seq(grid, body);
    }
}

#[allow(clippy::too_many_arguments)]
unsafe fn syrk_impl<T, A, C>(
    handle: &Handle,
    op: &'static str,
    uplo: Fill,
    trans: Transpose,
    n: i32,
    k: i32,
    alpha: *const T,
    a: A,
    lda: i32,
    beta: *const T,
    c: C,
    ldc: i32,
    batch_count: i32,
) -> Result<()>
where
    T: Scalar,
    A: BatchRead<T>,
    C: BatchWrite<T>,
{
    handle.log_call(op, || {
        smallvec![
            LogArg::ch("precision", T::DTYPE.letter()),
            LogArg::ch("uplo", uplo.letter()),
            LogArg::ch("trans", trans.letter()),
            LogArg::int("n", n as i64),
            LogArg::int("k", k as i64),
            LogArg::int("lda", lda as i64),
            LogArg::int("ldc", ldc as i64),
            LogArg::int("batch_count", batch_count as i64),
        ]
    });

    if handle.record_size_query(0) {
        return Ok(());
    }

    match syrk_arg_check::<T>(trans, n, k, lda, ldc, batch_count)? {
        ArgCheck::QuickReturn => return Ok(()),
        ArgCheck::Continue => {}
    }

    check_ptr("alpha", alpha.is_null())?;
    check_ptr("beta", beta.is_null())?;

    let alpha_zero_host = host_scalar(handle, alpha)
        .map(|v| v.is_zero())
        .unwrap_or(false);
    if k == 0 || alpha_zero_host {
        let b0 = load_scalar(beta);
        if handle.pointer_mode() == PointerMode::Host && b0 == T::one() {
            return Ok(());
        }
        check_ptr("c", c.is_null())?;
        check_numerics_tri_matrix(op, handle, uplo, n, c, ldc, batch_count, true)?;
        match uplo {
            Fill::Upper => syrk_scale_kernel::<T, C, true>(n, b0, c, ldc, batch_count),
            Fill::Lower => syrk_scale_kernel::<T, C, false>(n, b0, c, ldc, batch_count),
        }
        return check_numerics_tri_matrix(op, handle, uplo, n, c, ldc, batch_count, false);
    }

    check_ptr("a", a.is_null())?;
    check_ptr("c", c.is_null())?;

    let alpha_v = load_scalar(alpha);
    let beta_v = load_scalar(beta);

    let (a_rows, a_cols) = if trans == Transpose::None {
        (n, k)
    } else {
        (k, n)
    };
    check_numerics_matrix(op, handle, a_rows, a_cols, a, lda, batch_count, true)?;
    check_numerics_tri_matrix(op, handle, uplo, n, c, ldc, batch_count, true)?;

    if alpha_v.is_zero() {
        match uplo {
            Fill::Upper => syrk_scale_kernel::<T, C, true>(n, beta_v, c, ldc, batch_count),
            Fill::Lower => syrk_scale_kernel::<T, C, false>(n, beta_v, c, ldc, batch_count),
        }
    } else {
        macro_rules! rk {
            ($upper:expr, $trans:expr) => {
                syrk_kernel::<T, A, C, { $upper }, { $trans }>(
                    n,
                    k,
                    alpha_v,
                    a,
                    lda,
                    beta_v,
                    c,
                    ldc,
                    batch_count,
                )
            };
        }
        match (uplo, trans) {
            (Fill::Upper, Transpose::None) => rk!(true, false),
            (Fill::Upper, _) => rk!(true, true),
            (Fill::Lower, Transpose::None) => rk!(false, false),
            (Fill::Lower, _) => rk!(false, true),
        }
    }

    check_numerics_matrix(op, handle, a_rows, a_cols, a, lda, batch_count, false)?;
    check_numerics_tri_matrix(op, handle, uplo, n, c, ldc, batch_count, false)
}

/// Symmetric rank-k update `C = alpha * op(A) * op(A)^T + beta * C`.
///
/// # Safety
/// When non-null, `a` must cover an `lda`-led column-major panel of
/// `op(A)`, `c` an `ldc x n` panel, and `alpha`/`beta` one element each.
#[allow(clippy::too_many_arguments)]
pub unsafe fn syrk<T: Scalar>(
    handle: &Handle,
    uplo: Fill,
    trans: Transpose,
    n: i32,
    k: i32,
    alpha: *const T,
    a: *const T,
    lda: i32,
    beta: *const T,
    c: *mut T,
    ldc: i32,
) -> Status {
    status_boundary(|| {
        syrk_impl(
            handle,
            "syrk",
            uplo,
            trans,
            n,
            k,
            alpha,
            StridedRead::new(a, 0),
            lda,
            beta,
            StridedWrite::new(c, 0),
            ldc,
            1,
        )
    })
}

/// Symmetric rank-k update over a batch (pointer-array form).
///
/// # Safety
/// When non-null, each table must hold `batch_count` per-item pointers
/// with the plain-form coverage per item.
#[allow(clippy::too_many_arguments)]
pub unsafe fn syrk_batched<T: Scalar>(
    handle: &Handle,
    uplo: Fill,
    trans: Transpose,
    n: i32,
    k: i32,
    alpha: *const T,
    a: *const *const T,
    lda: i32,
    beta: *const T,
    c: *const *mut T,
    ldc: i32,
    batch_count: i32,
) -> Status {
    status_boundary(|| {
        syrk_impl(
            handle,
            "syrk_batched",
            uplo,
            trans,
            n,
            k,
            alpha,
            ArrayRead::new(a),
            lda,
            beta,
            ArrayWrite::new(c),
            ldc,
            batch_count,
        )
    })
}

/// Symmetric rank-k update over a batch (strided form).
///
/// # Safety
/// When non-null, each operand must cover every batch item addressed by
/// its stride.
#[allow(clippy::too_many_arguments)]
pub unsafe fn syrk_strided_batched<T: Scalar>(
    handle: &Handle,
    uplo: Fill,
    trans: Transpose,
    n: i32,
    k: i32,
    alpha: *const T,
    a: *const T,
    lda: i32,
    stridea: i64,
    beta: *const T,
    c: *mut T,
    ldc: i32,
    stridec: i64,
    batch_count: i32,
) -> Status {
    status_boundary(|| {
        syrk_impl(
            handle,
            "syrk_strided_batched",
            uplo,
            trans,
            n,
            k,
            alpha,
            StridedRead::new(a, stridea),
            lda,
            beta,
            StridedWrite::new(c, stridec),
            ldc,
            batch_count,
        )
    })
}
