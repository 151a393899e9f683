//! General matrix-matrix multiply: `C = alpha * op(A) * op(B) + beta * C`
//!
//! The output is tiled into `TILE x TILE` blocks. Each work-group marches
//! the contracted dimension in `TILE`-wide steps, staging one tile of
//! `op(A)` and one of `op(B)` per step, then accumulating the full tile
//! product from staged data. The nine transpose/conjugate combinations
//! are monomorphized so the staging loops never branch per element.
//!
//! `alpha == 0` or `k == 0` degenerates to scaling `C` by `beta`
//! (`beta == 0` overwrites without reading).

use super::validate::{check_batch, check_dim, check_ld, check_ptr};
use super::{ArgCheck, Transpose};
use crate::batch::{
    host_scalar, load_scalar, ArrayRead, ArrayWrite, BatchRead, BatchWrite, StridedRead,
    StridedWrite,
};
use crate::check::check_numerics_matrix;
use crate::context::{Handle, LogArg, PointerMode};
use crate::dtype::Scalar;
use crate::error::{status_boundary, Result, Status};
use crate::launch::{launch, launch_batch_seq, tiles_for, Grid};
use smallvec::smallvec;

/// Output tile edge and contraction step
const TILE: i32 = 32;

#[allow(clippy::too_many_arguments)]
fn gemm_arg_check(
    trans_a: Transpose,
    trans_b: Transpose,
    m: i32,
    n: i32,
    k: i32,
    lda: i32,
    ldb: i32,
    ldc: i32,
    batch_count: i32,
) -> Result<ArgCheck> {
    check_dim("m", m)?;
    check_dim("n", n)?;
    check_dim("k", k)?;
    let a_rows = if trans_a == Transpose::None { m } else { k };
    let b_rows = if trans_b == Transpose::None { k } else { n };
    check_ld("lda", lda, a_rows)?;
    check_ld("ldb", ldb, b_rows)?;
    check_ld("ldc", ldc, m)?;
    check_batch(batch_count)?;
    if m == 0 || n == 0 || batch_count == 0 {
        return Ok(ArgCheck::QuickReturn);
    }
    Ok(ArgCheck::Continue)
}

/// Scale path: `C = beta * C`
unsafe fn gemm_scale_kernel<T, C>(m: i32, n: i32, beta: T, c: C, ldc: i32, batch_count: i32)
where
    T: Scalar,
    C: BatchWrite<T>,
{
    let grid = Grid::new(tiles_for(m, TILE), tiles_for(n, TILE), batch_count as u32);
    let body = move |g: crate::launch::GroupId| {
        let pc = unsafe { c.load_mut(g.z as i32, 0) };
        let row0 = g.x as i32 * TILE;
        let col0 = g.y as i32 * TILE;
        for col in col0..(col0 + TILE).min(n) {
            for row in row0..(row0 + TILE).min(m) {
                let p = unsafe { pc.offset(row as isize + col as isize * ldc as isize) };
                unsafe { *p = if beta.is_zero() { T::zero() } else { beta * *p } };
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
unsafe fn gemm_kernel<T, A, B, C, const TA: bool, const CA: bool, const TB: bool, const CB: bool>(
    m: i32,
    n: i32,
    k: i32,
    alpha: T,
    a: A,
    lda: i32,
    b: B,
    ldb: i32,
    beta: T,
    c: C,
    ldc: i32,
    batch_count: i32,
) where
    T: Scalar,
    A: BatchRead<T>,
    B: BatchRead<T>,
    C: BatchWrite<T>,
{
    let grid = Grid::new(tiles_for(m, TILE), tiles_for(n, TILE), batch_count as u32);

    let body = move |g: crate::launch::GroupId| {
        let pa = unsafe { a.load(g.z as i32, 0) };
        let pb = unsafe { b.load(g.z as i32, 0) };
        let pc = unsafe { c.load_mut(g.z as i32, 0) };

        let row0 = g.x as i32 * TILE;
        let col0 = g.y as i32 * TILE;
        let rows = (m - row0).min(TILE);
        let cols = (n - col0).min(TILE);

        let mut acc = [T::zero(); (TILE * TILE) as usize];

        let mut k0 = 0;
        while k0 < k {
            let ks = (k - k0).min(TILE);

            // Stage op(A) rows and op(B) columns for this k-step
            let mut atile = [T::zero(); (TILE * TILE) as usize];
            for t in 0..rows {
                let row = (row0 + t) as isize;
                for kk in 0..ks {
                    let kg = (k0 + kk) as isize;
                    let idx = if TA {
                        kg + row * lda as isize
                    } else {
                        row + kg * lda as isize
                    };
                    let v = unsafe { *pa.offset(idx) };
                    atile[(t * TILE + kk) as usize] = if CA { v.conj() } else { v };
                }
            }
            let mut btile = [T::zero(); (TILE * TILE) as usize];
            for t in 0..cols {
                let col = (col0 + t) as isize;
                for kk in 0..ks {
                    let kg = (k0 + kk) as isize;
                    let idx = if TB {
                        col + kg * ldb as isize
                    } else {
                        kg + col * ldb as isize
                    };
                    let v = unsafe { *pb.offset(idx) };
                    btile[(t * TILE + kk) as usize] = if CB { v.conj() } else { v };
                }
            }

            for i in 0..rows {
                for j in 0..cols {
                    let mut sum = T::zero();
                    for kk in 0..ks {
                        sum = sum
                            + atile[(i * TILE + kk) as usize] * btile[(j * TILE + kk) as usize];
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
unsafe fn gemm_impl<T, A, B, C>(
    handle: &Handle,
    op: &'static str,
    trans_a: Transpose,
    trans_b: Transpose,
    m: i32,
    n: i32,
    k: i32,
    alpha: *const T,
    a: A,
    lda: i32,
    b: B,
    ldb: i32,
    beta: *const T,
    c: C,
    ldc: i32,
    batch_count: i32,
) -> Result<()>
where
    T: Scalar,
    A: BatchRead<T>,
    B: BatchRead<T>,
    C: BatchWrite<T>,
{
    handle.log_call(op, || {
        smallvec![
            LogArg::ch("precision", T::DTYPE.letter()),
            LogArg::ch("transA", trans_a.letter()),
            LogArg::ch("transB", trans_b.letter()),
            LogArg::int("m", m as i64),
            LogArg::int("n", n as i64),
            LogArg::int("k", k as i64),
            LogArg::int("lda", lda as i64),
            LogArg::int("ldb", ldb as i64),
            LogArg::int("ldc", ldc as i64),
            LogArg::int("batch_count", batch_count as i64),
        ]
    });

    if handle.record_size_query(0) {
        return Ok(());
    }

    match gemm_arg_check(trans_a, trans_b, m, n, k, lda, ldb, ldc, batch_count)? {
        ArgCheck::QuickReturn => return Ok(()),
        ArgCheck::Continue => {}
    }

    check_ptr("alpha", alpha.is_null())?;
    check_ptr("beta", beta.is_null())?;

    // Degenerate product (k == 0, or a host-visible zero alpha): nothing
    // to accumulate, only the beta scale of C remains. A and B are not
    // required on this path, and beta == 1 makes it a full no-op.
    let alpha_zero_host = host_scalar(handle, alpha)
        .map(|v| v.is_zero())
        .unwrap_or(false);
    if k == 0 || alpha_zero_host {
        let b0 = load_scalar(beta);
        if handle.pointer_mode() == PointerMode::Host && b0 == T::one() {
            return Ok(());
        }
        check_ptr("c", c.is_null())?;
        check_numerics_matrix(op, handle, m, n, c, ldc, batch_count, true)?;
        gemm_scale_kernel(m, n, b0, c, ldc, batch_count);
        return check_numerics_matrix(op, handle, m, n, c, ldc, batch_count, false);
    }

    check_ptr("a", a.is_null())?;
    check_ptr("b", b.is_null())?;
    check_ptr("c", c.is_null())?;

    let alpha_v = load_scalar(alpha);
    let beta_v = load_scalar(beta);

    let (a_rows, a_cols) = if trans_a == Transpose::None {
        (m, k)
    } else {
        (k, m)
    };
    let (b_rows, b_cols) = if trans_b == Transpose::None {
        (k, n)
    } else {
        (n, k)
    };
    check_numerics_matrix(op, handle, a_rows, a_cols, a, lda, batch_count, true)?;
    check_numerics_matrix(op, handle, b_rows, b_cols, b, ldb, batch_count, true)?;
    check_numerics_matrix(op, handle, m, n, c, ldc, batch_count, true)?;

    if alpha_v.is_zero() {
        gemm_scale_kernel(m, n, beta_v, c, ldc, batch_count);
    } else {
        macro_rules! mm {
            ($ta:expr, $ca:expr, $tb:expr, $cb:expr) => {
                gemm_kernel::<T, A, B, C, { $ta }, { $ca }, { $tb }, { $cb }>(
                    m,
                    n,
                    k,
                    alpha_v,
                    a,
                    lda,
                    b,
                    ldb,
                    beta_v,
                    c,
                    ldc,
                    batch_count,
                )
            };
        }
        match (trans_a, trans_b) {
            (Transpose::None, Transpose::None) => mm!(false, false, false, false),
            (Transpose::None, Transpose::Trans) => mm!(false, false, true, false),
            (Transpose::None, Transpose::ConjTrans) => mm!(false, false, true, true),
            (Transpose::Trans, Transpose::None) => mm!(true, false, false, false),
            (Transpose::Trans, Transpose::Trans) => mm!(true, false, true, false),
            (Transpose::Trans, Transpose::ConjTrans) => mm!(true, false, true, true),
            (Transpose::ConjTrans, Transpose::None) => mm!(true, true, false, false),
            (Transpose::ConjTrans, Transpose::Trans) => mm!(true, true, true, false),
            (Transpose::ConjTrans, Transpose::ConjTrans) => mm!(true, true, true, true),
        }
    }

    check_numerics_matrix(op, handle, a_rows, a_cols, a, lda, batch_count, false)?;
    check_numerics_matrix(op, handle, b_rows, b_cols, b, ldb, batch_count, false)?;
    check_numerics_matrix(op, handle, m, n, c, ldc, batch_count, false)
}

/// General matrix-matrix multiply `C = alpha * op(A) * op(B) + beta * C`.
///
/// # Safety
/// When non-null, `a`, `b`, and `c` must cover column-major panels of
/// their leading dimensions, and `alpha`/`beta` one element each.
#[allow(clippy::too_many_arguments)]
pub unsafe fn gemm<T: Scalar>(
    handle: &Handle,
    trans_a: Transpose,
    trans_b: Transpose,
    m: i32,
    n: i32,
    k: i32,
    alpha: *const T,
    a: *const T,
    lda: i32,
    b: *const T,
    ldb: i32,
    beta: *const T,
    c: *mut T,
    ldc: i32,
) -> Status {
    status_boundary(|| {
        gemm_impl(
            handle,
            "gemm",
            trans_a,
            trans_b,
            m,
            n,
            k,
            alpha,
            StridedRead::new(a, 0),
            lda,
            StridedRead::new(b, 0),
            ldb,
            beta,
            StridedWrite::new(c, 0),
            ldc,
            1,
        )
    })
}

/// Matrix-matrix multiply over a batch (pointer-array form).
///
/// # Safety
/// When non-null, each table must hold `batch_count` per-item pointers
/// with the plain-form coverage per item.
#[allow(clippy::too_many_arguments)]
pub unsafe fn gemm_batched<T: Scalar>(
    handle: &Handle,
    trans_a: Transpose,
    trans_b: Transpose,
    m: i32,
    n: i32,
    k: i32,
    alpha: *const T,
    a: *const *const T,
    lda: i32,
    b: *const *const T,
    ldb: i32,
    beta: *const T,
    c: *const *mut T,
    ldc: i32,
    batch_count: i32,
) -> Status {
    status_boundary(|| {
        gemm_impl(
            handle,
            "gemm_batched",
            trans_a,
            trans_b,
            m,
            n,
            k,
            alpha,
            ArrayRead::new(a),
            lda,
            ArrayRead::new(b),
            ldb,
            beta,
            ArrayWrite::new(c),
            ldc,
            batch_count,
        )
    })
}

/// Matrix-matrix multiply over a batch (strided form).
///
/// # Safety
/// When non-null, each operand must cover every batch item addressed by
/// its stride.
#[allow(clippy::too_many_arguments)]
pub unsafe fn gemm_strided_batched<T: Scalar>(
    handle: &Handle,
    trans_a: Transpose,
    trans_b: Transpose,
    m: i32,
    n: i32,
    k: i32,
    alpha: *const T,
    a: *const T,
    lda: i32,
    stridea: i64,
    b: *const T,
    ldb: i32,
    strideb: i64,
    beta: *const T,
    c: *mut T,
    ldc: i32,
    stridec: i64,
    batch_count: i32,
) -> Status {
    status_boundary(|| {
        gemm_impl(
            handle,
            "gemm_strided_batched",
            trans_a,
            trans_b,
            m,
            n,
            k,
            alpha,
            StridedRead::new(a, stridea),
            lda,
            StridedRead::new(b, strideb),
            ldb,
            beta,
            StridedWrite::new(c, stridec),
            ldc,
            batch_count,
        )
    })
}
