//! Symmetric/hermitian rank-2 update
//!
//! `syr2`: `A = alpha*x*y^T + alpha*y*x^T + A` on the selected triangle.
//! `her2`: `A = alpha*x*y^H + conj(alpha)*y*x^H + A`; the diagonal of a
//! hermitian matrix is real, so its imaginary part is forced to zero
//! after the update.
//!
//! Tiling follows the rank-1 kernel; tiles entirely outside the selected
//! triangle are skipped before any staging, and the fill/hermitian
//! variants are monomorphized so a tile never branches on them per
//! element.

use super::validate::{check_batch, check_dim, check_inc, check_ld, check_ptr};
use super::{ArgCheck, Fill};
use crate::batch::{
    inc_shift, load_scalar, ArrayRead, ArrayWrite, BatchRead, BatchWrite, StridedRead,
    StridedWrite,
};
use crate::check::{check_numerics_tri_matrix, check_numerics_vector};
use crate::context::{Handle, LogArg, PointerMode};
use crate::dtype::Scalar;
use crate::error::{status_boundary, Result, Status};
use crate::launch::{launch, launch_batch_seq, tiles_for, Grid};
use smallvec::smallvec;

const DIM_X: i32 = 32;
/// Output columns per tile
const TILE_COLS: i32 = 128;

#[allow(clippy::too_many_arguments)]
fn syr2_arg_check(
    n: i32,
    incx: i32,
    incy: i32,
    lda: i32,
    batch_count: i32,
    alpha_null: bool,
    x_null: bool,
    y_null: bool,
    a_null: bool,
) -> Result<ArgCheck> {
    check_dim("n", n)?;
    check_inc("incx", incx)?;
    check_inc("incy", incy)?;
    check_ld("lda", lda, n)?;
    check_batch(batch_count)?;
    if n == 0 || batch_count == 0 {
        return Ok(ArgCheck::QuickReturn);
    }
    check_ptr("alpha", alpha_null)?;
    check_ptr("x", x_null)?;
    check_ptr("y", y_null)?;
    check_ptr("a", a_null)?;
    Ok(ArgCheck::Continue)
}

#[allow(clippy::too_many_arguments)]
unsafe fn syr2_kernel<T, X, Y, A, const UPPER: bool, const HER: bool>(
    n: i32,
    alpha: T,
    x: X,
    incx: i32,
    y: Y,
    incy: i32,
    a: A,
    lda: i32,
    batch_count: i32,
) where
    T: Scalar,
    X: BatchRead<T>,
    Y: BatchRead<T>,
    A: BatchWrite<T>,
{
    let shiftx = inc_shift(incx, n);
    let shifty = inc_shift(incy, n);
    let grid = Grid::new(
        tiles_for(n, DIM_X),
        tiles_for(n, TILE_COLS),
        batch_count as u32,
    );

    let body = move |g: crate::launch::GroupId| {
        if alpha.is_zero() {
            return;
        }
        let row0 = g.x as i32 * DIM_X;
        let col0 = g.y as i32 * TILE_COLS;
        let row_end = (row0 + DIM_X).min(n);
        let col_end = (col0 + TILE_COLS).min(n);

        // Skip tiles with no element in the selected triangle
        if UPPER {
            if row0 > col_end - 1 {
                return;
            }
        } else if row_end - 1 < col0 {
            return;
        }

        let px = unsafe { x.load(g.z as i32, shiftx) };
        let py = unsafe { y.load(g.z as i32, shifty) };
        let pa = unsafe { a.load_mut(g.z as i32, 0) };

        let mut xrow = [T::zero(); DIM_X as usize];
        let mut yrow = [T::zero(); DIM_X as usize];
        for t in 0..(row_end - row0) as usize {
            let i = (row0 + t as i32) as isize;
            xrow[t] = unsafe { *px.offset(i * incx as isize) };
            yrow[t] = unsafe { *py.offset(i * incy as isize) };
        }
        let mut xcol = [T::zero(); TILE_COLS as usize];
        let mut ycol = [T::zero(); TILE_COLS as usize];
        for t in 0..(col_end - col0) as usize {
            let j = (col0 + t as i32) as isize;
            let xv = unsafe { *px.offset(j * incx as isize) };
            let yv = unsafe { *py.offset(j * incy as isize) };
            xcol[t] = if HER { xv.conj() } else { xv };
            ycol[t] = if HER { yv.conj() } else { yv };
        }

        let alpha_r = if HER { alpha.conj() } else { alpha };
        for tx in 0..(row_end - row0) {
            let row = row0 + tx;
            for ty in 0..(col_end - col0) {
                let col = col0 + ty;
                let in_triangle = if UPPER { row <= col } else { row >= col };
                if !in_triangle {
                    continue;
                }
                let update = alpha * xrow[tx as usize] * ycol[ty as usize]
                    + alpha_r * yrow[tx as usize] * xcol[ty as usize];
                let p = unsafe { pa.offset(row as isize + col as isize * lda as isize) };
                let v = unsafe { *p } + update;
                unsafe {
                    *p = if HER && row == col {
                        T::from_real(v.real())
                    } else {
                        v
                    }
                };
            }
        }
    };

    let footprint = lda as i64 * n as i64;
    if unsafe { a.disjoint(footprint, batch_count) } {
        launch(grid, body);
    } else {
        launch_batch_seq(grid, body);
    }
}

#[allow(clippy::too_many_arguments)]
unsafe fn syr2_impl<T, X, Y, A, const HER: bool>(
    handle: &Handle,
    op: &'static str,
    uplo: Fill,
    n: i32,
    alpha: *const T,
    x: X,
    incx: i32,
    y: Y,
    incy: i32,
    a: A,
    lda: i32,
    batch_count: i32,
) -> Result<()>
where
    T: Scalar,
    X: BatchRead<T>,
    Y: BatchRead<T>,
    A: BatchWrite<T>,
{
    handle.log_call(op, || {
        smallvec![
            LogArg::ch("precision", T::DTYPE.letter()),
            LogArg::ch("uplo", uplo.letter()),
            LogArg::int("n", n as i64),
            LogArg::int("incx", incx as i64),
            LogArg::int("incy", incy as i64),
            LogArg::int("lda", lda as i64),
            LogArg::int("batch_count", batch_count as i64),
        ]
    });

    if handle.record_size_query(0) {
        return Ok(());
    }

    match syr2_arg_check(
        n,
        incx,
        incy,
        lda,
        batch_count,
        alpha.is_null(),
        x.is_null(),
        y.is_null(),
        a.is_null(),
    )? {
        ArgCheck::QuickReturn => return Ok(()),
        ArgCheck::Continue => {}
    }

    let a_val = load_scalar(alpha);
    if handle.pointer_mode() == PointerMode::Host && a_val.is_zero() {
        return Ok(());
    }

    check_numerics_tri_matrix(op, handle, uplo, n, a, lda, batch_count, true)?;
    check_numerics_vector(op, handle, n, x, incx, batch_count, true)?;
    check_numerics_vector(op, handle, n, y, incy, batch_count, true)?;

    match uplo {
        Fill::Upper => syr2_kernel::<T, X, Y, A, true, HER>(
            n,
            a_val,
            x,
            incx,
            y,
            incy,
            a,
            lda,
            batch_count,
        ),
        Fill::Lower => syr2_kernel::<T, X, Y, A, false, HER>(
            n,
            a_val,
            x,
            incx,
            y,
            incy,
            a,
            lda,
            batch_count,
        ),
    }

    check_numerics_tri_matrix(op, handle, uplo, n, a, lda, batch_count, false)?;
    check_numerics_vector(op, handle, n, x, incx, batch_count, false)?;
    check_numerics_vector(op, handle, n, y, incy, batch_count, false)
}

macro_rules! impl_rank2_family {
    ($name:ident, $name_batched:ident, $name_strided:ident, $her:expr, $doc:literal) => {
        #[doc = $doc]
        ///
        /// # Safety
        /// When non-null, `x` and `y` must cover `n` elements each, `a`
        /// an `lda x n` column-major panel, and `alpha` one element.
        #[allow(clippy::too_many_arguments)]
        pub unsafe fn $name<T: Scalar>(
            handle: &Handle,
            uplo: Fill,
            n: i32,
            alpha: *const T,
            x: *const T,
            incx: i32,
            y: *const T,
            incy: i32,
            a: *mut T,
            lda: i32,
        ) -> Status {
            status_boundary(|| {
                syr2_impl::<T, _, _, _, { $her }>(
                    handle,
                    stringify!($name),
                    uplo,
                    n,
                    alpha,
                    StridedRead::new(x, 0),
                    incx,
                    StridedRead::new(y, 0),
                    incy,
                    StridedWrite::new(a, 0),
                    lda,
                    1,
                )
            })
        }

        #[doc = $doc]
        /// Pointer-array batched form.
        ///
        /// # Safety
        /// When non-null, each table must hold `batch_count` per-item
        /// pointers with the plain-form coverage per item.
        #[allow(clippy::too_many_arguments)]
        pub unsafe fn $name_batched<T: Scalar>(
            handle: &Handle,
            uplo: Fill,
            n: i32,
            alpha: *const T,
            x: *const *const T,
            incx: i32,
            y: *const *const T,
            incy: i32,
            a: *const *mut T,
            lda: i32,
            batch_count: i32,
        ) -> Status {
            status_boundary(|| {
                syr2_impl::<T, _, _, _, { $her }>(
                    handle,
                    stringify!($name_batched),
                    uplo,
                    n,
                    alpha,
                    ArrayRead::new(x),
                    incx,
                    ArrayRead::new(y),
                    incy,
                    ArrayWrite::new(a),
                    lda,
                    batch_count,
                )
            })
        }

        #[doc = $doc]
        /// Strided batched form; a stride of 0 broadcasts that operand.
        ///
        /// # Safety
        /// When non-null, each operand must cover every batch item
        /// addressed by its stride.
        #[allow(clippy::too_many_arguments)]
        pub unsafe fn $name_strided<T: Scalar>(
            handle: &Handle,
            uplo: Fill,
            n: i32,
            alpha: *const T,
            x: *const T,
            incx: i32,
            stridex: i64,
            y: *const T,
            incy: i32,
            stridey: i64,
            a: *mut T,
            lda: i32,
            stridea: i64,
            batch_count: i32,
        ) -> Status {
            status_boundary(|| {
                syr2_impl::<T, _, _, _, { $her }>(
                    handle,
                    stringify!($name_strided),
                    uplo,
                    n,
                    alpha,
                    StridedRead::new(x, stridex),
                    incx,
                    StridedRead::new(y, stridey),
                    incy,
                    StridedWrite::new(a, stridea),
                    lda,
                    batch_count,
                )
            })
        }
    };
}

impl_rank2_family!(
    syr2,
    syr2_batched,
    syr2_strided_batched,
    false,
    "Symmetric rank-2 update `A = alpha*x*y^T + alpha*y*x^T + A` on the selected triangle."
);

impl_rank2_family!(
    her2,
    her2_batched,
    her2_strided_batched,
    true,
    "Hermitian rank-2 update `A = alpha*x*y^H + conj(alpha)*y*x^H + A` on the selected triangle."
);
