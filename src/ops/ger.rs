//! Rank-1 update: `A = alpha * x * y^T + A` (`gerc` conjugates `y`)
//!
//! The kernel tiles the output into `DIM_X x (DIM_Y * WIN)` blocks. Each
//! work-group stages the `x` and `y` slices its tile needs into local
//! buffers, then every lane computes one output row of the tile, covering
//! `WIN` columns per y-lane to amortize the staging cost.

use super::validate::{check_batch, check_dim, check_inc, check_ld, check_ptr};
use super::ArgCheck;
use crate::batch::{
    inc_shift, load_scalar, ArrayRead, ArrayWrite, BatchRead, BatchWrite, StridedRead,
    StridedWrite,
};
use crate::check::{check_numerics_matrix, check_numerics_vector};
use crate::context::{Handle, LogArg, PointerMode};
use crate::dtype::Scalar;
use crate::error::{status_boundary, Result, Status};
use crate::launch::{launch, launch_batch_seq, tiles_for, Grid};
use smallvec::smallvec;

const DIM_X: i32 = 32;
const DIM_Y: i32 = 32;
/// Output columns per lane
const WIN: i32 = 8;

#[allow(clippy::too_many_arguments)]
fn ger_arg_check(
    m: i32,
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
    check_dim("m", m)?;
    check_dim("n", n)?;
    check_inc("incx", incx)?;
    check_inc("incy", incy)?;
    check_ld("lda", lda, m)?;
    check_batch(batch_count)?;
    if m == 0 || n == 0 || batch_count == 0 {
        return Ok(ArgCheck::QuickReturn);
    }
    check_ptr("alpha", alpha_null)?;
    check_ptr("x", x_null)?;
    check_ptr("y", y_null)?;
    check_ptr("a", a_null)?;
    Ok(ArgCheck::Continue)
}

/// Pre/post operand scan shared by both phases
#[allow(clippy::too_many_arguments)]
unsafe fn ger_check_numerics<T, X, Y, A>(
    op: &'static str,
    handle: &Handle,
    m: i32,
    n: i32,
    a: A,
    lda: i32,
    x: X,
    incx: i32,
    y: Y,
    incy: i32,
    batch_count: i32,
    is_input: bool,
) -> Result<()>
where
    T: Scalar,
    X: BatchRead<T>,
    Y: BatchRead<T>,
    A: BatchRead<T>,
{
    check_numerics_matrix(op, handle, m, n, a, lda, batch_count, is_input)?;
    check_numerics_vector(op, handle, m, x, incx, batch_count, is_input)?;
    check_numerics_vector(op, handle, n, y, incy, batch_count, is_input)
}

#[allow(clippy::too_many_arguments)]
unsafe fn ger_kernel<T, X, Y, A, const CONJ: bool>(
    m: i32,
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
    let shiftx = inc_shift(incx, m);
    let shifty = inc_shift(incy, n);
    let cols_per_group = DIM_Y * WIN;
    let grid = Grid::new(
        tiles_for(m, DIM_X),
        tiles_for(n, cols_per_group),
        batch_count as u32,
    );

    let body = move |g: crate::launch::GroupId| {
        if alpha.is_zero() {
            return;
        }
        let px = unsafe { x.load(g.z as i32, shiftx) };
        let py = unsafe { y.load(g.z as i32, shifty) };
        let pa = unsafe { a.load_mut(g.z as i32, 0) };

        let row0 = g.x as i32 * DIM_X;
        let col0 = g.y as i32 * cols_per_group;

        // Stage the operand slices this tile touches
        let mut xdata = [T::zero(); DIM_X as usize];
        for (t, slot) in xdata.iter_mut().enumerate() {
            let row = row0 + t as i32;
            if row < m {
                *slot = unsafe { *px.offset(row as isize * incx as isize) };
            }
        }
        let mut ydata = [T::zero(); (DIM_Y * WIN) as usize];
        for (j, slot) in ydata.iter_mut().enumerate() {
            let col = col0 + j as i32;
            if col < n {
                let yv = unsafe { *py.offset(col as isize * incy as isize) };
                *slot = if CONJ { yv.conj() } else { yv };
            }
        }

        // Compute from staged data only
        for tx in 0..DIM_X {
            let row = row0 + tx;
            if row >= m {
                break;
            }
            let x_value = alpha * xdata[tx as usize];
            for (j, &yv) in ydata.iter().enumerate() {
                let col = col0 + j as i32;
                if col >= n {
                    break;
                }
                let p = unsafe { pa.offset(row as isize + col as isize * lda as isize) };
                unsafe { *p = *p + x_value * yv };
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
unsafe fn ger_impl<T, X, Y, A, const CONJ: bool>(
    handle: &Handle,
    op: &'static str,
    m: i32,
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
            LogArg::int("m", m as i64),
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

    match ger_arg_check(
        m,
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

    ger_check_numerics(op, handle, m, n, a, lda, x, incx, y, incy, batch_count, true)?;
    ger_kernel::<T, X, Y, A, CONJ>(m, n, a_val, x, incx, y, incy, a, lda, batch_count);
    ger_check_numerics(op, handle, m, n, a, lda, x, incx, y, incy, batch_count, false)
}

macro_rules! impl_ger_family {
    ($name:ident, $name_batched:ident, $name_strided:ident, $conj:expr, $doc:literal) => {
        #[doc = $doc]
        ///
        /// # Safety
        /// When non-null, `x` must cover `m` elements, `y` `n` elements,
        /// `a` an `lda x n` column-major panel, and `alpha` one element.
        #[allow(clippy::too_many_arguments)]
        pub unsafe fn $name<T: Scalar>(
            handle: &Handle,
            m: i32,
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
                ger_impl::<T, _, _, _, { $conj }>(
                    handle,
                    stringify!($name),
                    m,
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
            m: i32,
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
                ger_impl::<T, _, _, _, { $conj }>(
                    handle,
                    stringify!($name_batched),
                    m,
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
            m: i32,
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
                ger_impl::<T, _, _, _, { $conj }>(
                    handle,
                    stringify!($name_strided),
                    m,
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

impl_ger_family!(
    ger,
    ger_batched,
    ger_strided_batched,
    false,
    "Rank-1 update `A = alpha * x * y^T + A` (unconjugated)."
);

impl_ger_family!(
    gerc,
    gerc_batched,
    gerc_strided_batched,
    true,
    "Conjugated rank-1 update `A = alpha * x * y^H + A`."
);
