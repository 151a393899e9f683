//! Dot products: `dot` (unconjugated) and `dotc` (first operand conjugated)
//!
//! For real element types the two entry points coincide. Half-precision
//! inputs accumulate in `f32` and convert back on finalize. Negative
//! increments are legal and address the respective vector from its end.

use super::validate::{check_batch, check_dim, check_inc, check_ptr};
use super::ArgCheck;
use crate::batch::{ArrayRead, BatchRead, StridedRead};
use crate::check::check_numerics_vector;
use crate::context::{Handle, LogArg};
use crate::dtype::Scalar;
use crate::error::{status_boundary, Result, Status};
use crate::reduce::{
    reduce2_strided_batched, reduction_workspace_bytes, write_identity_results, Combine,
    CombineSum, Fetch2, FetchDot, Finalize, FinalizeDot,
};
use smallvec::smallvec;

fn dot_arg_check(
    n: i32,
    incx: i32,
    incy: i32,
    batch_count: i32,
    x_null: bool,
    y_null: bool,
    results_null: bool,
) -> Result<ArgCheck> {
    check_dim("n", n)?;
    check_inc("incx", incx)?;
    check_inc("incy", incy)?;
    check_batch(batch_count)?;
    if batch_count == 0 {
        return Ok(ArgCheck::QuickReturn);
    }
    if n == 0 {
        check_ptr("result", results_null)?;
        return Ok(ArgCheck::QuickReturn);
    }
    check_ptr("x", x_null)?;
    check_ptr("y", y_null)?;
    check_ptr("result", results_null)?;
    Ok(ArgCheck::Continue)
}

#[allow(clippy::too_many_arguments)]
unsafe fn dot_impl<T, X, Y, const CONJ: bool>(
    handle: &Handle,
    op: &'static str,
    n: i32,
    x: X,
    incx: i32,
    y: Y,
    incy: i32,
    batch_count: i32,
    results: *mut T,
) -> Result<()>
where
    T: Scalar,
    X: BatchRead<T>,
    Y: BatchRead<T>,
    FetchDot<CONJ>: Fetch2<T>,
    CombineSum: Combine<<FetchDot<CONJ> as Fetch2<T>>::Acc>,
    FinalizeDot<T>: Finalize<<FetchDot<CONJ> as Fetch2<T>>::Acc, Out = T>,
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

    if handle.record_size_query(reduction_workspace_bytes::<<FetchDot<CONJ> as Fetch2<T>>::Acc>(
        n,
        batch_count,
    )) {
        return Ok(());
    }

    match dot_arg_check(
        n,
        incx,
        incy,
        batch_count,
        x.is_null(),
        y.is_null(),
        results.is_null(),
    )? {
        ArgCheck::QuickReturn => {
            write_identity_results::<<FetchDot<CONJ> as Fetch2<T>>::Acc, CombineSum, FinalizeDot<T>>(
                results,
                batch_count,
            );
            return Ok(());
        }
        ArgCheck::Continue => {}
    }

    check_numerics_vector(op, handle, n, x, incx, batch_count, true)?;
    check_numerics_vector(op, handle, n, y, incy, batch_count, true)?;
    reduce2_strided_batched::<T, X, Y, FetchDot<CONJ>, CombineSum, FinalizeDot<T>>(
        handle,
        n,
        x,
        incx,
        y,
        incy,
        batch_count,
        results,
    )
}

macro_rules! impl_dot_family {
    ($name:ident, $name_batched:ident, $name_strided:ident, $conj:expr, $doc:literal) => {
        #[doc = $doc]
        ///
        /// # Safety
        /// When non-null, `x` and `y` must each cover `n` elements at
        /// their increments and `result` one element.
        pub unsafe fn $name<T>(
            handle: &Handle,
            n: i32,
            x: *const T,
            incx: i32,
            y: *const T,
            incy: i32,
            result: *mut T,
        ) -> Status
        where
            T: Scalar,
            FetchDot<{ $conj }>: Fetch2<T>,
            CombineSum: Combine<<FetchDot<{ $conj }> as Fetch2<T>>::Acc>,
            FinalizeDot<T>: Finalize<<FetchDot<{ $conj }> as Fetch2<T>>::Acc, Out = T>,
        {
            status_boundary(|| {
                dot_impl::<T, _, _, { $conj }>(
                    handle,
                    stringify!($name),
                    n,
                    StridedRead::new(x, 0),
                    incx,
                    StridedRead::new(y, 0),
                    incy,
                    1,
                    result,
                )
            })
        }

        #[doc = $doc]
        /// Pointer-array batched form.
        ///
        /// # Safety
        /// When non-null, `x` and `y` must each hold `batch_count`
        /// per-item pointers; `results` must cover `batch_count` elements.
        #[allow(clippy::too_many_arguments)]
        pub unsafe fn $name_batched<T>(
            handle: &Handle,
            n: i32,
            x: *const *const T,
            incx: i32,
            y: *const *const T,
            incy: i32,
            batch_count: i32,
            results: *mut T,
        ) -> Status
        where
            T: Scalar,
            FetchDot<{ $conj }>: Fetch2<T>,
            CombineSum: Combine<<FetchDot<{ $conj }> as Fetch2<T>>::Acc>,
            FinalizeDot<T>: Finalize<<FetchDot<{ $conj }> as Fetch2<T>>::Acc, Out = T>,
        {
            status_boundary(|| {
                dot_impl::<T, _, _, { $conj }>(
                    handle,
                    stringify!($name_batched),
                    n,
                    ArrayRead::new(x),
                    incx,
                    ArrayRead::new(y),
                    incy,
                    batch_count,
                    results,
                )
            })
        }

        #[doc = $doc]
        /// Strided batched form; a stride of 0 broadcasts one vector
        /// across the batch.
        ///
        /// # Safety
        /// When non-null, `x` and `y` must cover every batch item
        /// addressed by their strides; `results` must cover
        /// `batch_count` elements.
        #[allow(clippy::too_many_arguments)]
        pub unsafe fn $name_strided<T>(
            handle: &Handle,
            n: i32,
            x: *const T,
            incx: i32,
            stridex: i64,
            y: *const T,
            incy: i32,
            stridey: i64,
            batch_count: i32,
            results: *mut T,
        ) -> Status
        where
            T: Scalar,
            FetchDot<{ $conj }>: Fetch2<T>,
            CombineSum: Combine<<FetchDot<{ $conj }> as Fetch2<T>>::Acc>,
            FinalizeDot<T>: Finalize<<FetchDot<{ $conj }> as Fetch2<T>>::Acc, Out = T>,
        {
            status_boundary(|| {
                dot_impl::<T, _, _, { $conj }>(
                    handle,
                    stringify!($name_strided),
                    n,
                    StridedRead::new(x, stridex),
                    incx,
                    StridedRead::new(y, stridey),
                    incy,
                    batch_count,
                    results,
                )
            })
        }
    };
}

impl_dot_family!(
    dot,
    dot_batched,
    dot_strided_batched,
    false,
    "Dot product `sum(x_i * y_i)` (unconjugated)."
);

impl_dot_family!(
    dotc,
    dotc_batched,
    dotc_strided_batched,
    true,
    "Conjugated dot product `sum(conj(x_i) * y_i)`."
);
