//! Magnitude reductions: `asum`, `nrm2`, `iamax`, `iamin`
//!
//! All four are one skeleton over the reduction engine with different
//! functors: sum of one-norms, euclidean norm (squared-magnitude fetch,
//! square-root finalize), and the extremum-index searches (lower index
//! wins ties; result is 1-based with 0 for an empty vector).
//!
//! Following the reference convention for this family, a non-positive
//! increment is not an error: the call quick-returns the combiner
//! identity. The result slot is written on every success path, so it is a
//! required pointer even for degenerate problems; the input vector is not
//! inspected on those paths.

use super::validate::{check_batch, check_dim, check_inc, check_ptr};
use super::ArgCheck;
use crate::batch::{ArrayRead, BatchRead, StridedRead};
use crate::check::check_numerics_vector;
use crate::context::{Handle, LogArg};
use crate::dtype::Scalar;
use crate::error::{status_boundary, Result, Status};
use crate::reduce::{
    reduce_strided_batched, reduction_workspace_bytes, write_identity_results, Combine,
    CombineAmax, CombineAmin, CombineSum, Fetch1, FetchAmax, FetchAmin, FetchAsum, FetchNrm2,
    Finalize, FinalizeIdentity, FinalizeIndex, FinalizeSqrt,
};
use smallvec::smallvec;

fn reduction_arg_check(
    n: i32,
    incx: i32,
    batch_count: i32,
    x_null: bool,
    results_null: bool,
) -> Result<ArgCheck> {
    check_dim("n", n)?;
    check_inc("incx", incx)?;
    check_batch(batch_count)?;
    if batch_count == 0 {
        return Ok(ArgCheck::QuickReturn);
    }
    if n == 0 || incx < 0 {
        check_ptr("result", results_null)?;
        return Ok(ArgCheck::QuickReturn);
    }
    check_ptr("x", x_null)?;
    check_ptr("result", results_null)?;
    Ok(ArgCheck::Continue)
}

#[allow(clippy::too_many_arguments)]
unsafe fn reduction_impl<T, X, F, C, Z>(
    handle: &Handle,
    op: &'static str,
    n: i32,
    x: X,
    incx: i32,
    batch_count: i32,
    results: *mut Z::Out,
) -> Result<()>
where
    T: Scalar,
    X: BatchRead<T>,
    F: Fetch1<T>,
    C: Combine<F::Acc>,
    Z: Finalize<F::Acc>,
{
    handle.log_call(op, || {
        smallvec![
            LogArg::ch("precision", T::DTYPE.letter()),
            LogArg::int("n", n as i64),
            LogArg::int("incx", incx as i64),
            LogArg::int("batch_count", batch_count as i64),
        ]
    });

    if handle.record_size_query(reduction_workspace_bytes::<F::Acc>(n, batch_count)) {
        return Ok(());
    }

    match reduction_arg_check(n, incx, batch_count, x.is_null(), results.is_null())? {
        ArgCheck::QuickReturn => {
            write_identity_results::<F::Acc, C, Z>(results, batch_count);
            return Ok(());
        }
        ArgCheck::Continue => {}
    }

    check_numerics_vector(op, handle, n, x, incx, batch_count, true)?;
    reduce_strided_batched::<T, X, F, C, Z>(handle, n, x, incx, batch_count, results)
}

macro_rules! impl_magnitude_reduction {
    (
        $name:ident, $name_batched:ident, $name_strided:ident,
        $fetch:ty, $combine:ty, $finalize:ty, $out:ty,
        $doc:literal
    ) => {
        #[doc = $doc]
        ///
        /// # Safety
        /// When non-null, `x` must cover `n` elements at increment `incx`
        /// and `result` one element.
        pub unsafe fn $name<T>(
            handle: &Handle,
            n: i32,
            x: *const T,
            incx: i32,
            result: *mut $out,
        ) -> Status
        where
            T: Scalar,
            $fetch: Fetch1<T>,
            $combine: Combine<<$fetch as Fetch1<T>>::Acc>,
            $finalize: Finalize<<$fetch as Fetch1<T>>::Acc, Out = $out>,
        {
            status_boundary(|| {
                reduction_impl::<T, _, $fetch, $combine, $finalize>(
                    handle,
                    stringify!($name),
                    n,
                    StridedRead::new(x, 0),
                    incx,
                    1,
                    result,
                )
            })
        }

        #[doc = $doc]
        /// Pointer-array batched form.
        ///
        /// # Safety
        /// When non-null, `x` must hold `batch_count` pointers each
        /// covering `n` elements at increment `incx`; `results` must
        /// cover `batch_count` elements.
        pub unsafe fn $name_batched<T>(
            handle: &Handle,
            n: i32,
            x: *const *const T,
            incx: i32,
            batch_count: i32,
            results: *mut $out,
        ) -> Status
        where
            T: Scalar,
            $fetch: Fetch1<T>,
            $combine: Combine<<$fetch as Fetch1<T>>::Acc>,
            $finalize: Finalize<<$fetch as Fetch1<T>>::Acc, Out = $out>,
        {
            status_boundary(|| {
                reduction_impl::<T, _, $fetch, $combine, $finalize>(
                    handle,
                    stringify!($name_batched),
                    n,
                    ArrayRead::new(x),
                    incx,
                    batch_count,
                    results,
                )
            })
        }

        #[doc = $doc]
        /// Strided batched form; `stridex = 0` broadcasts one vector.
        ///
        /// # Safety
        /// When non-null, `x` must cover every batch item addressed by
        /// `stridex`; `results` must cover `batch_count` elements.
        pub unsafe fn $name_strided<T>(
            handle: &Handle,
            n: i32,
            x: *const T,
            incx: i32,
            stridex: i64,
            batch_count: i32,
            results: *mut $out,
        ) -> Status
        where
            T: Scalar,
            $fetch: Fetch1<T>,
            $combine: Combine<<$fetch as Fetch1<T>>::Acc>,
            $finalize: Finalize<<$fetch as Fetch1<T>>::Acc, Out = $out>,
        {
            status_boundary(|| {
                reduction_impl::<T, _, $fetch, $combine, $finalize>(
                    handle,
                    stringify!($name_strided),
                    n,
                    StridedRead::new(x, stridex),
                    incx,
                    batch_count,
                    results,
                )
            })
        }
    };
}

impl_magnitude_reduction!(
    asum,
    asum_batched,
    asum_strided_batched,
    FetchAsum,
    CombineSum,
    FinalizeIdentity,
    T::Real,
    "Sum of element one-norms: `sum(|re(x_i)| + |im(x_i)|)`."
);

impl_magnitude_reduction!(
    nrm2,
    nrm2_batched,
    nrm2_strided_batched,
    FetchNrm2,
    CombineSum,
    FinalizeSqrt,
    T::Real,
    "Euclidean norm: `sqrt(sum(|x_i|^2))`."
);

impl_magnitude_reduction!(
    iamax,
    iamax_batched,
    iamax_strided_batched,
    FetchAmax,
    CombineAmax,
    FinalizeIndex,
    i64,
    "1-based index of the first element with maximum one-norm (0 when empty)."
);

impl_magnitude_reduction!(
    iamin,
    iamin_batched,
    iamin_strided_batched,
    FetchAmin,
    CombineAmin,
    FinalizeIndex,
    i64,
    "1-based index of the first element with minimum one-norm (0 when empty)."
);
