//! Generic parallel reduction engine
//!
//! Every reduction-shaped operation (sum of magnitudes, euclidean norm,
//! dot product, extremum index search) is one instantiation of
//! `finalize(combine_over_all_elements(fetch(x[i])))`:
//!
//! - [`Fetch1`]/[`Fetch2`] transform an element (or element pair) into an
//!   accumulator,
//! - [`Combine`] is the associative, commutative folding operator with an
//!   identity,
//! - [`Finalize`] maps the folded accumulator to the result type.
//!
//! # Two-level tree
//!
//! The vector is cut into fixed windows of [`NB`] elements. Each
//! work-group fetches its window into a group-local buffer and folds it
//! with a halving tree (one logical barrier between staging and folding),
//! producing one partial per group in workspace. A second pass walks each
//! batch item's partials with a grid-stride load into another [`NB`]-wide
//! buffer and the same halving tree, then finalizes. Synchronization is a
//! constant number of barriers regardless of vector length: O(n / P) work
//! per lane with O(log NB) combine depth.
//!
//! # Numeric semantics
//!
//! The combine order is a pure function of `n`, never of thread
//! scheduling, so repeated runs are bit-identical. It is NOT the
//! left-to-right sequential order: results may differ from a sequential
//! sum in the last bits, and tests compare against a sequential oracle
//! with relative tolerance only.
//!
//! Zero-length input produces the combiner identity without reading
//! memory.

mod functors;

pub use functors::{
    Combine, CombineAmax, CombineAmin, CombineSum, Fetch1, Fetch2, FetchAmax, FetchAmin,
    FetchAsum, FetchDot, FetchNrm2, Finalize, FinalizeDot, FinalizeIdentity, FinalizeIndex,
    FinalizeSqrt, IndexVal,
};

use crate::batch::{inc_shift, BatchRead};
use crate::context::Handle;
use crate::dtype::Scalar;
use crate::error::Result;
use crate::launch::{launch, tiles_for, Grid};

/// Work-group width for reductions
pub(crate) const NB: usize = 512;

/// Number of first-pass work-groups for an `n`-element reduction
#[inline]
pub(crate) fn reduction_groups(n: i32) -> u32 {
    tiles_for(n, NB as i32)
}

/// Workspace requirement in bytes for the partial-per-group table
#[inline]
pub(crate) fn reduction_workspace_bytes<A>(n: i32, batch_count: i32) -> usize {
    reduction_groups(n) as usize * batch_count.max(0) as usize * std::mem::size_of::<A>()
}

/// Fold one staged group buffer with the halving tree
#[inline]
fn tree_fold<A: Copy, C: Combine<A>>(shared: &mut [A; NB]) -> A {
    let mut s = NB / 2;
    while s > 0 {
        for t in 0..s {
            shared[t] = C::combine(shared[t], shared[t + s]);
        }
        s >>= 1;
    }
    shared[0]
}

/// Fold an already-materialized partial table into the final accumulator
///
/// Grid-stride load into an [`NB`]-wide buffer, then the halving tree,
/// matching the shape of the per-group first pass.
#[inline]
fn fold_partials<A: Copy, C: Combine<A>>(parts: &[A]) -> A {
    let mut shared = [C::identity(); NB];
    for (t, slot) in shared.iter_mut().enumerate() {
        let mut acc = C::identity();
        let mut i = t;
        while i < parts.len() {
            acc = C::combine(acc, parts[i]);
            i += NB;
        }
        *slot = acc;
    }
    tree_fold::<A, C>(&mut shared)
}

/// Single-vector batched reduction
///
/// Writes one finalized result per batch item to `results`. The caller
/// has already validated geometry and pointers and handled quick returns;
/// `n > 0` and `batch_count > 0` hold here.
///
/// # Safety
/// `x` must cover `n` elements at increment `inc` for every batch item;
/// `results` must cover `batch_count` elements.
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn reduce_strided_batched<T, X, F, C, Z>(
    handle: &Handle,
    n: i32,
    x: X,
    inc: i32,
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
    let groups = reduction_groups(n) as usize;
    let ws = handle.workspace(reduction_workspace_bytes::<F::Acc>(n, batch_count))?;
    let ws_addr = ws.as_mut_ptr::<F::Acc>() as usize;
    let shift = inc_shift(inc, n);

    // Pass 1: one partial per (group, batch item)
    launch(Grid::new(groups as u32, 1, batch_count as u32), |g| {
        let ptr = unsafe { x.load(g.z as i32, shift) };
        let mut shared = [C::identity(); NB];
        let base = g.x as usize * NB;
        for (t, slot) in shared.iter_mut().enumerate() {
            let i = base + t;
            if i < n as usize {
                let v = unsafe { *ptr.offset(i as i64 as isize * inc as isize) };
                *slot = F::fetch(v, (i + 1) as i64);
            }
        }
        let partial = tree_fold::<F::Acc, C>(&mut shared);
        let ws_ptr = ws_addr as *mut F::Acc;
        unsafe { *ws_ptr.add(g.z as usize * groups + g.x as usize) = partial };
    });

    // Pass 2: fold each batch item's partials and finalize
    let res_addr = results as usize;
    launch(Grid::new(1, 1, batch_count as u32), |g| {
        let ws_ptr = ws_addr as *const F::Acc;
        let parts =
            unsafe { std::slice::from_raw_parts(ws_ptr.add(g.z as usize * groups), groups) };
        let acc = fold_partials::<F::Acc, C>(parts);
        let res_ptr = res_addr as *mut Z::Out;
        unsafe { *res_ptr.add(g.z as usize) = Z::finalize(acc) };
    });

    Ok(())
}

/// Two-vector batched reduction (dot-product family)
///
/// Same structure as [`reduce_strided_batched`] with a pair fetch.
/// Negative increments address from the end of the respective vector.
///
/// # Safety
/// `x` and `y` must each cover `n` elements at their increments for every
/// batch item; `results` must cover `batch_count` elements.
#[allow(clippy::too_many_arguments)]
pub(crate) unsafe fn reduce2_strided_batched<T, X, Y, F, C, Z>(
    handle: &Handle,
    n: i32,
    x: X,
    incx: i32,
    y: Y,
    incy: i32,
    batch_count: i32,
    results: *mut Z::Out,
) -> Result<()>
where
    T: Scalar,
    X: BatchRead<T>,
    Y: BatchRead<T>,
    F: Fetch2<T>,
    C: Combine<F::Acc>,
    Z: Finalize<F::Acc>,
{
    let groups = reduction_groups(n) as usize;
    let ws = handle.workspace(reduction_workspace_bytes::<F::Acc>(n, batch_count))?;
    let ws_addr = ws.as_mut_ptr::<F::Acc>() as usize;
    let shiftx = inc_shift(incx, n);
    let shifty = inc_shift(incy, n);

    launch(Grid::new(groups as u32, 1, batch_count as u32), |g| {
        let px = unsafe { x.load(g.z as i32, shiftx) };
        let py = unsafe { y.load(g.z as i32, shifty) };
        let mut shared = [C::identity(); NB];
        let base = g.x as usize * NB;
        for (t, slot) in shared.iter_mut().enumerate() {
            let i = base + t;
            if i < n as usize {
                let xv = unsafe { *px.offset(i as isize * incx as isize) };
                let yv = unsafe { *py.offset(i as isize * incy as isize) };
                *slot = F::fetch(xv, yv);
            }
        }
        let partial = tree_fold::<F::Acc, C>(&mut shared);
        let ws_ptr = ws_addr as *mut F::Acc;
        unsafe { *ws_ptr.add(g.z as usize * groups + g.x as usize) = partial };
    });

    let res_addr = results as usize;
    launch(Grid::new(1, 1, batch_count as u32), |g| {
        let ws_ptr = ws_addr as *const F::Acc;
        let parts =
            unsafe { std::slice::from_raw_parts(ws_ptr.add(g.z as usize * groups), groups) };
        let acc = fold_partials::<F::Acc, C>(parts);
        let res_ptr = res_addr as *mut Z::Out;
        unsafe { *res_ptr.add(g.z as usize) = Z::finalize(acc) };
    });

    Ok(())
}

/// Write the finalized combiner identity to every batch result slot
///
/// The quick-return path of every reduction: a degenerate problem yields
/// the identity (0 for sums, the index sentinel for extremum searches)
/// without reading operand memory.
///
/// # Safety
/// `results` must cover `batch_count` elements when `batch_count > 0`.
pub(crate) unsafe fn write_identity_results<A, C, Z>(results: *mut Z::Out, batch_count: i32)
where
    A: Copy,
    C: Combine<A>,
    Z: Finalize<A>,
{
    let id = Z::finalize(C::identity());
    for b in 0..batch_count.max(0) as usize {
        *results.add(b) = id;
    }
}
