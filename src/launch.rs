//! Work-group grid executor
//!
//! Kernels are expressed as a fixed-geometry grid of work-groups over
//! (output-row-tile, output-column-tile, batch-index). Each work-group body
//! stages the operand slices its tile needs into local buffers, then
//! computes every lane of the tile from the staged data. The grid geometry
//! is a pure function of the problem size, never of the worker pool, so
//! results are reproducible across thread counts.
//!
//! There is no cross-group synchronization: groups own disjoint output
//! elements, or the caller of [`launch_batch_seq`] has decided the batch
//! axis must run in issue order (aliased output batches).

/// Work-group counts per grid axis
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Grid {
    /// Output-row-tile axis
    pub x: u32,
    /// Output-column-tile axis
    pub y: u32,
    /// Batch axis
    pub z: u32,
}

impl Grid {
    #[inline]
    pub(crate) fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Total group count
    #[inline]
    fn count(&self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }
}

/// Coordinates of one work-group within its grid
#[derive(Copy, Clone, Debug)]
pub(crate) struct GroupId {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

/// Number of tiles covering `extent` elements at `tile` elements each
#[inline]
pub(crate) fn tiles_for(extent: i32, tile: i32) -> u32 {
    debug_assert!(extent >= 0 && tile > 0);
    if extent == 0 {
        0
    } else {
        ((extent - 1) / tile + 1) as u32
    }
}

#[inline]
fn unflatten(grid: Grid, idx: usize) -> GroupId {
    let xy = grid.x as usize * grid.y as usize;
    let z = idx / xy;
    let rem = idx % xy;
    GroupId {
        x: (rem % grid.x as usize) as u32,
        y: (rem / grid.x as usize) as u32,
        z: z as u32,
    }
}

/// Run one work-group body for every group in the grid
///
/// All three axes may execute concurrently; the body must write only the
/// output elements its tile owns.
pub(crate) fn launch<F>(grid: Grid, body: F)
where
    F: Fn(GroupId) + Send + Sync,
{
    let count = grid.count();
    if count == 0 {
        return;
    }

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        (0..count)
            .into_par_iter()
            .for_each(|idx| body(unflatten(grid, idx)));
    }

    #[cfg(not(feature = "rayon"))]
    for idx in 0..count {
        body(unflatten(grid, idx));
    }
}

/// Run the grid with the batch axis serialized
///
/// Used when output batch items may alias (stride-0 broadcast, short
/// strides, duplicated pointer-table entries): batch items execute in
/// issue order, tiles within one batch item still run concurrently.
pub(crate) fn launch_batch_seq<F>(grid: Grid, body: F)
where
    F: Fn(GroupId) + Send + Sync,
{
    let plane = Grid::new(grid.x, grid.y, 1);
    for z in 0..grid.z {
        launch(plane, |g| {
            body(GroupId {
                x: g.x,
                y: g.y,
                z,
            })
        });
    }
}
