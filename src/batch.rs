//! Batched operand addressing
//!
//! Every kernel reads its operands through one of two access patterns:
//!
//! - **Strided** (covers the plain convention with `stride = 0` or
//!   `batch_count = 1`): `effective = base + shift + batch * stride`
//! - **Pointer-array**: `effective = table[batch] + shift`
//!
//! Both are abstracted behind [`BatchRead`]/[`BatchWrite`] so the
//! reduction engine and the tile dispatcher each have a single code path.
//! A stride of zero is a legal broadcast (every batch item aliases one
//! buffer). The model does not assume `stride >= extent`; overlapping
//! batches are permitted by contract and callers own any write hazards
//! that cannot be detected here (the dispatcher serializes the batch axis
//! for the hazards it *can* detect, see [`BatchWrite::disjoint`]).

use crate::context::{Handle, PointerMode};
use crate::dtype::Scalar;

/// Read access to one batched operand
///
/// # Safety of `load`
///
/// The returned pointer is only valid when the underlying caller-supplied
/// buffer (or pointer table entry) covers the addressed batch item; the
/// argument validator guarantees callers have been rejected before any
/// `load` on a null root.
pub trait BatchRead<T: Scalar>: Copy + Send + Sync + 'static {
    /// Pointer to element 0 of batch item `batch`, advanced by `shift`
    /// elements
    ///
    /// # Safety
    /// Root pointer must be non-null and the addressed item in bounds.
    unsafe fn load(self, batch: i32, shift: i64) -> *const T;

    /// True when the root pointer is null
    fn is_null(&self) -> bool;
}

/// Write access to one batched operand
pub trait BatchWrite<T: Scalar>: BatchRead<T> {
    /// Mutable pointer to element 0 of batch item `batch`, advanced by
    /// `shift` elements
    ///
    /// # Safety
    /// Same contract as [`BatchRead::load`].
    unsafe fn load_mut(self, batch: i32, shift: i64) -> *mut T;

    /// True when batch items of this operand are provably disjoint for a
    /// footprint of `footprint` elements
    ///
    /// The dispatcher parallelizes the batch axis only when this holds;
    /// otherwise batch items run in issue order so aliased outputs (e.g.
    /// a stride-0 broadcast accumulator) see deterministic accumulation.
    ///
    /// # Safety
    /// May read the pointer table; root must be non-null when
    /// `batch_count > 0`.
    unsafe fn disjoint(self, footprint: i64, batch_count: i32) -> bool;
}

/// Strided operand view: one base buffer plus a fixed per-item stride
#[derive(Copy, Clone, Debug)]
pub struct StridedRead<T> {
    base: *const T,
    stride: i64,
}

/// Mutable strided operand view
#[derive(Copy, Clone, Debug)]
pub struct StridedWrite<T> {
    base: *mut T,
    stride: i64,
}

/// Pointer-array operand view: a host-visible table of per-item pointers
#[derive(Copy, Clone, Debug)]
pub struct ArrayRead<T> {
    table: *const *const T,
}

/// Mutable pointer-array operand view
#[derive(Copy, Clone, Debug)]
pub struct ArrayWrite<T> {
    table: *const *mut T,
}

// The views carry caller-owned raw pointers across work-group tasks; the
// validator has established the access contract before any task runs.
unsafe impl<T> Send for StridedRead<T> {}
unsafe impl<T> Sync for StridedRead<T> {}
unsafe impl<T> Send for StridedWrite<T> {}
unsafe impl<T> Sync for StridedWrite<T> {}
unsafe impl<T> Send for ArrayRead<T> {}
unsafe impl<T> Sync for ArrayRead<T> {}
unsafe impl<T> Send for ArrayWrite<T> {}
unsafe impl<T> Sync for ArrayWrite<T> {}

impl<T> StridedRead<T> {
    /// View over `base` with `stride` elements between batch items
    #[inline]
    pub fn new(base: *const T, stride: i64) -> Self {
        Self { base, stride }
    }
}

impl<T> StridedWrite<T> {
    /// Mutable view over `base` with `stride` elements between batch items
    #[inline]
    pub fn new(base: *mut T, stride: i64) -> Self {
        Self { base, stride }
    }
}

impl<T> ArrayRead<T> {
    /// View over a table of `batch_count` per-item pointers
    #[inline]
    pub fn new(table: *const *const T) -> Self {
        Self { table }
    }
}

impl<T> ArrayWrite<T> {
    /// Mutable view over a table of `batch_count` per-item pointers
    #[inline]
    pub fn new(table: *const *mut T) -> Self {
        Self { table }
    }
}

impl<T: Scalar> BatchRead<T> for StridedRead<T> {
    #[inline]
    unsafe fn load(self, batch: i32, shift: i64) -> *const T {
        self.base.offset((shift + batch as i64 * self.stride) as isize)
    }

    #[inline]
    fn is_null(&self) -> bool {
        self.base.is_null()
    }
}

impl<T: Scalar> BatchRead<T> for StridedWrite<T> {
    #[inline]
    unsafe fn load(self, batch: i32, shift: i64) -> *const T {
        self.base.offset((shift + batch as i64 * self.stride) as isize) as *const T
    }

    #[inline]
    fn is_null(&self) -> bool {
        self.base.is_null()
    }
}

impl<T: Scalar> BatchWrite<T> for StridedWrite<T> {
    #[inline]
    unsafe fn load_mut(self, batch: i32, shift: i64) -> *mut T {
        self.base.offset((shift + batch as i64 * self.stride) as isize)
    }

    #[inline]
    unsafe fn disjoint(self, footprint: i64, batch_count: i32) -> bool {
        batch_count <= 1 || self.stride.abs() >= footprint
    }
}

impl<T: Scalar> BatchRead<T> for ArrayRead<T> {
    #[inline]
    unsafe fn load(self, batch: i32, shift: i64) -> *const T {
        (*self.table.add(batch as usize)).offset(shift as isize)
    }

    #[inline]
    fn is_null(&self) -> bool {
        self.table.is_null()
    }
}

impl<T: Scalar> BatchRead<T> for ArrayWrite<T> {
    #[inline]
    unsafe fn load(self, batch: i32, shift: i64) -> *const T {
        (*self.table.add(batch as usize)).offset(shift as isize) as *const T
    }

    #[inline]
    fn is_null(&self) -> bool {
        self.table.is_null()
    }
}

impl<T: Scalar> BatchWrite<T> for ArrayWrite<T> {
    #[inline]
    unsafe fn load_mut(self, batch: i32, shift: i64) -> *mut T {
        (*self.table.add(batch as usize)).offset(shift as isize)
    }

    unsafe fn disjoint(self, _footprint: i64, batch_count: i32) -> bool {
        // Exact-duplicate table entries are the alias mode the convention
        // actually produces; overlapping distinct pointers stay a caller
        // hazard per the addressing contract.
        if batch_count <= 1 {
            return true;
        }
        let mut ptrs: Vec<usize> = (0..batch_count as usize)
            .map(|b| *self.table.add(b) as usize)
            .collect();
        ptrs.sort_unstable();
        ptrs.windows(2).all(|w| w[0] != w[1])
    }
}

/// Shift that makes negative increments address from the end of the data
///
/// With `inc < 0`, lane `i` reads `x[shift + i*inc]`, so the shift points
/// at the last element of the logical vector.
#[inline]
pub(crate) fn inc_shift(inc: i32, n: i32) -> i64 {
    if inc < 0 {
        -(inc as i64) * (n as i64 - 1)
    } else {
        0
    }
}

/// Read a coefficient through its pointer
///
/// # Safety
/// `ptr` must be non-null and aligned; the validator guarantees this on
/// every path that reaches a kernel.
#[inline]
pub(crate) unsafe fn load_scalar<T: Scalar>(ptr: *const T) -> T {
    *ptr
}

/// Peek a host-resident coefficient before launch
///
/// Returns `None` in device pointer mode (the host must not dereference a
/// device-resident coefficient before the kernel runs) or when the pointer
/// is null.
#[inline]
pub(crate) fn host_scalar<T: Scalar>(handle: &Handle, ptr: *const T) -> Option<T> {
    match handle.pointer_mode() {
        PointerMode::Host if !ptr.is_null() => Some(unsafe { *ptr }),
        _ => None,
    }
}
