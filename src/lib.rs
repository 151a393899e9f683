//! # parablas
//!
//! **Dense batched BLAS (levels 1-3) with a data-parallel tile execution
//! model.**
//!
//! parablas provides the classic dense linear-algebra primitives (dot
//! products, norms, rank updates, triangular multiply/solve, matrix
//! multiply) behind a status-returning, handle-based interface, with
//! every operation available in three operand-passing conventions:
//! plain, pointer-array batched, and strided batched.
//!
//! ## Why parablas?
//!
//! - **One generic implementation per operation**: the scalar type, the
//!   batch addressing convention, and the fill/transpose/conjugate
//!   variants are monomorphized, not branched at runtime
//! - **Strict call contract**: mode checks, size checks, degenerate
//!   quick returns, and pointer checks happen in a fixed, documented
//!   order before any kernel is scheduled
//! - **Numerics sanitation**: optional NaN/Inf scans of inputs before
//!   dispatch and outputs after
//! - **Reproducible reductions**: fixed tree order independent of the
//!   worker pool, bit-identical run to run
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use parablas::prelude::*;
//!
//! let handle = Handle::new();
//! let x = vec![1.0f64, -2.0, 3.0];
//! let mut result = 0.0f64;
//!
//! let status = unsafe { asum(&handle, 3, x.as_ptr(), 1, &mut result) };
//! assert!(status.is_success());
//! assert_eq!(result, 6.0);
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): multi-threaded execution of kernel grids
//! - `f16`: half-precision element types (F16, BF16) for the dot family

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod context;
pub mod dtype;
pub mod error;
pub mod ops;
pub mod reduce;

pub(crate) mod check;
pub(crate) mod launch;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::context::{
        CheckNumerics, Handle, LayerMode, LogArg, Logger, PointerMode, Stream,
    };
    pub use crate::dtype::{Complex32, Complex64, DType, RealScalar, Scalar};
    pub use crate::error::Status;
    pub use crate::ops::*;
}
