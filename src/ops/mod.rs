//! Public operation families
//!
//! Every operation follows one control flow:
//!
//! ```text
//! log → size-query shortcut → validate → (quick return | error | continue)
//!     → sanitize inputs → dispatch → sanitize outputs → status
//! ```
//!
//! and exists in three operand-passing conventions: plain dense buffers,
//! a host array of per-item pointers (`_batched`), and one buffer plus a
//! fixed inter-item stride (`_strided_batched`). All three are thin entry
//! points over one generic implementation per operation, parameterized by
//! the batch access traits in [`crate::batch`].

mod axpy;
mod dot;
mod gemm;
mod gemv;
mod ger;
mod reduction;
mod scal;
mod syr2;
mod syrk;
mod trmv;
mod trsv;
pub(crate) mod validate;

pub use axpy::{axpy, axpy_batched, axpy_strided_batched};
pub use dot::{
    dot, dot_batched, dot_strided_batched, dotc, dotc_batched, dotc_strided_batched,
};
pub use gemm::{gemm, gemm_batched, gemm_strided_batched};
pub use gemv::{gemv, gemv_batched, gemv_strided_batched};
pub use ger::{ger, ger_batched, ger_strided_batched, gerc, gerc_batched, gerc_strided_batched};
pub use reduction::{
    asum, asum_batched, asum_strided_batched, iamax, iamax_batched, iamax_strided_batched,
    iamin, iamin_batched, iamin_strided_batched, nrm2, nrm2_batched, nrm2_strided_batched,
};
pub use scal::{scal, scal_batched, scal_strided_batched};
pub use syr2::{
    her2, her2_batched, her2_strided_batched, syr2, syr2_batched, syr2_strided_batched,
};
pub use syrk::{syrk, syrk_batched, syrk_strided_batched};
pub use trmv::{trmv, trmv_batched, trmv_strided_batched};
pub use trsv::{trsv, trsv_batched, trsv_strided_batched};

/// Transpose mode for matrix operands
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transpose {
    /// Use the matrix as stored
    None,
    /// Use the transpose
    Trans,
    /// Use the conjugate transpose
    ConjTrans,
}

impl Transpose {
    /// Conventional single-letter form for log records
    pub const fn letter(self) -> char {
        match self {
            Transpose::None => 'N',
            Transpose::Trans => 'T',
            Transpose::ConjTrans => 'C',
        }
    }
}

/// Which triangle of a triangular/symmetric operand is referenced
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Fill {
    /// Upper triangle
    Upper,
    /// Lower triangle
    Lower,
}

impl Fill {
    /// Conventional single-letter form for log records
    pub const fn letter(self) -> char {
        match self {
            Fill::Upper => 'U',
            Fill::Lower => 'L',
        }
    }
}

/// Whether a triangular operand has an implicit unit diagonal
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Diagonal {
    /// Diagonal is stored
    NonUnit,
    /// Diagonal is implicitly one; stored diagonal is not referenced
    Unit,
}

impl Diagonal {
    /// Conventional single-letter form for log records
    pub const fn letter(self) -> char {
        match self {
            Diagonal::NonUnit => 'N',
            Diagonal::Unit => 'U',
        }
    }
}

/// Verdict of an argument validator
///
/// Errors travel separately as `Err(Error)`; this is the non-error split
/// between "proceed to dispatch" and "valid but vacuous".
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ArgCheck {
    /// Proceed to dispatch
    Continue,
    /// Degenerate problem: return success with no kernel launch
    QuickReturn,
}
