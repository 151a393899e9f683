//! Scalar type system for parablas operands
//!
//! This module provides the `DType` enum representing the supported element
//! types, the [`Scalar`] trait connecting Rust types to kernels, and the
//! complex number types.

pub mod complex;
mod element;

pub use complex::{Complex32, Complex64};
pub use element::{RealScalar, Scalar};

use std::fmt;

/// Element types supported by parablas operands
///
/// This enum represents the precision of an operand at runtime. It is used
/// for log records and diagnostics; kernels themselves are monomorphized
/// over [`Scalar`] and never branch on it.
///
/// # Discriminant Values
///
/// The discriminant values are **stable**:
/// - Reals: 0-9 (F64=0, F32=1, F16=2, BF16=3)
/// - Complex: 40-49 (Complex32=40, Complex64=41)
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    /// 64-bit float
    F64 = 0,
    /// 32-bit float
    F32 = 1,
    /// 16-bit IEEE float (requires "f16" feature for kernels)
    F16 = 2,
    /// 16-bit brain float: integer-backed, f32 dynamic range
    BF16 = 3,
    /// Complex with 32-bit parts
    Complex32 = 40,
    /// Complex with 64-bit parts
    Complex64 = 41,
}

impl DType {
    /// Size of one element in bytes
    pub const fn size_of(self) -> usize {
        match self {
            DType::F64 => 8,
            DType::F32 => 4,
            DType::F16 | DType::BF16 => 2,
            DType::Complex32 => 8,
            DType::Complex64 => 16,
        }
    }

    /// True for complex types
    pub const fn is_complex(self) -> bool {
        matches!(self, DType::Complex32 | DType::Complex64)
    }

    /// Single-letter precision tag used in bench log records
    ///
    /// Follows the conventional naming: `s`/`d` for 32/64-bit reals,
    /// `c`/`z` for 32/64-bit complex, `h`/`b` for the 16-bit formats.
    pub const fn letter(self) -> char {
        match self {
            DType::F32 => 's',
            DType::F64 => 'd',
            DType::Complex32 => 'c',
            DType::Complex64 => 'z',
            DType::F16 => 'h',
            DType::BF16 => 'b',
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::F64 => "f64",
            DType::F32 => "f32",
            DType::F16 => "f16",
            DType::BF16 => "bf16",
            DType::Complex32 => "complex32",
            DType::Complex64 => "complex64",
        };
        f.write_str(name)
    }
}
