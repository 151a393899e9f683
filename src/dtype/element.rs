//! Scalar trait mapping Rust types to operand element types

use super::complex::{Complex32, Complex64};
use super::DType;
use bytemuck::{Pod, Zeroable};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Trait for types that can be elements of an operand buffer
///
/// This trait connects Rust's type system to the kernels. Every kernel is
/// monomorphized over `Scalar`, so a missing operation on a type is a
/// compile error, never a runtime dispatch failure.
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - Basic trait requirements
/// - `Pod + Zeroable` - Safe reinterpretation of raw operand memory (bytemuck)
/// - `Add + Sub + Mul + Div + Neg` - Arithmetic operations (Output = Self)
///
/// `PartialOrd` is NOT required here since complex types have no total
/// magnitude order; ordered reductions go through `abs1` on
/// [`Scalar::Real`].
pub trait Scalar:
    Copy
    + Clone
    + Send
    + Sync
    + Pod
    + Zeroable
    + 'static
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// The real type underlying this scalar (`Self` for real types)
    type Real: RealScalar;

    /// Additive identity
    fn zero() -> Self;

    /// Multiplicative identity
    fn one() -> Self;

    /// Complex conjugate (identity for real types)
    fn conj(self) -> Self;

    /// The one-norm of the element: `|re| + |im|` for complex, `|x|` for real
    ///
    /// This is the magnitude used by `asum` and the extremum-index
    /// searches, matching the reference semantics of those operations.
    fn abs1(self) -> Self::Real;

    /// Squared euclidean magnitude: `re² + im²`
    fn sq_abs(self) -> Self::Real;

    /// Embed a real value (imaginary part zero for complex types)
    fn from_real(r: Self::Real) -> Self;

    /// The real part of the element (`self` for real types)
    fn real(self) -> Self::Real;

    /// True when any part of the element is NaN
    fn is_nan(self) -> bool;

    /// True when any part of the element is infinite
    fn is_inf(self) -> bool;

    /// True for exact zero
    #[inline]
    fn is_zero(self) -> bool {
        self == Self::zero()
    }
}

/// Real scalars: the result type of norms and magnitude reductions
pub trait RealScalar: Scalar<Real = Self> + PartialOrd {
    /// Square root, used by norm finalization
    fn sqrt(self) -> Self;
}

impl Scalar for f32 {
    const DTYPE: DType = DType::F32;
    type Real = f32;

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }

    #[inline]
    fn conj(self) -> Self {
        self
    }

    #[inline]
    fn abs1(self) -> f32 {
        self.abs()
    }

    #[inline]
    fn sq_abs(self) -> f32 {
        self * self
    }

    #[inline]
    fn from_real(r: f32) -> Self {
        r
    }

    #[inline]
    fn real(self) -> f32 {
        self
    }

    #[inline]
    fn is_nan(self) -> bool {
        f32::is_nan(self)
    }

    #[inline]
    fn is_inf(self) -> bool {
        f32::is_infinite(self)
    }
}

impl RealScalar for f32 {
    #[inline]
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }
}

impl Scalar for f64 {
    const DTYPE: DType = DType::F64;
    type Real = f64;

    #[inline]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn one() -> Self {
        1.0
    }

    #[inline]
    fn conj(self) -> Self {
        self
    }

    #[inline]
    fn abs1(self) -> f64 {
        self.abs()
    }

    #[inline]
    fn sq_abs(self) -> f64 {
        self * self
    }

    #[inline]
    fn from_real(r: f64) -> Self {
        r
    }

    #[inline]
    fn real(self) -> f64 {
        self
    }

    #[inline]
    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }

    #[inline]
    fn is_inf(self) -> bool {
        f64::is_infinite(self)
    }
}

impl RealScalar for f64 {
    #[inline]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }
}

impl Scalar for Complex32 {
    const DTYPE: DType = DType::Complex32;
    type Real = f32;

    #[inline]
    fn zero() -> Self {
        Complex32::ZERO
    }

    #[inline]
    fn one() -> Self {
        Complex32::ONE
    }

    #[inline]
    fn conj(self) -> Self {
        Complex32::conj(self)
    }

    #[inline]
    fn abs1(self) -> f32 {
        self.re.abs() + self.im.abs()
    }

    #[inline]
    fn sq_abs(self) -> f32 {
        self.magnitude_squared()
    }

    #[inline]
    fn from_real(r: f32) -> Self {
        Complex32::new(r, 0.0)
    }

    #[inline]
    fn real(self) -> f32 {
        self.re
    }

    #[inline]
    fn is_nan(self) -> bool {
        self.re.is_nan() || self.im.is_nan()
    }

    #[inline]
    fn is_inf(self) -> bool {
        self.re.is_infinite() || self.im.is_infinite()
    }
}

impl Scalar for Complex64 {
    const DTYPE: DType = DType::Complex64;
    type Real = f64;

    #[inline]
    fn zero() -> Self {
        Complex64::ZERO
    }

    #[inline]
    fn one() -> Self {
        Complex64::ONE
    }

    #[inline]
    fn conj(self) -> Self {
        Complex64::conj(self)
    }

    #[inline]
    fn abs1(self) -> f64 {
        self.re.abs() + self.im.abs()
    }

    #[inline]
    fn sq_abs(self) -> f64 {
        self.magnitude_squared()
    }

    #[inline]
    fn from_real(r: f64) -> Self {
        Complex64::new(r, 0.0)
    }

    #[inline]
    fn real(self) -> f64 {
        self.re
    }

    #[inline]
    fn is_nan(self) -> bool {
        self.re.is_nan() || self.im.is_nan()
    }

    #[inline]
    fn is_inf(self) -> bool {
        self.re.is_infinite() || self.im.is_infinite()
    }
}

// ============================================================================
// Half-precision floating point types (requires "f16" feature)
// ============================================================================

#[cfg(feature = "f16")]
impl Scalar for half::f16 {
    const DTYPE: DType = DType::F16;
    type Real = half::f16;

    #[inline]
    fn zero() -> Self {
        half::f16::ZERO
    }

    #[inline]
    fn one() -> Self {
        half::f16::ONE
    }

    #[inline]
    fn conj(self) -> Self {
        self
    }

    #[inline]
    fn abs1(self) -> half::f16 {
        half::f16::from_f32(self.to_f32().abs())
    }

    #[inline]
    fn sq_abs(self) -> half::f16 {
        let v = self.to_f32();
        half::f16::from_f32(v * v)
    }

    #[inline]
    fn from_real(r: half::f16) -> Self {
        r
    }

    #[inline]
    fn real(self) -> half::f16 {
        self
    }

    #[inline]
    fn is_nan(self) -> bool {
        half::f16::is_nan(self)
    }

    #[inline]
    fn is_inf(self) -> bool {
        half::f16::is_infinite(self)
    }
}

#[cfg(feature = "f16")]
impl RealScalar for half::f16 {
    #[inline]
    fn sqrt(self) -> Self {
        half::f16::from_f32(self.to_f32().sqrt())
    }
}

#[cfg(feature = "f16")]
impl Scalar for half::bf16 {
    const DTYPE: DType = DType::BF16;
    type Real = half::bf16;

    #[inline]
    fn zero() -> Self {
        half::bf16::ZERO
    }

    #[inline]
    fn one() -> Self {
        half::bf16::ONE
    }

    #[inline]
    fn conj(self) -> Self {
        self
    }

    #[inline]
    fn abs1(self) -> half::bf16 {
        half::bf16::from_f32(self.to_f32().abs())
    }

    #[inline]
    fn sq_abs(self) -> half::bf16 {
        let v = self.to_f32();
        half::bf16::from_f32(v * v)
    }

    #[inline]
    fn from_real(r: half::bf16) -> Self {
        r
    }

    #[inline]
    fn real(self) -> half::bf16 {
        self
    }

    #[inline]
    fn is_nan(self) -> bool {
        half::bf16::is_nan(self)
    }

    #[inline]
    fn is_inf(self) -> bool {
        half::bf16::is_infinite(self)
    }
}

#[cfg(feature = "f16")]
impl RealScalar for half::bf16 {
    #[inline]
    fn sqrt(self) -> Self {
        half::bf16::from_f32(self.to_f32().sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_dtype() {
        assert_eq!(f64::DTYPE, DType::F64);
        assert_eq!(f32::DTYPE, DType::F32);
        assert_eq!(Complex32::DTYPE, DType::Complex32);
        assert_eq!(Complex64::DTYPE, DType::Complex64);
    }

    #[test]
    fn test_abs1() {
        assert_eq!((-2.5f64).abs1(), 2.5);
        assert_eq!(Complex32::new(-3.0, 4.0).abs1(), 7.0);
    }

    #[test]
    fn test_sq_abs() {
        assert_eq!(3.0f32.sq_abs(), 9.0);
        assert_eq!(Complex64::new(3.0, 4.0).sq_abs(), 25.0);
    }

    #[test]
    fn test_non_finite_detection() {
        assert!(f32::NAN.is_nan());
        assert!(f64::INFINITY.is_inf());
        assert!(Complex64::new(0.0, f64::NAN).is_nan());
        assert!(Complex32::new(f32::NEG_INFINITY, 1.0).is_inf());
        assert!(!1.0f64.is_nan() && !1.0f64.is_inf());
    }

    #[test]
    fn test_zero_detection() {
        assert!(0.0f32.is_zero());
        assert!(Complex64::ZERO.is_zero());
        assert!(!Complex64::I.is_zero());
    }
}
