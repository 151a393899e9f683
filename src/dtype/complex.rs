//! Complex number types for the complex-precision operation families
//!
//! Complex32 and Complex64 are compatible with bytemuck for zero-copy reads
//! from caller-owned buffers and implement the [`Scalar`](super::Scalar)
//! trait for kernels.
//!
//! # Storage Format
//!
//! Complex numbers are stored in interleaved format (re, im, re, im...),
//! matching the convention of every mainstream BLAS binding.
//!
//! # Arithmetic Operations
//!
//! Complex arithmetic follows standard mathematical definitions:
//! - Addition: `(a+bi) + (c+di) = (a+c) + (b+d)i`
//! - Multiplication: `(a+bi)(c+di) = (ac-bd) + (ad+bc)i`
//! - Division: `(a+bi)/(c+di) = (a+bi)*conj(c+di)/|c+di|²`

use bytemuck::{Pod, Zeroable};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Macro to implement a complex number type with all operations
///
/// This avoids code duplication between Complex32 and Complex64.
macro_rules! impl_complex {
    (
        $name:ident,
        $float:ty,
        $doc_float_bits:literal
    ) => {
        #[doc = concat!("Complex number with ", $doc_float_bits, "-bit real and imaginary parts")]
        ///
        /// Memory layout: two floats, interleaved (re, im).
        #[repr(C)]
        #[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
        pub struct $name {
            /// Real part
            pub re: $float,
            /// Imaginary part
            pub im: $float,
        }

        impl $name {
            /// Zero complex number
            pub const ZERO: Self = Self { re: 0.0, im: 0.0 };

            /// One (real unit)
            pub const ONE: Self = Self { re: 1.0, im: 0.0 };

            /// Imaginary unit i
            pub const I: Self = Self { re: 0.0, im: 1.0 };

            /// Create a new complex number
            #[inline]
            pub const fn new(re: $float, im: $float) -> Self {
                Self { re, im }
            }

            /// Magnitude (absolute value): |z| = sqrt(re² + im²)
            #[inline]
            pub fn magnitude(self) -> $float {
                (self.re * self.re + self.im * self.im).sqrt()
            }

            /// Squared magnitude: |z|² = re² + im²
            ///
            /// More efficient than `magnitude()` when the square root is
            /// not needed (norm accumulation).
            #[inline]
            pub fn magnitude_squared(self) -> $float {
                self.re * self.re + self.im * self.im
            }

            /// Complex conjugate: conj(a + bi) = a - bi
            #[inline]
            pub fn conj(self) -> Self {
                Self {
                    re: self.re,
                    im: -self.im,
                }
            }
        }

        impl Add for $name {
            type Output = Self;

            #[inline]
            fn add(self, rhs: Self) -> Self {
                Self {
                    re: self.re + rhs.re,
                    im: self.im + rhs.im,
                }
            }
        }

        impl Sub for $name {
            type Output = Self;

            #[inline]
            fn sub(self, rhs: Self) -> Self {
                Self {
                    re: self.re - rhs.re,
                    im: self.im - rhs.im,
                }
            }
        }

        impl Mul for $name {
            type Output = Self;

            #[inline]
            fn mul(self, rhs: Self) -> Self {
                Self {
                    re: self.re * rhs.re - self.im * rhs.im,
                    im: self.re * rhs.im + self.im * rhs.re,
                }
            }
        }

        impl Div for $name {
            type Output = Self;

            #[inline]
            fn div(self, rhs: Self) -> Self {
                let mag_sq = rhs.magnitude_squared();
                Self {
                    re: (self.re * rhs.re + self.im * rhs.im) / mag_sq,
                    im: (self.im * rhs.re - self.re * rhs.im) / mag_sq,
                }
            }
        }

        impl Neg for $name {
            type Output = Self;

            #[inline]
            fn neg(self) -> Self {
                Self {
                    re: -self.re,
                    im: -self.im,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.im >= 0.0 {
                    write!(f, "{}+{}i", self.re, self.im)
                } else {
                    write!(f, "{}{}i", self.re, self.im)
                }
            }
        }
    };
}

impl_complex!(Complex32, f32, "32");
impl_complex!(Complex64, f64, "64");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complex_arithmetic() {
        let a = Complex32::new(3.0, 4.0);
        let b = Complex32::new(1.0, 2.0);

        let sum = a + b;
        assert_eq!(sum, Complex32::new(4.0, 6.0));

        // (3+4i)(1+2i) = 3 + 6i + 4i + 8i² = -5 + 10i
        let prod = a * b;
        assert_eq!(prod, Complex32::new(-5.0, 10.0));
    }

    #[test]
    fn test_complex_magnitude() {
        let z = Complex64::new(3.0, 4.0);
        assert_eq!(z.magnitude(), 5.0);
        assert_eq!(z.magnitude_squared(), 25.0);
    }

    #[test]
    fn test_complex_conj() {
        let z = Complex64::new(1.0, -2.0);
        assert_eq!(z.conj(), Complex64::new(1.0, 2.0));
    }

    #[test]
    fn test_complex_div() {
        let a = Complex64::new(-5.0, 10.0);
        let b = Complex64::new(1.0, 2.0);
        let q = a / b;
        assert!((q.re - 3.0).abs() < 1e-12);
        assert!((q.im - 4.0).abs() < 1e-12);
    }
}
