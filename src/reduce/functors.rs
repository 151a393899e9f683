//! Fetch / combine / finalize functors for the reduction engine
//!
//! Each reduction-shaped operation is assembled from one functor of each
//! kind. The functors are implemented per concrete element type: an
//! operation that does not exist for a type (e.g. magnitude reductions
//! over half precision) is a missing impl and therefore a compile error,
//! never a runtime dispatch failure. Half-precision dot products
//! accumulate in `f32` and convert back on finalize.

use crate::dtype::{Complex32, Complex64, RealScalar, Scalar};
use std::marker::PhantomData;

/// Single-element transform feeding the combiner
///
/// `index` is the 1-based logical position of the element, consumed only
/// by the extremum searches.
pub trait Fetch1<T: Scalar> {
    /// Accumulator produced by the transform
    type Acc: Copy + Send + Sync + 'static;

    /// Transform one element
    fn fetch(v: T, index: i64) -> Self::Acc;
}

/// Element-pair transform feeding the combiner (dot-product family)
pub trait Fetch2<T: Scalar> {
    /// Accumulator produced by the transform
    type Acc: Copy + Send + Sync + 'static;

    /// Transform one element pair
    fn fetch(x: T, y: T) -> Self::Acc;
}

/// Associative, commutative folding operator with an identity element
///
/// `combine(a, identity()) == a` must hold: tail lanes of a partially
/// filled work-group carry the identity through the tree.
pub trait Combine<A: Copy> {
    /// The identity element
    fn identity() -> A;

    /// Fold two accumulators
    fn combine(a: A, b: A) -> A;
}

/// Map the folded accumulator to the operation's result type
pub trait Finalize<A: Copy> {
    /// Result element type
    type Out: Copy + Send + Sync + 'static;

    /// Finalize the folded accumulator
    fn finalize(acc: A) -> Self::Out;
}

// ============================================================================
// Fetch functors
// ============================================================================

/// `|re| + |im|` magnitude fetch (sum of magnitudes)
pub struct FetchAsum;

/// Squared euclidean magnitude fetch (norm)
pub struct FetchNrm2;

/// Magnitude-with-index fetch for the maximum search
pub struct FetchAmax;

/// Magnitude-with-index fetch for the minimum search
pub struct FetchAmin;

/// Product fetch for the dot family; `CONJ` conjugates the first operand
pub struct FetchDot<const CONJ: bool>;

/// Accumulator of the extremum searches: a magnitude and the 1-based
/// index it came from. Index 0 is the "no element seen" sentinel (the
/// combiner identity).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IndexVal<R> {
    /// 1-based element index, 0 when no element has been folded in
    pub index: i64,
    /// Element magnitude
    pub value: R,
}

macro_rules! impl_magnitude_fetches {
    ($t:ty, $acc:ty) => {
        impl Fetch1<$t> for FetchAsum {
            type Acc = $acc;

            #[inline]
            fn fetch(v: $t, _index: i64) -> $acc {
                v.abs1()
            }
        }

        impl Fetch1<$t> for FetchNrm2 {
            type Acc = $acc;

            #[inline]
            fn fetch(v: $t, _index: i64) -> $acc {
                v.sq_abs()
            }
        }

        impl Fetch1<$t> for FetchAmax {
            type Acc = IndexVal<$acc>;

            #[inline]
            fn fetch(v: $t, index: i64) -> IndexVal<$acc> {
                IndexVal {
                    index,
                    value: v.abs1(),
                }
            }
        }

        impl Fetch1<$t> for FetchAmin {
            type Acc = IndexVal<$acc>;

            #[inline]
            fn fetch(v: $t, index: i64) -> IndexVal<$acc> {
                IndexVal {
                    index,
                    value: v.abs1(),
                }
            }
        }
    };
}

impl_magnitude_fetches!(f32, f32);
impl_magnitude_fetches!(f64, f64);
impl_magnitude_fetches!(Complex32, f32);
impl_magnitude_fetches!(Complex64, f64);

macro_rules! impl_fetch_dot {
    ($t:ty) => {
        impl<const CONJ: bool> Fetch2<$t> for FetchDot<CONJ> {
            type Acc = $t;

            #[inline]
            fn fetch(x: $t, y: $t) -> $t {
                let lhs = if CONJ { x.conj() } else { x };
                lhs * y
            }
        }
    };
}

impl_fetch_dot!(f32);
impl_fetch_dot!(f64);
impl_fetch_dot!(Complex32);
impl_fetch_dot!(Complex64);

// Half-precision products accumulate in f32
#[cfg(feature = "f16")]
impl<const CONJ: bool> Fetch2<half::f16> for FetchDot<CONJ> {
    type Acc = f32;

    #[inline]
    fn fetch(x: half::f16, y: half::f16) -> f32 {
        x.to_f32() * y.to_f32()
    }
}

#[cfg(feature = "f16")]
impl<const CONJ: bool> Fetch2<half::bf16> for FetchDot<CONJ> {
    type Acc = f32;

    #[inline]
    fn fetch(x: half::bf16, y: half::bf16) -> f32 {
        x.to_f32() * y.to_f32()
    }
}

// ============================================================================
// Combine functors
// ============================================================================

/// Additive fold
pub struct CombineSum;

impl<A: Scalar> Combine<A> for CombineSum {
    #[inline]
    fn identity() -> A {
        A::zero()
    }

    #[inline]
    fn combine(a: A, b: A) -> A {
        a + b
    }
}

/// Maximum-magnitude fold, lower index wins ties
pub struct CombineAmax;

impl<R: RealScalar> Combine<IndexVal<R>> for CombineAmax {
    #[inline]
    fn identity() -> IndexVal<R> {
        IndexVal {
            index: 0,
            value: R::zero(),
        }
    }

    #[inline]
    fn combine(a: IndexVal<R>, b: IndexVal<R>) -> IndexVal<R> {
        if a.index == 0 {
            return b;
        }
        if b.index == 0 {
            return a;
        }
        if b.value > a.value || (b.value == a.value && b.index < a.index) {
            b
        } else {
            a
        }
    }
}

/// Minimum-magnitude fold, lower index wins ties
pub struct CombineAmin;

impl<R: RealScalar> Combine<IndexVal<R>> for CombineAmin {
    #[inline]
    fn identity() -> IndexVal<R> {
        IndexVal {
            index: 0,
            value: R::zero(),
        }
    }

    #[inline]
    fn combine(a: IndexVal<R>, b: IndexVal<R>) -> IndexVal<R> {
        if a.index == 0 {
            return b;
        }
        if b.index == 0 {
            return a;
        }
        if b.value < a.value || (b.value == a.value && b.index < a.index) {
            b
        } else {
            a
        }
    }
}

// ============================================================================
// Finalize functors
// ============================================================================

/// Pass the accumulator through unchanged
pub struct FinalizeIdentity;

impl<A: Copy + Send + Sync + 'static> Finalize<A> for FinalizeIdentity {
    type Out = A;

    #[inline]
    fn finalize(acc: A) -> A {
        acc
    }
}

/// Square root of the accumulated squared magnitudes (norm)
pub struct FinalizeSqrt;

impl<R: RealScalar> Finalize<R> for FinalizeSqrt {
    type Out = R;

    #[inline]
    fn finalize(acc: R) -> R {
        acc.sqrt()
    }
}

/// Extract the 1-based index of the extremum (0 for an empty vector)
pub struct FinalizeIndex;

impl<R: RealScalar> Finalize<IndexVal<R>> for FinalizeIndex {
    type Out = i64;

    #[inline]
    fn finalize(acc: IndexVal<R>) -> i64 {
        acc.index
    }
}

/// Convert the dot accumulator back to the operand element type
pub struct FinalizeDot<T>(PhantomData<T>);

macro_rules! impl_finalize_dot_identity {
    ($t:ty) => {
        impl Finalize<$t> for FinalizeDot<$t> {
            type Out = $t;

            #[inline]
            fn finalize(acc: $t) -> $t {
                acc
            }
        }
    };
}

impl_finalize_dot_identity!(f32);
impl_finalize_dot_identity!(f64);
impl_finalize_dot_identity!(Complex32);
impl_finalize_dot_identity!(Complex64);

#[cfg(feature = "f16")]
impl Finalize<f32> for FinalizeDot<half::f16> {
    type Out = half::f16;

    #[inline]
    fn finalize(acc: f32) -> half::f16 {
        half::f16::from_f32(acc)
    }
}

#[cfg(feature = "f16")]
impl Finalize<f32> for FinalizeDot<half::bf16> {
    type Out = half::bf16;

    #[inline]
    fn finalize(acc: f32) -> half::bf16 {
        half::bf16::from_f32(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asum_fetch_is_one_norm() {
        let v = Complex32::new(-3.0, 4.0);
        assert_eq!(<FetchAsum as Fetch1<Complex32>>::fetch(v, 1), 7.0);
        assert_eq!(<FetchAsum as Fetch1<f64>>::fetch(-2.5, 1), 2.5);
    }

    #[test]
    fn test_dot_fetch_conjugates() {
        let x = Complex64::new(1.0, 2.0);
        let y = Complex64::new(3.0, 4.0);
        let plain = <FetchDot<false> as Fetch2<Complex64>>::fetch(x, y);
        let conj = <FetchDot<true> as Fetch2<Complex64>>::fetch(x, y);
        assert_eq!(plain, x * y);
        assert_eq!(conj, x.conj() * y);
    }

    #[test]
    fn test_amax_combine_prefers_lower_index_on_tie() {
        let a = IndexVal { index: 3, value: 5.0f64 };
        let b = IndexVal { index: 7, value: 5.0f64 };
        assert_eq!(CombineAmax::combine(a, b).index, 3);
        assert_eq!(CombineAmax::combine(b, a).index, 3);
    }

    #[test]
    fn test_amax_combine_sentinel_identity() {
        let id = <CombineAmax as Combine<IndexVal<f32>>>::identity();
        let a = IndexVal { index: 2, value: 0.5f32 };
        assert_eq!(CombineAmax::combine(a, id), a);
        assert_eq!(CombineAmax::combine(id, a), a);
    }

    #[test]
    fn test_amin_combine() {
        let a = IndexVal { index: 1, value: 2.0f32 };
        let b = IndexVal { index: 2, value: 1.0f32 };
        assert_eq!(CombineAmin::combine(a, b).index, 2);
    }

    #[test]
    fn test_finalize_sqrt() {
        assert_eq!(<FinalizeSqrt as Finalize<f64>>::finalize(9.0), 3.0);
    }
}
