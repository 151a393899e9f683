//! Common test utilities: sequential CPU oracle and comparison helpers
//!
//! The oracle computes every operation with plain left-to-right loops.
//! Reductions in the library fold in a fixed tree order, so comparisons
//! against the oracle always use relative tolerance scaled to the
//! problem size, never bit equality.
#![allow(dead_code)]

use parablas::dtype::{Complex64, RealScalar, Scalar};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Relative-tolerance comparison: |a - b| <= atol + rtol * |b|
pub fn assert_close_f64(a: f64, b: f64, rtol: f64, atol: f64, msg: &str) {
    let diff = (a - b).abs();
    let tol = atol + rtol * b.abs();
    assert!(
        diff <= tol,
        "{}: {} vs {} (diff={}, tol={})",
        msg,
        a,
        b,
        diff,
        tol
    );
}

/// Slice version of [`assert_close_f64`]
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        assert_close_f64(*x, *y, rtol, atol, &format!("{} [elem {}]", msg, i));
    }
}

/// Slice comparison for f32 data promoted through f64
pub fn assert_allclose_f32(a: &[f32], b: &[f32], rtol: f64, atol: f64, msg: &str) {
    let aa: Vec<f64> = a.iter().map(|v| *v as f64).collect();
    let bb: Vec<f64> = b.iter().map(|v| *v as f64).collect();
    assert_allclose_f64(&aa, &bb, rtol, atol, msg);
}

/// Elementwise comparison of complex slices
pub fn assert_allclose_c64(a: &[Complex64], b: &[Complex64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        assert_close_f64(x.re, y.re, rtol, atol, &format!("{} [elem {} re]", msg, i));
        assert_close_f64(x.im, y.im, rtol, atol, &format!("{} [elem {} im]", msg, i));
    }
}

/// Seeded uniform f64 data in [-1, 1)
pub fn rand_f64(seed: u64, len: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(-1.0..1.0)).collect()
}

/// Seeded uniform f32 data in [-1, 1)
pub fn rand_f32(seed: u64, len: usize) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(-1.0f32..1.0)).collect()
}

/// Seeded complex data with parts in [-1, 1)
pub fn rand_c64(seed: u64, len: usize) -> Vec<Complex64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| Complex64::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)))
        .collect()
}

// ============================================================================
// Sequential oracle
// ============================================================================

/// Sequential sum of one-norms
pub fn asum_ref<T: Scalar>(x: &[T]) -> T::Real {
    let mut sum = <T::Real as Scalar>::zero();
    for v in x {
        sum = sum + v.abs1();
    }
    sum
}

/// Sequential euclidean norm
pub fn nrm2_ref<T: Scalar>(x: &[T]) -> T::Real {
    let mut sum = <T::Real as Scalar>::zero();
    for v in x {
        sum = sum + v.sq_abs();
    }
    sum.sqrt()
}

/// Sequential dot product, optionally conjugating x
pub fn dot_ref<T: Scalar>(conj: bool, x: &[T], y: &[T]) -> T {
    let mut sum = T::zero();
    for (a, b) in x.iter().zip(y.iter()) {
        let lhs = if conj { a.conj() } else { *a };
        sum = sum + lhs * *b;
    }
    sum
}

/// Sequential 1-based max-one-norm index search, first occurrence wins
pub fn iamax_ref<T: Scalar>(x: &[T]) -> i64 {
    let mut best = 0i64;
    let mut best_val = <T::Real as Scalar>::zero();
    for (i, v) in x.iter().enumerate() {
        let m = v.abs1();
        if best == 0 || m > best_val {
            best = i as i64 + 1;
            best_val = m;
        }
    }
    best
}

/// Sequential 1-based min-one-norm index search, first occurrence wins
pub fn iamin_ref<T: Scalar>(x: &[T]) -> i64 {
    let mut best = 0i64;
    let mut best_val = <T::Real as Scalar>::zero();
    for (i, v) in x.iter().enumerate() {
        let m = v.abs1();
        if best == 0 || m < best_val {
            best = i as i64 + 1;
            best_val = m;
        }
    }
    best
}

/// Column-major general matrix-vector multiply oracle
///
/// `trans`: 0 = none, 1 = transpose, 2 = conjugate transpose.
#[allow(clippy::too_many_arguments)]
pub fn gemv_ref<T: Scalar>(
    trans: u8,
    m: usize,
    n: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    x: &[T],
    beta: T,
    y: &mut [T],
) {
    let (out_len, in_len) = if trans == 0 { (m, n) } else { (n, m) };
    for i in 0..out_len {
        let mut sum = T::zero();
        for j in 0..in_len {
            let av = match trans {
                0 => a[i + j * lda],
                1 => a[j + i * lda],
                _ => a[j + i * lda].conj(),
            };
            sum = sum + av * x[j];
        }
        y[i] = if beta.is_zero() {
            alpha * sum
        } else {
            alpha * sum + beta * y[i]
        };
    }
}

/// Column-major rank-1 update oracle
pub fn ger_ref<T: Scalar>(
    conj: bool,
    m: usize,
    n: usize,
    alpha: T,
    x: &[T],
    y: &[T],
    a: &mut [T],
    lda: usize,
) {
    for j in 0..n {
        let yv = if conj { y[j].conj() } else { y[j] };
        for i in 0..m {
            a[i + j * lda] = a[i + j * lda] + alpha * x[i] * yv;
        }
    }
}

/// Column-major matrix-matrix multiply oracle
///
/// `ta`/`tb`: 0 = none, 1 = transpose, 2 = conjugate transpose.
#[allow(clippy::too_many_arguments)]
pub fn gemm_ref<T: Scalar>(
    ta: u8,
    tb: u8,
    m: usize,
    n: usize,
    k: usize,
    alpha: T,
    a: &[T],
    lda: usize,
    b: &[T],
    ldb: usize,
    beta: T,
    c: &mut [T],
    ldc: usize,
) {
    for j in 0..n {
        for i in 0..m {
            let mut sum = T::zero();
            for kk in 0..k {
                let av = match ta {
                    0 => a[i + kk * lda],
                    1 => a[kk + i * lda],
                    _ => a[kk + i * lda].conj(),
                };
                let bv = match tb {
                    0 => b[kk + j * ldb],
                    1 => b[j + kk * ldb],
                    _ => b[j + kk * ldb].conj(),
                };
                sum = sum + av * bv;
            }
            let idx = i + j * ldc;
            c[idx] = if beta.is_zero() {
                alpha * sum
            } else {
                alpha * sum + beta * c[idx]
            };
        }
    }
}

/// Triangular matrix-vector multiply oracle (dense loops over the
/// referenced triangle only)
#[allow(clippy::too_many_arguments)]
pub fn trmv_ref<T: Scalar>(
    upper: bool,
    trans: u8,
    unit: bool,
    n: usize,
    a: &[T],
    lda: usize,
    x: &mut [T],
) {
    let w: Vec<T> = x.to_vec();
    for i in 0..n {
        let mut sum = if unit { w[i] } else { T::zero() };
        for j in 0..n {
            if unit && j == i {
                continue;
            }
            let stored = if trans == 0 {
                // op(A)[i][j] references A[i][j]
                if upper { j >= i } else { j <= i }
            } else {
                // op(A)[i][j] references A[j][i]
                if upper { i >= j } else { i <= j }
            };
            if !stored {
                continue;
            }
            let av = if trans == 0 {
                a[i + j * lda]
            } else if trans == 1 {
                a[j + i * lda]
            } else {
                a[j + i * lda].conj()
            };
            sum = sum + av * w[j];
        }
        x[i] = sum;
    }
}
