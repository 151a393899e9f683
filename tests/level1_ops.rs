//! Level-1 operation tests against the sequential oracle
//!
//! Reductions fold in a fixed tree order, so oracle comparisons use
//! relative tolerance scaled to the problem size; repeated runs on the
//! same input must nevertheless be bit-identical.

mod common;

use common::*;
use parablas::prelude::*;

#[test]
fn test_asum_f64_matches_oracle() {
    let handle = Handle::new();
    for n in [1usize, 7, 511, 512, 513, 4096] {
        let x = rand_f64(n as u64, n);
        let mut result = 0.0f64;
        let status = unsafe { asum::<f64>(&handle, n as i32, x.as_ptr(), 1, &mut result) };
        assert!(status.is_success());
        let expect = asum_ref(&x);
        assert_close_f64(
            result,
            expect,
            1e-13 * n as f64,
            0.0,
            &format!("asum n={}", n),
        );
    }
}

#[test]
fn test_asum_complex_is_one_norm() {
    let handle = Handle::new();
    let x = [Complex64::new(3.0, -4.0), Complex64::new(-1.0, 2.0)];
    let mut result = 0.0f64;
    let status = unsafe { asum::<Complex64>(&handle, 2, x.as_ptr(), 1, &mut result) };
    assert!(status.is_success());
    // |3| + |-4| + |-1| + |2| = 10
    assert_eq!(result, 10.0);
}

#[test]
fn test_asum_strided_elements() {
    let handle = Handle::new();
    let x = [1.0f64, 100.0, 2.0, 100.0, 3.0];
    let mut result = 0.0f64;
    let status = unsafe { asum::<f64>(&handle, 3, x.as_ptr(), 2, &mut result) };
    assert!(status.is_success());
    assert_eq!(result, 6.0);
}

#[test]
fn test_asum_negative_inc_quick_returns_zero() {
    let handle = Handle::new();
    let x = [1.0f64, 2.0, 3.0];
    let mut result = -5.0f64;
    let status = unsafe { asum::<f64>(&handle, 3, x.as_ptr(), -1, &mut result) };
    assert!(status.is_success());
    assert_eq!(result, 0.0);
}

#[test]
fn test_nrm2_matches_oracle() {
    let handle = Handle::new();
    for n in [3usize, 512, 2000] {
        let x = rand_f64(10 + n as u64, n);
        let mut result = 0.0f64;
        let status = unsafe { nrm2::<f64>(&handle, n as i32, x.as_ptr(), 1, &mut result) };
        assert!(status.is_success());
        assert_close_f64(
            result,
            nrm2_ref(&x),
            1e-13 * n as f64,
            0.0,
            &format!("nrm2 n={}", n),
        );
    }
}

#[test]
fn test_dot_matches_oracle() {
    let handle = Handle::new();
    for n in [1usize, 100, 513, 3000] {
        let x = rand_f64(n as u64, n);
        let y = rand_f64(1000 + n as u64, n);
        let mut result = 0.0f64;
        let status =
            unsafe { dot::<f64>(&handle, n as i32, x.as_ptr(), 1, y.as_ptr(), 1, &mut result) };
        assert!(status.is_success());
        assert_close_f64(
            result,
            dot_ref(false, &x, &y),
            1e-12 * n as f64,
            1e-14,
            &format!("dot n={}", n),
        );
    }
}

#[test]
fn test_dotc_conjugates_first_operand() {
    let handle = Handle::new();
    let x = rand_c64(5, 64);
    let y = rand_c64(6, 64);
    let mut plain = Complex64::ZERO;
    let mut conj = Complex64::ZERO;
    unsafe {
        assert!(dot::<Complex64>(&handle, 64, x.as_ptr(), 1, y.as_ptr(), 1, &mut plain)
            .is_success());
        assert!(dotc::<Complex64>(&handle, 64, x.as_ptr(), 1, y.as_ptr(), 1, &mut conj)
            .is_success());
    }
    let ep = dot_ref(false, &x, &y);
    let ec = dot_ref(true, &x, &y);
    assert_close_f64(plain.re, ep.re, 1e-12, 1e-14, "dotu re");
    assert_close_f64(plain.im, ep.im, 1e-12, 1e-14, "dotu im");
    assert_close_f64(conj.re, ec.re, 1e-12, 1e-14, "dotc re");
    assert_close_f64(conj.im, ec.im, 1e-12, 1e-14, "dotc im");
    assert!((plain.im - conj.im).abs() > 1e-9, "conjugation must matter");
}

#[test]
fn test_dot_negative_increments() {
    let handle = Handle::new();
    let x = [1.0f64, 2.0, 3.0];
    let y = [10.0f64, 20.0, 30.0];
    let mut result = 0.0f64;
    // incx = -1 pairs x reversed with y forward:
    // 3*10 + 2*20 + 1*30 = 100
    let status = unsafe { dot::<f64>(&handle, 3, x.as_ptr(), -1, y.as_ptr(), 1, &mut result) };
    assert!(status.is_success());
    assert_eq!(result, 100.0);
}

#[test]
fn test_reduction_bit_reproducible() {
    let handle = Handle::new();
    let n = 4099usize;
    let x = rand_f64(77, n);
    let mut r1 = 0.0f64;
    let mut r2 = 0.0f64;
    unsafe {
        assert!(asum::<f64>(&handle, n as i32, x.as_ptr(), 1, &mut r1).is_success());
        assert!(asum::<f64>(&handle, n as i32, x.as_ptr(), 1, &mut r2).is_success());
    }
    assert_eq!(r1.to_bits(), r2.to_bits(), "fixed tree order is deterministic");
}

#[test]
fn test_iamax_iamin_match_oracle() {
    let handle = Handle::new();
    for n in [1usize, 17, 512, 1025] {
        let x = rand_f64(3 * n as u64 + 1, n);
        let mut imax = 0i64;
        let mut imin = 0i64;
        unsafe {
            assert!(iamax::<f64>(&handle, n as i32, x.as_ptr(), 1, &mut imax).is_success());
            assert!(iamin::<f64>(&handle, n as i32, x.as_ptr(), 1, &mut imin).is_success());
        }
        assert_eq!(imax, iamax_ref(&x), "iamax n={}", n);
        assert_eq!(imin, iamin_ref(&x), "iamin n={}", n);
    }
}

#[test]
fn test_iamax_tie_prefers_first() {
    let handle = Handle::new();
    let x = [1.0f64, 5.0, -5.0, 2.0];
    let mut index = 0i64;
    let status = unsafe { iamax::<f64>(&handle, 4, x.as_ptr(), 1, &mut index) };
    assert!(status.is_success());
    assert_eq!(index, 2, "1-based, first of the tied magnitudes");
}

#[test]
fn test_scal_basic_and_alpha_one_noop() {
    let handle = Handle::new();
    let mut x = [1.0f64, -2.0, 3.0];
    let alpha = 2.0f64;
    let status = unsafe { scal::<f64>(&handle, 3, &alpha, x.as_mut_ptr(), 1) };
    assert!(status.is_success());
    assert_eq!(x, [2.0, -4.0, 6.0]);

    let one = 1.0f64;
    let status = unsafe { scal::<f64>(&handle, 3, &one, x.as_mut_ptr(), 1) };
    assert!(status.is_success());
    assert_eq!(x, [2.0, -4.0, 6.0]);
}

#[test]
fn test_scal_zero_alpha_writes_zeros() {
    let handle = Handle::new();
    let mut x = [4.0f32, 5.0];
    let zero = 0.0f32;
    let status = unsafe { scal::<f32>(&handle, 2, &zero, x.as_mut_ptr(), 1) };
    assert!(status.is_success());
    assert_eq!(x, [0.0, 0.0]);
}

#[test]
fn test_axpy_matches_oracle() {
    let handle = Handle::new();
    let n = 300usize;
    let x = rand_f64(21, n);
    let y0 = rand_f64(22, n);
    let mut y = y0.clone();
    let alpha = 1.5f64;
    let status =
        unsafe { axpy::<f64>(&handle, n as i32, &alpha, x.as_ptr(), 1, y.as_mut_ptr(), 1) };
    assert!(status.is_success());
    let expect: Vec<f64> = x.iter().zip(y0.iter()).map(|(a, b)| 1.5 * a + b).collect();
    assert_allclose_f64(&y, &expect, 1e-14, 0.0, "axpy");
}

#[test]
fn test_axpy_zero_alpha_untouched() {
    let handle = Handle::new();
    let x = [f64::MAX; 3];
    let mut y = [1.0f64, 2.0, 3.0];
    let zero = 0.0f64;
    let status = unsafe { axpy::<f64>(&handle, 3, &zero, x.as_ptr(), 1, y.as_mut_ptr(), 1) };
    assert!(status.is_success());
    assert_eq!(y, [1.0, 2.0, 3.0]);
}

#[cfg(feature = "f16")]
#[test]
fn test_half_dot_accumulates_in_f32() {
    use half::f16;
    let handle = Handle::new();
    // 4096 terms of 0.25 * 0.25: a pure-f16 accumulator saturates its
    // 11-bit significand long before 256.0; f32 accumulation does not.
    let n = 4096usize;
    let x: Vec<f16> = (0..n).map(|_| f16::from_f32(0.25)).collect();
    let y = x.clone();
    let mut result = f16::ZERO;
    let status =
        unsafe { dot::<f16>(&handle, n as i32, x.as_ptr(), 1, y.as_ptr(), 1, &mut result) };
    assert!(status.is_success());
    let got = result.to_f32();
    assert!((got - 256.0).abs() < 1.0, "got {}", got);
}
