//! Level-2 operation tests against the sequential oracle

mod common;

use common::*;
use parablas::prelude::*;

#[test]
fn test_gemv_n_matches_oracle() {
    let handle = Handle::new();
    let (m, n) = (70usize, 45usize);
    let a = rand_f64(1, m * n);
    let x = rand_f64(2, n);
    let y0 = rand_f64(3, m);
    let alpha = 1.5f64;
    let beta = -0.25f64;

    let mut y = y0.clone();
    let status = unsafe {
        gemv::<f64>(
            &handle,
            Transpose::None,
            m as i32,
            n as i32,
            &alpha,
            a.as_ptr(),
            m as i32,
            x.as_ptr(),
            1,
            &beta,
            y.as_mut_ptr(),
            1,
        )
    };
    assert!(status.is_success());

    let mut expect = y0;
    gemv_ref(0, m, n, alpha, &a, m, &x, beta, &mut expect);
    assert_allclose_f64(&y, &expect, 1e-12 * n as f64, 1e-14, "gemv N");
}

#[test]
fn test_gemv_trans_and_conj_match_oracle() {
    let handle = Handle::new();
    let (m, n) = (33usize, 64usize);
    let a = rand_c64(4, m * n);
    let x = rand_c64(5, m);
    let y0 = rand_c64(6, n);
    let alpha = Complex64::new(0.5, -1.0);
    let beta = Complex64::new(1.0, 0.25);

    for (trans, code) in [(Transpose::Trans, 1u8), (Transpose::ConjTrans, 2u8)] {
        let mut y = y0.clone();
        let status = unsafe {
            gemv::<Complex64>(
                &handle,
                trans,
                m as i32,
                n as i32,
                &alpha,
                a.as_ptr(),
                m as i32,
                x.as_ptr(),
                1,
                &beta,
                y.as_mut_ptr(),
                1,
            )
        };
        assert!(status.is_success());

        let mut expect = y0.clone();
        gemv_ref(code, m, n, alpha, &a, m, &x, beta, &mut expect);
        assert_allclose_c64(&y, &expect, 1e-12 * m as f64, 1e-14, "gemv T/C");
    }
}

#[test]
fn test_gemv_beta_zero_overwrites_nan_output() {
    let handle = Handle::new();
    let (m, n) = (4usize, 4usize);
    let a = rand_f64(7, m * n);
    let x = rand_f64(8, n);
    let alpha = 1.0f64;
    let beta = 0.0f64;
    // beta == 0 must not read y, so prior NaNs are overwritten
    let mut y = [f64::NAN; 4];
    let status = unsafe {
        gemv::<f64>(
            &handle,
            Transpose::None,
            m as i32,
            n as i32,
            &alpha,
            a.as_ptr(),
            m as i32,
            x.as_ptr(),
            1,
            &beta,
            y.as_mut_ptr(),
            1,
        )
    };
    assert!(status.is_success());
    assert!(y.iter().all(|v| v.is_finite()));
}

#[test]
fn test_ger_matches_oracle() {
    let handle = Handle::new();
    let (m, n) = (65usize, 40usize);
    let x = rand_f64(11, m);
    let y = rand_f64(12, n);
    let a0 = rand_f64(13, m * n);
    let alpha = -0.75f64;

    let mut a = a0.clone();
    let status = unsafe {
        ger::<f64>(
            &handle,
            m as i32,
            n as i32,
            &alpha,
            x.as_ptr(),
            1,
            y.as_ptr(),
            1,
            a.as_mut_ptr(),
            m as i32,
        )
    };
    assert!(status.is_success());

    let mut expect = a0;
    ger_ref(false, m, n, alpha, &x, &y, &mut expect, m);
    assert_allclose_f64(&a, &expect, 1e-13, 1e-15, "ger");
}

#[test]
fn test_gerc_conjugates_y() {
    let handle = Handle::new();
    let n = 12usize;
    let x = rand_c64(21, n);
    let y = rand_c64(22, n);
    let a0 = rand_c64(23, n * n);
    let alpha = Complex64::new(1.0, 0.5);

    let mut a = a0.clone();
    let status = unsafe {
        gerc::<Complex64>(
            &handle,
            n as i32,
            n as i32,
            &alpha,
            x.as_ptr(),
            1,
            y.as_ptr(),
            1,
            a.as_mut_ptr(),
            n as i32,
        )
    };
    assert!(status.is_success());

    let mut expect = a0;
    ger_ref(true, n, n, alpha, &x, &y, &mut expect, n);
    assert_allclose_c64(&a, &expect, 1e-13, 1e-15, "gerc");
}

#[test]
fn test_ger_negative_increments() {
    let handle = Handle::new();
    // x traversed backwards must match a manually reversed forward call
    let m = 5usize;
    let n = 3usize;
    let x = rand_f64(31, m);
    let y = rand_f64(32, n);
    let alpha = 2.0f64;

    let mut a_neg = vec![0.0f64; m * n];
    let status = unsafe {
        ger::<f64>(
            &handle,
            m as i32,
            n as i32,
            &alpha,
            x.as_ptr(),
            -1,
            y.as_ptr(),
            1,
            a_neg.as_mut_ptr(),
            m as i32,
        )
    };
    assert!(status.is_success());

    let xr: Vec<f64> = x.iter().rev().cloned().collect();
    let mut a_fwd = vec![0.0f64; m * n];
    let status = unsafe {
        ger::<f64>(
            &handle,
            m as i32,
            n as i32,
            &alpha,
            xr.as_ptr(),
            1,
            y.as_ptr(),
            1,
            a_fwd.as_mut_ptr(),
            m as i32,
        )
    };
    assert!(status.is_success());
    assert_allclose_f64(&a_neg, &a_fwd, 0.0, 0.0, "ger incx=-1");
}

#[test]
fn test_syr2_only_touches_selected_triangle() {
    let handle = Handle::new();
    let n = 40usize;
    let x = rand_f64(41, n);
    let y = rand_f64(42, n);
    let a0 = rand_f64(43, n * n);
    let alpha = 1.0f64;

    let mut a = a0.clone();
    let status = unsafe {
        syr2::<f64>(
            &handle,
            Fill::Upper,
            n as i32,
            &alpha,
            x.as_ptr(),
            1,
            y.as_ptr(),
            1,
            a.as_mut_ptr(),
            n as i32,
        )
    };
    assert!(status.is_success());

    for col in 0..n {
        for row in 0..n {
            let idx = row + col * n;
            if row <= col {
                let expect = a0[idx] + alpha * (x[row] * y[col] + y[row] * x[col]);
                assert_close_f64(a[idx], expect, 1e-13, 1e-15, "upper element");
            } else {
                assert_eq!(a[idx], a0[idx], "lower triangle must be untouched");
            }
        }
    }
}

#[test]
fn test_her2_diagonal_stays_real() {
    let handle = Handle::new();
    let n = 16usize;
    let x = rand_c64(51, n);
    let y = rand_c64(52, n);
    // Start from a hermitian-plausible matrix with real diagonal
    let mut a0 = rand_c64(53, n * n);
    for i in 0..n {
        a0[i + i * n] = Complex64::new(a0[i + i * n].re, 0.0);
    }
    let alpha = Complex64::new(0.75, -0.5);

    let mut a = a0.clone();
    let status = unsafe {
        her2::<Complex64>(
            &handle,
            Fill::Lower,
            n as i32,
            &alpha,
            x.as_ptr(),
            1,
            y.as_ptr(),
            1,
            a.as_mut_ptr(),
            n as i32,
        )
    };
    assert!(status.is_success());

    for i in 0..n {
        assert_eq!(a[i + i * n].im, 0.0, "diagonal imaginary part");
    }
    // Off-diagonal lower element matches the definition
    let (r, c) = (5usize, 2usize);
    let expect = a0[r + c * n]
        + alpha * x[r] * y[c].conj()
        + alpha.conj() * y[r] * x[c].conj();
    assert_close_f64(a[r + c * n].re, expect.re, 1e-13, 1e-15, "her2 re");
    assert_close_f64(a[r + c * n].im, expect.im, 1e-13, 1e-15, "her2 im");
}

#[test]
fn test_trmv_matches_oracle() {
    let handle = Handle::new();
    let n = 48usize;
    let a = rand_f64(61, n * n);

    for (uplo, upper) in [(Fill::Upper, true), (Fill::Lower, false)] {
        for (trans, code) in [(Transpose::None, 0u8), (Transpose::Trans, 1u8)] {
            for (diag, unit) in [(Diagonal::NonUnit, false), (Diagonal::Unit, true)] {
                let x0 = rand_f64(62, n);
                let mut x = x0.clone();
                let status = unsafe {
                    trmv::<f64>(
                        &handle,
                        uplo,
                        trans,
                        diag,
                        n as i32,
                        a.as_ptr(),
                        n as i32,
                        x.as_mut_ptr(),
                        1,
                    )
                };
                assert!(status.is_success());

                let mut expect = x0;
                trmv_ref(upper, code, unit, n, &a, n, &mut expect);
                assert_allclose_f64(
                    &x,
                    &expect,
                    1e-12 * n as f64,
                    1e-14,
                    &format!("trmv {:?} {:?} {:?}", uplo, trans, diag),
                );
            }
        }
    }
}

#[test]
fn test_trmv_conj_trans_complex() {
    let handle = Handle::new();
    let n = 20usize;
    let a = rand_c64(71, n * n);
    let x0 = rand_c64(72, n);

    let mut x = x0.clone();
    let status = unsafe {
        trmv::<Complex64>(
            &handle,
            Fill::Upper,
            Transpose::ConjTrans,
            Diagonal::NonUnit,
            n as i32,
            a.as_ptr(),
            n as i32,
            x.as_mut_ptr(),
            1,
        )
    };
    assert!(status.is_success());

    let mut expect = x0;
    trmv_ref(true, 2, false, n, &a, n, &mut expect);
    assert_allclose_c64(&x, &expect, 1e-12 * n as f64, 1e-14, "trmv C");
}

#[test]
fn test_trsv_inverts_trmv() {
    let handle = Handle::new();
    let n = 32usize;
    // Well-conditioned triangular matrix: dominant diagonal
    let mut a = rand_f64(81, n * n);
    for i in 0..n {
        a[i + i * n] = 4.0 + a[i + i * n].abs();
    }
    let x0 = rand_f64(82, n);

    for (uplo, trans) in [
        (Fill::Upper, Transpose::None),
        (Fill::Lower, Transpose::None),
        (Fill::Upper, Transpose::Trans),
        (Fill::Lower, Transpose::Trans),
    ] {
        let mut x = x0.clone();
        unsafe {
            assert!(trmv::<f64>(
                &handle,
                uplo,
                trans,
                Diagonal::NonUnit,
                n as i32,
                a.as_ptr(),
                n as i32,
                x.as_mut_ptr(),
                1,
            )
            .is_success());
            assert!(trsv::<f64>(
                &handle,
                uplo,
                trans,
                Diagonal::NonUnit,
                n as i32,
                a.as_ptr(),
                n as i32,
                x.as_mut_ptr(),
                1,
            )
            .is_success());
        }
        assert_allclose_f64(
            &x,
            &x0,
            1e-10 * n as f64,
            1e-12,
            &format!("round trip {:?} {:?}", uplo, trans),
        );
    }
}

#[test]
fn test_trsv_unit_diagonal_ignores_stored_diagonal() {
    let handle = Handle::new();
    let n = 8usize;
    let mut a = rand_f64(91, n * n);
    // Garbage on the diagonal must not be referenced in unit mode
    for i in 0..n {
        a[i + i * n] = f64::NAN;
    }
    let x0 = rand_f64(92, n);
    let mut x = x0.clone();
    unsafe {
        assert!(trmv::<f64>(
            &handle,
            Fill::Lower,
            Transpose::None,
            Diagonal::Unit,
            n as i32,
            a.as_ptr(),
            n as i32,
            x.as_mut_ptr(),
            1,
        )
        .is_success());
        assert!(trsv::<f64>(
            &handle,
            Fill::Lower,
            Transpose::None,
            Diagonal::Unit,
            n as i32,
            a.as_ptr(),
            n as i32,
            x.as_mut_ptr(),
            1,
        )
        .is_success());
    }
    assert_allclose_f64(&x, &x0, 1e-11 * n as f64, 1e-13, "unit round trip");
}
