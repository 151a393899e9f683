//! Level-3 operation tests against the sequential oracle

mod common;

use common::*;
use parablas::prelude::*;

#[test]
fn test_gemm_all_transpose_combinations() {
    let handle = Handle::new();
    let (m, n, k) = (37usize, 41usize, 53usize);
    let alpha = 1.25f64;
    let beta = -0.5f64;

    for (ta, ca) in [(Transpose::None, 0u8), (Transpose::Trans, 1u8)] {
        for (tb, cb) in [(Transpose::None, 0u8), (Transpose::Trans, 1u8)] {
            let (a_rows, a_cols) = if ta == Transpose::None { (m, k) } else { (k, m) };
            let (b_rows, b_cols) = if tb == Transpose::None { (k, n) } else { (n, k) };
            let a = rand_f64(100 + ca as u64, a_rows * a_cols);
            let b = rand_f64(200 + cb as u64, b_rows * b_cols);
            let c0 = rand_f64(300, m * n);

            let mut c = c0.clone();
            let status = unsafe {
                gemm::<f64>(
                    &handle,
                    ta,
                    tb,
                    m as i32,
                    n as i32,
                    k as i32,
                    &alpha,
                    a.as_ptr(),
                    a_rows as i32,
                    b.as_ptr(),
                    b_rows as i32,
                    &beta,
                    c.as_mut_ptr(),
                    m as i32,
                )
            };
            assert!(status.is_success());

            let mut expect = c0;
            gemm_ref(
                ca, cb, m, n, k, alpha, &a, a_rows, &b, b_rows, beta, &mut expect, m,
            );
            assert_allclose_f64(
                &c,
                &expect,
                1e-12 * k as f64,
                1e-14,
                &format!("gemm {:?}/{:?}", ta, tb),
            );
        }
    }
}

#[test]
fn test_gemm_conj_trans_complex() {
    let handle = Handle::new();
    let (m, n, k) = (14usize, 9usize, 21usize);
    let a = rand_c64(1, k * m);
    let b = rand_c64(2, k * n);
    let c0 = rand_c64(3, m * n);
    let alpha = Complex64::new(1.0, -0.5);
    let beta = Complex64::new(0.25, 0.75);

    let mut c = c0.clone();
    let status = unsafe {
        gemm::<Complex64>(
            &handle,
            Transpose::ConjTrans,
            Transpose::None,
            m as i32,
            n as i32,
            k as i32,
            &alpha,
            a.as_ptr(),
            k as i32,
            b.as_ptr(),
            k as i32,
            &beta,
            c.as_mut_ptr(),
            m as i32,
        )
    };
    assert!(status.is_success());

    let mut expect = c0;
    gemm_ref(
        2,
        0,
        m,
        n,
        k,
        alpha,
        &a,
        k,
        &b,
        k,
        beta,
        &mut expect,
        m,
    );
    assert_allclose_c64(&c, &expect, 1e-12 * k as f64, 1e-14, "gemm C/N");
}

#[test]
fn test_gemm_k_zero_scales_by_beta() {
    let handle = Handle::new();
    let (m, n) = (5usize, 6usize);
    let c0 = rand_f64(7, m * n);
    let alpha = 3.0f64;
    let beta = 0.5f64;

    let mut c = c0.clone();
    // A and B may be null when k == 0
    let status = unsafe {
        gemm::<f64>(
            &handle,
            Transpose::None,
            Transpose::None,
            m as i32,
            n as i32,
            0,
            &alpha,
            std::ptr::null(),
            m as i32,
            std::ptr::null(),
            1,
            &beta,
            c.as_mut_ptr(),
            m as i32,
        )
    };
    assert!(status.is_success());
    let expect: Vec<f64> = c0.iter().map(|v| 0.5 * v).collect();
    assert_allclose_f64(&c, &expect, 1e-15, 0.0, "k=0 scale");
}

#[test]
fn test_gemm_alpha_zero_beta_one_is_noop() {
    let handle = Handle::new();
    let (m, n, k) = (4usize, 4usize, 4usize);
    let c0 = rand_f32(8, m * n);
    let alpha = 0.0f32;
    let beta = 1.0f32;

    let mut c = c0.clone();
    let status = unsafe {
        gemm::<f32>(
            &handle,
            Transpose::None,
            Transpose::None,
            m as i32,
            n as i32,
            k as i32,
            &alpha,
            std::ptr::null(),
            m as i32,
            std::ptr::null(),
            k as i32,
            &beta,
            c.as_mut_ptr(),
            m as i32,
        )
    };
    assert!(status.is_success());
    assert_eq!(c, c0);
}

#[test]
fn test_gemm_large_tiles_cross_boundaries() {
    let handle = Handle::new();
    // Sizes straddling the 32-wide tile boundary in every dimension
    let (m, n, k) = (65usize, 66usize, 95usize);
    let a = rand_f32(11, m * k);
    let b = rand_f32(12, k * n);
    let c0 = vec![0.0f32; m * n];
    let alpha = 1.0f32;
    let beta = 0.0f32;

    let mut c = c0.clone();
    let status = unsafe {
        gemm::<f32>(
            &handle,
            Transpose::None,
            Transpose::None,
            m as i32,
            n as i32,
            k as i32,
            &alpha,
            a.as_ptr(),
            m as i32,
            b.as_ptr(),
            k as i32,
            &beta,
            c.as_mut_ptr(),
            m as i32,
        )
    };
    assert!(status.is_success());

    let mut expect = c0;
    gemm_ref(0, 0, m, n, k, alpha, &a, m, &b, k, beta, &mut expect, m);
    assert_allclose_f32(&c, &expect, 1e-4 * k as f64, 1e-5, "gemm f32 large");
}

#[test]
fn test_syrk_updates_triangle_only() {
    let handle = Handle::new();
    let (n, k) = (35usize, 20usize);
    let a = rand_f64(21, n * k);
    let c0 = rand_f64(22, n * n);
    let alpha = 0.5f64;
    let beta = 2.0f64;

    let mut c = c0.clone();
    let status = unsafe {
        syrk::<f64>(
            &handle,
            Fill::Lower,
            Transpose::None,
            n as i32,
            k as i32,
            &alpha,
            a.as_ptr(),
            n as i32,
            &beta,
            c.as_mut_ptr(),
            n as i32,
        )
    };
    assert!(status.is_success());

    // Full-product oracle, then compare per triangle
    let mut full = c0.clone();
    let at: Vec<f64> = {
        // A^T with column-major layout: element (kk, i) = A[i + kk*n]
        let mut t = vec![0.0f64; k * n];
        for i in 0..n {
            for kk in 0..k {
                t[kk + i * k] = a[i + kk * n];
            }
        }
        t
    };
    gemm_ref(0, 0, n, n, k, alpha, &a, n, &at, k, beta, &mut full, n);

    for col in 0..n {
        for row in 0..n {
            let idx = row + col * n;
            if row >= col {
                assert_close_f64(c[idx], full[idx], 1e-12 * k as f64, 1e-14, "lower");
            } else {
                assert_eq!(c[idx], c0[idx], "upper triangle must be untouched");
            }
        }
    }
}

#[test]
fn test_syrk_trans_matches_untransposed() {
    let handle = Handle::new();
    // C = alpha * A^T * A with A k x n equals the N form on A^T
    let (n, k) = (18usize, 27usize);
    let a = rand_f64(31, k * n); // k x n, column-major, lda = k
    let c0 = vec![0.0f64; n * n];
    let alpha = 1.0f64;
    let beta = 0.0f64;

    let mut c_trans = c0.clone();
    let status = unsafe {
        syrk::<f64>(
            &handle,
            Fill::Upper,
            Transpose::Trans,
            n as i32,
            k as i32,
            &alpha,
            a.as_ptr(),
            k as i32,
            &beta,
            c_trans.as_mut_ptr(),
            n as i32,
        )
    };
    assert!(status.is_success());

    // Materialize B = A^T (n x k) and run the N form
    let mut b = vec![0.0f64; n * k];
    for i in 0..n {
        for kk in 0..k {
            b[i + kk * n] = a[kk + i * k];
        }
    }
    let mut c_none = c0;
    let status = unsafe {
        syrk::<f64>(
            &handle,
            Fill::Upper,
            Transpose::None,
            n as i32,
            k as i32,
            &alpha,
            b.as_ptr(),
            n as i32,
            &beta,
            c_none.as_mut_ptr(),
            n as i32,
        )
    };
    assert!(status.is_success());

    assert_allclose_f64(&c_trans, &c_none, 1e-12 * k as f64, 1e-14, "syrk T vs N");
}

#[test]
fn test_gemm_strided_batched_matches_loop() {
    let handle = Handle::new();
    let (m, n, k) = (16usize, 16usize, 16usize);
    let batch = 5usize;
    let a = rand_f64(41, m * k * batch);
    let b = rand_f64(42, k * n * batch);
    let c0 = rand_f64(43, m * n * batch);
    let alpha = 1.0f64;
    let beta = 0.5f64;

    let mut c = c0.clone();
    let status = unsafe {
        gemm_strided_batched::<f64>(
            &handle,
            Transpose::None,
            Transpose::None,
            m as i32,
            n as i32,
            k as i32,
            &alpha,
            a.as_ptr(),
            m as i32,
            (m * k) as i64,
            b.as_ptr(),
            k as i32,
            (k * n) as i64,
            &beta,
            c.as_mut_ptr(),
            m as i32,
            (m * n) as i64,
            batch as i32,
        )
    };
    assert!(status.is_success());

    let mut expect = c0;
    for bi in 0..batch {
        let (a0, b0, ci) = (bi * m * k, bi * k * n, bi * m * n);
        let mut slice = expect[ci..ci + m * n].to_vec();
        gemm_ref(
            0,
            0,
            m,
            n,
            k,
            alpha,
            &a[a0..a0 + m * k],
            m,
            &b[b0..b0 + k * n],
            k,
            beta,
            &mut slice,
            m,
        );
        expect[ci..ci + m * n].copy_from_slice(&slice);
    }
    assert_allclose_f64(&c, &expect, 1e-12 * k as f64, 1e-14, "strided batched gemm");
}
