//! Small dense-matrix helpers for per-face Jacobian blocks.
//!
//! Blocks are `faer::Mat<f64>` of size nVar × nVar, allocated once per
//! evaluator and overwritten in place on every call.

use faer::Mat;

/// Set every entry of `m` to zero.
#[inline]
pub fn zero(m: &mut Mat<f64>) {
    for j in 0..m.ncols() {
        for i in 0..m.nrows() {
            m[(i, j)] = 0.0;
        }
    }
}

/// Multiply every entry of `m` by `factor`.
#[inline]
pub fn scale(m: &mut Mat<f64>, factor: f64) {
    for j in 0..m.ncols() {
        for i in 0..m.nrows() {
            m[(i, j)] *= factor;
        }
    }
}

/// `out = P · diag(lambda) · P_inv`.
pub fn similarity(p: &Mat<f64>, lambda: &[f64], p_inv: &Mat<f64>, out: &mut Mat<f64>) {
    let n = p.nrows();
    for i in 0..n {
        for j in 0..n {
            let mut sum = 0.0;
            for k in 0..n {
                sum += p[(i, k)] * lambda[k] * p_inv[(k, j)];
            }
            out[(i, j)] = sum;
        }
    }
}

/// `out = a · x`.
pub fn mat_vec(a: &Mat<f64>, x: &[f64], out: &mut [f64]) {
    for i in 0..a.nrows() {
        let mut sum = 0.0;
        for j in 0..a.ncols() {
            sum += a[(i, j)] * x[j];
        }
        out[i] = sum;
    }
}

/// `out = a · b` for square matrices of equal size.
pub fn mat_mul(a: &Mat<f64>, b: &Mat<f64>, out: &mut Mat<f64>) {
    let n = a.nrows();
    for i in 0..n {
        for j in 0..b.ncols() {
            let mut sum = 0.0;
            for k in 0..a.ncols() {
                sum += a[(i, k)] * b[(k, j)];
            }
            out[(i, j)] = sum;
        }
    }
}
