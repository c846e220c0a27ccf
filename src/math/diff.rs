//! Central-difference Jacobians.
//!
//! The piecewise model is cheap to evaluate (a handful of samples, two
//! quadratics), so numerical differentiation is plenty fast and avoids
//! hand-maintained derivative code for the augmented residual vector.

use nalgebra::{DMatrix, DVector};

use crate::domain::PARAM_LEN;

/// Relative step for central differences.
const FD_EPS: f64 = 1e-6;

/// Central-difference Jacobian of `f` at `p`.
///
/// `m` is the residual dimension; `f` must always return a vector of
/// length `m`. The result is `m x PARAM_LEN`, column `j` holding
/// `∂f/∂p_j`.
pub fn central_jacobian<F>(f: &F, p: &[f64; PARAM_LEN], m: usize) -> DMatrix<f64>
where
    F: Fn(&[f64; PARAM_LEN]) -> DVector<f64>,
{
    let mut jac = DMatrix::<f64>::zeros(m, PARAM_LEN);

    for j in 0..PARAM_LEN {
        let h = FD_EPS * (1.0 + p[j].abs());
        let mut forward = *p;
        let mut backward = *p;
        forward[j] += h;
        backward[j] -= h;

        let fp = f(&forward);
        let fm = f(&backward);
        let col = (fp - fm) / (2.0 * h);
        jac.set_column(j, &col);
    }

    jac
}
