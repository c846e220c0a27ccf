//! The fit problem: objective and constraints.
//!
//! We minimize the sum of squared residuals over the sample set, subject to
//! two equality constraints at the breakpoint:
//!
//! - continuity: `seg1(x0) - seg2(x0) = 0`
//! - smoothness: `seg1'(x0) - seg2'(x0) = 0`
//!
//! Both constraints are evaluated at the *trial* breakpoint with the *trial*
//! coefficients, so they are coupled to the same parameter vector as the
//! objective.

use nalgebra::DVector;

use crate::domain::{PARAM_LEN, PiecewiseParams, Sample};
use crate::models::predict;

/// Sum of squared residuals of the piecewise model over `samples`.
///
/// Non-negative; zero exactly when every sample lies on the curve.
pub fn sum_squared_residuals(samples: &[Sample], params: &PiecewiseParams) -> f64 {
    samples
        .iter()
        .map(|s| {
            let r = s.y - predict(s.x, params);
            r * r
        })
        .sum()
}

/// Value mismatch between the segments at the breakpoint.
pub fn continuity_gap(params: &PiecewiseParams) -> f64 {
    params.seg1.eval(params.x0) - params.seg2.eval(params.x0)
}

/// Slope mismatch between the segments at the breakpoint.
pub fn slope_gap(params: &PiecewiseParams) -> f64 {
    params.seg1.slope(params.x0) - params.seg2.slope(params.x0)
}

/// Both constraint gaps, in solver order.
pub fn constraint_gaps(params: &PiecewiseParams) -> [f64; 2] {
    [continuity_gap(params), slope_gap(params)]
}

/// Augmented-Lagrangian residual vector for a flat parameter vector.
///
/// Layout: the `n` data residuals followed by the two scaled constraint
/// residuals `sqrt(ρ/2) (h_j + λ_j/ρ)`. Minimizing the squared norm of this
/// vector minimizes `f(p) + λ·h(p) + (ρ/2)‖h(p)‖²` up to a constant in `λ`.
pub fn augmented_residuals(
    samples: &[Sample],
    p: &[f64; PARAM_LEN],
    lambda: &[f64; 2],
    rho: f64,
) -> DVector<f64> {
    let params = PiecewiseParams::from_array(p);
    let mut out = DVector::<f64>::zeros(samples.len() + 2);

    for (i, s) in samples.iter().enumerate() {
        out[i] = s.y - predict(s.x, &params);
    }

    let scale = (rho / 2.0).sqrt();
    let h = constraint_gaps(&params);
    out[samples.len()] = scale * (h[0] + lambda[0] / rho);
    out[samples.len() + 1] = scale * (h[1] + lambda[1] / rho);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Quadratic;

    fn tangent_params() -> PiecewiseParams {
        // seg2 = seg1 + k (x - x0)^2 is continuous and smooth at x0 for any k.
        let seg1 = Quadratic::new(1.0, -2.0, 3.0);
        let x0 = 2.0;
        let k = -0.75;
        let seg2 = Quadratic::new(
            seg1.a + k,
            seg1.b - 2.0 * k * x0,
            seg1.c + k * x0 * x0,
        );
        PiecewiseParams::new(seg1, seg2, x0)
    }

    #[test]
    fn gaps_vanish_exactly_for_tangent_segments() {
        let p = tangent_params();
        assert!(continuity_gap(&p).abs() < 1e-12);
        assert!(slope_gap(&p).abs() < 1e-12);

        // Perturbing one coefficient breaks both identities.
        let mut q = p;
        q.seg2.c += 0.1;
        assert!(continuity_gap(&q).abs() > 0.05);
        let mut q = p;
        q.seg2.b += 0.1;
        assert!(slope_gap(&q).abs() > 0.05);
    }

    #[test]
    fn objective_is_nonnegative_and_zero_only_on_exact_data() {
        let p = tangent_params();
        let samples: Vec<Sample> = (0..6)
            .map(|i| {
                let x = i as f64;
                Sample { x, y: predict(x, &p) }
            })
            .collect();

        assert_eq!(sum_squared_residuals(&samples, &p), 0.0);

        let mut off = samples.clone();
        off[3].y += 0.5;
        let sse = sum_squared_residuals(&off, &p);
        assert!(sse > 0.0);
        assert!((sse - 0.25).abs() < 1e-12);
    }

    #[test]
    fn objective_is_order_independent() {
        let p = tangent_params();
        let samples: Vec<Sample> = (0..8)
            .map(|i| {
                let x = i as f64 * 0.7;
                Sample { x, y: predict(x, &p) + 0.1 * (i as f64) }
            })
            .collect();
        let mut reversed = samples.clone();
        reversed.reverse();

        let a = sum_squared_residuals(&samples, &p);
        let b = sum_squared_residuals(&reversed, &p);
        assert!((a - b).abs() < 1e-9 * a.max(1.0));
    }

    #[test]
    fn augmented_residuals_layout() {
        let p = tangent_params();
        let samples: Vec<Sample> = (0..4)
            .map(|i| {
                let x = i as f64;
                Sample { x, y: predict(x, &p) }
            })
            .collect();

        let arr = p.to_array();
        let r = augmented_residuals(&samples, &arr, &[0.0, 0.0], 10.0);
        assert_eq!(r.len(), 6);
        // Exact data + feasible params + zero multipliers: all residuals zero.
        assert!(r.iter().all(|v| v.abs() < 1e-10));

        // Non-zero multipliers shift the constraint rows only.
        let r2 = augmented_residuals(&samples, &arr, &[2.0, -4.0], 10.0);
        assert!((0..4).all(|i| r2[i].abs() < 1e-10));
        let scale = (10.0f64 / 2.0).sqrt();
        assert!((r2[4] - scale * (2.0 / 10.0)).abs() < 1e-10);
        assert!((r2[5] - scale * (-4.0 / 10.0)).abs() < 1e-10);
    }
}
