//! Breakpoint start generation.
//!
//! The solve is local, so the breakpoint guess matters. By default we run a
//! single start (the configured guess, or the midpoint of the x range), but
//! the fitter can also sweep a deterministic grid of starts across the data
//! range and keep the best result.

/// `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn linear_space(min: f64, max: f64, steps: usize) -> Vec<f64> {
    if steps == 0 {
        return Vec::new();
    }
    if steps == 1 || (max - min).abs() < 1e-12 {
        return vec![min];
    }
    let step = (max - min) / (steps as f64 - 1.0);
    (0..steps).map(|i| min + step * i as f64).collect()
}

/// Breakpoint starts: the primary guess first, then a grid across
/// `[lo, hi]`, deduplicated.
///
/// The primary guess keeps index 0 so that tie-breaking by start index
/// preserves the single-start behavior when the grid adds nothing.
pub fn x0_starts(primary: f64, lo: f64, hi: f64, count: usize) -> Vec<f64> {
    let count = count.max(1);
    let mut out = vec![primary];
    if count == 1 {
        return out;
    }

    for cand in linear_space(lo, hi, count) {
        if out.iter().all(|&x| (x - cand).abs() > 1e-9) {
            out.push(cand);
        }
    }
    out
}
