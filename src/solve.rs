use crate::error::{IntSimError, Result};
use crate::params::TechParams;

pub const MAX_FIXED_POINT_ITERATIONS: usize = 1000;
pub const RELATIVE_TOLERANCE: f64 = 1e-10;

/// Iterates `x = f(x)` from `x0` until the relative change falls below [`RELATIVE_TOLERANCE`].
pub fn fixed_point(what: &'static str, x0: f64, f: impl Fn(f64) -> f64) -> Result<f64> {
    let mut x = x0;
    for iteration in 1..=MAX_FIXED_POINT_ITERATIONS {
        let next = f(x);
        if !next.is_finite() {
            return Err(IntSimError::NonFinite {
                what,
                iterations: iteration,
            });
        }
        if (next - x).abs() <= RELATIVE_TOLERANCE * x.abs() {
            return Ok(next);
        }
        x = next;
    }
    Err(IntSimError::NoConvergence {
        what,
        iterations: MAX_FIXED_POINT_ITERATIONS,
    })
}

/// Finds the pitch whose resistance per length equals `r_need`.
///
/// Since resistivity itself depends on the pitch, `p = 2 sqrt(rho(p) / (ar r_need))`
/// is iterated starting from `guess`.
pub fn pitch_for_resistance(params: &TechParams, r_need: f64, guess: f64) -> Result<f64> {
    let ar = params.design.aspect_ratio;
    fixed_point("wire pitch", guess, |p| {
        2.0 * (params.resistivity(p) / (ar * r_need)).sqrt()
    })
}
