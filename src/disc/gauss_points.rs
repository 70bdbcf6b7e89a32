use ndarray::{Array, Ix1};
use serde::Deserialize;

use crate::error::SpectralError;

pub mod legendre_points;
pub mod lobatto_points;

/// Binary digits the Newton-Raphson iteration resolves each root to.
const NEWTON_DIGITS: i32 = 50;
const NEWTON_MAX_ITERATIONS: usize = 100;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeFamily {
    /// Roots of P_n, strictly inside (-1, 1).
    GaussLegendre,
    /// Roots of P_n - P_{n-2}, including both endpoints.
    GaussLobatto,
}

pub struct GaussPoints1d {
    pub points: Array<f64, Ix1>,
    pub weights: Array<f64, Ix1>,
}
impl GaussPoints1d {
    pub fn new(points_num: usize, family: NodeFamily) -> Result<Self, SpectralError> {
        let (points, weights) = match family {
            NodeFamily::GaussLegendre => legendre_points::get_legendre_points_interval(points_num)?,
            NodeFamily::GaussLobatto => lobatto_points::get_lobatto_points_interval(points_num)?,
        };
        Ok(Self { points, weights })
    }
}

/// Newton-Raphson on `func`, which returns (value, slope). Steps that would
/// leave [lower, upper] are replaced by a bisection toward the violated bound.
/// Returns `None` if no Newton step drops below the tolerance within the
/// iteration budget.
pub(crate) fn newton_raphson<F>(func: F, guess: f64, lower: f64, upper: f64) -> Option<f64>
where
    F: Fn(f64) -> (f64, f64),
{
    let tolerance = 2.0_f64.powi(1 - NEWTON_DIGITS);
    let (lower, upper) = if lower <= upper {
        (lower, upper)
    } else {
        (upper, lower)
    };
    let mut x = guess.clamp(lower, upper);
    for _ in 0..NEWTON_MAX_ITERATIONS {
        let (value, slope) = func(x);
        if value == 0.0 {
            return Some(x);
        }
        let newton = x - value / slope;
        let next = if !newton.is_finite() {
            0.5 * (lower + upper)
        } else if newton < lower {
            0.5 * (x + lower)
        } else if newton > upper {
            0.5 * (x + upper)
        } else {
            newton
        };
        let step = next - x;
        x = next;
        // bisection steps never count as convergence
        if next == newton && step.abs() <= tolerance * x.abs() {
            return Some(x);
        }
    }
    None
}

/// Roots must come out strictly increasing; anything else means a Newton
/// iteration slid onto a neighbouring root.
pub(crate) fn check_ordering(order: usize, points: &[f64]) -> Result<(), SpectralError> {
    for (i, pair) in points.windows(2).enumerate() {
        if pair[0] >= pair[1] {
            return Err(SpectralError::ConvergenceFailure {
                order,
                root: i + 1,
                iterations: NEWTON_MAX_ITERATIONS,
            });
        }
    }
    Ok(())
}

pub(crate) fn convergence_failure(order: usize, root: usize) -> SpectralError {
    SpectralError::ConvergenceFailure {
        order,
        root,
        iterations: NEWTON_MAX_ITERATIONS,
    }
}
