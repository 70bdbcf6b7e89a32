use std::f64::consts::PI;

use ndarray::{Array, Ix1};

use super::{check_ordering, convergence_failure, newton_raphson};
use crate::disc::legendre::{legendre, legendre_derivative};
use crate::error::SpectralError;

/// q_n(x) = P_n(x) - P_{n-2}(x) together with q_n'(x).
fn lobatto_polynomial(order: usize, x: f64) -> (f64, f64) {
    (
        legendre(order, x) - legendre(order - 2, x),
        legendre_derivative(order, x) - legendre_derivative(order - 2, x),
    )
}

/// Gauss-Lobatto abscissas: -1, the `order - 2` interior roots of
/// P_order - P_{order-2}, and 1, ascending.
///
/// Works forward from -1 through the lower half, seeding each Newton-Raphson
/// iteration with -cos((j + 1/4) pi / (n - 1) - 3 / (8 (n - 1) pi (j + 1/4))),
/// then mirrors.
pub fn generate_lobatto_abscissas(order: usize) -> Result<Vec<f64>, SpectralError> {
    if order < 2 {
        return Err(SpectralError::InvalidOrder { order });
    }
    let m = (order - 1) as f64;
    let guess = |j: usize| {
        let k = j as f64 + 0.25;
        -(k * PI / m - 3.0 / (8.0 * m * PI * k)).cos()
    };

    let mut lower_half = Vec::with_capacity(order / 2);
    lower_half.push(-1.0);
    let mut prev_guess = -1.0;
    for j in 1..order / 2 {
        let current = guess(j);
        let root = newton_raphson(
            |x| lobatto_polynomial(order, x),
            current,
            prev_guess,
            guess(j + 1),
        )
        .ok_or_else(|| convergence_failure(order, j))?;
        lower_half.push(root);
        prev_guess = current;
    }

    let mut abscissas = lower_half.clone();
    if order % 2 != 0 {
        abscissas.push(0.0);
    }
    abscissas.extend(lower_half.iter().rev().map(|&x| -x));
    check_ordering(order, &abscissas)?;
    Ok(abscissas)
}

/// Endpoints get 2 / (n (n - 1)); interior nodes 2 / (n (n - 1) P_{n-1}(x_i)^2).
pub fn generate_lobatto_weights(
    order: usize,
    abscissas: &[f64],
) -> Result<Vec<f64>, SpectralError> {
    if order < 2 {
        return Err(SpectralError::InvalidOrder { order });
    }
    if abscissas.len() != order {
        return Err(SpectralError::dimension_mismatch(order, abscissas.len()));
    }
    let scale = (order * (order - 1)) as f64;
    let mut weights: Vec<f64> = abscissas
        .iter()
        .map(|&x| {
            let p = legendre(order - 1, x);
            2.0 / (scale * p * p)
        })
        .collect();
    weights[0] = 2.0 / scale;
    weights[order - 1] = 2.0 / scale;
    Ok(weights)
}

pub fn get_lobatto_points_interval(
    points_num: usize,
) -> Result<(Array<f64, Ix1>, Array<f64, Ix1>), SpectralError> {
    let points = generate_lobatto_abscissas(points_num)?;
    let weights = generate_lobatto_weights(points_num, &points)?;
    Ok((Array::from(points), Array::from(weights)))
}
