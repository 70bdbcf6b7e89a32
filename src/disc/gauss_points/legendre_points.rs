use std::f64::consts::PI;

use ndarray::{Array, Ix1};

use super::{check_ordering, convergence_failure, newton_raphson};
use crate::disc::legendre::{legendre_derivative, legendre_pair};
use crate::error::SpectralError;

/// Gauss-Legendre abscissas: the `order` roots of P_order, ascending.
///
/// The upper half is found by Newton-Raphson from the asymptotic guess
/// (1 - 1/n^2 + 1/n^3) cos(pi (4i - 1) / (4n + 2)), bracketed by the
/// neighbouring guesses; the lower half is its mirror image and odd orders
/// get an exact zero in the middle.
pub fn generate_legendre_abscissas(order: usize) -> Result<Vec<f64>, SpectralError> {
    if order < 1 {
        return Err(SpectralError::InvalidOrder { order });
    }
    let n = order as f64;
    let scale = 1.0 - 1.0 / (n * n) + 1.0 / (n * n * n);
    let guess = |i: usize| scale * (PI * (4 * i - 1) as f64 / (4.0 * n + 2.0)).cos();
    let value_and_slope = |x: f64| {
        let (p_n, _) = legendre_pair(order, x);
        (p_n, legendre_derivative(order, x))
    };

    // descending: largest root first
    let mut upper_half = Vec::with_capacity(order / 2);
    let mut prev_guess = 1.0;
    for i in 1..=order / 2 {
        let current = guess(i);
        let root = newton_raphson(value_and_slope, current, guess(i + 1), prev_guess)
            .ok_or_else(|| convergence_failure(order, order - i))?;
        upper_half.push(root);
        prev_guess = current;
    }

    let mut abscissas: Vec<f64> = upper_half.iter().map(|&x| -x).collect();
    if order % 2 != 0 {
        abscissas.push(0.0);
    }
    abscissas.extend(upper_half.iter().rev());
    check_ordering(order, &abscissas)?;
    Ok(abscissas)
}

/// w_i = 2 / ((1 - x_i^2) P'_order(x_i)^2)
pub fn generate_legendre_weights(
    order: usize,
    abscissas: &[f64],
) -> Result<Vec<f64>, SpectralError> {
    if abscissas.len() != order {
        return Err(SpectralError::dimension_mismatch(order, abscissas.len()));
    }
    Ok(abscissas
        .iter()
        .map(|&x| {
            let dp = legendre_derivative(order, x);
            2.0 / ((1.0 - x * x) * dp * dp)
        })
        .collect())
}

pub fn get_legendre_points_interval(
    points_num: usize,
) -> Result<(Array<f64, Ix1>, Array<f64, Ix1>), SpectralError> {
    let points = generate_legendre_abscissas(points_num)?;
    let weights = generate_legendre_weights(points_num, &points)?;
    Ok((Array::from(points), Array::from(weights)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::legendre::legendre;
    use approx::assert_relative_eq;

    #[test]
    fn test_abscissas_are_symmetric_roots() {
        for n in 2..=12 {
            let points = generate_legendre_abscissas(n).unwrap();
            assert_eq!(points.len(), n);
            for i in 0..n {
                assert_eq!(points[i], -points[n - 1 - i]);
                assert!(points[i] > -1.0 && points[i] < 1.0);
                assert!(legendre(n, points[i]).abs() < 1e-10, "P_{n}({})", points[i]);
            }
        }
    }

    #[test]
    fn test_order_four_literal_values() {
        let (points, weights) = get_legendre_points_interval(4).unwrap();
        let expected_points = [-0.8611363116, -0.3399810436, 0.3399810436, 0.8611363116];
        let expected_weights = [0.3478548451, 0.6521451549, 0.6521451549, 0.3478548451];
        for i in 0..4 {
            assert_relative_eq!(points[i], expected_points[i], epsilon = 1e-10);
            assert_relative_eq!(weights[i], expected_weights[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn test_low_orders() {
        assert_eq!(generate_legendre_abscissas(1).unwrap(), vec![0.0]);
        let weights = generate_legendre_weights(1, &[0.0]).unwrap();
        assert_relative_eq!(weights[0], 2.0);
        let points = generate_legendre_abscissas(3).unwrap();
        assert_eq!(points[1], 0.0);
        assert_relative_eq!(points[2], (3.0_f64 / 5.0).sqrt(), epsilon = 1e-14);
    }

    #[test]
    fn test_high_order_converges() {
        let points = generate_legendre_abscissas(40).unwrap();
        assert!(points.iter().all(|&x| legendre(40, x).abs() < 1e-10));
    }

    #[test]
    fn test_invalid_order() {
        assert!(matches!(
            generate_legendre_abscissas(0),
            Err(SpectralError::InvalidOrder { order: 0 })
        ));
        assert!(generate_legendre_weights(3, &[0.0]).is_err());
    }
}
