//! Legendre polynomials P_n and their first two derivatives on [-1, 1].
//!
//! Values come from the three-term recurrence
//! (k+1) P_{k+1}(x) = (2k+1) x P_k(x) - k P_{k-1}(x).
//! The derivative identities divide by x^2 - 1, so the endpoints use their
//! closed forms; close to (but not at) +-1 the closed-form derivatives lose
//! accuracy and callers that need derivatives there should prefer nodal or
//! barycentric evaluation.

/// Returns (P_n(x), P_{n-1}(x)); P_{-1} is taken as 0.
pub fn legendre_pair(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }
    let mut p_prev = 1.0;
    let mut p_curr = x;
    for k in 1..n {
        let p_next = ((2 * k + 1) as f64 * x * p_curr - k as f64 * p_prev) / (k + 1) as f64;
        p_prev = p_curr;
        p_curr = p_next;
    }
    (p_curr, p_prev)
}

pub fn legendre(n: usize, x: f64) -> f64 {
    legendre_pair(n, x).0
}

/// P'_n(x) = n (x P_n(x) - P_{n-1}(x)) / (x^2 - 1)
pub fn legendre_derivative(n: usize, x: f64) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let nf = n as f64;
    if x == 1.0 {
        return nf * (nf + 1.0) / 2.0;
    }
    if x == -1.0 {
        return endpoint_sign(n + 1) * nf * (nf + 1.0) / 2.0;
    }
    let (p_n, p_n_minus_1) = legendre_pair(n, x);
    nf * (x * p_n - p_n_minus_1) / (x * x - 1.0)
}

/// P''_n(x) = (2 x P'_n(x) - n (n+1) P_n(x)) / (1 - x^2)
pub fn legendre_second_derivative(n: usize, x: f64) -> f64 {
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let endpoint = (nf - 1.0) * nf * (nf + 1.0) * (nf + 2.0) / 8.0;
    if x == 1.0 {
        return endpoint;
    }
    if x == -1.0 {
        return endpoint_sign(n) * endpoint;
    }
    let (p_n, p_n_minus_1) = legendre_pair(n, x);
    let dp_n = nf * (x * p_n - p_n_minus_1) / (x * x - 1.0);
    (2.0 * x * dp_n - nf * (nf + 1.0) * p_n) / (1.0 - x * x)
}

// (-1)^k
fn endpoint_sign(k: usize) -> f64 {
    if k % 2 == 0 { 1.0 } else { -1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_low_order_values() {
        let x = 0.3;
        assert_relative_eq!(legendre(0, x), 1.0);
        assert_relative_eq!(legendre(1, x), x);
        assert_relative_eq!(legendre(2, x), (3.0 * x * x - 1.0) / 2.0, epsilon = 1e-15);
        assert_relative_eq!(
            legendre(3, x),
            (5.0 * x * x * x - 3.0 * x) / 2.0,
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_derivatives_match_closed_forms() {
        // P_3 = (5x^3 - 3x)/2, P_3' = (15x^2 - 3)/2, P_3'' = 15x
        for &x in &[-0.9, -0.2, 0.0, 0.45, 0.8] {
            assert_relative_eq!(
                legendre_derivative(3, x),
                (15.0 * x * x - 3.0) / 2.0,
                epsilon = 1e-12
            );
            assert_relative_eq!(legendre_second_derivative(3, x), 15.0 * x, epsilon = 1e-11);
        }
    }

    #[test]
    fn test_endpoints() {
        for n in 1..8 {
            let nf = n as f64;
            assert_relative_eq!(legendre(n, 1.0), 1.0, epsilon = 1e-14);
            assert_relative_eq!(legendre_derivative(n, 1.0), nf * (nf + 1.0) / 2.0);
            let interior = legendre_derivative(n, 1.0 - 1e-7);
            assert_relative_eq!(interior, nf * (nf + 1.0) / 2.0, max_relative = 1e-4);
            let left = legendre_derivative(n, -1.0 + 1e-7);
            assert_relative_eq!(legendre_derivative(n, -1.0), left, max_relative = 1e-4);
        }
        // P_4'' at the endpoints: 3*4*5*6/8 = 45
        assert_relative_eq!(legendre_second_derivative(4, 1.0), 45.0);
        assert_relative_eq!(legendre_second_derivative(4, -1.0), 45.0);
        assert_relative_eq!(legendre_second_derivative(3, -1.0), -15.0);
    }
}
