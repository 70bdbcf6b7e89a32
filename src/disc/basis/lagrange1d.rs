use ndarray::{Array, Array1, ArrayView1, Ix1, Ix2};

use crate::disc::gauss_points::{GaussPoints1d, NodeFamily};
use crate::disc::matrix::SquareMatrix;
use crate::error::SpectralError;

/// Nodal Lagrange basis on [-1, 1] together with the operators every field
/// on a domain of this order shares. Built once per (order, family) and
/// handed out behind an `Rc`.
pub struct LagrangeBasis1D {
    pub order: usize,
    pub family: NodeFamily,
    pub cell_gauss_points: Array<f64, Ix1>,
    pub cell_gauss_weights: Array<f64, Ix1>,
    pub bary_weights: Array<f64, Ix1>,
    /// D_ij = l_j'(x_i)
    pub dphis_cell_gps: SquareMatrix,
    /// (2, n): l_j(-1) in row 0, l_j(1) in row 1
    pub phis_bnd_gps: Array<f64, Ix2>,
}

impl LagrangeBasis1D {
    pub fn new(order: usize, family: NodeFamily) -> Result<LagrangeBasis1D, SpectralError> {
        let GaussPoints1d { points, weights } = GaussPoints1d::new(order, family)?;
        let bary_weights = generate_barycentric_weights(points.view());
        let dphis_cell_gps =
            generate_differentiation_matrix(order, points.view(), bary_weights.view())?;
        let mut phis_bnd_gps = Array::zeros((2, order));
        for (row, &x) in [-1.0, 1.0].iter().enumerate() {
            let phis = lagrange_interpolant(points.view(), bary_weights.view(), x)?;
            phis_bnd_gps.row_mut(row).assign(&phis);
        }
        Ok(LagrangeBasis1D {
            order,
            family,
            cell_gauss_points: points,
            cell_gauss_weights: weights,
            bary_weights,
            dphis_cell_gps,
            phis_bnd_gps,
        })
    }
    /// Values of every basis polynomial l_j at `x`.
    pub fn interpolant_at(&self, x: f64) -> Result<Array1<f64>, SpectralError> {
        lagrange_interpolant(self.cell_gauss_points.view(), self.bary_weights.view(), x)
    }
    /// Index of the node equal to `x`, if any.
    pub fn node_index(&self, x: f64) -> Option<usize> {
        self.cell_gauss_points.iter().position(|&xi| xi == x)
    }
    pub fn left_interpolant(&self) -> ArrayView1<f64> {
        self.phis_bnd_gps.row(0)
    }
    pub fn right_interpolant(&self) -> ArrayView1<f64> {
        self.phis_bnd_gps.row(1)
    }
}

/// w_i = 1 / prod_{j != i} (x_i - x_j)
pub fn generate_barycentric_weights(points: ArrayView1<f64>) -> Array1<f64> {
    let n = points.len();
    Array1::from_iter((0..n).map(|i| {
        let product: f64 = (0..n)
            .filter(|&j| j != i)
            .map(|j| points[i] - points[j])
            .product();
        1.0 / product
    }))
}

/// Off-diagonal D_ij = (w_j / w_i) / (x_i - x_j); the diagonal is the
/// negated row sum so constants differentiate to zero exactly.
pub fn generate_differentiation_matrix(
    order: usize,
    points: ArrayView1<f64>,
    bary_weights: ArrayView1<f64>,
) -> Result<SquareMatrix, SpectralError> {
    if points.len() != order {
        return Err(SpectralError::dimension_mismatch(order, points.len()));
    }
    if bary_weights.len() != order {
        return Err(SpectralError::dimension_mismatch(order, bary_weights.len()));
    }
    let mut dxi = Array::zeros((order, order));
    for i in 0..order {
        let mut row_sum = 0.0;
        for j in 0..order {
            if j != i {
                let entry = (bary_weights[j] / bary_weights[i]) / (points[i] - points[j]);
                dxi[(i, j)] = entry;
                row_sum += entry;
            }
        }
        dxi[(i, i)] = -row_sum;
    }
    SquareMatrix::from_array(dxi)
}

fn lagrange_interpolant(
    points: ArrayView1<f64>,
    bary_weights: ArrayView1<f64>,
    x: f64,
) -> Result<Array1<f64>, SpectralError> {
    let n = points.len();
    if let Some(k) = points.iter().position(|&xi| xi == x) {
        let mut phis = Array1::zeros(n);
        phis[k] = 1.0;
        return Ok(phis);
    }
    let terms = Array1::from_iter((0..n).map(|j| bary_weights[j] / (x - points[j])));
    let denominator = terms.sum();
    let phis = terms / denominator;
    if phis.iter().any(|phi| !phi.is_finite()) {
        return Err(SpectralError::InterpolationSingularity { x });
    }
    Ok(phis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_differentiates_polynomials_exactly() {
        for family in [NodeFamily::GaussLegendre, NodeFamily::GaussLobatto] {
            for n in 2..=12 {
                let basis = LagrangeBasis1D::new(n, family).unwrap();
                let x = &basis.cell_gauss_points;
                for k in 0..n as i32 {
                    let f = x.mapv(|xi| xi.powi(k));
                    let df = basis.dphis_cell_gps.dot_vec(f.view()).unwrap();
                    for i in 0..n {
                        let exact = if k == 0 { 0.0 } else { k as f64 * x[i].powi(k - 1) };
                        assert!((df[i] - exact).abs() < 1e-9, "n={n} k={k} i={i}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_edge_interpolants() {
        let basis = LagrangeBasis1D::new(7, NodeFamily::GaussLegendre).unwrap();
        assert_relative_eq!(basis.left_interpolant().sum(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(basis.right_interpolant().sum(), 1.0, epsilon = 1e-12);
        // interpolating x^3 to the edges
        let f = basis.cell_gauss_points.mapv(|xi| xi.powi(3));
        assert_relative_eq!(basis.left_interpolant().dot(&f), -1.0, epsilon = 1e-12);
        assert_relative_eq!(basis.right_interpolant().dot(&f), 1.0, epsilon = 1e-12);

        let lobatto = LagrangeBasis1D::new(5, NodeFamily::GaussLobatto).unwrap();
        assert_eq!(lobatto.left_interpolant()[0], 1.0);
        assert_eq!(lobatto.right_interpolant()[4], 1.0);
        assert_eq!(lobatto.right_interpolant().sum(), 1.0);
        assert_eq!(lobatto.node_index(1.0), Some(4));
    }

    #[test]
    fn test_barycentric_weights_two_points() {
        let points = ndarray::array![-1.0, 1.0];
        let weights = generate_barycentric_weights(points.view());
        assert_relative_eq!(weights[0], -0.5);
        assert_relative_eq!(weights[1], 0.5);
    }

    #[test]
    fn test_mismatched_inputs() {
        let points = ndarray::array![-0.5, 0.5];
        let weights = generate_barycentric_weights(points.view());
        assert!(generate_differentiation_matrix(3, points.view(), weights.view()).is_err());
        let basis = LagrangeBasis1D::new(3, NodeFamily::GaussLegendre).unwrap();
        assert!(matches!(
            basis.interpolant_at(f64::NAN),
            Err(SpectralError::InterpolationSingularity { .. })
        ));
        assert!(LagrangeBasis1D::new(0, NodeFamily::GaussLegendre).is_err());
    }
}
