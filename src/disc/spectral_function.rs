//! One scalar field on one domain.
//!
//! Nodal values are the primary data. The Legendre modal coefficients are a
//! lazily filled cache that is dropped whenever the nodal values are replaced,
//! so `value_at` and friends always describe the current nodal data.

use std::rc::Rc;

use ndarray::{Array1, ArrayView1};
use once_cell::unsync::OnceCell;

use crate::disc::basis::lagrange1d::LagrangeBasis1D;
use crate::disc::legendre::{legendre, legendre_derivative, legendre_second_derivative};
use crate::error::SpectralError;

#[derive(Clone)]
pub struct SpectralFunction {
    basis: Rc<LagrangeBasis1D>,
    collocation_data: Array1<f64>,
    spectral_data: OnceCell<Array1<f64>>,
}

impl SpectralFunction {
    pub fn new(basis: Rc<LagrangeBasis1D>) -> Self {
        let collocation_data = Array1::zeros(basis.order);
        Self {
            basis,
            collocation_data,
            spectral_data: OnceCell::new(),
        }
    }
    pub fn with_collocation_data(
        basis: Rc<LagrangeBasis1D>,
        collocation_data: Array1<f64>,
    ) -> Result<Self, SpectralError> {
        let mut function = Self::new(basis);
        function.set_collocation_data(collocation_data)?;
        Ok(function)
    }
    /// Samples `f` at the domain's nodes.
    pub fn from_fn<F: Fn(f64) -> f64>(basis: Rc<LagrangeBasis1D>, f: F) -> Self {
        let collocation_data = basis.cell_gauss_points.mapv(f);
        Self {
            basis,
            collocation_data,
            spectral_data: OnceCell::new(),
        }
    }
    pub fn basis(&self) -> &Rc<LagrangeBasis1D> {
        &self.basis
    }
    pub fn order(&self) -> usize {
        self.basis.order
    }
    pub fn collocation_data(&self) -> ArrayView1<f64> {
        self.collocation_data.view()
    }
    pub fn set_collocation_data(&mut self, data: Array1<f64>) -> Result<(), SpectralError> {
        if data.len() != self.order() {
            return Err(SpectralError::dimension_mismatch(self.order(), data.len()));
        }
        self.collocation_data = data;
        self.spectral_data = OnceCell::new();
        Ok(())
    }
    pub fn has_modal_cache(&self) -> bool {
        self.spectral_data.get().is_some()
    }

    pub fn value_at_node(&self, i: usize) -> Result<f64, SpectralError> {
        self.check_index(i)?;
        Ok(self.collocation_data[i])
    }
    pub fn derivative_at_node(&self, i: usize) -> Result<f64, SpectralError> {
        self.check_index(i)?;
        Ok(self
            .basis
            .dphis_cell_gps
            .view()
            .row(i)
            .dot(&self.collocation_data))
    }
    pub fn second_derivative_at_node(&self, i: usize) -> Result<f64, SpectralError> {
        self.check_index(i)?;
        let dxi = &self.basis.dphis_cell_gps;
        let first = dxi.dot_vec(self.collocation_data.view())?;
        Ok(dxi.view().row(i).dot(&first))
    }
    /// Derivative at every node.
    pub fn nodal_derivative(&self) -> Result<Array1<f64>, SpectralError> {
        self.basis
            .dphis_cell_gps
            .dot_vec(self.collocation_data.view())
    }

    /// c_k = sum_j w_j f_j P_k(x_j) / sum_j w_j P_k(x_j)^2
    ///
    /// The discrete norm in the denominator equals 2 / (2k + 1) whenever the
    /// quadrature integrates P_k^2 exactly, and keeps the round trip back to
    /// the nodes exact for the top Lobatto mode where it does not.
    pub fn project_to_modal_coefficients(&self) -> &Array1<f64> {
        self.spectral_data.get_or_init(|| {
            let basis = &self.basis;
            Array1::from_iter((0..basis.order).map(|k| {
                let mut inner = 0.0;
                let mut norm = 0.0;
                for ((&x, &w), &f) in basis
                    .cell_gauss_points
                    .iter()
                    .zip(basis.cell_gauss_weights.iter())
                    .zip(self.collocation_data.iter())
                {
                    let p = legendre(k, x);
                    inner += w * f * p;
                    norm += w * p * p;
                }
                inner / norm
            }))
        })
    }
    pub fn modal_coefficient(&self, k: usize) -> Result<f64, SpectralError> {
        let coefficients = self.project_to_modal_coefficients();
        coefficients
            .get(k)
            .copied()
            .ok_or(SpectralError::IndexOutOfRange {
                index: k,
                len: coefficients.len(),
            })
    }

    /// Truncated Legendre series at `x`.
    pub fn value_at(&self, x: f64) -> f64 {
        self.modal_sum(|k| legendre(k, x))
    }
    /// Series derivative. Loses accuracy close to (not at) the endpoints.
    pub fn derivative_at(&self, x: f64) -> f64 {
        self.modal_sum(|k| legendre_derivative(k, x))
    }
    pub fn second_derivative_at(&self, x: f64) -> f64 {
        self.modal_sum(|k| legendre_second_derivative(k, x))
    }
    fn modal_sum<F: Fn(usize) -> f64>(&self, polynomial: F) -> f64 {
        self.project_to_modal_coefficients()
            .iter()
            .enumerate()
            .map(|(k, &c)| c * polynomial(k))
            .sum()
    }

    /// Barycentric interpolation through the nodal values.
    pub fn value_at_bary(&self, x: f64) -> Result<f64, SpectralError> {
        if let Some(i) = self.basis.node_index(x) {
            return Ok(self.collocation_data[i]);
        }
        let (numerator, denominator) = self.bary_sums(x);
        finite_or_singular(numerator / denominator, x)
    }
    /// p'(x) = sum_j w_j (p(x) - f_j) / (x - x_j)^2 / sum_j w_j / (x - x_j)
    pub fn derivative_at_bary(&self, x: f64) -> Result<f64, SpectralError> {
        if let Some(i) = self.basis.node_index(x) {
            return self.derivative_at_node(i);
        }
        let (numerator, denominator) = self.bary_sums(x);
        let value = numerator / denominator;
        let mut slope = 0.0;
        for ((&xj, &wj), &fj) in self
            .basis
            .cell_gauss_points
            .iter()
            .zip(self.basis.bary_weights.iter())
            .zip(self.collocation_data.iter())
        {
            let dx = x - xj;
            slope += wj * (value - fj) / (dx * dx);
        }
        finite_or_singular(slope / denominator, x)
    }
    fn bary_sums(&self, x: f64) -> (f64, f64) {
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for ((&xj, &wj), &fj) in self
            .basis
            .cell_gauss_points
            .iter()
            .zip(self.basis.bary_weights.iter())
            .zip(self.collocation_data.iter())
        {
            let term = wj / (x - xj);
            numerator += term * fj;
            denominator += term;
        }
        (numerator, denominator)
    }

    fn check_index(&self, i: usize) -> Result<(), SpectralError> {
        if i >= self.order() {
            return Err(SpectralError::IndexOutOfRange {
                index: i,
                len: self.order(),
            });
        }
        Ok(())
    }
}

fn finite_or_singular(value: f64, x: f64) -> Result<f64, SpectralError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SpectralError::InterpolationSingularity { x })
    }
}
