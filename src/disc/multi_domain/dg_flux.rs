use std::rc::Rc;

use ndarray::{Array, Array1, ArrayView1, ArrayViewMut1, Ix2, s};

use super::{DomainLayout, Field};
use crate::disc::boundary::{BoundaryDriver, RightBoundary};
use crate::disc::matrix::SquareMatrix;
use crate::error::SpectralError;

/// Weak-form operator D^_ij = -(w_j / w_i) D_ji, so that
/// (D^ f)_i = -(1 / w_i) * integral of l_i' f.
pub fn skew_differentiation_matrix(
    dxi: &SquareMatrix,
    weights: ArrayView1<f64>,
) -> Result<SquareMatrix, SpectralError> {
    let n = dxi.extent();
    if weights.len() != n {
        return Err(SpectralError::dimension_mismatch(n, weights.len()));
    }
    let mut data = Array::<f64, Ix2>::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            data[(i, j)] = -(weights[j] / weights[i]) * dxi[(j, i)];
        }
    }
    SquareMatrix::from_array(data)
}

/// Discontinuous Galerkin coupling with upwind fluxes.
///
/// With u = (pi + psi) / 2 travelling left and v = (pi - psi) / 2 travelling
/// right, interface k takes u from the domain on its right and v from the
/// domain on its left. The leftmost v is the driver, -g(t + 1); the rightmost
/// u is zero when transmitting and -v when reflecting, which pins pi* to zero.
pub struct DgFluxCoupling {
    pub layout: DomainLayout,
    pub driver: Rc<dyn BoundaryDriver>,
    pub right_boundary: RightBoundary,
    skew_dxi: Vec<SquareMatrix>,
}

impl DgFluxCoupling {
    pub fn new(
        layout: DomainLayout,
        driver: Rc<dyn BoundaryDriver>,
        right_boundary: RightBoundary,
    ) -> Result<Self, SpectralError> {
        let skew_dxi = layout
            .bases()
            .iter()
            .map(|basis| {
                skew_differentiation_matrix(&basis.dphis_cell_gps, basis.cell_gauss_weights.view())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            layout,
            driver,
            right_boundary,
            skew_dxi,
        })
    }

    pub fn compute_time_derivative(
        &self,
        t: f64,
        state: ArrayView1<f64>,
        mut dxdt: ArrayViewMut1<f64>,
    ) -> Result<(), SpectralError> {
        self.layout.check_len(state.len())?;
        self.layout.check_len(dxdt.len())?;
        let domain_num = self.layout.domain_num();
        let mut u = Array1::<f64>::zeros(domain_num + 1);
        let mut v = Array1::<f64>::zeros(domain_num + 1);

        v[0] = -self.driver.value(t + 1.0);
        for (domain, basis) in self.layout.bases().iter().enumerate() {
            let pi = state.slice(s![self.layout.field_range(domain, Field::Pi)]);
            let psi = state.slice(s![self.layout.field_range(domain, Field::Psi)]);
            let left = basis.left_interpolant();
            let right = basis.right_interpolant();
            u[domain] = 0.5 * (left.dot(&pi) + left.dot(&psi));
            v[domain + 1] = 0.5 * (right.dot(&pi) - right.dot(&psi));
        }
        u[domain_num] = match self.right_boundary {
            RightBoundary::Transmitting => 0.0,
            RightBoundary::Reflecting => -v[domain_num],
        };
        let pi_flux = &u + &v;
        let psi_flux = &u - &v;

        for (domain, basis) in self.layout.bases().iter().enumerate() {
            let pi_range = self.layout.field_range(domain, Field::Pi);
            let psi_range = self.layout.field_range(domain, Field::Psi);
            let skew = &self.skew_dxi[domain];
            skew.dot_vec_into(
                state.slice(s![psi_range.clone()]),
                dxdt.slice_mut(s![pi_range.clone()]),
            )?;
            skew.dot_vec_into(
                state.slice(s![pi_range.clone()]),
                dxdt.slice_mut(s![psi_range.clone()]),
            )?;
            let left = basis.left_interpolant();
            let right = basis.right_interpolant();
            for i in 0..basis.order {
                let w = basis.cell_gauss_weights[i];
                dxdt[pi_range.start + i] +=
                    (psi_flux[domain + 1] * right[i] - psi_flux[domain] * left[i]) / w;
                dxdt[psi_range.start + i] +=
                    (pi_flux[domain + 1] * right[i] - pi_flux[domain] * left[i]) / w;
            }
        }
        Ok(())
    }
}
