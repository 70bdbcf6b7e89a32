use ndarray::{ArrayView1, ArrayViewMut1};

use crate::error::SpectralError;

pub mod basis;
pub mod boundary;
pub mod gauss_points;
pub mod legendre;
pub mod matrix;
pub mod multi_domain;
pub mod spectral_function;

/// Right-hand side of the semi-discrete system dx/dt = f(t, x).
pub trait SpatialDisc {
    /// Writes f(t, state) into `dxdt`; every entry is overwritten.
    fn compute_time_derivative(
        &self,
        t: f64,
        state: ArrayView1<f64>,
        dxdt: ArrayViewMut1<f64>,
    ) -> Result<(), SpectralError>;
}
