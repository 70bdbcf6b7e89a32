//! Coupling of several spectral domains into one semi-discrete system.
//!
//! Domain `d` maps the reference interval [-1, 1] onto the global interval
//! [2d - 1, 2d + 1]. The global state stores, domain after domain, the `n_d`
//! nodal values of pi followed by the `n_d` nodal values of psi, and the
//! system evolved is pi_t = psi_x, psi_t = pi_x.

use std::ops::Range;
use std::rc::Rc;

use ndarray::{Array1, ArrayView1, ArrayViewMut1};
use serde::Deserialize;

use crate::disc::SpatialDisc;
use crate::disc::basis::lagrange1d::LagrangeBasis1D;
use crate::disc::gauss_points::NodeFamily;
use crate::error::SpectralError;

pub mod collocation;
pub mod dg_flux;

pub use collocation::CollocationCoupling;
pub use dg_flux::DgFluxCoupling;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Pi,
    Psi,
}

impl Field {
    pub const ALL: [Field; 2] = [Field::Pi, Field::Psi];
    /// Position of the field inside a domain's block.
    pub fn index(&self) -> usize {
        match self {
            Field::Pi => 0,
            Field::Psi => 1,
        }
    }
    pub fn name(&self) -> &'static str {
        match self {
            Field::Pi => "pi",
            Field::Psi => "psi",
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SchemeKind {
    Dg,
    Collocation,
}

impl SchemeKind {
    pub fn default_node_family(&self) -> NodeFamily {
        match self {
            SchemeKind::Dg => NodeFamily::GaussLegendre,
            SchemeKind::Collocation => NodeFamily::GaussLobatto,
        }
    }
}

/// Domain bases in left-to-right order plus the offsets of each domain's
/// block in the global state.
#[derive(Clone)]
pub struct DomainLayout {
    bases: Vec<Rc<LagrangeBasis1D>>,
    offsets: Vec<usize>,
    state_len: usize,
}

impl DomainLayout {
    pub fn new(bases: Vec<Rc<LagrangeBasis1D>>) -> Result<Self, SpectralError> {
        if bases.is_empty() {
            return Err(SpectralError::InvalidConfiguration(
                "at least one domain is required".to_string(),
            ));
        }
        let mut offsets = Vec::with_capacity(bases.len());
        let mut state_len = 0;
        for basis in bases.iter() {
            offsets.push(state_len);
            state_len += 2 * basis.order;
        }
        Ok(Self {
            bases,
            offsets,
            state_len,
        })
    }
    pub fn domain_num(&self) -> usize {
        self.bases.len()
    }
    pub fn basis(&self, domain: usize) -> &Rc<LagrangeBasis1D> {
        &self.bases[domain]
    }
    pub fn bases(&self) -> &[Rc<LagrangeBasis1D>] {
        &self.bases
    }
    /// 2 * sum of the domain orders
    pub fn state_len(&self) -> usize {
        self.state_len
    }
    pub fn field_range(&self, domain: usize, field: Field) -> Range<usize> {
        let n = self.bases[domain].order;
        let start = match field {
            Field::Pi => self.offsets[domain],
            Field::Psi => self.offsets[domain] + n,
        };
        start..start + n
    }
    pub fn global_coordinate(&self, domain: usize, x: f64) -> f64 {
        x + 2.0 * domain as f64
    }
    pub fn check_len(&self, len: usize) -> Result<(), SpectralError> {
        if len != self.state_len {
            return Err(SpectralError::dimension_mismatch(self.state_len, len));
        }
        Ok(())
    }
    /// Global state with every node set from `f(field, global_x)`.
    pub fn fill_state<F>(&self, f: F) -> Array1<f64>
    where
        F: Fn(Field, f64) -> f64,
    {
        let mut state = Array1::zeros(self.state_len);
        for (domain, basis) in self.bases.iter().enumerate() {
            for field in Field::ALL {
                let range = self.field_range(domain, field);
                for (value, &x) in state
                    .slice_mut(ndarray::s![range])
                    .iter_mut()
                    .zip(basis.cell_gauss_points.iter())
                {
                    *value = f(field, self.global_coordinate(domain, x));
                }
            }
        }
        state
    }
}

pub enum EvolutionScheme {
    Collocation(CollocationCoupling),
    DgFlux(DgFluxCoupling),
}

impl EvolutionScheme {
    pub fn layout(&self) -> &DomainLayout {
        match self {
            EvolutionScheme::Collocation(scheme) => &scheme.layout,
            EvolutionScheme::DgFlux(scheme) => &scheme.layout,
        }
    }
}

impl SpatialDisc for EvolutionScheme {
    fn compute_time_derivative(
        &self,
        t: f64,
        state: ArrayView1<f64>,
        dxdt: ArrayViewMut1<f64>,
    ) -> Result<(), SpectralError> {
        match self {
            EvolutionScheme::Collocation(scheme) => scheme.compute_time_derivative(t, state, dxdt),
            EvolutionScheme::DgFlux(scheme) => scheme.compute_time_derivative(t, state, dxdt),
        }
    }
}
