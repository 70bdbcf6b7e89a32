use std::rc::Rc;

use ndarray::{ArrayView1, ArrayViewMut1, s};

use super::{DomainLayout, Field};
use crate::disc::boundary::{BoundaryDriver, RightBoundary};
use crate::disc::gauss_points::NodeFamily;
use crate::error::SpectralError;

/// Time-derivative estimate of (pi, psi) at one domain edge.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct EdgeRate {
    pi: f64,
    psi: f64,
}

impl EdgeRate {
    fn average(&self, other: &EdgeRate) -> EdgeRate {
        EdgeRate {
            pi: 0.5 * (self.pi + other.pi),
            psi: 0.5 * (self.psi + other.psi),
        }
    }
}

/// Continuous collocation on Gauss-Lobatto nodes. Interior nodes take the
/// plain differentiation-matrix rates; the two nodes meeting at an interface
/// both take the average of their one-sided rates, so the interface rates
/// agree exactly.
pub struct CollocationCoupling {
    pub layout: DomainLayout,
    pub driver: Rc<dyn BoundaryDriver>,
    pub right_boundary: RightBoundary,
}

impl CollocationCoupling {
    pub fn new(
        layout: DomainLayout,
        driver: Rc<dyn BoundaryDriver>,
        right_boundary: RightBoundary,
    ) -> Result<Self, SpectralError> {
        for basis in layout.bases() {
            if basis.family != NodeFamily::GaussLobatto {
                return Err(SpectralError::InvalidConfiguration(
                    "collocation coupling needs Gauss-Lobatto nodes".to_string(),
                ));
            }
        }
        Ok(Self {
            layout,
            driver,
            right_boundary,
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
        // rates at interface k: from_left is the right edge of domain k-1,
        // from_right the left edge of domain k
        let mut from_left = vec![EdgeRate::default(); domain_num + 1];
        let mut from_right = vec![EdgeRate::default(); domain_num + 1];

        for (domain, basis) in self.layout.bases().iter().enumerate() {
            let pi_range = self.layout.field_range(domain, Field::Pi);
            let psi_range = self.layout.field_range(domain, Field::Psi);
            let dxi = &basis.dphis_cell_gps;
            dxi.dot_vec_into(
                state.slice(s![psi_range.clone()]),
                dxdt.slice_mut(s![pi_range.clone()]),
            )?;
            dxi.dot_vec_into(
                state.slice(s![pi_range.clone()]),
                dxdt.slice_mut(s![psi_range.clone()]),
            )?;
            from_right[domain] = EdgeRate {
                pi: dxdt[pi_range.start],
                psi: dxdt[psi_range.start],
            };
            from_left[domain + 1] = EdgeRate {
                pi: dxdt[pi_range.end - 1],
                psi: dxdt[psi_range.end - 1],
            };
        }

        // psi(-1, t) = g(t + 1) with pi = -psi
        let drive = 2.0 * self.driver.derivative(t + 1.0);
        let first = from_right[0];
        from_left[0] = EdgeRate {
            pi: -first.pi - drive,
            psi: -first.psi + drive,
        };
        let last = from_left[domain_num];
        from_right[domain_num] = match self.right_boundary {
            RightBoundary::Transmitting => EdgeRate {
                pi: -last.pi - 2.0 * last.psi,
                psi: -last.psi - 2.0 * last.pi,
            },
            RightBoundary::Reflecting => EdgeRate {
                pi: -last.pi,
                psi: last.psi,
            },
        };

        for interface in 0..=domain_num {
            let rate = from_left[interface].average(&from_right[interface]);
            if interface > 0 {
                let domain = interface - 1;
                let pi_end = self.layout.field_range(domain, Field::Pi).end - 1;
                let psi_end = self.layout.field_range(domain, Field::Psi).end - 1;
                dxdt[pi_end] = rate.pi;
                dxdt[psi_end] = rate.psi;
            }
            if interface < domain_num {
                let pi_start = self.layout.field_range(interface, Field::Pi).start;
                let psi_start = self.layout.field_range(interface, Field::Psi).start;
                dxdt[pi_start] = rate.pi;
                dxdt[psi_start] = rate.psi;
            }
        }
        Ok(())
    }
}
