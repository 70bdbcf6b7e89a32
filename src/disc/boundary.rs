use std::f64::consts::LN_2;

use num_dual::{Dual64, DualNum, first_derivative};
use serde::Deserialize;

/// Time-dependent signal fed in at the left end of the leftmost domain.
pub trait BoundaryDriver {
    fn value(&self, t: f64) -> f64;
    fn derivative(&self, t: f64) -> f64;
    /// (pi, psi) of the right-moving wave the driver launches, at global
    /// coordinate `x` and time `t`: psi = g(t - x), pi = -psi.
    fn right_moving_wave(&self, x: f64, t: f64) -> (f64, f64) {
        let psi = self.value(t - x);
        (-psi, psi)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundarySignal {
    /// cos(frequency * t)
    Sinusoid { frequency: f64 },
    /// 2^(-decay * t^2)
    Pulse { decay: f64 },
}

impl BoundarySignal {
    pub fn eval<D: DualNum<f64>>(&self, t: D) -> D {
        match *self {
            BoundarySignal::Sinusoid { frequency } => (t * frequency).cos(),
            BoundarySignal::Pulse { decay } => (t.powi(2) * (-decay * LN_2)).exp(),
        }
    }
}

impl Default for BoundarySignal {
    fn default() -> Self {
        BoundarySignal::Sinusoid { frequency: 2.0 }
    }
}

impl BoundaryDriver for BoundarySignal {
    fn value(&self, t: f64) -> f64 {
        self.eval(t)
    }
    fn derivative(&self, t: f64) -> f64 {
        first_derivative(|t: Dual64| self.eval(t), t).1
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RightBoundary {
    /// Outgoing waves leave; nothing comes back in.
    #[default]
    Transmitting,
    /// pi is held at zero at the right end and the wave returns inverted in pi.
    Reflecting,
}
