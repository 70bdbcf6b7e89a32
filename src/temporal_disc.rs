use ndarray::{Array1, ArrayView1, Zip};
use tracing::debug;

use crate::disc::SpatialDisc;
use crate::error::SpectralError;
use crate::history::HistoryRecorder;

/// Fixed-step classic fourth-order Runge-Kutta from t = 0 to `final_time`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemporalDisc {
    pub step_size: f64,
    pub final_time: f64,
}

/// Stage buffers reused across steps.
struct Rk4Workspace {
    k1: Array1<f64>,
    k2: Array1<f64>,
    k3: Array1<f64>,
    k4: Array1<f64>,
    stage: Array1<f64>,
}

impl Rk4Workspace {
    fn new(len: usize) -> Self {
        Self {
            k1: Array1::zeros(len),
            k2: Array1::zeros(len),
            k3: Array1::zeros(len),
            k4: Array1::zeros(len),
            stage: Array1::zeros(len),
        }
    }
}

impl TemporalDisc {
    pub fn new(step_size: f64, final_time: f64) -> Result<Self, SpectralError> {
        if !(step_size.is_finite() && step_size > 0.0) {
            return Err(SpectralError::InvalidConfiguration(format!(
                "step size must be positive, got {step_size}"
            )));
        }
        if !(final_time.is_finite() && final_time > 0.0) {
            return Err(SpectralError::InvalidConfiguration(format!(
                "final time must be positive, got {final_time}"
            )));
        }
        Ok(Self {
            step_size,
            final_time,
        })
    }
    /// ceil(final_time / step_size), ignoring round-off when the ratio is
    /// meant to be an integer.
    pub fn step_num(&self) -> usize {
        let ratio = self.final_time / self.step_size;
        let nearest = ratio.round();
        if (ratio - nearest).abs() <= 1e-9 * nearest.max(1.0) {
            nearest as usize
        } else {
            ratio.ceil() as usize
        }
    }
    /// Time after `step` steps. Computed directly so round-off does not
    /// accumulate over long runs.
    pub fn time_at(&self, step: usize) -> f64 {
        step as f64 * self.step_size
    }

    /// Advances `state` through every step, handing each new state to
    /// `recorder`. Returns the number of steps taken.
    pub fn time_march<S, R>(
        &self,
        spatial_disc: &S,
        state: &mut Array1<f64>,
        recorder: &mut R,
    ) -> Result<usize, SpectralError>
    where
        S: SpatialDisc,
        R: HistoryRecorder + ?Sized,
    {
        let step_num = self.step_num();
        let report_every = (step_num / 10).max(1);
        let mut workspace = Rk4Workspace::new(state.len());
        for step in 1..=step_num {
            let t = self.time_at(step - 1);
            rk4_step(spatial_disc, t, self.step_size, state, &mut workspace)?;
            let new_time = self.time_at(step);
            if state.iter().any(|v| !v.is_finite()) {
                return Err(SpectralError::NonFiniteState { time: new_time });
            }
            recorder.record(new_time, state.view())?;
            if step % report_every == 0 {
                debug!(step, step_num, time = new_time, "rk4 progress");
            }
        }
        Ok(step_num)
    }
}

fn rk4_step<S: SpatialDisc>(
    spatial_disc: &S,
    t: f64,
    h: f64,
    state: &mut Array1<f64>,
    ws: &mut Rk4Workspace,
) -> Result<(), SpectralError> {
    spatial_disc.compute_time_derivative(t, state.view(), ws.k1.view_mut())?;
    stage_into(&mut ws.stage, state.view(), ws.k1.view(), 0.5 * h);
    spatial_disc.compute_time_derivative(t + 0.5 * h, ws.stage.view(), ws.k2.view_mut())?;
    stage_into(&mut ws.stage, state.view(), ws.k2.view(), 0.5 * h);
    spatial_disc.compute_time_derivative(t + 0.5 * h, ws.stage.view(), ws.k3.view_mut())?;
    stage_into(&mut ws.stage, state.view(), ws.k3.view(), h);
    spatial_disc.compute_time_derivative(t + h, ws.stage.view(), ws.k4.view_mut())?;
    Zip::from(state)
        .and(&ws.k1)
        .and(&ws.k2)
        .and(&ws.k3)
        .and(&ws.k4)
        .for_each(|y, &k1, &k2, &k3, &k4| {
            *y += h / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4);
        });
    Ok(())
}

// stage = y + a * k
fn stage_into(stage: &mut Array1<f64>, y: ArrayView1<f64>, k: ArrayView1<f64>, a: f64) {
    Zip::from(stage)
        .and(&y)
        .and(&k)
        .for_each(|s, &yi, &ki| *s = yi + a * ki);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{ArrayViewMut1, array};

    /// dy/dt = -y + sin t
    struct ForcedDecay;
    impl SpatialDisc for ForcedDecay {
        fn compute_time_derivative(
            &self,
            t: f64,
            state: ArrayView1<f64>,
            mut dxdt: ArrayViewMut1<f64>,
        ) -> Result<(), SpectralError> {
            dxdt[0] = -state[0] + t.sin();
            Ok(())
        }
    }
    // y(0) = 1
    fn exact(t: f64) -> f64 {
        1.5 * (-t).exp() + 0.5 * (t.sin() - t.cos())
    }

    fn final_error(step_size: f64) -> f64 {
        let disc = TemporalDisc::new(step_size, 1.0).unwrap();
        let mut state = array![1.0];
        let mut last_time = 0.0;
        let mut recorder = |t: f64, _: ArrayView1<f64>| -> Result<(), SpectralError> {
            last_time = t;
            Ok(())
        };
        let steps = disc.time_march(&ForcedDecay, &mut state, &mut recorder).unwrap();
        assert_eq!(steps, disc.step_num());
        assert_relative_eq!(last_time, 1.0, epsilon = 1e-12);
        (state[0] - exact(1.0)).abs()
    }

    #[test]
    fn test_fourth_order_convergence() {
        let coarse = final_error(0.1);
        let fine = final_error(0.05);
        let rate = (coarse / fine).log2();
        assert!(rate > 3.5 && rate < 4.5, "observed order {rate}");
        assert!(fine < 1e-6);
    }

    #[test]
    fn test_step_num() {
        assert_eq!(TemporalDisc::new(0.001, 2.0).unwrap().step_num(), 2000);
        assert_eq!(TemporalDisc::new(0.1, 0.3).unwrap().step_num(), 3);
        assert_eq!(TemporalDisc::new(0.3, 1.0).unwrap().step_num(), 4);
        assert_eq!(TemporalDisc::new(2.0, 1.0).unwrap().step_num(), 1);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(TemporalDisc::new(0.0, 1.0).is_err());
        assert!(TemporalDisc::new(0.1, -1.0).is_err());
        assert!(TemporalDisc::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_non_finite_state_aborts() {
        struct Blowup;
        impl SpatialDisc for Blowup {
            fn compute_time_derivative(
                &self,
                _t: f64,
                _state: ArrayView1<f64>,
                mut dxdt: ArrayViewMut1<f64>,
            ) -> Result<(), SpectralError> {
                dxdt.fill(f64::INFINITY);
                Ok(())
            }
        }
        let disc = TemporalDisc::new(0.5, 2.0).unwrap();
        let mut state = array![0.0, 1.0];
        let mut recorded = 0;
        let mut recorder = |_: f64, _: ArrayView1<f64>| -> Result<(), SpectralError> {
            recorded += 1;
            Ok(())
        };
        let result = disc.time_march(&Blowup, &mut state, &mut recorder);
        assert!(matches!(result, Err(SpectralError::NonFiniteState { time }) if time == 0.5));
        assert_eq!(recorded, 0);
    }
}
