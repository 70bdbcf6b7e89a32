use ndarray::{Array1, ArrayView1};
use ndarray_stats::QuantileExt;

use crate::disc::multi_domain::{DomainLayout, Field};
use crate::disc::spectral_function::SpectralFunction;
use crate::error::SpectralError;

/// Receives the state after every accepted time step.
pub trait HistoryRecorder {
    fn record(&mut self, time: f64, state: ArrayView1<f64>) -> Result<(), SpectralError>;
}

impl<F> HistoryRecorder for F
where
    F: FnMut(f64, ArrayView1<f64>) -> Result<(), SpectralError>,
{
    fn record(&mut self, time: f64, state: ArrayView1<f64>) -> Result<(), SpectralError> {
        self(time, state)
    }
}

pub struct Snapshot {
    pub time: f64,
    /// per domain, indexed by `Field::index`
    pub fields: Vec<[SpectralFunction; 2]>,
}

/// Append-only record of the evolution; every stored function shares its
/// domain's basis.
pub struct StateHistory {
    layout: DomainLayout,
    snapshots: Vec<Snapshot>,
}

impl StateHistory {
    pub fn new(layout: DomainLayout) -> Self {
        Self {
            layout,
            snapshots: Vec::new(),
        }
    }
    pub fn layout(&self) -> &DomainLayout {
        &self.layout
    }
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }
    pub fn times(&self) -> Vec<f64> {
        self.snapshots.iter().map(|snapshot| snapshot.time).collect()
    }
    pub fn snapshot(&self, step: usize) -> Result<&Snapshot, SpectralError> {
        self.snapshots.get(step).ok_or(SpectralError::IndexOutOfRange {
            index: step,
            len: self.snapshots.len(),
        })
    }
    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }
    pub fn function(
        &self,
        step: usize,
        domain: usize,
        field: Field,
    ) -> Result<&SpectralFunction, SpectralError> {
        let snapshot = self.snapshot(step)?;
        let domain_fields = snapshot
            .fields
            .get(domain)
            .ok_or(SpectralError::IndexOutOfRange {
                index: domain,
                len: snapshot.fields.len(),
            })?;
        Ok(&domain_fields[field.index()])
    }

    /// (time, c_mode) for every snapshot.
    pub fn mode_series(
        &self,
        domain: usize,
        field: Field,
        mode: usize,
    ) -> Result<Vec<(f64, f64)>, SpectralError> {
        (0..self.len())
            .map(|step| {
                let function = self.function(step, domain, field)?;
                Ok((self.snapshots[step].time, function.modal_coefficient(mode)?))
            })
            .collect()
    }

    /// Largest nodal |f - exact(x, t)| over all domains at `step`, with `x`
    /// the global coordinate.
    pub fn max_deviation<F>(&self, step: usize, field: Field, exact: F) -> Result<f64, SpectralError>
    where
        F: Fn(f64, f64) -> f64,
    {
        let snapshot = self.snapshot(step)?;
        let mut deviations = Vec::new();
        for (domain, fields) in snapshot.fields.iter().enumerate() {
            let function = &fields[field.index()];
            let points = &function.basis().cell_gauss_points;
            for (&x, &value) in points.iter().zip(function.collocation_data().iter()) {
                let global_x = self.layout.global_coordinate(domain, x);
                deviations.push((value - exact(global_x, snapshot.time)).abs());
            }
        }
        Ok(*Array1::from(deviations).max_skipnan())
    }
}

impl HistoryRecorder for StateHistory {
    fn record(&mut self, time: f64, state: ArrayView1<f64>) -> Result<(), SpectralError> {
        self.layout.check_len(state.len())?;
        if let Some(last) = self.snapshots.last() {
            if time <= last.time {
                return Err(SpectralError::NonMonotonicTime {
                    time,
                    last: last.time,
                });
            }
        }
        let mut fields = Vec::with_capacity(self.layout.domain_num());
        for (domain, basis) in self.layout.bases().iter().enumerate() {
            let [pi, psi] = Field::ALL.map(|field| {
                let range = self.layout.field_range(domain, field);
                SpectralFunction::with_collocation_data(
                    basis.clone(),
                    state.slice(ndarray::s![range]).to_owned(),
                )
            });
            fields.push([pi?, psi?]);
        }
        self.snapshots.push(Snapshot { time, fields });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::basis::lagrange1d::LagrangeBasis1D;
    use crate::disc::gauss_points::NodeFamily;
    use approx::assert_relative_eq;
    use std::rc::Rc;

    fn layout() -> DomainLayout {
        let basis = Rc::new(LagrangeBasis1D::new(5, NodeFamily::GaussLegendre).unwrap());
        DomainLayout::new(vec![basis.clone(), basis]).unwrap()
    }

    #[test]
    fn test_record_and_lookup() {
        let layout = layout();
        let mut history = StateHistory::new(layout.clone());
        for step in 0..3 {
            let t = 0.5 * step as f64;
            let state = layout.fill_state(|field, x| match field {
                Field::Pi => t,
                Field::Psi => x,
            });
            history.record(t, state.view()).unwrap();
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.times(), vec![0.0, 0.5, 1.0]);
        let pi = history.function(2, 1, Field::Pi).unwrap();
        assert_eq!(pi.value_at_node(3).unwrap(), 1.0);
        assert!(Rc::ptr_eq(pi.basis(), layout.basis(1)));
        let psi = history.function(1, 1, Field::Psi).unwrap();
        assert_relative_eq!(psi.value_at_bary(0.0).unwrap(), 2.0, epsilon = 1e-13);
        assert!(history.function(3, 0, Field::Pi).is_err());
        assert!(history.function(0, 2, Field::Pi).is_err());

        let series = history.mode_series(0, Field::Pi, 0).unwrap();
        assert_eq!(series.len(), 3);
        assert_relative_eq!(series[2].1, 1.0, epsilon = 1e-13);
        let deviation = history.max_deviation(1, Field::Psi, |x, _| x).unwrap();
        assert!(deviation < 1e-15);
        let deviation = history.max_deviation(2, Field::Pi, |_, _| 0.0).unwrap();
        assert_relative_eq!(deviation, 1.0);
    }

    #[test]
    fn test_rejects_bad_records() {
        let layout = layout();
        let mut history = StateHistory::new(layout.clone());
        assert!(history.record(0.0, Array1::zeros(3).view()).is_err());
        history.record(1.0, Array1::zeros(20).view()).unwrap();
        assert!(matches!(
            history.record(1.0, Array1::zeros(20).view()),
            Err(SpectralError::NonMonotonicTime { .. })
        ));
        assert_eq!(history.len(), 1);
    }
}
