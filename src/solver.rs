use std::path::PathBuf;
use std::rc::Rc;

use ndarray::Array1;
use tracing::{info, warn};

use crate::disc::boundary::{BoundaryDriver, BoundarySignal, RightBoundary};
use crate::disc::gauss_points::NodeFamily;
use crate::disc::multi_domain::{DomainLayout, EvolutionScheme, Field, SchemeKind};
use crate::error::SpectralError;
use crate::history::{HistoryRecorder, StateHistory};
use crate::initialization::{initialize_bases, initialize_scheme, initialize_solution};
use crate::io::write_to_csv::write_to_csv;
use crate::temporal_disc::TemporalDisc;

#[derive(Clone, Debug, PartialEq)]
pub struct SolverParameters {
    pub orders: Vec<usize>,
    pub scheme: SchemeKind,
    pub node_family: NodeFamily,
    pub right_boundary: RightBoundary,
    pub boundary_signal: BoundarySignal,
    pub step_size: f64,
    pub final_time: f64,
    pub output_dir: Option<PathBuf>,
    pub dump_interval: usize,
}

pub struct WaveSolver<'a> {
    pub solutions: Array1<f64>,
    pub scheme: EvolutionScheme,
    pub temporal_disc: TemporalDisc,
    pub history: StateHistory,
    pub solver_params: &'a SolverParameters,
}

impl<'a> WaveSolver<'a> {
    pub fn new(solver_params: &'a SolverParameters) -> Result<Self, SpectralError> {
        let bases = initialize_bases(&solver_params.orders, solver_params.node_family)?;
        let layout = DomainLayout::new(bases)?;
        let driver: Rc<dyn BoundaryDriver> = Rc::new(solver_params.boundary_signal);
        let solutions = initialize_solution(&layout, driver.as_ref());
        let mut history = StateHistory::new(layout.clone());
        history.record(0.0, solutions.view())?;
        let scheme = initialize_scheme(layout, solver_params, driver)?;
        let temporal_disc = TemporalDisc::new(solver_params.step_size, solver_params.final_time)?;
        info!(
            domains = solver_params.orders.len(),
            unknowns = solutions.len(),
            scheme = ?solver_params.scheme,
            node_family = ?solver_params.node_family,
            right_boundary = ?solver_params.right_boundary,
            "initialized wave solver"
        );
        Ok(Self {
            solutions,
            scheme,
            temporal_disc,
            history,
            solver_params,
        })
    }

    pub fn solve(&mut self) -> Result<usize, SpectralError> {
        let step_num = self.temporal_disc.step_num();
        let end_time = self.temporal_disc.time_at(step_num);
        if end_time - self.temporal_disc.final_time > 1e-9 {
            warn!(
                end_time,
                final_time = self.temporal_disc.final_time,
                "step size does not divide the final time; the last step overshoots"
            );
        }
        info!(
            step_num,
            step_size = self.temporal_disc.step_size,
            final_time = self.temporal_disc.final_time,
            "time marching"
        );
        let taken =
            self.temporal_disc
                .time_march(&self.scheme, &mut self.solutions, &mut self.history)?;
        let final_time = self.temporal_disc.time_at(taken);
        if self.solver_params.right_boundary == RightBoundary::Transmitting {
            let deviation = self.exact_deviation(Field::Psi)?;
            info!(final_time, deviation, "finished; max |psi - exact|");
        } else {
            info!(final_time, "finished");
        }
        Ok(taken)
    }

    /// Max nodal deviation of the latest snapshot from the right-moving wave.
    /// Only meaningful while nothing has been reflected back.
    pub fn exact_deviation(&self, field: Field) -> Result<f64, SpectralError> {
        let driver = self.solver_params.boundary_signal;
        self.history
            .max_deviation(self.history.len() - 1, field, |x, t| {
                let (pi, psi) = driver.right_moving_wave(x, t);
                match field {
                    Field::Pi => pi,
                    Field::Psi => psi,
                }
            })
    }

    /// Latest value of `field` at global coordinate `x`.
    pub fn evaluate(&self, field: Field, x: f64) -> Result<f64, SpectralError> {
        let layout = self.history.layout();
        let domain_num = layout.domain_num();
        let right_end = 2.0 * domain_num as f64 - 1.0;
        if !(-1.0..=right_end).contains(&x) {
            return Err(SpectralError::InvalidConfiguration(format!(
                "x = {x} lies outside [-1, {right_end}]"
            )));
        }
        let domain = (((x + 1.0) / 2.0).floor() as usize).min(domain_num - 1);
        let function = self
            .history
            .function(self.history.len() - 1, domain, field)?;
        function.value_at_bary(x - 2.0 * domain as f64)
    }

    pub fn dump(&self) -> Result<(), SpectralError> {
        if let Some(output_dir) = &self.solver_params.output_dir {
            write_to_csv(&self.history, self.solver_params.dump_interval, output_dir)?;
            info!(path = %output_dir.display(), snapshots = self.history.len(), "wrote csv dumps");
        }
        Ok(())
    }
}
