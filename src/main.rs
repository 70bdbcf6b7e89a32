mod disc;
mod error;
mod history;
mod initialization;
mod io;
mod solver;
mod temporal_disc;

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::SpectralError;
use crate::solver::WaveSolver;

const DEFAULT_PARAM_FILE: &str = "inputs/solverparam.json";

fn run(param_file: &str) -> Result<(), SpectralError> {
    let solver_params = initialization::initialize_params_by_file(param_file)?;
    info!(param_file, "loaded solver parameters");
    let mut solver = WaveSolver::new(&solver_params)?;
    solver.solve()?;
    solver.dump()?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let param_file = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_PARAM_FILE.to_string());
    match run(&param_file) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
