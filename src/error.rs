use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpectralError {
    #[error("invalid approximation order {order}")]
    InvalidOrder { order: usize },
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("root {root} of order {order} did not converge after {iterations} Newton iterations")]
    ConvergenceFailure {
        order: usize,
        root: usize,
        iterations: usize,
    },
    #[error("barycentric interpolation is singular at x = {x}")]
    InterpolationSingularity { x: f64 },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("state became non-finite at t = {time}")]
    NonFiniteState { time: f64 },
    #[error("history time {time} does not follow last recorded time {last}")]
    NonMonotonicTime { time: f64, last: f64 },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse parameters: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
}

impl SpectralError {
    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }
}
