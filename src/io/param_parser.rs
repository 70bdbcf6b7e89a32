use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::disc::boundary::{BoundarySignal, RightBoundary};
use crate::disc::gauss_points::NodeFamily;
use crate::disc::multi_domain::SchemeKind;
use crate::error::SpectralError;

#[derive(Deserialize, Debug)]
pub struct SolverParamParser {
    /// One approximation order per domain, left to right.
    pub orders: Vec<usize>,
    pub scheme: SchemeKind,
    #[serde(default)]
    pub node_family: Option<NodeFamily>,
    #[serde(default)]
    pub right_boundary: RightBoundary,
    #[serde(default)]
    pub boundary_signal: BoundarySignal,
    pub step_size: f64,
    pub final_time: f64,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default = "default_dump_interval")]
    pub dump_interval: usize,
}

fn default_dump_interval() -> usize {
    1
}

impl SolverParamParser {
    pub fn parse<P: AsRef<Path>>(file_path: P) -> Result<Self, SpectralError> {
        let file_content = fs::read_to_string(file_path)?;
        Self::parse_str(&file_content)
    }
    pub fn parse_str(content: &str) -> Result<Self, SpectralError> {
        Ok(serde_json::from_str(content)?)
    }
}
