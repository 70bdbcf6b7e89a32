use std::path::{Path, PathBuf};
use std::rc::Rc;

use hashbrown::HashMap;
use ndarray::Array1;

use crate::disc::basis::lagrange1d::LagrangeBasis1D;
use crate::disc::boundary::BoundaryDriver;
use crate::disc::gauss_points::NodeFamily;
use crate::disc::multi_domain::{
    CollocationCoupling, DgFluxCoupling, DomainLayout, EvolutionScheme, Field, SchemeKind,
};
use crate::error::SpectralError;
use crate::io::param_parser::SolverParamParser;
use crate::solver::SolverParameters;

pub fn initialize_params_by_file<P: AsRef<Path>>(
    file_path: P,
) -> Result<SolverParameters, SpectralError> {
    let parser = SolverParamParser::parse(file_path)?;
    initialize_params(parser)
}

/// Checks the parsed parameters and fills in the scheme's default node family.
pub fn initialize_params(parser: SolverParamParser) -> Result<SolverParameters, SpectralError> {
    if parser.orders.is_empty() {
        return Err(SpectralError::InvalidConfiguration(
            "`orders` must name at least one domain".to_string(),
        ));
    }
    let node_family = parser
        .node_family
        .unwrap_or_else(|| parser.scheme.default_node_family());
    if parser.scheme == SchemeKind::Collocation && node_family != NodeFamily::GaussLobatto {
        return Err(SpectralError::InvalidConfiguration(
            "the collocation scheme needs gauss_lobatto nodes".to_string(),
        ));
    }
    for (name, value) in [
        ("step_size", parser.step_size),
        ("final_time", parser.final_time),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(SpectralError::InvalidConfiguration(format!(
                "`{name}` must be positive, got {value}"
            )));
        }
    }
    if parser.dump_interval == 0 {
        return Err(SpectralError::InvalidConfiguration(
            "`dump_interval` must be at least 1".to_string(),
        ));
    }
    Ok(SolverParameters {
        orders: parser.orders,
        scheme: parser.scheme,
        node_family,
        right_boundary: parser.right_boundary,
        boundary_signal: parser.boundary_signal,
        step_size: parser.step_size,
        final_time: parser.final_time,
        output_dir: parser.output_dir.map(PathBuf::from),
        dump_interval: parser.dump_interval,
    })
}

/// One basis per distinct order; domains of equal order share it.
pub fn initialize_bases(
    orders: &[usize],
    family: NodeFamily,
) -> Result<Vec<Rc<LagrangeBasis1D>>, SpectralError> {
    let mut cache: HashMap<usize, Rc<LagrangeBasis1D>> = HashMap::new();
    let mut bases = Vec::with_capacity(orders.len());
    for &order in orders {
        let basis = match cache.get(&order) {
            Some(basis) => basis.clone(),
            None => {
                let basis = Rc::new(LagrangeBasis1D::new(order, family)?);
                cache.insert(order, basis.clone());
                basis
            }
        };
        bases.push(basis);
    }
    Ok(bases)
}

pub fn initialize_scheme(
    layout: DomainLayout,
    params: &SolverParameters,
    driver: Rc<dyn BoundaryDriver>,
) -> Result<EvolutionScheme, SpectralError> {
    Ok(match params.scheme {
        SchemeKind::Dg => EvolutionScheme::DgFlux(DgFluxCoupling::new(
            layout,
            driver,
            params.right_boundary,
        )?),
        SchemeKind::Collocation => EvolutionScheme::Collocation(CollocationCoupling::new(
            layout,
            driver,
            params.right_boundary,
        )?),
    })
}

/// Right-moving wave launched by the driver, at t = 0.
pub fn initialize_solution(layout: &DomainLayout, driver: &dyn BoundaryDriver) -> Array1<f64> {
    layout.fill_state(|field, x| {
        let (pi, psi) = driver.right_moving_wave(x, 0.0);
        match field {
            Field::Pi => pi,
            Field::Psi => psi,
        }
    })
}
