use geode_solvers::transient::ivp;
use geode_symbolic::{CompileError, DiffError, MatrixError, Var};
use thiserror::Error;

/// Errors raised while building a [`GeodesicField`](crate::GeodesicField)
/// or a [`MetricTensor`](crate::MetricTensor).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("metric is {metric}x{metric} but the coordinate system has {coordinates} coordinates")]
    DimensionMismatch { metric: usize, coordinates: usize },

    #[error("coordinate {index} is not the coordinate variable x{index}")]
    CoordinateOrder { index: usize },

    #[error("the affine parameter cannot be one of the coordinates")]
    AffineCoordinate,

    #[error("metric entry ({row}, {col}) depends on {var}, not only on the coordinates")]
    NonCoordinateDependence { row: usize, col: usize, var: Var },

    #[error("metric is not symmetric: entries ({row}, {col}) and ({col}, {row}) differ")]
    Asymmetric { row: usize, col: usize },

    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error("failed to compile the acceleration field: {0}")]
    Compile(#[from] CompileError),

    #[error("failed to differentiate the metric: {0}")]
    Diff(#[from] DiffError),
}

/// A capability a coordinate system does not provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{system} coordinates do not support {capability}")]
pub struct Unsupported {
    /// Name of the coordinate system.
    pub system: &'static str,

    /// The missing capability.
    pub capability: &'static str,
}

/// Errors that can occur while integrating or post-processing a [`Body`](crate::Body).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("body has no geodesic field to integrate")]
    NoField,

    #[error(transparent)]
    Solver(#[from] ivp::Error),

    #[error("invalid solver options: {0}")]
    Config(#[from] ivp::ConfigError),

    #[error(transparent)]
    Unsupported(#[from] Unsupported),

    #[error("at least 2 samples are needed, the trajectory has {0}")]
    TooFewSamples(usize),

    #[error("failed to compile the speed formula: {0}")]
    Compile(#[from] CompileError),
}

/// Errors from the closed-form orbit helpers.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum OrbitError {
    #[error("no circular orbit exists at r = {r}")]
    NoCircularOrbit { r: f64 },

    #[error("radial speed squared is {value}, which is not a rounding error")]
    NegativeRadialSpeed { value: f64 },

    #[error("spin a = {a} exceeds the extremal value rs/2 = {limit}")]
    ExtremalSpin { a: f64, limit: f64 },
}
