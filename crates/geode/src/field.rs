use std::{fmt, sync::Arc};

use geode_core::OdeSystem;
use geode_symbolic::{Compiled, Expr, Layout, Matrix, Var};
use tracing::debug;

use crate::{ConfigurationError, MetricTensor, coordinates::CoordinateSystem};

/// Number of coordinates of a spacetime.
pub const DIM: usize = 4;

/// Length of the geodesic state `[x0, x1, x2, x3, v0, v1, v2, v3]`.
pub const STATE: usize = 2 * DIM;

/// The geodesic equations of a metric, derived symbolically and compiled.
///
/// For velocities `u^m = dx^m/ds` the covariant acceleration is
///
/// ```text
/// a_j = 1/2 Σ_mk (∂g_mk/∂x^j) u^m u^k
/// ```
///
/// and the contravariant acceleration is
///
/// ```text
/// a^k = Σ_m g^mk (a_m - Σ_j (dg_mj/ds) u^j)
/// ```
///
/// where `dg/ds` is the derivative along the trajectory. Each `a^k` is
/// compiled into a closure over the state `[x0..x3, v0..v3]`.
///
/// A field is immutable and can be shared between any number of bodies.
#[derive(Clone)]
pub struct GeodesicField {
    coordinates: Arc<dyn CoordinateSystem>,
    metric: MetricTensor,
    acceleration: [Expr; DIM],
    compiled: [Compiled<STATE>; DIM],
}

impl GeodesicField {
    /// Derives and compiles the geodesic equations of `metric`.
    ///
    /// # Errors
    ///
    /// Returns an error if the metric is not `4 × 4`, the coordinate system
    /// does not list the coordinates `x0..x3` in order, or the metric is
    /// singular.
    pub fn new(
        coordinates: Arc<dyn CoordinateSystem>,
        metric: MetricTensor,
    ) -> Result<Self, ConfigurationError> {
        if metric.dim() != DIM {
            return Err(ConfigurationError::DimensionMismatch {
                metric: metric.dim(),
                coordinates: DIM,
            });
        }
        let coords = coordinates.coords();
        for (index, coord) in coords.iter().enumerate() {
            match coord.as_var() {
                Some(Var::Coordinate(i)) if i == index => {}
                Some(Var::Affine) => return Err(ConfigurationError::AffineCoordinate),
                _ => return Err(ConfigurationError::CoordinateOrder { index }),
            }
        }

        let acceleration = derive(&coords, &metric)?;
        let field = Self::compile(coordinates, metric, acceleration)?;
        debug!(
            coordinates = field.coordinates.name(),
            sizes = ?field.sizes(),
            "derived geodesic acceleration field"
        );
        Ok(field)
    }

    /// Returns a copy with every acceleration component simplified and
    /// recompiled.
    ///
    /// Simplification preserves values and is idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if a simplified component fails to compile.
    pub fn simplified(&self) -> Result<Self, ConfigurationError> {
        let before = self.sizes();
        let acceleration = self.acceleration.each_ref().map(Expr::simplify);
        let field = Self::compile(self.coordinates.clone(), self.metric.clone(), acceleration)?;
        debug!(
            coordinates = field.coordinates.name(),
            before = ?before,
            after = ?field.sizes(),
            "simplified geodesic acceleration field"
        );
        Ok(field)
    }

    fn compile(
        coordinates: Arc<dyn CoordinateSystem>,
        metric: MetricTensor,
        acceleration: [Expr; DIM],
    ) -> Result<Self, ConfigurationError> {
        let layout = Layout::phase_space(DIM);
        let [a0, a1, a2, a3] = &acceleration;
        let compiled = [
            a0.compile(layout)?,
            a1.compile(layout)?,
            a2.compile(layout)?,
            a3.compile(layout)?,
        ];
        Ok(Self {
            coordinates,
            metric,
            acceleration,
            compiled,
        })
    }

    #[must_use]
    pub fn coordinates(&self) -> &Arc<dyn CoordinateSystem> {
        &self.coordinates
    }

    #[must_use]
    pub fn metric(&self) -> &MetricTensor {
        &self.metric
    }

    /// The symbolic contravariant acceleration `a^k`.
    #[must_use]
    pub fn acceleration(&self) -> &[Expr; DIM] {
        &self.acceleration
    }

    /// Evaluates the contravariant acceleration at a state.
    #[must_use]
    pub fn accelerate(&self, state: &[f64; STATE]) -> [f64; DIM] {
        std::array::from_fn(|k| self.compiled[k].call(state))
    }

    fn sizes(&self) -> [usize; DIM] {
        self.acceleration.each_ref().map(Expr::size)
    }
}

/// Derives `a^k` for coordinates `coords` from `metric`.
fn derive(coords: &[Expr; DIM], metric: &MetricTensor) -> Result<[Expr; DIM], ConfigurationError> {
    let g = metric.matrix();
    let inverse = metric.inverse()?;

    let velocities = coords
        .each_ref()
        .map(Expr::total_derivative)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    let u = velocities.as_slice();
    let quadratic = |m: &Matrix| {
        Expr::sum((0..DIM).flat_map(|i| {
            (0..DIM).filter_map(move |j| {
                let entry = &m[(i, j)];
                (!entry.is_zero())
                    .then(|| Expr::product([entry.clone(), u[i].clone(), u[j].clone()]))
            })
        }))
    };

    let covariant: Vec<Expr> = (0..DIM)
        .map(|j| quadratic(&g.diff(Var::Coordinate(j))) * 0.5)
        .collect();

    let along = g.total_derivative()?;
    let transport: Vec<Expr> = (0..DIM)
        .map(|m| {
            Expr::sum((0..DIM).map(|j| Expr::product([along[(m, j)].clone(), u[j].clone()])))
        })
        .collect();

    Ok(std::array::from_fn(|k| {
        Expr::sum((0..DIM).filter_map(|m| {
            let g_mk = &inverse[(m, k)];
            (!g_mk.is_zero())
                .then(|| Expr::product([g_mk.clone(), &covariant[m] - &transport[m]]))
        }))
    }))
}

impl OdeSystem<STATE> for GeodesicField {
    fn derivative(&self, _s: f64, y: &[f64; STATE]) -> [f64; STATE] {
        let a = self.accelerate(y);
        [y[4], y[5], y[6], y[7], a[0], a[1], a[2], a[3]]
    }
}

impl fmt::Debug for GeodesicField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeodesicField")
            .field("coordinates", &self.coordinates)
            .field("metric", &self.metric)
            .field("acceleration", &self.acceleration)
            .finish_non_exhaustive()
    }
}
