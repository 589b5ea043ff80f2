use geode_symbolic::Expr;
use ndarray::{Array2, ArrayView2};

use crate::Unsupported;

use super::{CoordinateSystem, OblateSpheroidal};

/// Spherical coordinates `(t, r, θ, φ)`.
///
/// Every formula is the [`OblateSpheroidal`] one with `a = 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spherical;

impl Spherical {
    fn general() -> OblateSpheroidal {
        OblateSpheroidal::new(0.0)
    }
}

impl CoordinateSystem for Spherical {
    fn name(&self) -> &'static str {
        "spherical"
    }

    fn labels(&self) -> [&'static str; 4] {
        Self::general().labels()
    }

    fn velocity_equation(&self) -> Result<Expr, Unsupported> {
        Ok(Self::general().velocity_equation()?.simplify())
    }

    fn to_cartesian(&self, positions: ArrayView2<'_, f64>) -> Result<Array2<f64>, Unsupported> {
        Self::general().to_cartesian(positions)
    }

    fn to_spherical(&self, positions: ArrayView2<'_, f64>) -> Result<Array2<f64>, Unsupported> {
        Self::general().to_spherical(positions)
    }
}
