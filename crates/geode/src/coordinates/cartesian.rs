use geode_symbolic::Expr;
use ndarray::{Array2, ArrayView2};

use crate::Unsupported;

use super::{CoordinateSystem, map_samples};

/// Cartesian coordinates `(t, x, y, z)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cartesian;

impl CoordinateSystem for Cartesian {
    fn name(&self) -> &'static str {
        "cartesian"
    }

    fn labels(&self) -> [&'static str; 4] {
        ["t", "x", "y", "z"]
    }

    fn velocity_equation(&self) -> Result<Expr, Unsupported> {
        let [_, vx, vy, vz] = std::array::from_fn(Expr::velocity);
        Ok((vx.powi(2) + vy.powi(2) + vz.powi(2)).sqrt())
    }

    fn to_cartesian(&self, positions: ArrayView2<'_, f64>) -> Result<Array2<f64>, Unsupported> {
        assert_eq!(positions.nrows(), 4, "trajectories have four rows");
        Ok(positions.to_owned())
    }

    fn to_spherical(&self, positions: ArrayView2<'_, f64>) -> Result<Array2<f64>, Unsupported> {
        Ok(map_samples(positions, |[t, x, y, z]| {
            let rho = x.hypot(y);
            [t, rho.hypot(z), rho.atan2(z), y.atan2(x)]
        }))
    }
}
