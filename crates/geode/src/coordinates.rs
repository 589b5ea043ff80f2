//! Coordinate systems for four-dimensional spacetimes.
//!
//! A [`CoordinateSystem`] names the four coordinates a metric is written in,
//! provides the coordinate-speed formula used by
//! [`Body::calculate_velocities`](crate::Body::calculate_velocities), and
//! converts sampled trajectories to Cartesian and canonical spherical
//! coordinates.
//!
//! Trajectories are `4 × N` arrays: one row per coordinate, one column per
//! sample. Index 0 is always the time-like coordinate.

mod cartesian;
mod lemaitre;
mod oblate;
mod spherical;

pub use cartesian::Cartesian;
pub use lemaitre::Lemaitre;
pub use oblate::OblateSpheroidal;
pub use spherical::Spherical;

use std::fmt;

use geode_symbolic::Expr;
use ndarray::{Array2, ArrayView2, Axis};

use crate::Unsupported;

/// The four generalized coordinates of a spacetime.
///
/// Coordinate `i` is the symbolic variable [`Expr::coordinate(i)`], a
/// function of the affine parameter whose derivative is
/// [`Expr::velocity(i)`]. A metric written for this system must order its
/// rows and columns the same way.
pub trait CoordinateSystem: fmt::Debug + Send + Sync {
    /// A short name for logs and errors.
    fn name(&self) -> &'static str;

    /// Human-readable labels of the four coordinates.
    fn labels(&self) -> [&'static str; 4];

    /// The symbolic coordinates, in metric order.
    fn coords(&self) -> [Expr; 4] {
        std::array::from_fn(Expr::coordinate)
    }

    /// The affine parameter the coordinates are functions of.
    fn interval(&self) -> Expr {
        Expr::affine()
    }

    /// The labels formatted as a tuple, such as `(t, r, θ, φ)`.
    fn coords_string(&self) -> String {
        format!("({})", self.labels().join(", "))
    }

    /// The coordinate speed of a particle.
    ///
    /// The formula is written in terms of the spatial coordinates `x1..x3`
    /// and their rates of change `v1..v3`.
    ///
    /// # Errors
    ///
    /// Returns [`Unsupported`] if the system has no speed formula.
    fn velocity_equation(&self) -> Result<Expr, Unsupported>;

    /// Converts a `4 × N` trajectory to Cartesian `(t, x, y, z)`.
    ///
    /// # Errors
    ///
    /// Returns [`Unsupported`] if the system has no such conversion.
    ///
    /// # Panics
    ///
    /// Panics if `positions` does not have four rows.
    fn to_cartesian(&self, positions: ArrayView2<'_, f64>) -> Result<Array2<f64>, Unsupported>;

    /// Converts a `4 × N` trajectory to spherical `(t, r, θ, φ)`.
    ///
    /// # Errors
    ///
    /// Returns [`Unsupported`] if the system has no such conversion.
    ///
    /// # Panics
    ///
    /// Panics if `positions` does not have four rows.
    fn to_spherical(&self, positions: ArrayView2<'_, f64>) -> Result<Array2<f64>, Unsupported>;
}

/// Applies `f` to every sample (column) of a `4 × N` trajectory.
fn map_samples<F>(positions: ArrayView2<'_, f64>, f: F) -> Array2<f64>
where
    F: Fn([f64; 4]) -> [f64; 4],
{
    assert_eq!(positions.nrows(), 4, "trajectories have four rows");

    let mut out = Array2::zeros(positions.raw_dim());
    for (column, mut target) in positions
        .axis_iter(Axis(1))
        .zip(out.axis_iter_mut(Axis(1)))
    {
        let mapped = f([column[0], column[1], column[2], column[3]]);
        for (slot, value) in target.iter_mut().zip(mapped) {
            *slot = value;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn default_symbols() {
        let system = Spherical;
        assert_eq!(system.coords()[2], Expr::coordinate(2));
        assert_eq!(system.interval(), Expr::affine());
        assert_eq!(system.coords_string(), "(t, r, θ, φ)");
        assert_eq!(Cartesian.coords_string(), "(t, x, y, z)");
    }

    #[test]
    fn samples_are_mapped_column_by_column() {
        let positions = array![[0.0, 1.0], [1.0, 2.0], [2.0, 3.0], [3.0, 4.0]];
        let doubled = map_samples(positions.view(), |p| p.map(|v| 2.0 * v));

        assert_eq!(doubled.dim(), (4, 2));
        assert_relative_eq!(doubled[[3, 1]], 8.0);
        assert_relative_eq!(doubled[[1, 0]], 2.0);
    }
}
