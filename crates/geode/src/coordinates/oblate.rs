use geode_symbolic::Expr;
use ndarray::{Array2, ArrayView2};

use crate::Unsupported;

use super::{CoordinateSystem, map_samples};

/// Oblate spheroidal coordinates `(t, r, θ, φ)` with rotation parameter `a`.
///
/// These are the spatial coordinates of the Boyer-Lindquist form of the
/// Kerr metric. Surfaces of constant `r` are oblate spheroids with
/// Cartesian embedding
///
/// ```text
/// x = sqrt(r² + a²) sin θ cos φ
/// y = sqrt(r² + a²) sin θ sin φ
/// z = r cos θ
/// ```
///
/// With `a = 0` they reduce to ordinary spherical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OblateSpheroidal {
    a: f64,
}

impl OblateSpheroidal {
    #[must_use]
    pub fn new(a: f64) -> Self {
        Self { a }
    }

    /// Returns the rotation parameter.
    #[must_use]
    pub fn a(&self) -> f64 {
        self.a
    }
}

impl CoordinateSystem for OblateSpheroidal {
    fn name(&self) -> &'static str {
        "oblate spheroidal"
    }

    fn labels(&self) -> [&'static str; 4] {
        ["t", "r", "θ", "φ"]
    }

    fn velocity_equation(&self) -> Result<Expr, Unsupported> {
        let [_, r, theta, _] = self.coords();
        let [_, dr, dtheta, dphi] = std::array::from_fn(Expr::velocity);
        let a2 = self.a * self.a;

        let (sin2, cos2) = (theta.sin().powi(2), theta.cos().powi(2));
        let r2 = r.powi(2);

        let radial = dr.powi(2) * (&sin2 * &r2 / (&r2 + a2) + &cos2);
        let angular = &r2 * dtheta.powi(2) + &r2 * dphi.powi(2) * &sin2;
        let rotation = a2 * (dtheta.powi(2) * cos2 + dphi.powi(2) * sin2);

        Ok((radial + angular + rotation).sqrt())
    }

    fn to_cartesian(&self, positions: ArrayView2<'_, f64>) -> Result<Array2<f64>, Unsupported> {
        let a = self.a;
        Ok(map_samples(positions, |[t, r, theta, phi]| {
            let rho = r.hypot(a) * theta.sin();
            [t, rho * phi.cos(), rho * phi.sin(), r * theta.cos()]
        }))
    }

    fn to_spherical(&self, positions: ArrayView2<'_, f64>) -> Result<Array2<f64>, Unsupported> {
        let a = self.a;
        Ok(map_samples(positions, |[t, r, theta, phi]| {
            let (sin, cos) = theta.sin_cos();
            let radius = r.hypot(a * sin);
            let polar = (r.hypot(a) * sin).atan2(r * cos);
            [t, radius, polar, phi]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn spheroid_embedding() {
        let system = OblateSpheroidal::new(0.6);
        let positions = array![[1.0], [0.8], [std::f64::consts::FRAC_PI_2], [0.0]];
        let cartesian = system.to_cartesian(positions.view()).expect("supported");

        assert_relative_eq!(cartesian[[0, 0]], 1.0);
        assert_relative_eq!(cartesian[[1, 0]], 1.0, max_relative = 1e-12);
        assert_relative_eq!(cartesian[[2, 0]], 0.0, epsilon = 1e-12);
        assert_relative_eq!(cartesian[[3, 0]], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn spherical_view_matches_cartesian_view() {
        let system = OblateSpheroidal::new(0.45);
        let positions = array![[0.0, 2.0], [3.0, 1.2], [0.4, 2.3], [1.0, -2.0]];

        let cartesian = system.to_cartesian(positions.view()).expect("supported");
        let spherical = system.to_spherical(positions.view()).expect("supported");

        for k in 0..2 {
            let (x, y, z) = (cartesian[[1, k]], cartesian[[2, k]], cartesian[[3, k]]);
            let radius = (x * x + y * y + z * z).sqrt();
            assert_relative_eq!(spherical[[1, k]], radius, max_relative = 1e-12);
            assert_relative_eq!(spherical[[2, k]], (z / radius).acos(), max_relative = 1e-12);
            assert_relative_eq!(spherical[[3, k]], positions[[3, k]]);
        }
    }

    #[test]
    fn speed_of_rotation_about_the_axis() {
        // At the equator, x-y motion at radius sqrt(r² + a²).
        let (a, r, dphi) = (0.5, 2.0, 0.3);
        let speed = OblateSpheroidal::new(a)
            .velocity_equation()
            .expect("supported")
            .eval(&|var| match var {
                geode_symbolic::Var::Coordinate(1) => Some(r),
                geode_symbolic::Var::Coordinate(2) => Some(std::f64::consts::FRAC_PI_2),
                geode_symbolic::Var::Velocity(3) => Some(dphi),
                _ => Some(0.0),
            })
            .expect("bound");
        assert_relative_eq!(speed, r.hypot(a) * dphi, max_relative = 1e-12);
    }
}
