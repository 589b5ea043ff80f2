//! Metric tensors of well-known spacetimes.
//!
//! All metrics use the `(+, -, -, -)` signature and geometrized units, with
//! the horizon radius `rs = 2GM/c²` as the mass parameter.

use geode_symbolic::{Expr, Matrix};

use crate::MetricTensor;

/// Flat spacetime in [`Cartesian`](crate::coordinates::Cartesian) coordinates.
#[must_use]
pub fn minkowski() -> MetricTensor {
    MetricTensor::known(Matrix::diagonal(vec![
        Expr::one(),
        -Expr::one(),
        -Expr::one(),
        -Expr::one(),
    ]))
}

/// The static black hole in [`Spherical`](crate::coordinates::Spherical)
/// coordinates.
#[must_use]
pub fn schwarzschild(rs: f64) -> MetricTensor {
    let (r, theta) = (Expr::coordinate(1), Expr::coordinate(2));
    MetricTensor::known(Matrix::diagonal(vec![
        1.0 - rs / &r,
        (rs / &r - 1.0).recip(),
        -r.powi(2),
        -(r.powi(2) * theta.sin().powi(2)),
    ]))
}

/// A Schwarzschild black hole in a universe with cosmological constant
/// `lambda`, in [`Spherical`](crate::coordinates::Spherical) coordinates.
#[must_use]
pub fn de_sitter_schwarzschild(rs: f64, lambda: f64) -> MetricTensor {
    let (r, theta) = (Expr::coordinate(1), Expr::coordinate(2));
    let cosmological = r.powi(2) * (lambda / 3.0);
    MetricTensor::known(Matrix::diagonal(vec![
        1.0 - rs / &r - &cosmological,
        (cosmological + rs / &r - 1.0).recip(),
        -r.powi(2),
        -(r.powi(2) * theta.sin().powi(2)),
    ]))
}

/// The rotating black hole with spin `a`, in Boyer-Lindquist form over
/// [`OblateSpheroidal`](crate::coordinates::OblateSpheroidal) coordinates
/// with the same `a`.
#[must_use]
pub fn kerr(rs: f64, a: f64) -> MetricTensor {
    let (r, theta) = (Expr::coordinate(1), Expr::coordinate(2));
    let a2 = a * a;
    let sin2 = theta.sin().powi(2);

    let p2 = r.powi(2) + a2 * theta.cos().powi(2);
    let delta = r.powi(2) - rs * &r + a2;

    let g00 = 1.0 - rs * &r / &p2;
    let g03 = (a * rs) * &r * &sin2 / &p2;
    let g11 = -(&p2 / delta);
    let g22 = -p2.clone();
    let g33 = -(r.powi(2) + a2 + (a2 * rs) * &r * &sin2 / &p2) * &sin2;

    MetricTensor::known(Matrix::from_fn(4, |i, j| match (i, j) {
        (0, 0) => g00.clone(),
        (0, 3) | (3, 0) => g03.clone(),
        (1, 1) => g11.clone(),
        (2, 2) => g22.clone(),
        (3, 3) => g33.clone(),
        _ => Expr::zero(),
    }))
}

/// The Schwarzschild black hole in [`Lemaitre`](crate::coordinates::Lemaitre)
/// coordinates of a radially free-falling observer.
///
/// The metric is regular at the horizon, so trajectories can be followed
/// across it.
#[must_use]
pub fn lemaitre(rs: f64) -> MetricTensor {
    let (time, rho, theta) = (Expr::coordinate(0), Expr::coordinate(1), Expr::coordinate(2));
    let r = ((rho - time) * 1.5).powf(2.0 / 3.0) * rs.cbrt();
    MetricTensor::known(Matrix::diagonal(vec![
        Expr::one(),
        -(rs / &r),
        -r.powi(2),
        -(r.powi(2) * theta.sin().powi(2)),
    ]))
}

/// The Schwarzschild black hole in ingoing Eddington-Finkelstein
/// coordinates `(v, r, θ, φ)`, with `v = t + r*` the advanced time.
///
/// Unlike [`schwarzschild`], the metric stays invertible at `r = rs`.
/// Positions convert with the [`Spherical`](crate::coordinates::Spherical)
/// formulas, which leave the time row unchanged.
#[must_use]
pub fn eddington_finkelstein(rs: f64) -> MetricTensor {
    let (r, theta) = (Expr::coordinate(1), Expr::coordinate(2));
    let g00 = 1.0 - rs / &r;
    let g22 = -r.powi(2);
    let g33 = -(r.powi(2) * theta.sin().powi(2));

    MetricTensor::known(Matrix::from_fn(4, |i, j| match (i, j) {
        (0, 0) => g00.clone(),
        (0, 1) | (1, 0) => -Expr::one(),
        (2, 2) => g22.clone(),
        (3, 3) => g33.clone(),
        _ => Expr::zero(),
    }))
}

/// A static metric with a logarithmic potential, `g_00 = (1 + α ln r)²`.
///
/// Circular orbits in this metric have a flat rotation curve at large radii,
/// which makes it a toy model for galactic dynamics without dark matter.
#[must_use]
pub fn lieu(alpha: f64) -> MetricTensor {
    let (r, theta) = (Expr::coordinate(1), Expr::coordinate(2));
    MetricTensor::known(Matrix::diagonal(vec![
        (1.0 + alpha * r.ln()).powi(2),
        Expr::constant(-(1.0 + alpha).powi(2)),
        -r.powi(2),
        -(r.powi(2) * theta.sin().powi(2)),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn at(metric: &MetricTensor, position: [f64; 4]) -> ndarray::Array2<f64> {
        metric.evaluate(&position).expect("coordinates are bound")
    }

    #[test]
    fn every_constructor_is_a_valid_metric() {
        for metric in [
            minkowski(),
            schwarzschild(1.0),
            de_sitter_schwarzschild(1.0, 1e-4),
            kerr(1.0, 0.3),
            lemaitre(1.0),
            eddington_finkelstein(1.0),
            lieu(0.1),
        ] {
            assert_eq!(metric.dim(), 4);
            let rebuilt = MetricTensor::new(metric.matrix().clone());
            assert_eq!(rebuilt.as_ref(), Ok(&metric));
            assert!(metric.inverse().is_ok());
        }
    }

    #[test]
    fn kerr_without_spin_is_schwarzschild() {
        let position = [0.0, 4.0, 1.1, 0.3];
        let kerr = at(&kerr(1.0, 0.0), position);
        let schwarzschild = at(&schwarzschild(1.0), position);
        for (k, s) in kerr.iter().zip(schwarzschild.iter()) {
            assert_relative_eq!(*k, *s, max_relative = 1e-12);
        }
    }

    #[test]
    fn de_sitter_without_lambda_is_schwarzschild() {
        let position = [0.0, 3.0, 0.7, 0.0];
        let sitter = at(&de_sitter_schwarzschild(1.0, 0.0), position);
        let schwarzschild = at(&schwarzschild(1.0), position);
        for (d, s) in sitter.iter().zip(schwarzschild.iter()) {
            assert_relative_eq!(*d, *s, max_relative = 1e-12);
        }
    }

    #[test]
    fn kerr_frame_dragging_term() {
        let (rs, a, r) = (1.0, 0.4, 3.0);
        let g = at(&kerr(rs, a), [0.0, r, std::f64::consts::FRAC_PI_2, 0.0]);
        assert_relative_eq!(g[[0, 3]], a * rs / r, max_relative = 1e-12);
        assert_relative_eq!(g[[3, 0]], g[[0, 3]]);
        assert_relative_eq!(g[[1, 1]], -r * r / (r * r - rs * r + a * a), max_relative = 1e-12);
    }

    #[test]
    fn lemaitre_radial_term() {
        // r = rs where ρ - T = 2 rs / 3, so g_11 = -1 there.
        let rs = 1.5;
        let g = at(&lemaitre(rs), [0.25, 0.25 + 2.0 * rs / 3.0, 1.0, 0.0]);
        assert_relative_eq!(g[[0, 0]], 1.0);
        assert_relative_eq!(g[[1, 1]], -1.0, max_relative = 1e-12);
        assert_relative_eq!(g[[2, 2]], -rs * rs, max_relative = 1e-12);
    }

    #[test]
    fn eddington_finkelstein_is_regular_at_the_horizon() {
        let g = at(&eddington_finkelstein(1.0), [0.0, 1.0, 1.0, 0.0]);
        assert_relative_eq!(g[[0, 0]], 0.0);
        assert_relative_eq!(g[[0, 1]], -1.0);
        assert!(g.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn lieu_radial_terms() {
        let alpha = 0.2;
        let g = at(&lieu(alpha), [0.0, std::f64::consts::E, 1.0, 0.0]);
        assert_relative_eq!(g[[0, 0]], 1.44, max_relative = 1e-12);
        assert_relative_eq!(g[[1, 1]], -1.44, max_relative = 1e-12);
    }
}
