//! Orbits in the [`kerr`](crate::metrics::kerr) metric.
//!
//! Orbits lie in the equatorial plane `θ = π/2` of Boyer-Lindquist
//! coordinates. The spin `a` must not exceed the extremal value `rs/2`.

use crate::OrbitError;

use super::{OrbitConstants, radial_speed};

/// Sense of an orbit relative to the black hole's spin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rotation {
    /// Co-rotating with the black hole.
    #[default]
    Prograde,

    /// Counter-rotating.
    Retrograde,
}

impl Rotation {
    fn sign(self) -> f64 {
        match self {
            Rotation::Prograde => 1.0,
            Rotation::Retrograde => -1.0,
        }
    }
}

fn check_spin(rs: f64, a: f64) -> Result<(), OrbitError> {
    let limit = rs / 2.0;
    if a.abs() > limit {
        return Err(OrbitError::ExtremalSpin { a, limit });
    }
    Ok(())
}

/// The conserved quantities of the circular equatorial orbit of radius `r`.
///
/// # Errors
///
/// Returns an error if the spin exceeds `rs/2` or no circular orbit of the
/// given sense exists at `r`.
pub fn circular_orbit(
    rs: f64,
    a: f64,
    r: f64,
    rotation: Rotation,
) -> Result<OrbitConstants, OrbitError> {
    check_spin(rs, a)?;

    let sigma = rotation.sign();
    let rot = sigma * a * (rs / (2.0 * r.powi(3))).sqrt();
    let binding = 1.0 - 1.5 * rs / r + 2.0 * rot;
    if !(binding > 0.0) || r <= 0.0 {
        return Err(OrbitError::NoCircularOrbit { r });
    }
    let den = binding.sqrt();

    Ok(OrbitConstants {
        k: (1.0 - rs / r + rot) / den,
        h: sigma * (r * rs / 2.0).sqrt() * (1.0 + a * a / (r * r) - 2.0 * rot) / den,
    })
}

/// The outer and inner horizon radii.
///
/// # Errors
///
/// Returns [`OrbitError::ExtremalSpin`] if the spin exceeds `rs/2`.
pub fn horizons(rs: f64, a: f64) -> Result<(f64, f64), OrbitError> {
    check_spin(rs, a)?;
    let root = (rs * rs - 4.0 * a * a).max(0.0).sqrt();
    Ok(((rs + root) / 2.0, (rs - root) / 2.0))
}

/// Boyer-Lindquist radius of the outer boundary of the ergosphere at polar
/// angle `theta`.
///
/// # Errors
///
/// Returns [`OrbitError::ExtremalSpin`] if the spin exceeds `rs/2`.
pub fn ergosphere(rs: f64, a: f64, theta: f64) -> Result<f64, OrbitError> {
    check_spin(rs, a)?;
    let cos = theta.cos();
    Ok(rs / 2.0 + (rs * rs / 4.0 - a * a * cos * cos).sqrt())
}

/// Squared radial speed `(dr/ds)²` of an equatorial orbit with conserved
/// quantities `orbit` at radius `r`.
#[must_use]
pub fn radial_speed_squared(rs: f64, a: f64, r: f64, orbit: OrbitConstants) -> f64 {
    let OrbitConstants { k, h } = orbit;
    let (r2, r3) = (r * r, r * r * r);
    k * k - 1.0 + rs / r + (a * a * (k * k - 1.0) - h * h) / r2 + rs * (h - a * k).powi(2) / r3
}

/// Four-velocity at radius `r` in the equatorial plane for the conserved
/// quantities `orbit`, moving outward.
///
/// # Errors
///
/// Returns an error if the spin exceeds `rs/2`, or the squared radial speed
/// is negative beyond rounding error.
pub fn initial_velocity(
    rs: f64,
    a: f64,
    r: f64,
    orbit: OrbitConstants,
) -> Result<[f64; 4], OrbitError> {
    check_spin(rs, a)?;

    let OrbitConstants { k, h } = orbit;
    let delta = r * r + a * a - r * rs;
    let tdot = ((r * r + a * a + a * a * rs / r) * k - a * rs * h / r) / delta;
    let phidot = (a * rs * k / r + (1.0 - rs / r) * h) / delta;
    let rdot = radial_speed(radial_speed_squared(rs, a, r, orbit))?;

    Ok([tdot, rdot, 0.0, phidot])
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use crate::{metrics, orbits::schwarzschild};

    #[test]
    fn spin_zero_matches_schwarzschild() {
        let (rs, r) = (1.0, 6.0);
        let kerr = circular_orbit(rs, 0.0, r, Rotation::Prograde).expect("exists");
        let schwarzschild = schwarzschild::circular_orbit(rs, r).expect("exists");
        assert_relative_eq!(kerr.k, schwarzschild.k, max_relative = 1e-14);
        assert_relative_eq!(kerr.h, schwarzschild.h, max_relative = 1e-14);

        let retrograde = circular_orbit(rs, 0.0, r, Rotation::Retrograde).expect("exists");
        assert_relative_eq!(retrograde.h, -kerr.h, max_relative = 1e-14);
    }

    #[test]
    fn circular_velocity_is_normalized_and_circular() {
        let (rs, a, r) = (1.0, 0.4, 5.0);
        for rotation in [Rotation::Prograde, Rotation::Retrograde] {
            let orbit = circular_orbit(rs, a, r, rotation).expect("exists");
            assert!(radial_speed_squared(rs, a, r, orbit).abs() < 1e-12);

            let u = initial_velocity(rs, a, r, orbit).expect("circular");
            assert!(u[1] < 1e-6);

            let position = [0.0, r, FRAC_PI_2, 0.0];
            let norm = metrics::kerr(rs, a).interval(&position, &u).expect("bound");
            assert_relative_eq!(norm, 1.0, max_relative = 1e-10);
        }
    }

    #[test]
    fn prograde_orbits_are_more_bound() {
        let (rs, a, r) = (1.0, 0.45, 4.0);
        let pro = circular_orbit(rs, a, r, Rotation::Prograde).expect("exists");
        let retro = circular_orbit(rs, a, r, Rotation::Retrograde).expect("exists");
        assert!(pro.k < retro.k);
        assert!(pro.h > 0.0 && retro.h < 0.0);
    }

    #[test]
    fn horizon_radii() {
        let (outer, inner) = horizons(1.0, 0.3).expect("sub-extremal");
        assert_relative_eq!(outer, 0.9);
        assert_relative_eq!(inner, 0.1, max_relative = 1e-12);
        assert_relative_eq!(outer + inner, 1.0);

        let (outer, inner) = horizons(1.0, 0.5).expect("extremal");
        assert_relative_eq!(outer, 0.5);
        assert_relative_eq!(inner, 0.5);
    }

    #[test]
    fn ergosphere_touches_the_horizon_at_the_poles() {
        let (rs, a) = (1.0, 0.3);
        let (outer, _) = horizons(rs, a).expect("sub-extremal");
        assert_relative_eq!(ergosphere(rs, a, 0.0).expect("valid"), outer, max_relative = 1e-12);
        assert_relative_eq!(ergosphere(rs, a, FRAC_PI_2).expect("valid"), rs);
    }

    #[test]
    fn super_extremal_spin_is_rejected() {
        let err = horizons(1.0, 0.6).unwrap_err();
        assert_eq!(err, OrbitError::ExtremalSpin { a: 0.6, limit: 0.5 });
        assert!(circular_orbit(1.0, 0.6, 5.0, Rotation::Prograde).is_err());
        assert!(ergosphere(1.0, -0.7, 0.0).is_err());
    }
}
