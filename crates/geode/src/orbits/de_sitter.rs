//! Circular orbits in the
//! [`de_sitter_schwarzschild`](crate::metrics::de_sitter_schwarzschild) metric.

use std::f64::consts::TAU;

use crate::OrbitError;

use super::OrbitConstants;

/// `1 - rs/r - Λr²/3`, the time-time component of the metric.
fn lapse(rs: f64, lambda: f64, r: f64) -> f64 {
    1.0 - rs / r - lambda * r * r / 3.0
}

/// Squared angular velocity `(dφ/dt)²` of the circular orbit of radius `r`.
fn omega_squared(rs: f64, lambda: f64, r: f64) -> f64 {
    rs / (2.0 * r.powi(3)) - lambda / 3.0
}

/// The conserved quantities of the circular equatorial orbit of radius `r`.
///
/// # Errors
///
/// Returns [`OrbitError::NoCircularOrbit`] if `r` is inside the photon
/// sphere, or so far out that the cosmological repulsion wins.
pub fn circular_orbit(rs: f64, lambda: f64, r: f64) -> Result<OrbitConstants, OrbitError> {
    let binding = 1.0 - 1.5 * rs / r;
    let omega2 = omega_squared(rs, lambda, r);
    if !(binding > 0.0) || !(omega2 > 0.0) || r <= 0.0 {
        return Err(OrbitError::NoCircularOrbit { r });
    }
    Ok(OrbitConstants {
        k: lapse(rs, lambda, r) / binding.sqrt(),
        h: (omega2 / (binding / r.powi(4))).sqrt(),
    })
}

/// Period of the circular orbit of radius `r`, in coordinate time.
///
/// # Errors
///
/// Returns [`OrbitError::NoCircularOrbit`] if no circular orbit exists.
pub fn period(rs: f64, lambda: f64, r: f64) -> Result<f64, OrbitError> {
    let omega2 = omega_squared(rs, lambda, r);
    if !(omega2 > 0.0) {
        return Err(OrbitError::NoCircularOrbit { r });
    }
    Ok(TAU / omega2.sqrt())
}

/// Four-velocity of the circular equatorial orbit `orbit` at radius `r`.
#[must_use]
pub fn initial_velocity(rs: f64, lambda: f64, r: f64, orbit: OrbitConstants) -> [f64; 4] {
    [orbit.k / lapse(rs, lambda, r), 0.0, 0.0, orbit.h / (r * r)]
}
