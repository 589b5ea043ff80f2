//! Orbits in the [`schwarzschild`](crate::metrics::schwarzschild) metric.
//!
//! Positions are `(t, r, θ, φ)` and orbits lie in the equatorial plane
//! `θ = π/2` unless stated otherwise.

use std::f64::consts::{FRAC_PI_2, TAU};

use ndarray::{Array1, ArrayView2};

use crate::OrbitError;

use super::{OrbitConstants, radial_speed};

/// The conserved quantities of the circular orbit of radius `r`.
///
/// # Errors
///
/// Returns [`OrbitError::NoCircularOrbit`] unless `r` is outside the photon
/// sphere at `1.5 rs`.
pub fn circular_orbit(rs: f64, r: f64) -> Result<OrbitConstants, OrbitError> {
    let binding = 1.0 - 1.5 * rs / r;
    if !(binding > 0.0) || r <= 0.0 {
        return Err(OrbitError::NoCircularOrbit { r });
    }
    Ok(OrbitConstants {
        k: (1.0 - rs / r) / binding.sqrt(),
        h: (r * rs / (2.0 - 3.0 * rs / r)).sqrt(),
    })
}

/// Period of the circular orbit of radius `r`, in coordinate time.
#[must_use]
pub fn period(rs: f64, r: f64) -> f64 {
    TAU * (2.0 * r.powi(3) / rs).sqrt()
}

/// Squared radial speed `(dr/ds)²` of an equatorial orbit with conserved
/// quantities `orbit` at radius `r`.
#[must_use]
pub fn radial_speed_squared(rs: f64, r: f64, orbit: OrbitConstants) -> f64 {
    let OrbitConstants { k, h } = orbit;
    k * k - (1.0 - rs / r) * (1.0 + h * h / (r * r))
}

/// Position at radius `r` in the equatorial plane, at `t = φ = 0`.
#[must_use]
pub fn equatorial_position(r: f64) -> [f64; 4] {
    [0.0, r, FRAC_PI_2, 0.0]
}

/// Four-velocity at radius `r` in the equatorial plane for the conserved
/// quantities `orbit`, moving outward.
///
/// # Errors
///
/// Returns [`OrbitError::NegativeRadialSpeed`] if `r` is a turning point
/// the orbit cannot reach.
pub fn initial_velocity(rs: f64, r: f64, orbit: OrbitConstants) -> Result<[f64; 4], OrbitError> {
    let rdot = radial_speed(radial_speed_squared(rs, r, orbit))?;
    Ok([orbit.k / (1.0 - rs / r), rdot, 0.0, orbit.h / (r * r)])
}

/// The energy `k = (1 - rs/r) dt/ds` at every sample of a trajectory.
#[must_use]
pub fn energy(
    rs: f64,
    positions: ArrayView2<'_, f64>,
    velocities: ArrayView2<'_, f64>,
) -> Array1<f64> {
    let r = positions.row(1);
    let tdot = velocities.row(0);
    Array1::from_shape_fn(r.len(), |k| (1.0 - rs / r[k]) * tdot[k])
}

/// The angular momentum `h = r² sin²θ dφ/ds` at every sample of a trajectory.
#[must_use]
pub fn angular_momentum(
    positions: ArrayView2<'_, f64>,
    velocities: ArrayView2<'_, f64>,
) -> Array1<f64> {
    let (r, theta) = (positions.row(1), positions.row(2));
    let phidot = velocities.row(3);
    Array1::from_shape_fn(r.len(), |k| (r[k] * theta[k].sin()).powi(2) * phidot[k])
}
