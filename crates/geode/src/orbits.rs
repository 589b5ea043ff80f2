//! Closed-form orbits used to set up and check trajectories.
//!
//! Each submodule covers one metric from [`metrics`](crate::metrics). The
//! conserved quantities are the energy-like `k = g_00 dt/ds` (plus the
//! frame-dragging term for Kerr) and the angular-momentum-like
//! `h = -g_33 dφ/ds`, both per unit rest mass.

pub mod de_sitter;
pub mod kerr;
pub mod lieu;
pub mod schwarzschild;

use tracing::warn;

use crate::OrbitError;

/// Negative squared speeds down to this value are treated as rounding error.
pub const ROUNDING_TOLERANCE: f64 = 1e-9;

/// The conserved quantities of a geodesic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitConstants {
    /// Energy per unit rest mass.
    pub k: f64,

    /// Angular momentum per unit rest mass.
    pub h: f64,
}

/// Returns a squared radial speed, with rounding-level negatives set to zero.
///
/// Closed-form squared speeds of circular orbits vanish analytically but
/// come out slightly negative in floating point. Those are clamped to zero
/// with a warning.
///
/// # Errors
///
/// Returns [`OrbitError::NegativeRadialSpeed`] if `value` is below
/// `-ROUNDING_TOLERANCE` or is NaN.
pub fn clamp_radial_speed_squared(value: f64) -> Result<f64, OrbitError> {
    if value >= 0.0 {
        Ok(value)
    } else if value >= -ROUNDING_TOLERANCE {
        warn!(value, "clamping negative radial speed squared to zero");
        Ok(0.0)
    } else {
        Err(OrbitError::NegativeRadialSpeed { value })
    }
}

/// Returns the radial speed for a squared value, clamping rounding error.
///
/// # Errors
///
/// Returns [`OrbitError::NegativeRadialSpeed`] if the squared value is
/// negative beyond rounding error.
pub(crate) fn radial_speed(squared: f64) -> Result<f64, OrbitError> {
    clamp_radial_speed_squared(squared).map(f64::sqrt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_level_negatives_are_clamped() {
        assert_eq!(clamp_radial_speed_squared(-1e-12), Ok(0.0));
        assert_eq!(clamp_radial_speed_squared(0.25), Ok(0.25));
        assert_eq!(radial_speed(0.25), Ok(0.5));
        assert_eq!(radial_speed(-1e-15), Ok(0.0));
    }

    #[test]
    fn large_negatives_are_errors() {
        assert_eq!(
            clamp_radial_speed_squared(-1e-3),
            Err(OrbitError::NegativeRadialSpeed { value: -1e-3 })
        );
        assert!(clamp_radial_speed_squared(f64::NAN).is_err());
    }
}
