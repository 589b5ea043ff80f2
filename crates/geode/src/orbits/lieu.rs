//! Circular orbits in the logarithmic [`lieu`](crate::metrics::lieu) metric.

use crate::OrbitError;

use super::OrbitConstants;

/// The conserved quantities of the circular equatorial orbit of radius `r`.
///
/// # Errors
///
/// Returns [`OrbitError::NoCircularOrbit`] if the potential is not
/// attractive enough to hold a circular orbit at `r`.
pub fn circular_orbit(alpha: f64, r: f64) -> Result<OrbitConstants, OrbitError> {
    let lapse = 1.0 + alpha * r.ln();
    let binding = 1.0 + alpha * (r.ln() - 1.0);
    if !(lapse > 0.0) || !(binding > 0.0) || !(alpha > 0.0) {
        return Err(OrbitError::NoCircularOrbit { r });
    }
    Ok(OrbitConstants {
        k: lapse.powf(1.5) / binding.sqrt(),
        h: r * (alpha / binding).sqrt(),
    })
}

/// Four-velocity of the circular equatorial orbit `orbit` at radius `r`.
#[must_use]
pub fn initial_velocity(alpha: f64, r: f64, orbit: OrbitConstants) -> [f64; 4] {
    let lapse = 1.0 + alpha * r.ln();
    [orbit.k / (lapse * lapse), 0.0, 0.0, orbit.h / (r * r)]
}

/// Circular orbit speed `r dφ/dt` measured in coordinate time.
///
/// # Errors
///
/// Returns [`OrbitError::NoCircularOrbit`] if no circular orbit exists.
pub fn rotation_speed(alpha: f64, r: f64) -> Result<f64, OrbitError> {
    let orbit = circular_orbit(alpha, r)?;
    let u = initial_velocity(alpha, r, orbit);
    Ok(r * u[3] / u[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::f64::consts::FRAC_PI_2;

    use approx::assert_relative_eq;

    use crate::metrics;

    #[test]
    fn circular_velocity_is_normalized() {
        let (alpha, r) = (0.05, 12.0);
        let orbit = circular_orbit(alpha, r).expect("exists");
        let u = initial_velocity(alpha, r, orbit);

        let norm = metrics::lieu(alpha)
            .interval(&[0.0, r, FRAC_PI_2, 0.0], &u)
            .expect("bound");
        assert_relative_eq!(norm, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn rotation_curve_is_nearly_flat() {
        // v = sqrt(α) (1 + α ln r) in coordinate time, which grows only
        // logarithmically with radius.
        let alpha = 1e-6;
        let inner = rotation_speed(alpha, 10.0).expect("exists");
        let outer = rotation_speed(alpha, 1e4).expect("exists");
        assert_relative_eq!(inner, alpha.sqrt(), max_relative = 1e-4);
        assert_relative_eq!(outer / inner, 1.0, max_relative = 1e-4);
    }

    #[test]
    fn non_positive_alpha_has_no_orbit() {
        assert!(circular_orbit(0.0, 5.0).is_err());
        assert!(circular_orbit(-0.1, 5.0).is_err());
    }
}
