use thiserror::Error;

/// Configuration for the initial-value-problem solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    max_step: f64,
    atol: f64,
    rtol: f64,
    max_steps: usize,
    first_step: Option<f64>,
}

/// Errors that can occur when validating a solver config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_step must be positive (infinity means unbounded)")]
    MaxStep,

    #[error("atol must be finite and non-negative")]
    Atol,

    #[error("rtol must be finite and non-negative")]
    Rtol,

    #[error("atol and rtol cannot both be zero")]
    ZeroTolerance,

    #[error("max_steps must be at least one")]
    MaxSteps,

    #[error("first_step must be finite and positive")]
    FirstStep,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(f64::INFINITY, 1e-8, 1e-8, 100_000).unwrap()
    }
}

impl Config {
    /// Creates a new config with validated step limits and tolerances.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_step` is not positive, a tolerance is
    /// negative or non-finite, both tolerances are zero, or `max_steps` is
    /// zero.
    pub fn new(max_step: f64, atol: f64, rtol: f64, max_steps: usize) -> Result<Self, ConfigError> {
        if max_step.is_nan() || max_step <= 0.0 {
            return Err(ConfigError::MaxStep);
        }
        if !atol.is_finite() || atol < 0.0 {
            return Err(ConfigError::Atol);
        }
        if !rtol.is_finite() || rtol < 0.0 {
            return Err(ConfigError::Rtol);
        }
        if atol == 0.0 && rtol == 0.0 {
            return Err(ConfigError::ZeroTolerance);
        }
        if max_steps == 0 {
            return Err(ConfigError::MaxSteps);
        }

        Ok(Self {
            max_step,
            atol,
            rtol,
            max_steps,
            first_step: None,
        })
    }

    /// Sets the initial step size instead of estimating it.
    ///
    /// # Errors
    ///
    /// Returns an error if `first_step` is not finite and positive.
    pub fn with_first_step(self, first_step: f64) -> Result<Self, ConfigError> {
        if !first_step.is_finite() || first_step <= 0.0 {
            return Err(ConfigError::FirstStep);
        }
        Ok(Self {
            first_step: Some(first_step),
            ..self
        })
    }

    /// Returns the largest step the solver may take.
    #[must_use]
    pub fn max_step(&self) -> f64 {
        self.max_step
    }

    /// Returns the absolute error tolerance.
    #[must_use]
    pub fn atol(&self) -> f64 {
        self.atol
    }

    /// Returns the relative error tolerance.
    #[must_use]
    pub fn rtol(&self) -> f64 {
        self.rtol
    }

    /// Returns the maximum number of accepted steps.
    #[must_use]
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Returns the configured initial step, if any.
    #[must_use]
    pub fn first_step(&self) -> Option<f64> {
        self.first_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = Config::default();
        assert!(config.max_step().is_infinite());
        assert_eq!(config.max_steps(), 100_000);
        assert_eq!(config.first_step(), None);
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(Config::new(0.0, 1e-8, 1e-8, 10), Err(ConfigError::MaxStep));
        assert_eq!(Config::new(f64::NAN, 1e-8, 1e-8, 10), Err(ConfigError::MaxStep));
        assert_eq!(Config::new(1.0, -1.0, 1e-8, 10), Err(ConfigError::Atol));
        assert_eq!(Config::new(1.0, 1e-8, f64::NAN, 10), Err(ConfigError::Rtol));
        assert_eq!(Config::new(1.0, 0.0, 0.0, 10), Err(ConfigError::ZeroTolerance));
        assert_eq!(Config::new(1.0, 1e-8, 1e-8, 0), Err(ConfigError::MaxSteps));
        assert_eq!(
            Config::default().with_first_step(-0.1),
            Err(ConfigError::FirstStep)
        );
    }
}
