use geode_solvers::transient::ivp::{Config, ConfigError, Method, Trigger};
use serde::{Deserialize, Serialize};

use crate::field::STATE;

/// How a [`Body`](crate::Body) integrates its trajectory.
///
/// Options deserialize with defaults for any missing field, so a config
/// file only needs the values it changes:
///
/// ```
/// use geode::SolverOptions;
///
/// let options: SolverOptions = toml::from_str(r#"
///     time_interval = [0.0, 500.0]
///     method = "dopri5"
///     rtol = 1e-10
/// "#).unwrap();
///
/// assert_eq!(options.max_step, 1.0);
/// assert_eq!(options.rtol, 1e-10);
/// ```
///
/// Events are closures and are never serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverOptions {
    /// Start and end of the affine parameter.
    pub time_interval: [f64; 2],

    pub method: Method,

    /// Largest step the solver may take.
    pub max_step: f64,

    /// Absolute tolerance of adaptive methods.
    pub atol: f64,

    /// Relative tolerance of adaptive methods.
    pub rtol: f64,

    /// Largest number of accepted steps before the run is abandoned.
    pub max_steps: usize,

    /// Zero-crossing triggers over the state `[x0..x3, v0..v3]`.
    #[serde(skip)]
    pub events: Vec<Trigger<STATE>>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            time_interval: [0.0, 1.0],
            method: Method::Rosenbrock23,
            max_step: 1.0,
            atol: 1e-8,
            rtol: 1e-8,
            max_steps: 100_000,
            events: Vec::new(),
        }
    }
}

impl SolverOptions {
    /// Default options over `time_interval`.
    #[must_use]
    pub fn new(time_interval: [f64; 2]) -> Self {
        Self {
            time_interval,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_method(self, method: Method) -> Self {
        Self { method, ..self }
    }

    #[must_use]
    pub fn with_max_step(self, max_step: f64) -> Self {
        Self { max_step, ..self }
    }

    #[must_use]
    pub fn with_tolerances(self, atol: f64, rtol: f64) -> Self {
        Self { atol, rtol, ..self }
    }

    #[must_use]
    pub fn with_max_steps(self, max_steps: usize) -> Self {
        Self { max_steps, ..self }
    }

    /// Adds an event trigger.
    #[must_use]
    pub fn with_event(mut self, event: Trigger<STATE>) -> Self {
        self.events.push(event);
        self
    }

    /// Validates the numeric settings into a solver config.
    ///
    /// # Errors
    ///
    /// Returns an error if a step limit or tolerance is invalid.
    pub fn config(&self) -> Result<Config, ConfigError> {
        Config::new(self.max_step, self.atol, self.rtol, self.max_steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn defaults_favour_the_stiff_method() {
        let options = SolverOptions::default();
        assert_eq!(options.method, Method::Rosenbrock23);
        assert_relative_eq!(options.max_step, 1.0);
        assert_relative_eq!(options.atol, 1e-8);
        assert_relative_eq!(options.rtol, 1e-8);
        assert!(options.events.is_empty());
        assert!(options.config().is_ok());
    }

    #[test]
    fn builders_set_fields() {
        let options = SolverOptions::new([0.0, 10.0])
            .with_method(Method::Dopri5)
            .with_max_step(0.5)
            .with_tolerances(1e-10, 1e-9)
            .with_max_steps(10)
            .with_event(Trigger::new(|_, y: &[f64; STATE]| y[1] - 1.0));

        assert_eq!(options.time_interval, [0.0, 10.0]);
        assert_eq!(options.method, Method::Dopri5);
        assert_relative_eq!(options.max_step, 0.5);
        assert_relative_eq!(options.atol, 1e-10);
        assert_relative_eq!(options.rtol, 1e-9);
        assert_eq!(options.max_steps, 10);
        assert_eq!(options.events.len(), 1);
    }

    #[test]
    fn invalid_settings_are_reported() {
        let options = SolverOptions::default().with_max_step(-1.0);
        assert_eq!(options.config(), Err(ConfigError::MaxStep));

        let options = SolverOptions::default().with_tolerances(0.0, 0.0);
        assert_eq!(options.config(), Err(ConfigError::ZeroTolerance));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let options: SolverOptions = toml::from_str(
            r#"
            time_interval = [0.0, 250.0]
            method = "rk4"
            max_step = 0.25
            "#,
        )
        .expect("valid options");

        assert_eq!(options.time_interval, [0.0, 250.0]);
        assert_eq!(options.method, Method::Rk4);
        assert_relative_eq!(options.max_step, 0.25);
        assert_relative_eq!(options.atol, 1e-8);
        assert_eq!(options.max_steps, 100_000);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<SolverOptions, _> = toml::from_str("tolerance = 1e-6");
        assert!(result.is_err());
    }

    #[test]
    fn options_round_trip_through_toml() {
        let options = SolverOptions::new([1.0, 2.0]).with_method(Method::Dopri5);
        let text = toml::to_string(&options).expect("serializable");
        let back: SolverOptions = toml::from_str(&text).expect("valid options");
        assert_eq!(back.time_interval, options.time_interval);
        assert_eq!(back.method, options.method);
    }
}
