use super::ConfigError;

/// Errors that prevent integration from starting.
///
/// Numerical failures during integration are not errors: they are reported
/// through [`Status`](super::Status) alongside the samples computed so far.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("span [{start}, {end}] must be finite and increasing")]
    InvalidSpan { start: f64, end: f64 },

    #[error("initial state must be finite")]
    NonFiniteInitialState,

    #[error(transparent)]
    Config(#[from] ConfigError),
}
