mod dopri5;
mod rk4;
mod rosenbrock;

pub(super) use dopri5::Dopri5;
pub(super) use rk4::Rk4;
pub(super) use rosenbrock::Rosenbrock23;

use geode_core::OdeSystem;

use super::Stats;

/// Integration method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Method {
    /// Classic fourth-order Runge-Kutta with a fixed step.
    Rk4,

    /// Dormand-Prince 5(4), adaptive and explicit.
    Dopri5,

    /// Rosenbrock 2(3), adaptive and L-stable, for stiff problems.
    #[default]
    Rosenbrock23,
}

impl Method {
    /// Returns true if the method controls its step from an error estimate.
    #[must_use]
    pub fn is_adaptive(self) -> bool {
        !matches!(self, Method::Rk4)
    }

    /// Returns true if the method is suited to stiff problems.
    #[must_use]
    pub fn is_stiff(self) -> bool {
        matches!(self, Method::Rosenbrock23)
    }
}

/// Result of a single step attempt.
pub(super) struct Attempt<const N: usize> {
    /// Proposed state at the end of the step.
    pub y: [f64; N],

    /// Derivative at the proposed state.
    pub f: [f64; N],

    /// Local error estimate per component.
    pub error: [f64; N],
}

/// A one-step method that advances the state by `h`.
pub(super) trait Stepper<const N: usize> {
    /// Order of the embedded error estimate, used by the step controller.
    const ERROR_ORDER: u32;

    /// Attempts a step of size `h` from `(s, y)` where `f = f(s, y)`.
    fn attempt<S: OdeSystem<N>>(
        &mut self,
        system: &S,
        s: f64,
        y: &[f64; N],
        f: &[f64; N],
        h: f64,
        stats: &mut Stats,
    ) -> Attempt<N>;

    /// Called after a step is accepted so cached data can be dropped.
    fn accepted(&mut self) {}
}

/// Computes `y + h * Σ c_j k_j`.
pub(super) fn combine<const N: usize>(
    y: &[f64; N],
    h: f64,
    terms: &[(f64, &[f64; N])],
) -> [f64; N] {
    std::array::from_fn(|i| y[i] + h * terms.iter().map(|(c, k)| c * k[i]).sum::<f64>())
}

pub(super) fn evaluate<S: OdeSystem<N>, const N: usize>(
    system: &S,
    s: f64,
    y: &[f64; N],
    stats: &mut Stats,
) -> [f64; N] {
    stats.evaluations += 1;
    system.derivative(s, y)
}
