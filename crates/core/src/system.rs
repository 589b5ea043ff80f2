/// A first-order system of ordinary differential equations.
///
/// The system describes `dy/ds = f(s, y)` for a state of `N` scalars. The
/// independent variable `s` is usually time, but the solvers only require it
/// to be a real parameter along the curve (an affine parameter for geodesics).
///
/// Implementations must be deterministic and free of side effects, since a
/// solver may evaluate the same point several times while it adapts its step.
pub trait OdeSystem<const N: usize> {
    /// Returns the derivative of the state at `(s, y)`.
    ///
    /// A system that is undefined at `y` (a coordinate singularity, for
    /// example) should return non-finite values rather than panic; solvers
    /// treat those as failed steps.
    fn derivative(&self, s: f64, y: &[f64; N]) -> [f64; N];
}

impl<const N: usize, T: OdeSystem<N> + ?Sized> OdeSystem<N> for &T {
    fn derivative(&self, s: f64, y: &[f64; N]) -> [f64; N] {
        (**self).derivative(s, y)
    }
}

/// A point along a solved trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<const N: usize> {
    /// The independent variable.
    pub s: f64,

    /// The state at `s`.
    pub y: [f64; N],
}

impl<const N: usize> Sample<N> {
    /// Creates a sample from a parameter value and a state.
    #[must_use]
    pub fn new(s: f64, y: [f64; N]) -> Self {
        Self { s, y }
    }

    /// Returns true if every state component is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.s.is_finite() && self.y.iter().all(|v| v.is_finite())
    }
}
