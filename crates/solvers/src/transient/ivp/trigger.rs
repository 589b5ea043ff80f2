use std::{fmt, sync::Arc};

/// Which sign changes of a trigger function count as crossings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    /// Negative to non-negative or positive to non-positive.
    #[default]
    Any,

    /// Negative to non-negative only.
    Rising,

    /// Positive to non-positive only.
    Falling,
}

type TriggerFn<const N: usize> = Arc<dyn Fn(f64, &[f64; N]) -> f64 + Send + Sync>;

/// A scalar function of `(s, y)` whose zero crossings are located during integration.
///
/// Crossings are detected between accepted steps and refined on the step's
/// cubic Hermite interpolant. A terminal trigger ends the run at its first
/// crossing; a non-terminal trigger only records it.
#[derive(Clone)]
pub struct Trigger<const N: usize> {
    func: TriggerFn<N>,
    terminal: bool,
    direction: Direction,
}

impl<const N: usize> Trigger<N> {
    /// Creates a non-terminal trigger that fires in either direction.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(f64, &[f64; N]) -> f64 + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            terminal: false,
            direction: Direction::Any,
        }
    }

    /// Sets whether the first crossing ends the run.
    #[must_use]
    pub fn terminal(self, terminal: bool) -> Self {
        Self { terminal, ..self }
    }

    /// Restricts which sign changes count as crossings.
    #[must_use]
    pub fn direction(self, direction: Direction) -> Self {
        Self { direction, ..self }
    }

    /// Evaluates the trigger function.
    #[must_use]
    pub fn eval(&self, s: f64, y: &[f64; N]) -> f64 {
        (self.func)(s, y)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    #[must_use]
    pub fn crossing_direction(&self) -> Direction {
        self.direction
    }

    /// Returns true if going from `before` to `after` is a crossing.
    pub(super) fn crosses(&self, before: f64, after: f64) -> bool {
        let rising = before < 0.0 && after >= 0.0;
        let falling = before > 0.0 && after <= 0.0;
        match self.direction {
            Direction::Any => rising || falling,
            Direction::Rising => rising,
            Direction::Falling => falling,
        }
    }
}

impl<const N: usize> fmt::Debug for Trigger<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger")
            .field("terminal", &self.terminal)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

/// A located trigger crossing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerHit<const N: usize> {
    /// Index of the trigger in the slice passed to the solver.
    pub index: usize,

    /// Parameter at the crossing.
    pub s: f64,

    /// Interpolated state at the crossing.
    pub y: [f64; N],
}
