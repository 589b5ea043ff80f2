use geode_core::Sample;

use super::TriggerHit;

/// Indicates how the solver terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Reached the end of the span.
    Complete,

    /// A terminal trigger fired; the last sample is the crossing point.
    Triggered {
        /// Index of the trigger in the slice passed to the solver.
        index: usize,
    },

    /// Stopped early due to an observer action.
    StoppedByObserver,

    /// Used up the configured number of accepted steps.
    StepBudgetExceeded,

    /// The adaptive step shrank below the resolution of the parameter.
    StepSizeTooSmall,

    /// The derivative or the state became NaN or infinite.
    NonFiniteState,

    /// A fixed step disagreed with the same step taken in two halves, so the
    /// step size no longer resolves the solution.
    Diverged,
}

impl Status {
    /// Returns true if the solver ended without a numerical failure.
    #[must_use]
    pub fn is_success(self) -> bool {
        matches!(
            self,
            Status::Complete | Status::Triggered { .. } | Status::StoppedByObserver
        )
    }
}

/// Work counters for a solver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Number of derivative evaluations.
    pub evaluations: usize,

    /// Number of Jacobian approximations.
    pub jacobians: usize,

    /// Number of accepted steps.
    pub accepted: usize,

    /// Number of rejected steps.
    pub rejected: usize,
}

/// The result of an initial-value-problem integration.
#[derive(Debug, Clone)]
pub struct Solution<const N: usize> {
    /// How the solver terminated.
    pub status: Status,

    /// Samples at every accepted step, starting with the initial state.
    pub samples: Vec<Sample<N>>,

    /// Every trigger crossing found, in order of the parameter.
    pub hits: Vec<TriggerHit<N>>,

    /// Work counters.
    pub stats: Stats,
}

impl<const N: usize> Solution<N> {
    /// Returns the last sample of the trajectory.
    #[must_use]
    pub fn last(&self) -> Option<&Sample<N>> {
        self.samples.last()
    }
}
