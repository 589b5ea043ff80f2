use geode_core::Sample;

/// Event emitted by the solver for each accepted sample.
///
/// Step 0 is the initial state before any integration.
/// Steps 1..N are emitted after each accepted step.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a, const N: usize> {
    /// The step number (0 for the initial state).
    pub step: usize,

    /// The sample just added to the trajectory.
    pub sample: &'a Sample<N>,

    /// Size of the step that produced the sample (0 for the initial state).
    pub step_size: f64,
}
