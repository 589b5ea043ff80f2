//! Ready-made event triggers for geodesic integration.
//!
//! Triggers act on the state `[x0, x1, x2, x3, v0, v1, v2, v3]` and can be
//! refined with [`Trigger::terminal`] and [`Trigger::direction`].

use geode_solvers::transient::ivp::{Direction, Trigger};

use crate::field::{DIM, STATE};

/// Fires when coordinate `index` crosses `value`.
///
/// The trigger is non-terminal and fires in either direction.
///
/// # Panics
///
/// Panics if `index` is not a coordinate index.
#[must_use]
pub fn coordinate_reaches(index: usize, value: f64) -> Trigger<STATE> {
    assert!(index < DIM, "coordinate index {index} out of range");
    Trigger::new(move |_, y: &[f64; STATE]| y[index] - value)
}

/// Ends the run when the radial coordinate `x1` falls to `radius`.
#[must_use]
pub fn falls_to_radius(radius: f64) -> Trigger<STATE> {
    coordinate_reaches(1, radius)
        .direction(Direction::Falling)
        .terminal(true)
}

/// Ends the run when the time coordinate `x0` rises to `time`.
#[must_use]
pub fn coordinate_time_reaches(time: f64) -> Trigger<STATE> {
    coordinate_reaches(0, time)
        .direction(Direction::Rising)
        .terminal(true)
}
