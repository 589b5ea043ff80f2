//! Initial-value-problem solver for first-order ODE systems.
//!
//! Integrates `dy/ds = f(s, y)` over `[s0, s1]` from `y(s0) = y0`, recording
//! a [`Sample`] at every accepted step.
//!
//! # Methods
//!
//! - [`Method::Rk4`] — classic Runge-Kutta with a fixed step of
//!   [`Config::max_step`] (or a hundredth of the span if unbounded); a step
//!   that disagrees badly with two half steps ends the run with
//!   [`Status::Diverged`]
//! - [`Method::Dopri5`] — adaptive Dormand-Prince 5(4)
//! - [`Method::Rosenbrock23`] — adaptive, L-stable Rosenbrock 2(3) for stiff
//!   problems and trajectories that approach coordinate singularities
//!
//! Adaptive methods control the RMS of the local error scaled by
//! `atol + rtol * |y|` and never step further than [`Config::max_step`].
//!
//! # Triggers
//!
//! A [`Trigger`] is a scalar function of `(s, y)`. After each accepted step
//! the solver checks every trigger for a sign change and locates crossings
//! on the step's cubic Hermite interpolant. Crossings are recorded as
//! [`TriggerHit`]s. The first crossing of a terminal trigger replaces the
//! step's end point with the crossing and ends the run with
//! [`Status::Triggered`].
//!
//! # Observer Events
//!
//! The observer receives an [`Event`] for the initial state and for every
//! accepted sample, and may return [`Action::StopEarly`] to end the run.
//!
//! # Example
//!
//! ```
//! use geode_core::OdeSystem;
//! use geode_solvers::transient::ivp::{self, Config, Method, Status, Trigger};
//!
//! struct Decay;
//!
//! impl OdeSystem<1> for Decay {
//!     fn derivative(&self, _s: f64, y: &[f64; 1]) -> [f64; 1] {
//!         [-y[0]]
//!     }
//! }
//!
//! let half = Trigger::new(|_, y: &[f64; 1]| y[0] - 0.5).terminal(true);
//! let solution = ivp::solve_unobserved(
//!     &Decay,
//!     [0.0, 10.0],
//!     [1.0],
//!     Method::Dopri5,
//!     &Config::default(),
//!     &[half],
//! )
//! .unwrap();
//!
//! assert_eq!(solution.status, Status::Triggered { index: 0 });
//! let s = solution.last().unwrap().s;
//! assert!((s - 2.0_f64.ln()).abs() < 1e-4);
//! ```

mod action;
mod config;
mod controller;
mod error;
mod event;
mod locate;
mod method;
mod solution;
mod trigger;


pub use action::Action;
pub use config::{Config, ConfigError};
pub use error::Error;
pub use event::Event;
pub use method::Method;
pub use solution::{Solution, Stats, Status};
pub use trigger::{Direction, Trigger, TriggerHit};

use geode_core::{Observer, OdeSystem, Sample};
use tracing::{debug, trace};

use controller::{Controller, error_norm, scaled_norm};
use locate::Segment;
use method::{Attempt, Dopri5, Rk4, Rosenbrock23, Stepper, evaluate};

/// Number of fixed steps RK4 takes when the step size is unbounded.
const DEFAULT_FIXED_STEPS: f64 = 100.0;

/// Largest difference between a fixed step and its two half steps, relative
/// to `1 + |y|`, that still counts as resolved.
const DIVERGENCE_LIMIT: f64 = 0.1;

/// Integrates `system` over `span` from `y0`.
///
/// The observer receives an [`Event`] for every accepted sample.
/// See the [module docs](self) for methods, triggers and events.
///
/// # Errors
///
/// Returns an error if the span is not finite and increasing or the initial
/// state is not finite. Numerical failures during integration are reported
/// through [`Solution::status`] instead.
pub fn solve<S, Obs, const N: usize>(
    system: &S,
    span: [f64; 2],
    y0: [f64; N],
    method: Method,
    config: &Config,
    triggers: &[Trigger<N>],
    observer: Obs,
) -> Result<Solution<N>, Error>
where
    S: OdeSystem<N>,
    Obs: for<'a> Observer<Event<'a, N>, Action>,
{
    let [start, end] = span;
    if !start.is_finite() || !end.is_finite() || end <= start {
        return Err(Error::InvalidSpan { start, end });
    }
    if !y0.iter().all(|v| v.is_finite()) {
        return Err(Error::NonFiniteInitialState);
    }

    let solution = match method {
        Method::Rk4 => {
            let step = if config.max_step().is_finite() {
                config.max_step()
            } else {
                (end - start) / DEFAULT_FIXED_STEPS
            };
            drive(system, span, y0, Rk4, Some(step), config, triggers, observer)
        }
        Method::Dopri5 => drive(system, span, y0, Dopri5, None, config, triggers, observer),
        Method::Rosenbrock23 => drive(
            system,
            span,
            y0,
            Rosenbrock23::new(),
            None,
            config,
            triggers,
            observer,
        ),
    };

    debug!(
        ?method,
        status = ?solution.status,
        samples = solution.samples.len(),
        accepted = solution.stats.accepted,
        rejected = solution.stats.rejected,
        evaluations = solution.stats.evaluations,
        hits = solution.hits.len(),
        "integration finished"
    );

    Ok(solution)
}

/// Integrates `system` over `span` from `y0` without observation.
///
/// This is a convenience wrapper around [`solve`] that discards events.
///
/// # Errors
///
/// Returns an error if the span is not finite and increasing or the initial
/// state is not finite.
pub fn solve_unobserved<S, const N: usize>(
    system: &S,
    span: [f64; 2],
    y0: [f64; N],
    method: Method,
    config: &Config,
    triggers: &[Trigger<N>],
) -> Result<Solution<N>, Error>
where
    S: OdeSystem<N>,
{
    solve(system, span, y0, method, config, triggers, ())
}

/// Mutable state of a run, finished into a [`Solution`].
struct Run<const N: usize> {
    samples: Vec<Sample<N>>,
    hits: Vec<TriggerHit<N>>,
    stats: Stats,
}

impl<const N: usize> Run<N> {
    fn finish(self, status: Status) -> Solution<N> {
        Solution {
            status,
            samples: self.samples,
            hits: self.hits,
            stats: self.stats,
        }
    }
}

/// Runs the stepping loop with a concrete stepper.
///
/// `fixed_step` selects fixed-step mode; otherwise the step is adapted.
#[allow(clippy::too_many_arguments)]
fn drive<S, M, Obs, const N: usize>(
    system: &S,
    [start, end]: [f64; 2],
    y0: [f64; N],
    mut stepper: M,
    fixed_step: Option<f64>,
    config: &Config,
    triggers: &[Trigger<N>],
    mut observer: Obs,
) -> Solution<N>
where
    S: OdeSystem<N>,
    M: Stepper<N>,
    Obs: for<'a> Observer<Event<'a, N>, Action>,
{
    let controller = Controller::new(M::ERROR_ORDER);
    let mut run = Run {
        samples: vec![Sample::new(start, y0)],
        hits: Vec::new(),
        stats: Stats::default(),
    };

    let mut s = start;
    let mut y = y0;
    let mut f = evaluate(system, s, &y, &mut run.stats);
    if !f.iter().all(|v| v.is_finite()) {
        return run.finish(Status::NonFiniteState);
    }
    let mut g: Vec<f64> = triggers.iter().map(|t| t.eval(s, &y)).collect();

    let event = Event {
        step: 0,
        sample: &run.samples[0],
        step_size: 0.0,
    };
    if let Some(Action::StopEarly) = observer.observe(&event) {
        return run.finish(Status::StoppedByObserver);
    }

    let mut h = match (fixed_step, config.first_step()) {
        (Some(step), _) | (None, Some(step)) => step,
        (None, None) => initial_step(
            system,
            s,
            &y,
            &f,
            end - start,
            &controller,
            config,
            &mut run.stats,
        ),
    };
    let mut rejected_last = false;

    loop {
        let remaining = end - s;
        if remaining <= 0.0 {
            return run.finish(Status::Complete);
        }
        if run.stats.accepted >= config.max_steps() {
            return run.finish(Status::StepBudgetExceeded);
        }

        h = h.min(config.max_step());
        // Avoid a sliver of a final step.
        if h >= remaining || remaining - h < 16.0 * f64::EPSILON * end.abs().max(1.0) {
            h = remaining;
        }

        let min_step = 16.0 * f64::EPSILON * s.abs().max(end.abs()).max(1.0);
        if fixed_step.is_none() && h < min_step {
            trace!(s, h, "step size underflow");
            return run.finish(Status::StepSizeTooSmall);
        }

        let Attempt {
            y: y_new,
            f: f_new,
            error,
        } = stepper.attempt(system, s, &y, &f, h, &mut run.stats);

        let finite = y_new.iter().chain(&f_new).all(|v| v.is_finite());
        let err = if fixed_step.is_some() {
            if !finite {
                return run.finish(Status::NonFiniteState);
            }
            if diverged(&error, &y) {
                debug!(s, h, "fixed step no longer resolves the solution");
                return run.finish(Status::Diverged);
            }
            0.0
        } else {
            let err = error_norm(&error, &y, &y_new, config.atol(), config.rtol());
            if finite { err } else { f64::NAN }
        };

        if err.is_nan() || err > 1.0 {
            run.stats.rejected += 1;
            h *= controller.factor(err).min(1.0);
            rejected_last = true;
            continue;
        }

        let s_new = if h == remaining { end } else { s + h };
        run.stats.accepted += 1;
        stepper.accepted();

        let segment = Segment {
            s0: s,
            y0: &y,
            f0: &f,
            s1: s_new,
            y1: &y_new,
            f1: &f_new,
        };
        let g_new: Vec<f64> = triggers.iter().map(|t| t.eval(s_new, &y_new)).collect();
        let mut found: Vec<TriggerHit<N>> = triggers
            .iter()
            .enumerate()
            .filter(|(i, t)| t.crosses(g[*i], g_new[*i]))
            .map(|(index, t)| {
                let (s_hit, y_hit) = segment.locate(t, g[index]);
                TriggerHit {
                    index,
                    s: s_hit,
                    y: y_hit,
                }
            })
            .collect();
        found.sort_by(|a, b| a.s.total_cmp(&b.s));

        let terminal = found.iter().position(|hit| triggers[hit.index].is_terminal());
        if let Some(position) = terminal {
            found.truncate(position + 1);
            let hit = found[position];
            run.hits.extend(found);
            run.samples.push(Sample::new(hit.s, hit.y));

            let step = run.samples.len() - 1;
            let event = Event {
                step,
                sample: &run.samples[step],
                step_size: hit.s - s,
            };
            // The run ends here either way; a stop request changes nothing.
            let _ = observer.observe(&event);
            return run.finish(Status::Triggered { index: hit.index });
        }
        run.hits.extend(found);
        run.samples.push(Sample::new(s_new, y_new));

        let step = run.samples.len() - 1;
        let event = Event {
            step,
            sample: &run.samples[step],
            step_size: s_new - s,
        };
        if let Some(Action::StopEarly) = observer.observe(&event) {
            return run.finish(Status::StoppedByObserver);
        }

        if fixed_step.is_none() {
            let mut factor = controller.factor(err);
            if rejected_last {
                factor = factor.min(1.0);
            }
            h *= factor;
        }
        rejected_last = false;

        s = s_new;
        y = y_new;
        f = f_new;
        g = g_new;
    }
}

/// Estimates a first step from the size of the state and its derivatives.
#[allow(clippy::too_many_arguments)]
fn initial_step<S: OdeSystem<N>, const N: usize>(
    system: &S,
    s: f64,
    y: &[f64; N],
    f: &[f64; N],
    span: f64,
    controller: &Controller,
    config: &Config,
    stats: &mut Stats,
) -> f64 {
    let (atol, rtol) = (config.atol(), config.rtol());
    let d0 = scaled_norm(y, y, atol, rtol);
    let d1 = scaled_norm(f, y, atol, rtol);

    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    };
    let h0 = h0.min(span).min(config.max_step());

    let y1: [f64; N] = std::array::from_fn(|i| y[i] + h0 * f[i]);
    let f1 = evaluate(system, s + h0, &y1, stats);
    let df: [f64; N] = std::array::from_fn(|i| (f1[i] - f[i]) / h0);
    let d2 = scaled_norm(&df, y, atol, rtol);

    let h1 = if d1.max(d2) <= 1e-15 || !d2.is_finite() {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / d1.max(d2)).powf(controller.exponent())
    };

    (100.0 * h0).min(h1).min(span).min(config.max_step())
}

/// Checks a fixed step's doubling estimate against [`DIVERGENCE_LIMIT`].
fn diverged<const N: usize>(error: &[f64; N], y: &[f64; N]) -> bool {
    error
        .iter()
        .zip(y)
        .any(|(e, y)| e.is_nan() || e.abs() > DIVERGENCE_LIMIT * (1.0 + y.abs()))
}
