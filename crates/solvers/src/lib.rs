//! Numerical solvers for Geode.
//!
//! Solvers are grouped by problem type. Each solver lives in its own module
//! with a `solve` entry point that accepts an [`Observer`](geode_core::Observer)
//! and a `solve_unobserved` convenience wrapper.
//!
//! - [`transient::ivp`] — adaptive and fixed-step integration of
//!   `dy/ds = f(s, y)` with event detection

pub mod transient;
