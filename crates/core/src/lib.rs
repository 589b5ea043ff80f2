//! Core traits and types for the Geode workspace.
//!
//! This crate defines the shared abstractions that the solvers and the
//! geodesic machinery build on:
//!
//! - [`OdeSystem`] — a first-order system `dy/ds = f(s, y)` with `N` states
//! - [`Sample`] — one point of a solved trajectory
//! - [`Observer`] — receives solver events and optionally returns control actions

mod observer;
mod system;

pub use observer::Observer;
pub use system::{OdeSystem, Sample};
