//! Solvers for transient (time-marching) problems.

pub mod ivp;
