//! Symbolic expressions for deriving equations of motion.
//!
//! This crate is a small computer-algebra layer built for one job: turning a
//! metric tensor written in terms of coordinates into fast numeric closures.
//!
//! - [`Expr`] — an immutable, cheaply clonable expression tree over
//!   coordinates, velocities and the affine parameter ([`Var`])
//! - [`Expr::diff`] and [`Expr::total_derivative`] — partial derivatives and
//!   derivatives along a trajectory (chain rule through the coordinates)
//! - [`Expr::simplify`] — a value-preserving, idempotent canonicalization
//! - [`Matrix`] — square matrices of expressions with determinant and inverse
//! - [`Compiled`] — an expression compiled into a closure over a fixed
//!   argument [`Layout`]
//!
//! # Example
//!
//! ```
//! use geode_symbolic::{Compiled, Expr, Layout};
//!
//! let r = Expr::coordinate(1);
//! let potential = -1.0 / &r;
//! let force = potential.diff(r.as_var().unwrap()).simplify();
//!
//! let compiled: Compiled<8> = force.compile(Layout::phase_space(4)).unwrap();
//! let value = compiled.call(&[0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
//! assert!((value - 0.25).abs() < 1e-15);
//! ```

mod compile;
mod diff;
mod display;
mod eval;
mod expr;
mod matrix;
mod simplify;

pub use compile::{CompileError, Compiled, Layout};
pub use diff::DiffError;
pub use eval::EvalError;
pub use expr::{Expr, Func, Node, Var};
pub use matrix::{Matrix, MatrixError};
