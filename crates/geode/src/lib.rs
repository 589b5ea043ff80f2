//! Geodesic trajectories of test particles in arbitrary spacetime metrics.
//!
//! A [`MetricTensor`] written symbolically in the coordinates of a
//! [`CoordinateSystem`](coordinates::CoordinateSystem) is turned into a
//! [`GeodesicField`]: the geodesic equation solved for the coordinate
//! accelerations and compiled to fast closures. A [`Body`] then integrates
//! its trajectory through the field with one of the solvers in
//! [`geode_solvers`].
//!
//! - [`metrics`] — ready-made metrics (Minkowski, Schwarzschild, Kerr, ...)
//! - [`coordinates`] — coordinate systems and conversions between them
//! - [`events`] — triggers that stop or record an integration
//! - [`orbits`] — closed-form conserved quantities for setting up orbits
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use geode::{Body, GeodesicField, SolverOptions, coordinates::Spherical, metrics};
//!
//! let field = GeodesicField::new(Arc::new(Spherical), metrics::schwarzschild(1.0)).unwrap();
//! let mut body = Body::new(Arc::new(field), [0.0, 10.0, 1.5, 0.0], [1.2, 0.0, 0.0, 0.02]);
//!
//! assert!(body.solve(&SolverOptions::new([0.0, 5.0])).unwrap());
//! assert!(body.len() > 1);
//! ```

pub mod coordinates;
pub mod events;
pub mod metrics;
pub mod orbits;

mod body;
mod error;
mod field;
mod metric;
mod options;
mod velocity;

pub use body::{Body, Diagnostics};
pub use error::{ConfigurationError, Error, OrbitError, Unsupported};
pub use field::{DIM, GeodesicField, STATE};
pub use geode_solvers::transient::ivp::{Direction, Method, Status, Trigger};
pub use metric::MetricTensor;
pub use options::SolverOptions;
