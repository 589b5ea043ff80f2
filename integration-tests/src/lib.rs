//! Shared setup for the workspace integration tests.

use std::sync::Arc;

use geode::{
    GeodesicField, MetricTensor,
    coordinates::{CoordinateSystem, Spherical},
    metrics,
};
use tracing_subscriber::EnvFilter;

/// Installs a test-friendly subscriber once, honoring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builds a shared geodesic field, panicking on configuration errors.
pub fn field(
    coordinates: impl CoordinateSystem + 'static,
    metric: MetricTensor,
) -> Arc<GeodesicField> {
    init_tracing();
    let field = GeodesicField::new(Arc::new(coordinates), metric)
        .unwrap_or_else(|err| panic!("invalid field: {err}"));
    Arc::new(field)
}

/// The Schwarzschild field of radius `rs` in spherical coordinates.
pub fn schwarzschild(rs: f64) -> Arc<GeodesicField> {
    field(Spherical, metrics::schwarzschild(rs))
}

/// Wraps an angle to `(-π, π]`.
#[must_use]
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(std::f64::consts::TAU);
    if wrapped > std::f64::consts::PI {
        wrapped - std::f64::consts::TAU
    } else {
        wrapped
    }
}
