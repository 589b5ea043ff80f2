use geode_symbolic::Expr;
use ndarray::{Array2, ArrayView2, Axis};

use crate::Unsupported;

use super::CoordinateSystem;

/// Lemaître coordinates `(T, ρ, θ, φ)` of a free-falling observer.
///
/// The observer falls radially from rest at infinity into a Schwarzschild
/// black hole of horizon radius `rs`. The areal radius is
/// `r = (3/2 (ρ - T))^(2/3) rs^(1/3)`, and the coordinates stay regular
/// across the horizon.
///
/// There is no coordinate-speed formula for these coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lemaitre {
    rs: f64,
}

impl Lemaitre {
    #[must_use]
    pub fn new(rs: f64) -> Self {
        Self { rs }
    }

    /// Returns the horizon radius.
    #[must_use]
    pub fn rs(&self) -> f64 {
        self.rs
    }

    /// Areal radius at `ρ - T = lag`.
    fn radius(&self, lag: f64) -> f64 {
        (1.5 * lag).powf(2.0 / 3.0) * self.rs.cbrt()
    }

    /// Schwarzschild time minus `T`, up to a constant.
    fn time_shift(&self, lag: f64) -> f64 {
        let rs = self.rs;
        let q = (1.5 / rs * lag).cbrt();
        -3.0 * (4.0 * rs * rs / 9.0 * lag).cbrt()
            - rs * ((q - 1.0).abs().ln() - (q + 1.0).abs().ln())
    }

    /// Schwarzschild `(t, r)` rows for every sample.
    ///
    /// The time offset is chosen so that `t` equals `T` at the first sample.
    fn schwarzschild(&self, positions: ArrayView2<'_, f64>) -> (Vec<f64>, Vec<f64>) {
        assert_eq!(positions.nrows(), 4, "trajectories have four rows");

        let lags: Vec<f64> = positions
            .row(1)
            .iter()
            .zip(positions.row(0))
            .map(|(rho, t)| rho - t)
            .collect();
        let offset = lags.first().map_or(0.0, |&lag| -self.time_shift(lag));

        let t = positions
            .row(0)
            .iter()
            .zip(&lags)
            .map(|(time, &lag)| time + self.time_shift(lag) + offset)
            .collect();
        let r = lags.iter().map(|&lag| self.radius(lag)).collect();
        (t, r)
    }
}

impl CoordinateSystem for Lemaitre {
    fn name(&self) -> &'static str {
        "lemaitre"
    }

    fn labels(&self) -> [&'static str; 4] {
        ["T", "ρ", "θ", "φ"]
    }

    fn velocity_equation(&self) -> Result<Expr, Unsupported> {
        Err(Unsupported {
            system: self.name(),
            capability: "a velocity equation",
        })
    }

    fn to_cartesian(&self, positions: ArrayView2<'_, f64>) -> Result<Array2<f64>, Unsupported> {
        let (t, r) = self.schwarzschild(positions);

        let mut out = Array2::zeros(positions.raw_dim());
        for (k, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            let (theta, phi) = (positions[[2, k]], positions[[3, k]]);
            column[0] = t[k];
            column[1] = r[k] * theta.sin() * phi.cos();
            column[2] = r[k] * theta.sin() * phi.sin();
            column[3] = r[k] * theta.cos();
        }
        Ok(out)
    }

    fn to_spherical(&self, positions: ArrayView2<'_, f64>) -> Result<Array2<f64>, Unsupported> {
        let (t, r) = self.schwarzschild(positions);

        let mut out = positions.to_owned();
        out.row_mut(0).assign(&ndarray::Array1::from(t));
        out.row_mut(1).assign(&ndarray::Array1::from(r));
        Ok(out)
    }
}
