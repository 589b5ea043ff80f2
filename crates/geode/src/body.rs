use std::sync::Arc;

use geode_core::Observer;
use geode_solvers::transient::ivp::{self, Action, Event, Stats, Status, TriggerHit};
use geode_symbolic::{Compiled, Layout};
use ndarray::{ArcArray1, Array1, Array2, ArrayView2, Axis, array};
use tracing::{debug, info, warn};

use crate::{
    Error, GeodesicField, SolverOptions, Unsupported,
    coordinates::{Cartesian, CoordinateSystem, Spherical},
    field::{DIM, STATE},
    velocity::gradient,
};

/// How the last integration of a [`Body`] ended.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics {
    /// Termination cause reported by the solver.
    pub status: Status,

    /// Every event crossing, in order of the affine parameter.
    pub hits: Vec<TriggerHit<STATE>>,

    /// Solver work counters.
    pub stats: Stats,
}

impl Diagnostics {
    /// Returns true if the solver finished without diverging or running out
    /// of steps.
    #[must_use]
    pub fn success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns the index of the terminal event that ended the run, if any.
    #[must_use]
    pub fn triggered(&self) -> Option<usize> {
        match self.status {
            Status::Triggered { index } => Some(index),
            _ => None,
        }
    }
}

/// A test particle and its sampled trajectory.
///
/// Positions and velocities are `4 × N` arrays with one column per sample of
/// the affine parameter `s`. A new body holds a single sample, its initial
/// conditions. [`Body::solve`] replaces every array with the integrated
/// trajectory, always starting again from the first sample.
///
/// [`Body::to_cartesian`] and [`Body::to_spherical`] create views of the
/// trajectory in other coordinates. Views share `s` with the original, own
/// their positions, have no velocities and cannot be integrated.
#[derive(Debug, Clone)]
pub struct Body {
    field: Option<Arc<GeodesicField>>,
    coordinates: Arc<dyn CoordinateSystem>,
    s: ArcArray1<f64>,
    positions: Array2<f64>,
    velocities: Array2<f64>,
    velocity_norm: Option<Array1<f64>>,
    diagnostics: Option<Diagnostics>,
}

impl Body {
    /// Places a particle at `position` with four-velocity `velocity`.
    #[must_use]
    pub fn new(field: Arc<GeodesicField>, position: [f64; DIM], velocity: [f64; DIM]) -> Self {
        Self {
            coordinates: field.coordinates().clone(),
            field: Some(field),
            s: array![0.0].into_shared(),
            positions: column(position),
            velocities: column(velocity),
            velocity_norm: None,
            diagnostics: None,
        }
    }

    /// Integrates the geodesic equations from the initial conditions.
    ///
    /// Returns the success flag of the run, which is also available through
    /// [`Body::diagnostics`].
    ///
    /// # Errors
    ///
    /// Returns an error if the body has no field, the options are invalid,
    /// or the initial state is not finite. Numerical failures during
    /// integration are reported through the success flag instead.
    pub fn solve(&mut self, options: &SolverOptions) -> Result<bool, Error> {
        self.solve_observed(options, ())
    }

    /// Integrates like [`Body::solve`], reporting every accepted step to
    /// `observer`.
    ///
    /// The observer may return [`Action::StopEarly`] to end the run, which
    /// still counts as a success.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Body::solve`].
    pub fn solve_observed<Obs>(
        &mut self,
        options: &SolverOptions,
        observer: Obs,
    ) -> Result<bool, Error>
    where
        Obs: for<'a> Observer<Event<'a, STATE>, Action>,
    {
        let field = self.field.as_ref().ok_or(Error::NoField)?;
        let config = options.config()?;

        let mut y0 = [0.0; STATE];
        for i in 0..DIM {
            y0[i] = self.positions[[i, 0]];
            y0[DIM + i] = self.velocities[[i, 0]];
        }

        let solution = ivp::solve(
            field.as_ref(),
            options.time_interval,
            y0,
            options.method,
            &config,
            &options.events,
            observer,
        )?;

        let samples = &solution.samples;
        let n = samples.len();
        self.s = samples.iter().map(|sample| sample.s).collect::<Array1<_>>().into_shared();
        self.positions = Array2::from_shape_fn((DIM, n), |(i, k)| samples[k].y[i]);
        self.velocities = Array2::from_shape_fn((DIM, n), |(i, k)| samples[k].y[DIM + i]);
        self.velocity_norm = None;

        let diagnostics = Diagnostics {
            status: solution.status,
            hits: solution.hits,
            stats: solution.stats,
        };
        let success = diagnostics.success();
        if success {
            info!(
                coordinates = self.coordinates.name(),
                status = ?diagnostics.status,
                samples = n,
                "trajectory integrated"
            );
        } else {
            warn!(
                coordinates = self.coordinates.name(),
                status = ?diagnostics.status,
                samples = n,
                s = self.s[n - 1],
                "trajectory integration failed"
            );
        }
        self.diagnostics = Some(diagnostics);

        Ok(success)
    }

    /// Computes the coordinate speed at every sample.
    ///
    /// Each spatial coordinate is differentiated with respect to the time
    /// coordinate `x0` over the (non-uniform) samples, and the coordinate
    /// system's squared speed formula is evaluated before taking the square
    /// root. The last value repeats the second-to-last.
    ///
    /// # Errors
    ///
    /// Returns an error if the trajectory has fewer than two samples or the
    /// coordinate system has no speed formula.
    pub fn calculate_velocities(&mut self) -> Result<&Array1<f64>, Error> {
        let n = self.len();
        if n < 2 {
            return Err(Error::TooFewSamples(n));
        }

        let squared = self.coordinates.velocity_equation()?.powi(2).simplify();
        let speed2: Compiled<STATE> = squared.compile(Layout::phase_space(DIM))?;

        let t = self.positions.row(0);
        let rates: Vec<Array1<f64>> = (1..DIM)
            .map(|i| gradient(self.positions.row(i), t))
            .collect();

        let mut norm = Array1::from_shape_fn(n, |k| {
            let x = self.positions.column(k);
            let args = [
                x[0], x[1], x[2], x[3], 1.0, rates[0][k], rates[1][k], rates[2][k],
            ];
            speed2.call(&args).sqrt()
        });
        norm[n - 1] = norm[n - 2];

        debug!(
            coordinates = self.coordinates.name(),
            samples = n,
            "computed coordinate speed"
        );
        Ok(self.velocity_norm.insert(norm))
    }

    /// Returns a view of the trajectory in Cartesian coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinate system cannot convert to
    /// Cartesian coordinates.
    pub fn to_cartesian(&self) -> Result<Body, Unsupported> {
        let positions = self.coordinates.to_cartesian(self.positions.view())?;
        Ok(self.view(Arc::new(Cartesian), positions))
    }

    /// Returns a view of the trajectory in spherical coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinate system cannot convert to
    /// spherical coordinates.
    pub fn to_spherical(&self) -> Result<Body, Unsupported> {
        let positions = self.coordinates.to_spherical(self.positions.view())?;
        Ok(self.view(Arc::new(Spherical), positions))
    }

    fn view(&self, coordinates: Arc<dyn CoordinateSystem>, positions: Array2<f64>) -> Body {
        Body {
            field: None,
            coordinates,
            s: self.s.clone(),
            positions,
            velocities: Array2::zeros((DIM, 0)),
            velocity_norm: None,
            diagnostics: None,
        }
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.s.len()
    }

    /// Returns true if the body has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    #[must_use]
    pub fn field(&self) -> Option<&Arc<GeodesicField>> {
        self.field.as_ref()
    }

    #[must_use]
    pub fn coordinates(&self) -> &Arc<dyn CoordinateSystem> {
        &self.coordinates
    }

    /// The affine parameter at every sample.
    #[must_use]
    pub fn s(&self) -> &ArcArray1<f64> {
        &self.s
    }

    /// The `4 × N` positions.
    #[must_use]
    pub fn positions(&self) -> ArrayView2<'_, f64> {
        self.positions.view()
    }

    /// The `4 × N` velocities with respect to the affine parameter.
    #[must_use]
    pub fn velocities(&self) -> ArrayView2<'_, f64> {
        self.velocities.view()
    }

    /// Position at sample `k`.
    #[must_use]
    pub fn position(&self, k: usize) -> Option<[f64; DIM]> {
        sample(&self.positions, k)
    }

    /// Velocity at sample `k`.
    #[must_use]
    pub fn velocity(&self, k: usize) -> Option<[f64; DIM]> {
        sample(&self.velocities, k)
    }

    /// The coordinate speed, once [`Body::calculate_velocities`] has run.
    #[must_use]
    pub fn velocity_norm(&self) -> Option<&Array1<f64>> {
        self.velocity_norm.as_ref()
    }

    /// How the last integration ended, if the body has been solved.
    #[must_use]
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.diagnostics.as_ref()
    }

    /// Returns true if the body has been solved successfully.
    #[must_use]
    pub fn success(&self) -> bool {
        self.diagnostics.as_ref().is_some_and(Diagnostics::success)
    }
}

fn column(values: [f64; DIM]) -> Array2<f64> {
    Array2::from_shape_fn((DIM, 1), |(i, _)| values[i])
}

fn sample(array: &Array2<f64>, k: usize) -> Option<[f64; DIM]> {
    (k < array.len_of(Axis(1))).then(|| std::array::from_fn(|i| array[[i, k]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use geode_solvers::transient::ivp::Method;

    use crate::{
        coordinates::{Cartesian, Lemaitre},
        events, metrics,
    };

    fn flat() -> Arc<GeodesicField> {
        Arc::new(GeodesicField::new(Arc::new(Cartesian), metrics::minkowski()).expect("valid"))
    }

    fn schwarzschild(rs: f64) -> Arc<GeodesicField> {
        let field = GeodesicField::new(Arc::new(Spherical), metrics::schwarzschild(rs))
            .and_then(|field| field.simplified())
            .expect("valid");
        Arc::new(field)
    }

    #[test]
    fn new_body_holds_initial_conditions() {
        let body = Body::new(flat(), [0.0, 1.0, 2.0, 3.0], [1.0, 0.1, 0.0, 0.0]);
        assert_eq!(body.len(), 1);
        assert!(!body.is_empty());
        assert_eq!(body.position(0), Some([0.0, 1.0, 2.0, 3.0]));
        assert_eq!(body.velocity(0), Some([1.0, 0.1, 0.0, 0.0]));
        assert_eq!(body.position(1), None);
        assert!(body.diagnostics().is_none());
        assert!(!body.success());
    }

    #[test]
    fn straight_line_in_flat_space() {
        let mut body = Body::new(flat(), [0.0, 1.0, 2.0, 3.0], [1.0, 0.5, -0.25, 0.125]);
        let options = SolverOptions::new([0.0, 8.0]).with_method(Method::Dopri5);
        assert!(body.solve(&options).expect("valid options"));

        let diagnostics = body.diagnostics().expect("solved");
        assert_eq!(diagnostics.status, Status::Complete);
        assert_eq!(diagnostics.triggered(), None);

        assert_eq!(body.positions().dim(), (4, body.len()));
        assert_eq!(body.velocities().dim(), (4, body.len()));
        assert!(body.s().windows(2).into_iter().all(|w| w[1] > w[0]));

        for (k, &s) in body.s().iter().enumerate() {
            let x = body.position(k).expect("in range");
            assert_abs_diff_eq!(x[0], s, epsilon = 1e-10);
            assert_abs_diff_eq!(x[1], 1.0 + 0.5 * s, epsilon = 1e-10);
            assert_abs_diff_eq!(x[2], 2.0 - 0.25 * s, epsilon = 1e-10);
            assert_abs_diff_eq!(x[3], 3.0 + 0.125 * s, epsilon = 1e-10);
            assert_eq!(body.velocity(k), Some([1.0, 0.5, -0.25, 0.125]));
        }

        // With max_step 1 the solver needs at least eight steps.
        assert!(body.len() >= 9);
    }

    #[test]
    fn flat_space_speed_is_constant() {
        let mut body = Body::new(flat(), [0.0, 0.0, 0.0, 0.0], [2.0, 0.6, 0.0, 0.8]);
        body.solve(&SolverOptions::new([0.0, 5.0])).expect("valid options");

        let norm = body.calculate_velocities().expect("cartesian speed");
        for &v in norm {
            assert_relative_eq!(v, 0.5, max_relative = 1e-8);
        }
        assert_eq!(body.velocity_norm().map(Array1::len), Some(body.len()));
    }

    #[test]
    fn last_speed_repeats_the_second_to_last() {
        let mut body = Body::new(flat(), [0.0, 0.0, 0.0, 0.0], [1.0, 0.2, 0.0, 0.0]);
        body.solve(&SolverOptions::new([0.0, 3.0]).with_method(Method::Rk4))
            .expect("valid options");
        let norm = body.calculate_velocities().expect("cartesian speed").clone();
        let n = norm.len();
        assert_eq!(norm[n - 1], norm[n - 2]);
    }

    #[test]
    fn speed_needs_two_samples() {
        let mut body = Body::new(flat(), [0.0; 4], [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(body.calculate_velocities().err(), Some(Error::TooFewSamples(1)));
    }

    #[test]
    fn lemaitre_speed_is_unsupported() {
        let field = GeodesicField::new(Arc::new(Lemaitre::new(1.0)), metrics::lemaitre(1.0))
            .expect("valid field");
        let mut body = Body::new(Arc::new(field), [0.0, 6.0, 1.0, 0.0], [1.0, 0.0, 0.0, 0.0]);
        body.solve(&SolverOptions::new([0.0, 1.0])).expect("valid options");

        assert!(matches!(
            body.calculate_velocities(),
            Err(Error::Unsupported(Unsupported {
                system: "lemaitre",
                ..
            }))
        ));
    }

    #[test]
    fn views_share_the_affine_parameter() {
        let mut body = Body::new(schwarzschild(1.0), [0.0, 10.0, 1.2, 0.0], [1.1, 0.0, 0.0, 0.02]);
        body.solve(&SolverOptions::new([0.0, 20.0])).expect("valid options");

        let view = body.to_cartesian().expect("spherical converts");
        assert!(view.s().as_ptr() == body.s().as_ptr());
        assert_eq!(view.positions().dim(), body.positions().dim());
        assert_eq!(view.velocities().dim(), (4, 0));
        assert!(view.field().is_none());
        assert_eq!(view.coordinates().name(), "cartesian");

        let back = view.to_spherical().expect("cartesian converts");
        for (a, b) in back.positions().iter().zip(body.positions().iter()) {
            assert_relative_eq!(*a, *b, max_relative = 1e-10, epsilon = 1e-12);
        }
    }

    #[test]
    fn views_cannot_be_solved() {
        let body = Body::new(flat(), [0.0; 4], [1.0, 0.0, 0.0, 0.0]);
        let mut view = body.to_spherical().expect("cartesian converts");
        assert_eq!(view.solve(&SolverOptions::default()), Err(Error::NoField));
    }

    #[test]
    fn invalid_options_are_errors() {
        let mut body = Body::new(flat(), [0.0; 4], [1.0, 0.0, 0.0, 0.0]);

        let options = SolverOptions::default().with_tolerances(-1.0, 1e-8);
        assert_eq!(
            body.solve(&options),
            Err(Error::Config(ivp::ConfigError::Atol))
        );

        let options = SolverOptions::new([1.0, 0.0]);
        assert!(matches!(
            body.solve(&options),
            Err(Error::Solver(ivp::Error::InvalidSpan { .. }))
        ));
    }

    #[test]
    fn terminal_event_is_recorded() {
        let mut body = Body::new(flat(), [0.0, 5.0, 0.0, 0.0], [1.0, -0.5, 0.0, 0.0]);
        let options = SolverOptions::new([0.0, 20.0])
            .with_method(Method::Dopri5)
            .with_event(events::coordinate_reaches(1, 4.0))
            .with_event(events::falls_to_radius(2.0));

        assert!(body.solve(&options).expect("valid options"));
        let diagnostics = body.diagnostics().expect("solved");
        assert_eq!(diagnostics.triggered(), Some(1));
        assert_eq!(diagnostics.hits.len(), 2);
        assert_relative_eq!(diagnostics.hits[0].s, 2.0, max_relative = 1e-8);

        let last = body.position(body.len() - 1).expect("has samples");
        assert_relative_eq!(last[1], 2.0, max_relative = 1e-8);
        assert_relative_eq!(body.s()[body.len() - 1], 6.0, max_relative = 1e-8);
    }

    #[test]
    fn observer_sees_every_sample() {
        let mut body = Body::new(flat(), [0.0; 4], [1.0, 0.1, 0.0, 0.0]);
        let mut steps = 0;
        let success = body
            .solve_observed(&SolverOptions::new([0.0, 4.0]), |_: &Event<'_, STATE>| {
                steps += 1;
                None
            })
            .expect("valid options");

        assert!(success);
        assert_eq!(steps, body.len());
    }

    #[test]
    fn solving_again_starts_from_the_initial_conditions() {
        let mut body = Body::new(flat(), [0.0, 1.0, 0.0, 0.0], [1.0, 1.0, 0.0, 0.0]);
        body.solve(&SolverOptions::new([0.0, 2.0])).expect("valid options");
        body.calculate_velocities().expect("cartesian speed");
        body.solve(&SolverOptions::new([0.0, 1.0])).expect("valid options");

        assert_eq!(body.position(0), Some([0.0, 1.0, 0.0, 0.0]));
        assert_abs_diff_eq!(body.s()[body.len() - 1], 1.0, epsilon = 1e-12);
        assert!(body.velocity_norm().is_none());
    }
}
