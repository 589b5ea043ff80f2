use approx::assert_relative_eq;
use geode::{Body, Method, SolverOptions, Status, coordinates::Spherical, events, metrics};
use integration_tests::field;

const RS: f64 = 1.0;

/// Radial infall from r = 5 in ingoing Eddington-Finkelstein coordinates.
///
/// `(1 - rs/r) v̇² - 2 v̇ ṙ = 1` holds for `v̇ = 1, ṙ = -0.1` at `r = 5`.
fn infalling_body() -> Body {
    Body::new(
        field(Spherical, metrics::eddington_finkelstein(RS)),
        [0.0, 5.0, std::f64::consts::FRAC_PI_2, 0.0],
        [1.0, -0.1, 0.0, 0.0],
    )
}

#[test]
fn released_from_rest_falls_to_the_horizon() {
    // At rest: (1 - rs/r) v̇² = 1.
    let r0 = 5.0;
    let mut body = Body::new(
        field(Spherical, metrics::eddington_finkelstein(RS)),
        [0.0, r0, std::f64::consts::FRAC_PI_2, 0.0],
        [1.0 / (1.0 - RS / r0).sqrt(), 0.0, 0.0, 0.0],
    );
    let options = SolverOptions::new([0.0, 100.0]).with_event(events::falls_to_radius(RS));

    assert!(body.solve(&options).expect("valid options"));
    assert!(body.success());
    assert_eq!(body.diagnostics().and_then(|d| d.triggered()), Some(0));

    let radii = body.positions().row(1).to_vec();
    assert!(radii.windows(2).all(|w| w[1] < w[0]), "radius must fall");
    assert_relative_eq!(radii[radii.len() - 1], RS, max_relative = 1e-6);

    let angles = body.positions();
    assert!(angles.row(3).iter().all(|phi| phi.abs() < 1e-12));
}

#[test]
fn released_from_rest_in_schwarzschild_coordinates() {
    let r0 = 5.0;
    let mut body = Body::new(
        integration_tests::schwarzschild(RS),
        [0.0, r0, std::f64::consts::FRAC_PI_2, 0.0],
        [1.0 / (1.0 - RS / r0).sqrt(), 0.0, 0.0, 0.0],
    );
    let options = SolverOptions::new([0.0, 100.0]).with_event(events::falls_to_radius(2.0 * RS));

    assert!(body.solve(&options).expect("valid options"));
    assert_eq!(body.diagnostics().and_then(|d| d.triggered()), Some(0));

    let radii = body.positions().row(1).to_vec();
    assert!(radii.windows(2).all(|w| w[1] < w[0]), "radius must fall");
    assert_relative_eq!(radii[radii.len() - 1], 2.0 * RS, max_relative = 1e-6);
}

#[test]
fn no_method_reports_a_fall_through_the_coordinate_singularity() {
    // Without a stopping event the Schwarzschild-coordinate geodesic runs into r = rs.
    let r0 = 5.0;
    for method in [Method::Rk4, Method::Dopri5, Method::Rosenbrock23] {
        let mut body = Body::new(
            integration_tests::schwarzschild(RS),
            [0.0, r0, std::f64::consts::FRAC_PI_2, 0.0],
            [1.0 / (1.0 - RS / r0).sqrt(), 0.0, 0.0, 0.0],
        );
        let options = SolverOptions::new([0.0, 40.0]).with_method(method);

        assert!(!body.solve(&options).expect("valid options"), "{method:?}");
        assert!(!body.success());

        let status = body.diagnostics().expect("solved").status;
        assert_ne!(status, Status::Complete, "{method:?}");

        let end = body.position(body.len() - 1).expect("non-empty");
        assert!(end[1] > RS, "{method:?} ended at r = {}", end[1]);
    }
}

#[test]
fn crosses_the_horizon() {
    let mut body = infalling_body();
    let options = SolverOptions::new([0.0, 100.0])
        .with_method(Method::Dopri5)
        .with_tolerances(1e-10, 1e-10)
        .with_max_step(0.1)
        .with_event(events::falls_to_radius(0.5 * RS));

    assert!(body.solve(&options).expect("valid options"));
    let diagnostics = body.diagnostics().expect("solved");
    assert_eq!(diagnostics.triggered(), Some(0));

    let radii = body.positions().row(1).to_vec();
    assert!(radii.windows(2).all(|w| w[1] < w[0]), "radius must fall");
    assert_relative_eq!(radii[radii.len() - 1], 0.5 * RS, max_relative = 1e-8);

    // Proper time to the singularity from r0 is bounded by that of a fall
    // from rest, π/2 · sqrt(r0³ / rs).
    let s_end = body.s()[body.len() - 1];
    assert!(s_end > 0.0 && s_end < std::f64::consts::FRAC_PI_2 * 125.0_f64.sqrt());

    let field = body.field().expect("integrated body").clone();
    let last = body.len() - 1;
    let norm = field
        .metric()
        .interval(
            &body.position(last).expect("in range"),
            &body.velocity(last).expect("in range"),
        )
        .expect("bound");
    assert_relative_eq!(norm, 1.0, max_relative = 1e-6);
}

#[test]
fn advanced_time_stays_finite_at_the_horizon() {
    let mut body = infalling_body();
    let options = SolverOptions::new([0.0, 100.0]).with_event(events::falls_to_radius(RS));
    assert!(body.solve(&options).expect("valid options"));

    let end = body.position(body.len() - 1).expect("non-empty");
    assert_relative_eq!(end[1], RS, max_relative = 1e-6);
    assert!(end[0].is_finite() && end[0] > 0.0);

    let velocity = body.velocity(body.len() - 1).expect("non-empty");
    assert!(velocity.iter().all(|v| v.is_finite()));
}
