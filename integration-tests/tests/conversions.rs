use approx::assert_relative_eq;
use geode::{
    Body, Error, SolverOptions, Unsupported,
    coordinates::{Cartesian, Lemaitre},
    metrics,
};
use integration_tests::{field, wrap_angle};

const RS: f64 = 1.0;

/// A Lemaitre observer at fixed ρ, starting at r = 4 rs.
fn lemaitre_observer() -> Body {
    let rho = 16.0 / 3.0;
    Body::new(
        field(Lemaitre::new(RS), metrics::lemaitre(RS)),
        [0.0, rho, 1.0, 0.5],
        [1.0, 0.0, 0.0, 0.0],
    )
}

#[test]
fn lemaitre_observer_falls_through_the_horizon() {
    let mut body = lemaitre_observer();
    assert!(body.solve(&SolverOptions::new([0.0, 5.0])).expect("valid options"));

    // ρ = const and T = s are exact geodesics.
    for k in 0..body.len() {
        let x = body.position(k).expect("in range");
        assert_relative_eq!(x[0], body.s()[k], max_relative = 1e-9, epsilon = 1e-12);
        assert_relative_eq!(x[1], 16.0 / 3.0, max_relative = 1e-12);
    }

    let spherical = body.to_spherical().expect("lemaitre converts");
    let r = spherical.positions().row(1).to_vec();
    assert_relative_eq!(r[0], 4.0 * RS, max_relative = 1e-12);
    assert!(r.windows(2).all(|w| w[1] < w[0]));
    assert!(r[r.len() - 1] < RS, "ends inside the horizon");

    let angles = spherical.positions();
    assert_relative_eq!(angles[[2, spherical.len() - 1]], 1.0);
    assert_relative_eq!(angles[[3, spherical.len() - 1]], 0.5);
}

#[test]
fn lemaitre_has_no_speed_formula() {
    let mut body = lemaitre_observer();
    body.solve(&SolverOptions::new([0.0, 1.0])).expect("valid options");

    assert_eq!(
        body.calculate_velocities(),
        Err(Error::Unsupported(Unsupported {
            system: "lemaitre",
            capability: "a velocity equation",
        }))
    );
    assert!(body.velocity_norm().is_none());
}

#[test]
fn speed_needs_two_samples() {
    let mut body = lemaitre_observer();
    assert_eq!(body.calculate_velocities(), Err(Error::TooFewSamples(1)));
}

#[test]
fn views_round_trip_between_systems() {
    let mut body = Body::new(
        field(Cartesian, metrics::minkowski()),
        [0.0, 1.0, -2.0, 0.5],
        [1.25, -0.3, 0.4, 0.55],
    );
    body.solve(&SolverOptions::new([0.0, 3.0])).expect("valid options");

    let spherical = body.to_spherical().expect("cartesian converts");
    let back = spherical.to_cartesian().expect("spherical converts");
    assert_eq!(back.coordinates().name(), "cartesian");
    assert_eq!(back.len(), body.len());
    for (a, b) in body.positions().iter().zip(back.positions()) {
        assert_relative_eq!(*a, *b, max_relative = 1e-12, epsilon = 1e-12);
    }

    let first = spherical.position(0).expect("non-empty");
    assert_relative_eq!(first[1], 5.25_f64.sqrt(), max_relative = 1e-14);
    assert_relative_eq!(wrap_angle(first[3]), (-2.0_f64).atan2(1.0));
}
