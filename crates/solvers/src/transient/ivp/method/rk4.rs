use geode_core::OdeSystem;

use super::{Attempt, Stepper, combine, evaluate};
use crate::transient::ivp::Stats;

/// Classic fourth-order Runge-Kutta.
///
/// Each step is also retaken as two half steps. The difference between the
/// two results is reported as the error estimate, which the driver uses to
/// detect a fixed step that no longer resolves the solution.
pub(crate) struct Rk4;

impl Rk4 {
    fn advance<const N: usize, S: OdeSystem<N>>(
        system: &S,
        s: f64,
        y: &[f64; N],
        k1: &[f64; N],
        h: f64,
        stats: &mut Stats,
    ) -> [f64; N] {
        let k2 = evaluate(system, s + 0.5 * h, &combine(y, 0.5 * h, &[(1.0, k1)]), stats);
        let k3 = evaluate(system, s + 0.5 * h, &combine(y, 0.5 * h, &[(1.0, &k2)]), stats);
        let k4 = evaluate(system, s + h, &combine(y, h, &[(1.0, &k3)]), stats);

        combine(
            y,
            h / 6.0,
            &[(1.0, k1), (2.0, &k2), (2.0, &k3), (1.0, &k4)],
        )
    }
}

impl<const N: usize> Stepper<N> for Rk4 {
    const ERROR_ORDER: u32 = 4;

    fn attempt<S: OdeSystem<N>>(
        &mut self,
        system: &S,
        s: f64,
        y: &[f64; N],
        f: &[f64; N],
        h: f64,
        stats: &mut Stats,
    ) -> Attempt<N> {
        let y_new = Self::advance(system, s, y, f, h, stats);
        let f_new = evaluate(system, s + h, &y_new, stats);

        let y_mid = Self::advance(system, s, y, f, 0.5 * h, stats);
        let f_mid = evaluate(system, s + 0.5 * h, &y_mid, stats);
        let y_halves = Self::advance(system, s + 0.5 * h, &y_mid, &f_mid, 0.5 * h, stats);

        let mut error = [0.0; N];
        for ((e, full), halves) in error.iter_mut().zip(&y_new).zip(&y_halves) {
            *e = halves - full;
        }

        Attempt {
            y: y_new,
            f: f_new,
            error,
        }
    }
}
