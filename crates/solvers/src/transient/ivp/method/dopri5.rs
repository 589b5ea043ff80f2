use geode_core::OdeSystem;

use super::{Attempt, Stepper, combine, evaluate};
use crate::transient::ivp::Stats;

/// Dormand-Prince 5(4) with the first-same-as-last property.
pub(crate) struct Dopri5;

const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;
const A71: f64 = 35.0 / 384.0;
const A73: f64 = 500.0 / 1113.0;
const A74: f64 = 125.0 / 192.0;
const A75: f64 = -2187.0 / 6784.0;
const A76: f64 = 11.0 / 84.0;

// Difference between the fifth- and fourth-order weights.
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339_200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

impl<const N: usize> Stepper<N> for Dopri5 {
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
        let k1 = f;
        let k2 = evaluate(system, s + C2 * h, &combine(y, h, &[(A21, k1)]), stats);
        let k3 = evaluate(
            system,
            s + C3 * h,
            &combine(y, h, &[(A31, k1), (A32, &k2)]),
            stats,
        );
        let k4 = evaluate(
            system,
            s + C4 * h,
            &combine(y, h, &[(A41, k1), (A42, &k2), (A43, &k3)]),
            stats,
        );
        let k5 = evaluate(
            system,
            s + C5 * h,
            &combine(y, h, &[(A51, k1), (A52, &k2), (A53, &k3), (A54, &k4)]),
            stats,
        );
        let k6 = evaluate(
            system,
            s + h,
            &combine(y, h, &[(A61, k1), (A62, &k2), (A63, &k3), (A64, &k4), (A65, &k5)]),
            stats,
        );
        let y_new = combine(
            y,
            h,
            &[(A71, k1), (A73, &k3), (A74, &k4), (A75, &k5), (A76, &k6)],
        );
        let k7 = evaluate(system, s + h, &y_new, stats);

        let error = combine(
            &[0.0; N],
            h,
            &[(E1, k1), (E3, &k3), (E4, &k4), (E5, &k5), (E6, &k6), (E7, &k7)],
        );

        Attempt {
            y: y_new,
            f: k7,
            error,
        }
    }
}
