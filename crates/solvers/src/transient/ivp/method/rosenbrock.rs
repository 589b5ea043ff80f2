use geode_core::OdeSystem;
use nalgebra::{DMatrix, DVector, Dyn, LU};

use super::{Attempt, Stepper, combine, evaluate};
use crate::transient::ivp::Stats;

/// The Rosenbrock 2(3) pair of Shampine and Reichelt.
///
/// Each step solves three linear systems with `W = I - h d J`, where `J` is
/// a finite-difference Jacobian. The Jacobian is reused across rejected
/// attempts from the same point and recomputed after every accepted step.
pub(crate) struct Rosenbrock23 {
    jacobian: Option<Linearization>,
}

/// Jacobian `∂f/∂y` and explicit parameter derivative `∂f/∂s`.
struct Linearization {
    j: DMatrix<f64>,
    t: DVector<f64>,
}

const D: f64 = 1.0 / (2.0 + std::f64::consts::SQRT_2);
const E32: f64 = 6.0 + std::f64::consts::SQRT_2;

impl Rosenbrock23 {
    pub(crate) fn new() -> Self {
        Self { jacobian: None }
    }

    fn linearize<S: OdeSystem<N>, const N: usize>(
        system: &S,
        s: f64,
        y: &[f64; N],
        f: &[f64; N],
        stats: &mut Stats,
    ) -> Linearization {
        stats.jacobians += 1;
        let sqrt_eps = f64::EPSILON.sqrt();

        let mut j = DMatrix::zeros(N, N);
        for col in 0..N {
            let delta = sqrt_eps * y[col].abs().max(1.0);
            let mut shifted = *y;
            shifted[col] += delta;
            let f_shifted = evaluate(system, s, &shifted, stats);
            for row in 0..N {
                j[(row, col)] = (f_shifted[row] - f[row]) / delta;
            }
        }

        let delta = sqrt_eps * s.abs().max(1.0);
        let f_later = evaluate(system, s + delta, y, stats);
        let t = DVector::from_iterator(N, (0..N).map(|i| (f_later[i] - f[i]) / delta));

        Linearization { j, t }
    }
}

fn to_vector<const N: usize>(v: &[f64; N]) -> DVector<f64> {
    DVector::from_column_slice(v)
}

fn to_array<const N: usize>(v: &DVector<f64>) -> [f64; N] {
    std::array::from_fn(|i| v[i])
}

fn solve(lu: &LU<f64, Dyn, Dyn>, rhs: &DVector<f64>) -> Option<DVector<f64>> {
    lu.solve(rhs).filter(|x| x.iter().all(|v| v.is_finite()))
}

impl<const N: usize> Stepper<N> for Rosenbrock23 {
    const ERROR_ORDER: u32 = 2;

    fn attempt<S: OdeSystem<N>>(
        &mut self,
        system: &S,
        s: f64,
        y: &[f64; N],
        f: &[f64; N],
        h: f64,
        stats: &mut Stats,
    ) -> Attempt<N> {
        let linearization = self
            .jacobian
            .get_or_insert_with(|| Self::linearize(system, s, y, f, stats));
        let (j, t) = (&linearization.j, &linearization.t);

        let w = DMatrix::identity(N, N) - j * (h * D);
        let lu = w.lu();

        let failed = || Attempt {
            y: [f64::NAN; N],
            f: [f64::NAN; N],
            error: [f64::INFINITY; N],
        };

        let f0 = to_vector(f);
        let Some(k1) = solve(&lu, &(&f0 + t * (h * D))) else {
            return failed();
        };

        let y1 = combine(y, 0.5 * h, &[(1.0, &to_array(&k1))]);
        let f1 = to_vector(&evaluate(system, s + 0.5 * h, &y1, stats));
        let Some(k2) = solve(&lu, &(&f1 - &k1)).map(|v| v + &k1) else {
            return failed();
        };

        let y_new = combine(y, h, &[(1.0, &to_array(&k2))]);
        let f_new = evaluate(system, s + h, &y_new, stats);
        let f2 = to_vector(&f_new);

        let rhs = &f2 - (&k2 - &f1) * E32 - (&k1 - &f0) * 2.0 + t * (h * D);
        let Some(k3) = solve(&lu, &rhs) else {
            return failed();
        };

        let error = (&k1 - &k2 * 2.0 + &k3) * (h / 6.0);

        Attempt {
            y: y_new,
            f: f_new,
            error: to_array(&error),
        }
    }

    fn accepted(&mut self) {
        self.jacobian = None;
    }
}
