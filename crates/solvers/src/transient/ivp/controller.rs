/// Step-size controller using an I-controller.
///
/// `h_new = safety * h * error^(-exponent)`, clamped to
/// `[min_factor, max_factor]`, where `exponent = 1 / (q + 1)` for an error
/// estimate of order `q`.
#[derive(Debug, Clone, Copy)]
pub(super) struct Controller {
    safety: f64,
    min_factor: f64,
    max_factor: f64,
    exponent: f64,
}

impl Controller {
    pub(super) fn new(error_order: u32) -> Self {
        Self {
            safety: 0.9,
            min_factor: 0.2,
            max_factor: 5.0,
            exponent: 1.0 / f64::from(error_order + 1),
        }
    }

    /// Returns the factor to scale the step by after an attempt.
    ///
    /// A NaN error (a step into a singularity) shrinks as hard as allowed.
    pub(super) fn factor(&self, error: f64) -> f64 {
        if error.is_nan() {
            return self.min_factor;
        }
        if error == 0.0 {
            return self.max_factor;
        }
        (self.safety * error.powf(-self.exponent)).clamp(self.min_factor, self.max_factor)
    }

    pub(super) fn exponent(&self) -> f64 {
        self.exponent
    }
}

/// Root-mean-square error norm scaled by `atol + rtol * max(|y|, |y_new|)`.
pub(super) fn error_norm<const N: usize>(
    error: &[f64; N],
    y: &[f64; N],
    y_new: &[f64; N],
    atol: f64,
    rtol: f64,
) -> f64 {
    if N == 0 {
        return 0.0;
    }
    let sum: f64 = (0..N)
        .map(|i| {
            let scale = atol + rtol * y[i].abs().max(y_new[i].abs());
            (error[i] / scale).powi(2)
        })
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let n = N as f64;
    (sum / n).sqrt()
}

/// Plain RMS norm of `v` scaled by `atol + rtol * |y|`.
pub(super) fn scaled_norm<const N: usize>(v: &[f64; N], y: &[f64; N], atol: f64, rtol: f64) -> f64 {
    error_norm(v, y, y, atol, rtol)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn small_errors_grow_the_step() {
        let controller = Controller::new(4);
        assert_relative_eq!(controller.factor(0.0), 5.0);
        assert_relative_eq!(controller.factor(1e-12), 5.0);
        assert!(controller.factor(0.5) > 1.0);
    }

    #[test]
    fn large_errors_shrink_the_step() {
        let controller = Controller::new(2);
        assert!(controller.factor(2.0) < 1.0);
        assert_relative_eq!(controller.factor(1e12), 0.2);
        assert_relative_eq!(controller.factor(f64::NAN), 0.2);
        assert_relative_eq!(controller.factor(f64::INFINITY), 0.2);
    }

    #[test]
    fn norm_is_scaled_rms() {
        let error = [1e-6, 0.0];
        let y = [1.0, 0.0];
        // scale = 1e-6 + 1e-6 * 1 = 2e-6 for the first component.
        let norm = error_norm(&error, &y, &y, 1e-6, 1e-6);
        assert_relative_eq!(norm, (0.25_f64 / 2.0).sqrt(), max_relative = 1e-12);
    }
}
