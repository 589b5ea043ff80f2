use super::Trigger;

/// End points of an accepted step with their derivatives.
pub(super) struct Segment<'a, const N: usize> {
    pub s0: f64,
    pub y0: &'a [f64; N],
    pub f0: &'a [f64; N],
    pub s1: f64,
    pub y1: &'a [f64; N],
    pub f1: &'a [f64; N],
}

impl<const N: usize> Segment<'_, N> {
    /// Cubic Hermite interpolation of the state at `s`.
    pub(super) fn interpolate(&self, s: f64) -> [f64; N] {
        let h = self.s1 - self.s0;
        let t = (s - self.s0) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 1.0 - 3.0 * t2 + 2.0 * t3;
        let h10 = t - 2.0 * t2 + t3;
        let h01 = 3.0 * t2 - 2.0 * t3;
        let h11 = t3 - t2;

        std::array::from_fn(|i| {
            h00 * self.y0[i] + h10 * h * self.f0[i] + h01 * self.y1[i] + h11 * h * self.f1[i]
        })
    }

    /// Locates the crossing of `trigger` inside the segment by bisection.
    ///
    /// `g0` is the trigger value at `s0` and must differ in sign from the
    /// value at `s1`. Returns the parameter just past the crossing and the
    /// interpolated state there.
    pub(super) fn locate(&self, trigger: &Trigger<N>, g0: f64) -> (f64, [f64; N]) {
        let (mut lo, mut hi) = (self.s0, self.s1);
        let mut g_lo = g0;
        for _ in 0..100 {
            let mid = 0.5 * (lo + hi);
            if mid <= lo || mid >= hi {
                break;
            }
            let g_mid = trigger.eval(mid, &self.interpolate(mid));
            if trigger.crosses(g_lo, g_mid) {
                hi = mid;
            } else {
                lo = mid;
                g_lo = g_mid;
            }
        }
        let y = if hi == self.s1 {
            *self.y1
        } else {
            self.interpolate(hi)
        };
        (hi, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn hermite_is_exact_for_cubics() {
        // y = s^3, y' = 3 s^2 on [1, 2].
        let segment = Segment {
            s0: 1.0,
            y0: &[1.0],
            f0: &[3.0],
            s1: 2.0,
            y1: &[8.0],
            f1: &[12.0],
        };
        assert_relative_eq!(segment.interpolate(1.5)[0], 3.375, epsilon = 1e-14);
        assert_relative_eq!(segment.interpolate(1.0)[0], 1.0, epsilon = 1e-14);
        assert_relative_eq!(segment.interpolate(2.0)[0], 8.0, epsilon = 1e-14);
    }

    #[test]
    fn bisection_finds_linear_crossing() {
        // y = 2 s on [0, 1], crossing y = 0.5 at s = 0.25.
        let segment = Segment {
            s0: 0.0,
            y0: &[0.0],
            f0: &[2.0],
            s1: 1.0,
            y1: &[2.0],
            f1: &[2.0],
        };
        let trigger = Trigger::new(|_, y: &[f64; 1]| y[0] - 0.5);
        let (s, y) = segment.locate(&trigger, -0.5);
        assert_relative_eq!(s, 0.25, epsilon = 1e-12);
        assert_relative_eq!(y[0], 0.5, epsilon = 1e-12);
    }
}
