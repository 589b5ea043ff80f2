use ndarray::{Array1, ArrayView1};

/// Derivative of `f` with respect to `t` over non-uniform samples.
///
/// Interior points use the second-order central difference for uneven
/// spacing and the two end points use one-sided first-order differences,
/// so a quadratic is differentiated exactly away from the ends.
///
/// # Panics
///
/// Panics if `f` and `t` differ in length or have fewer than two samples.
pub(crate) fn gradient(f: ArrayView1<'_, f64>, t: ArrayView1<'_, f64>) -> Array1<f64> {
    let n = f.len();
    assert_eq!(n, t.len(), "values and sample points differ in length");
    assert!(n >= 2, "a gradient needs at least two samples");

    Array1::from_shape_fn(n, |i| match i {
        0 => (f[1] - f[0]) / (t[1] - t[0]),
        i if i == n - 1 => (f[i] - f[i - 1]) / (t[i] - t[i - 1]),
        i => {
            let before = t[i] - t[i - 1];
            let after = t[i + 1] - t[i];
            (before * before * f[i + 1] + (after * after - before * before) * f[i]
                - after * after * f[i - 1])
                / (before * after * (before + after))
        }
    })
}
