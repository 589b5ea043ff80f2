use geode_symbolic::{EvalError, Expr, Matrix, MatrixError, Var};
use ndarray::Array2;

use crate::ConfigurationError;

/// A symmetric metric tensor written in terms of the coordinates.
///
/// Entries may depend on the coordinates `x0..x3` only: not on the
/// velocities and not on the affine parameter directly.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricTensor {
    matrix: Matrix,
}

impl MetricTensor {
    /// Wraps a matrix of expressions as a metric.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry depends on anything other than a
    /// coordinate, or if the matrix is not symmetric.
    pub fn new(matrix: Matrix) -> Result<Self, ConfigurationError> {
        let dim = matrix.dim();
        for row in 0..dim {
            for col in 0..dim {
                let stray = matrix[(row, col)]
                    .variables()
                    .into_iter()
                    .find(|var| !matches!(var, Var::Coordinate(i) if *i < dim));
                if let Some(var) = stray {
                    return Err(ConfigurationError::NonCoordinateDependence { row, col, var });
                }
            }
        }

        for row in 0..dim {
            for col in row + 1..dim {
                let difference = (&matrix[(row, col)] - &matrix[(col, row)]).simplify();
                if !difference.is_zero() {
                    return Err(ConfigurationError::Asymmetric { row, col });
                }
            }
        }

        Ok(Self { matrix })
    }

    /// Wraps a matrix that is a metric by construction.
    pub(crate) fn known(matrix: Matrix) -> Self {
        debug_assert!(matrix.is_symmetric(), "metric constructors are symmetric");
        Self { matrix }
    }

    /// Builds a metric from its rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows do not form a square matrix or the
    /// matrix is not a valid metric (see [`MetricTensor::new`]).
    pub fn from_rows(rows: Vec<Vec<Expr>>) -> Result<Self, ConfigurationError> {
        Self::new(Matrix::from_rows(rows)?)
    }

    /// Builds a diagonal metric.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry depends on anything other than a
    /// coordinate.
    pub fn diagonal(diagonal: Vec<Expr>) -> Result<Self, ConfigurationError> {
        Self::new(Matrix::diagonal(diagonal))
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.matrix.dim()
    }

    #[must_use]
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Returns the component `g_ij`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> &Expr {
        self.matrix.get(i, j)
    }

    /// Returns the inverse metric `g^ij`.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Singular`] if the determinant is identically zero.
    pub fn inverse(&self) -> Result<Matrix, MatrixError> {
        self.matrix.inverse()
    }

    /// Evaluates every component at a point.
    ///
    /// # Errors
    ///
    /// Returns an error if `position` has fewer entries than the metric
    /// has coordinates.
    pub fn evaluate(&self, position: &[f64]) -> Result<Array2<f64>, EvalError> {
        let dim = self.dim();
        let bindings = |var: Var| match var {
            Var::Coordinate(i) => position.get(i).copied(),
            _ => None,
        };

        let mut values = Array2::zeros((dim, dim));
        for ((i, j), value) in values.indexed_iter_mut() {
            *value = self.matrix[(i, j)].eval(&bindings)?;
        }
        Ok(values)
    }

    /// Returns `g_ij u^i u^j` for a velocity `u` at `position`.
    ///
    /// The sign tells whether the motion is time-like, null or space-like
    /// under the metric's signature.
    ///
    /// # Errors
    ///
    /// Returns an error if `position` has fewer entries than the metric
    /// has coordinates.
    pub fn interval(&self, position: &[f64], velocity: &[f64]) -> Result<f64, EvalError> {
        let g = self.evaluate(position)?;
        Ok(g.indexed_iter()
            .map(|((i, j), g_ij)| g_ij * velocity[i] * velocity[j])
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::metrics;

    #[test]
    fn velocities_are_rejected() {
        let r = Expr::coordinate(1);
        let result = MetricTensor::diagonal(vec![
            Expr::one(),
            -Expr::one(),
            -r.powi(2),
            -(r.powi(2) * Expr::velocity(0)),
        ]);
        assert_eq!(
            result,
            Err(ConfigurationError::NonCoordinateDependence {
                row: 3,
                col: 3,
                var: Var::Velocity(0)
            })
        );
    }

    #[test]
    fn affine_parameter_is_rejected() {
        let result = MetricTensor::diagonal(vec![Expr::affine(), -Expr::one()]);
        assert!(matches!(
            result,
            Err(ConfigurationError::NonCoordinateDependence {
                var: Var::Affine,
                ..
            })
        ));
    }

    #[test]
    fn asymmetric_metric_is_rejected() {
        let r = Expr::coordinate(1);
        let result = MetricTensor::from_rows(vec![
            vec![Expr::one(), r.clone()],
            vec![r.powi(2), -Expr::one()],
        ]);
        assert_eq!(result, Err(ConfigurationError::Asymmetric { row: 0, col: 1 }));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let result = MetricTensor::from_rows(vec![vec![Expr::one()], vec![]]);
        assert!(matches!(result, Err(ConfigurationError::Matrix(_))));
    }

    #[test]
    fn numeric_components_and_interval() {
        let g = metrics::schwarzschild(2.0);
        let values = g.evaluate(&[0.0, 8.0, 0.5, 0.0]).expect("bound");

        assert_relative_eq!(values[[0, 0]], 0.75);
        assert_relative_eq!(values[[1, 1]], -1.0 / 0.75, max_relative = 1e-14);
        assert_relative_eq!(values[[0, 1]], 0.0);

        // A static observer has g_00 (u^0)² = 1 when u^0 = 1/sqrt(g_00).
        let u0 = 0.75_f64.sqrt().recip();
        let interval = g
            .interval(&[0.0, 8.0, 0.5, 0.0], &[u0, 0.0, 0.0, 0.0])
            .expect("bound");
        assert_relative_eq!(interval, 1.0, max_relative = 1e-14);
    }

    #[test]
    fn short_positions_are_unbound() {
        let g = metrics::schwarzschild(2.0);
        assert_eq!(
            g.evaluate(&[0.0, 8.0]).err(),
            Some(EvalError::Unbound(Var::Coordinate(2)))
        );
    }
}
