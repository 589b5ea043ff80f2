use std::ops::Index;

use thiserror::Error;

use crate::{
    diff::DiffError,
    expr::{Expr, Var},
};

/// Errors that can occur while building or inverting a matrix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    #[error("matrix has no rows")]
    Empty,

    #[error("row {row} has {len} entries, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("matrix is singular: its determinant simplifies to zero")]
    Singular,
}

/// A square matrix of expressions, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    dim: usize,
    entries: Vec<Expr>,
}

impl Matrix {
    /// Builds a matrix from its rows.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no rows or any row length differs from
    /// the number of rows.
    pub fn from_rows(rows: Vec<Vec<Expr>>) -> Result<Self, MatrixError> {
        let dim = rows.len();
        if dim == 0 {
            return Err(MatrixError::Empty);
        }
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != dim) {
            return Err(MatrixError::NotSquare {
                row,
                len: r.len(),
                expected: dim,
            });
        }
        Ok(Self {
            dim,
            entries: rows.into_iter().flatten().collect(),
        })
    }

    /// Builds a `dim × dim` matrix from a function of row and column.
    #[must_use]
    pub fn from_fn(dim: usize, mut f: impl FnMut(usize, usize) -> Expr) -> Self {
        let entries = (0..dim * dim).map(|k| f(k / dim, k % dim)).collect();
        Self { dim, entries }
    }

    /// Builds a diagonal matrix.
    #[must_use]
    pub fn diagonal(diagonal: Vec<Expr>) -> Self {
        Self::from_fn(diagonal.len(), |i, j| {
            if i == j {
                diagonal[i].clone()
            } else {
                Expr::zero()
            }
        })
    }

    /// Returns the number of rows (and columns).
    #[must_use]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns the entry at row `i`, column `j`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> &Expr {
        assert!(i < self.dim && j < self.dim, "index ({i}, {j}) out of bounds");
        &self.entries[i * self.dim + j]
    }

    /// Iterates over all entries in row-major order.
    pub fn entries(&self) -> impl Iterator<Item = &Expr> {
        self.entries.iter()
    }

    /// Applies `f` to every entry.
    #[must_use]
    pub fn map(&self, f: impl FnMut(&Expr) -> Expr) -> Self {
        Self {
            dim: self.dim,
            entries: self.entries.iter().map(f).collect(),
        }
    }

    #[must_use]
    pub fn transpose(&self) -> Self {
        Self::from_fn(self.dim, |i, j| self.get(j, i).clone())
    }

    #[must_use]
    pub fn simplify(&self) -> Self {
        self.map(Expr::simplify)
    }

    /// Differentiates every entry with respect to `var`.
    #[must_use]
    pub fn diff(&self, var: Var) -> Self {
        self.map(|e| e.diff(var))
    }

    /// Differentiates every entry along the curve.
    ///
    /// # Errors
    ///
    /// Returns an error if any entry depends on a velocity.
    pub fn total_derivative(&self) -> Result<Self, DiffError> {
        Ok(Self {
            dim: self.dim,
            entries: self
                .entries
                .iter()
                .map(Expr::total_derivative)
                .collect::<Result<_, _>>()?,
        })
    }

    /// Returns true if the matrix equals its transpose after simplification.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        (0..self.dim).all(|i| {
            (i + 1..self.dim).all(|j| (self.get(i, j) - self.get(j, i)).simplify().is_zero())
        })
    }

    /// Returns the simplified determinant.
    #[must_use]
    pub fn determinant(&self) -> Expr {
        let indices: Vec<usize> = (0..self.dim).collect();
        self.minor_determinant(&indices, &indices).simplify()
    }

    /// Laplace expansion of the submatrix selected by `rows` and `cols`.
    ///
    /// Expands along the row with the most zero entries so sparse metrics
    /// stay cheap.
    fn minor_determinant(&self, rows: &[usize], cols: &[usize]) -> Expr {
        if rows.len() == 1 {
            return self.get(rows[0], cols[0]).clone();
        }

        let zeros = |r: usize| cols.iter().filter(|&&c| self.get(r, c).is_zero()).count();
        let pivot = (0..rows.len())
            .max_by_key(|&p| (zeros(rows[p]), std::cmp::Reverse(p)))
            .unwrap_or(0);
        let row = rows[pivot];
        let other_rows: Vec<usize> = rows.iter().copied().filter(|&r| r != row).collect();

        Expr::sum(cols.iter().enumerate().filter_map(|(q, &col)| {
            let entry = self.get(row, col);
            if entry.is_zero() {
                return None;
            }
            let other_cols: Vec<usize> = cols.iter().copied().filter(|&c| c != col).collect();
            let sign = if (pivot + q) % 2 == 0 { 1.0 } else { -1.0 };
            Some(Expr::product([
                Expr::constant(sign),
                entry.clone(),
                self.minor_determinant(&other_rows, &other_cols),
            ]))
        }))
    }

    /// Returns the simplified inverse, computed from the adjugate.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Singular`] if the determinant simplifies to zero.
    pub fn inverse(&self) -> Result<Self, MatrixError> {
        let det = self.determinant();
        if det.is_zero() {
            return Err(MatrixError::Singular);
        }
        let inv_det = det.recip();

        let all: Vec<usize> = (0..self.dim).collect();
        let without =
            |k: usize| -> Vec<usize> { all.iter().copied().filter(|&x| x != k).collect() };

        if self.dim == 1 {
            return Ok(Self::from_fn(1, |_, _| inv_det.simplify()));
        }

        Ok(Self::from_fn(self.dim, |i, j| {
            // inverse(i, j) = cofactor(j, i) / det
            let minor = self.minor_determinant(&without(j), &without(i));
            if minor.is_zero() {
                return Expr::zero();
            }
            let sign = if (i + j) % 2 == 0 { 1.0 } else { -1.0 };
            Expr::product([Expr::constant(sign), minor, inv_det.clone()]).simplify()
        }))
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = Expr;

    fn index(&self, (i, j): (usize, usize)) -> &Expr {
        self.get(i, j)
    }
}
