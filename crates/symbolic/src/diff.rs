use thiserror::Error;

use crate::expr::{Expr, Func, Node, Var};

/// Errors that can occur while differentiating along a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DiffError {
    /// The expression already depends on a velocity.
    ///
    /// Total derivatives are taken through the coordinates only, so an
    /// expression containing velocities would need accelerations to
    /// differentiate, which are not representable.
    #[error("expression depends on velocity v{0}, which has no derivative along the curve")]
    DependsOnVelocity(usize),
}

impl Expr {
    /// Returns the partial derivative with respect to `var`.
    ///
    /// All other variables are held constant. The result is not simplified;
    /// call [`Expr::simplify`] when a compact form matters.
    #[must_use]
    pub fn diff(&self, var: Var) -> Expr {
        if !self.depends_on(var) {
            return Expr::zero();
        }

        match self.node() {
            Node::Const(_) => Expr::zero(),
            Node::Var(v) => {
                if *v == var {
                    Expr::one()
                } else {
                    Expr::zero()
                }
            }
            Node::Add(terms) => Expr::sum(terms.iter().map(|t| t.diff(var))),
            Node::Mul(factors) => Expr::sum((0..factors.len()).filter_map(|i| {
                if !factors[i].depends_on(var) {
                    return None;
                }
                Some(Expr::product(factors.iter().enumerate().map(|(j, f)| {
                    if i == j { f.diff(var) } else { f.clone() }
                })))
            })),
            Node::Pow(base, exponent) => {
                if !exponent.depends_on(var) {
                    // d(b^e) = e b^(e-1) b'
                    Expr::product([
                        exponent.clone(),
                        Expr::pow(base.clone(), exponent - 1.0),
                        base.diff(var),
                    ])
                } else if !base.depends_on(var) {
                    // d(b^e) = b^e ln(b) e'
                    Expr::product([self.clone(), base.ln(), exponent.diff(var)])
                } else {
                    // d(b^e) = b^e (e' ln b + e b' / b)
                    Expr::product([
                        self.clone(),
                        exponent.diff(var) * base.ln() + exponent * base.diff(var) / base,
                    ])
                }
            }
            Node::Call(func, arg) => {
                let outer = match func {
                    Func::Sin => arg.cos(),
                    Func::Cos => -arg.sin(),
                    Func::Tan => arg.cos().powi(-2),
                    Func::Exp => self.clone(),
                    Func::Ln => arg.recip(),
                };
                Expr::product([outer, arg.diff(var)])
            }
        }
    }

    /// Returns the derivative along a curve parametrized by the affine parameter.
    ///
    /// Each coordinate `x_i` is treated as a function of `s` whose derivative
    /// is the velocity `v_i`, so the result is `Σ ∂f/∂x_i · v_i + ∂f/∂s`.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::DependsOnVelocity`] if the expression contains a
    /// velocity variable.
    pub fn total_derivative(&self) -> Result<Expr, DiffError> {
        let vars = self.variables();
        if let Some(index) = vars.iter().find_map(|v| match v {
            Var::Velocity(i) => Some(*i),
            _ => None,
        }) {
            return Err(DiffError::DependsOnVelocity(index));
        }

        Ok(Expr::sum(vars.iter().map(|var| match var {
            Var::Coordinate(i) => Expr::product([self.diff(*var), Expr::velocity(*i)]),
            _ => self.diff(*var),
        })))
    }
}
