use thiserror::Error;

use crate::expr::{Expr, Node, Var};

/// Errors that can occur while evaluating an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A variable in the expression has no value.
    #[error("variable {0} is unbound")]
    Unbound(Var),
}

impl Expr {
    /// Evaluates the expression with variable values from `bindings`.
    ///
    /// Evaluation walks the tree, which makes it convenient for checks and
    /// tests. Use [`Expr::compile`] for repeated evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Unbound`] if `bindings` has no value for a
    /// variable the expression depends on.
    pub fn eval<F>(&self, bindings: &F) -> Result<f64, EvalError>
    where
        F: Fn(Var) -> Option<f64>,
    {
        Ok(match self.node() {
            Node::Const(c) => *c,
            Node::Var(v) => bindings(*v).ok_or(EvalError::Unbound(*v))?,
            Node::Add(terms) => {
                let mut total = 0.0;
                for term in terms {
                    total += term.eval(bindings)?;
                }
                total
            }
            Node::Mul(factors) => {
                let mut total = 1.0;
                for factor in factors {
                    total *= factor.eval(bindings)?;
                }
                total
            }
            Node::Pow(base, exponent) => base.eval(bindings)?.powf(exponent.eval(bindings)?),
            Node::Call(func, arg) => func.apply(arg.eval(bindings)?),
        })
    }
}
