use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::expr::{Expr, Node, Var};

/// Errors that can occur while compiling an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The expression depends on a variable the layout does not provide.
    #[error("variable {0} has no slot in the argument layout")]
    Unbound(Var),

    /// The layout width does not match the compiled argument length.
    #[error("layout provides {layout} arguments but the closure takes {arity}")]
    ArityMismatch { layout: usize, arity: usize },
}

/// Assigns argument slots to variables.
///
/// The phase-space layout for `dim` coordinates places `x_i` at slot `i` and
/// `v_i` at slot `dim + i`, matching the state vector of a geodesic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    dim: usize,
    velocities: bool,
}

impl Layout {
    /// Coordinates followed by their velocities.
    #[must_use]
    pub fn phase_space(dim: usize) -> Self {
        Self {
            dim,
            velocities: true,
        }
    }

    /// Coordinates only.
    #[must_use]
    pub fn coordinates(dim: usize) -> Self {
        Self {
            dim,
            velocities: false,
        }
    }

    /// Returns the number of argument slots.
    #[must_use]
    pub fn width(&self) -> usize {
        if self.velocities {
            2 * self.dim
        } else {
            self.dim
        }
    }

    /// Returns the slot of `var`, if the layout provides one.
    #[must_use]
    pub fn slot(&self, var: Var) -> Option<usize> {
        match var {
            Var::Coordinate(i) if i < self.dim => Some(i),
            Var::Velocity(i) if self.velocities && i < self.dim => Some(self.dim + i),
            _ => None,
        }
    }
}

type Closure<const N: usize> = Arc<dyn Fn(&[f64; N]) -> f64 + Send + Sync>;

/// An expression compiled into a numeric closure.
///
/// Compiled expressions are cheap to clone and safe to share across threads.
#[derive(Clone)]
pub struct Compiled<const N: usize> {
    expr: Expr,
    func: Closure<N>,
}

impl<const N: usize> Compiled<N> {
    /// Evaluates the compiled expression.
    #[must_use]
    pub fn call(&self, args: &[f64; N]) -> f64 {
        (self.func)(args)
    }

    /// Returns the expression this closure was compiled from.
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl<const N: usize> fmt::Debug for Compiled<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compiled")
            .field("arity", &N)
            .field("expr", &self.expr)
            .finish()
    }
}

impl Expr {
    /// Compiles the expression into a closure taking `N` arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout width differs from `N`, or if the
    /// expression depends on a variable the layout has no slot for.
    pub fn compile<const N: usize>(&self, layout: Layout) -> Result<Compiled<N>, CompileError> {
        if layout.width() != N {
            return Err(CompileError::ArityMismatch {
                layout: layout.width(),
                arity: N,
            });
        }
        Ok(Compiled {
            expr: self.clone(),
            func: build(self, layout)?,
        })
    }
}

fn build<const N: usize>(expr: &Expr, layout: Layout) -> Result<Closure<N>, CompileError> {
    let func: Closure<N> = match expr.node() {
        Node::Const(c) => {
            let c = *c;
            Arc::new(move |_: &[f64; N]| c)
        }
        Node::Var(v) => {
            let slot = layout.slot(*v).ok_or(CompileError::Unbound(*v))?;
            Arc::new(move |y: &[f64; N]| y[slot])
        }
        Node::Add(terms) => {
            let terms = terms
                .iter()
                .map(|t| build(t, layout))
                .collect::<Result<Vec<_>, _>>()?;
            Arc::new(move |y: &[f64; N]| terms.iter().map(|t| t(y)).sum())
        }
        Node::Mul(factors) => {
            let factors = factors
                .iter()
                .map(|f| build(f, layout))
                .collect::<Result<Vec<_>, _>>()?;
            Arc::new(move |y: &[f64; N]| factors.iter().map(|f| f(y)).product())
        }
        Node::Pow(base, exponent) => {
            let base = build(base, layout)?;
            match exponent.as_const() {
                Some(e) if e == 0.5 => Arc::new(move |y: &[f64; N]| base(y).sqrt()),
                Some(e) if e == -0.5 => Arc::new(move |y: &[f64; N]| base(y).sqrt().recip()),
                Some(e) if e.fract() == 0.0 && e.abs() <= f64::from(i32::MAX) => {
                    #[allow(clippy::cast_possible_truncation)]
                    let n = e as i32;
                    Arc::new(move |y: &[f64; N]| base(y).powi(n))
                }
                Some(e) => Arc::new(move |y: &[f64; N]| base(y).powf(e)),
                None => {
                    let exponent = build(exponent, layout)?;
                    Arc::new(move |y: &[f64; N]| base(y).powf(exponent(y)))
                }
            }
        }
        Node::Call(func, arg) => {
            let func = *func;
            let arg = build(arg, layout)?;
            Arc::new(move |y: &[f64; N]| func.apply(arg(y)))
        }
    };
    Ok(func)
}
