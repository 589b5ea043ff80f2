use std::{
    collections::BTreeSet,
    ops::{Add, Div, Mul, Neg, Sub},
    sync::Arc,
};

/// A variable an expression can depend on.
///
/// Coordinates and velocities are indexed by their position in the coordinate
/// tuple. The velocity `Velocity(i)` is the derivative of `Coordinate(i)` with
/// respect to the affine parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Var {
    /// The `i`-th coordinate, as a function of the affine parameter.
    Coordinate(usize),

    /// The derivative of the `i`-th coordinate along the curve.
    Velocity(usize),

    /// The affine parameter itself.
    Affine,
}

/// Elementary functions supported in expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
}

impl Func {
    /// Applies the function to a number.
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Func::Sin => x.sin(),
            Func::Cos => x.cos(),
            Func::Tan => x.tan(),
            Func::Exp => x.exp(),
            Func::Ln => x.ln(),
        }
    }

    /// Returns the function name used when displaying expressions.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Exp => "exp",
            Func::Ln => "ln",
        }
    }
}

/// A node of an expression tree.
///
/// Sums and products are n-ary. Subtraction and division do not exist as
/// nodes: `a - b` is `a + (-1)·b` and `a / b` is `a · b^-1`.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Const(f64),
    Var(Var),
    Add(Vec<Expr>),
    Mul(Vec<Expr>),
    Pow(Expr, Expr),
    Call(Func, Expr),
}

/// An immutable symbolic expression.
///
/// Cloning is cheap: subtrees are shared through reference counting, so
/// expressions can be reused freely while building larger ones. Constructors
/// apply light normalization (constant folding, flattening and identity
/// elimination); [`Expr::simplify`] performs the full canonicalization.
#[derive(Clone)]
pub struct Expr(Arc<Node>);

impl Expr {
    pub(crate) fn from_node(node: Node) -> Self {
        Self(Arc::new(node))
    }

    /// Returns the root node of the expression.
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.0
    }

    /// Creates a numeric constant.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::from_node(Node::Const(value))
    }

    /// The constant zero.
    #[must_use]
    pub fn zero() -> Self {
        Self::constant(0.0)
    }

    /// The constant one.
    #[must_use]
    pub fn one() -> Self {
        Self::constant(1.0)
    }

    /// Creates a variable.
    #[must_use]
    pub fn var(var: Var) -> Self {
        Self::from_node(Node::Var(var))
    }

    /// The `index`-th coordinate.
    #[must_use]
    pub fn coordinate(index: usize) -> Self {
        Self::var(Var::Coordinate(index))
    }

    /// The velocity of the `index`-th coordinate.
    #[must_use]
    pub fn velocity(index: usize) -> Self {
        Self::var(Var::Velocity(index))
    }

    /// The affine parameter.
    #[must_use]
    pub fn affine() -> Self {
        Self::var(Var::Affine)
    }

    /// Returns the constant value if the expression is a number.
    #[must_use]
    pub fn as_const(&self) -> Option<f64> {
        match self.node() {
            Node::Const(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the variable if the expression is a bare variable.
    #[must_use]
    pub fn as_var(&self) -> Option<Var> {
        match self.node() {
            Node::Var(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns true if the expression is the constant zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.as_const() == Some(0.0)
    }

    /// Returns true if the expression is the constant one.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.as_const() == Some(1.0)
    }

    /// Builds a sum of terms.
    pub fn sum<I>(terms: I) -> Self
    where
        I: IntoIterator<Item = Expr>,
    {
        let mut constant = 0.0;
        let mut rest = Vec::new();
        for term in terms {
            match term.node() {
                Node::Const(c) => constant += c,
                Node::Add(inner) => {
                    for t in inner {
                        match t.as_const() {
                            Some(c) => constant += c,
                            None => rest.push(t.clone()),
                        }
                    }
                }
                _ => rest.push(term),
            }
        }

        if constant != 0.0 || !constant.is_finite() {
            rest.insert(0, Self::constant(constant));
        }

        match rest.len() {
            0 => Self::zero(),
            1 => rest.pop().unwrap_or_else(Self::zero),
            _ => Self::from_node(Node::Add(rest)),
        }
    }

    /// Builds a product of factors.
    pub fn product<I>(factors: I) -> Self
    where
        I: IntoIterator<Item = Expr>,
    {
        let mut constant = 1.0;
        let mut rest = Vec::new();
        for factor in factors {
            match factor.node() {
                Node::Const(c) => constant *= c,
                Node::Mul(inner) => {
                    for f in inner {
                        match f.as_const() {
                            Some(c) => constant *= c,
                            None => rest.push(f.clone()),
                        }
                    }
                }
                _ => rest.push(factor),
            }
        }

        if constant == 0.0 {
            return Self::zero();
        }
        if constant != 1.0 {
            rest.insert(0, Self::constant(constant));
        }

        match rest.len() {
            0 => Self::one(),
            1 => rest.pop().unwrap_or_else(Self::one),
            _ => Self::from_node(Node::Mul(rest)),
        }
    }

    /// Raises `base` to `exponent`.
    #[must_use]
    pub fn pow(base: Expr, exponent: Expr) -> Self {
        match (base.as_const(), exponent.as_const()) {
            (_, Some(e)) if e == 0.0 => Self::one(),
            (_, Some(e)) if e == 1.0 => base,
            (Some(b), _) if b == 1.0 => Self::one(),
            (Some(b), Some(e)) => {
                let value = b.powf(e);
                if value.is_finite() {
                    Self::constant(value)
                } else {
                    Self::from_node(Node::Pow(base, exponent))
                }
            }
            _ => Self::from_node(Node::Pow(base, exponent)),
        }
    }

    /// Applies an elementary function.
    #[must_use]
    pub fn call(func: Func, arg: Expr) -> Self {
        if let Some(x) = arg.as_const() {
            let value = func.apply(x);
            if value.is_finite() {
                return Self::constant(value);
            }
        }
        Self::from_node(Node::Call(func, arg))
    }

    /// Raises the expression to an integer power.
    #[must_use]
    pub fn powi(&self, n: i32) -> Self {
        Self::pow(self.clone(), Self::constant(f64::from(n)))
    }

    /// Raises the expression to a real power.
    #[must_use]
    pub fn powf(&self, e: f64) -> Self {
        Self::pow(self.clone(), Self::constant(e))
    }

    /// The square root, represented as a power of one half.
    #[must_use]
    pub fn sqrt(&self) -> Self {
        self.powf(0.5)
    }

    /// The reciprocal `1 / self`.
    #[must_use]
    pub fn recip(&self) -> Self {
        self.powi(-1)
    }

    #[must_use]
    pub fn sin(&self) -> Self {
        Self::call(Func::Sin, self.clone())
    }

    #[must_use]
    pub fn cos(&self) -> Self {
        Self::call(Func::Cos, self.clone())
    }

    #[must_use]
    pub fn tan(&self) -> Self {
        Self::call(Func::Tan, self.clone())
    }

    #[must_use]
    pub fn exp(&self) -> Self {
        Self::call(Func::Exp, self.clone())
    }

    #[must_use]
    pub fn ln(&self) -> Self {
        Self::call(Func::Ln, self.clone())
    }

    /// Returns the set of variables the expression depends on.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<Var> {
        let mut vars = BTreeSet::new();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables(&self, vars: &mut BTreeSet<Var>) {
        match self.node() {
            Node::Const(_) => {}
            Node::Var(v) => {
                vars.insert(*v);
            }
            Node::Add(children) | Node::Mul(children) => {
                for child in children {
                    child.collect_variables(vars);
                }
            }
            Node::Pow(base, exponent) => {
                base.collect_variables(vars);
                exponent.collect_variables(vars);
            }
            Node::Call(_, arg) => arg.collect_variables(vars),
        }
    }

    /// Returns true if the expression depends on `var`.
    #[must_use]
    pub fn depends_on(&self, var: Var) -> bool {
        match self.node() {
            Node::Const(_) => false,
            Node::Var(v) => *v == var,
            Node::Add(children) | Node::Mul(children) => {
                children.iter().any(|child| child.depends_on(var))
            }
            Node::Pow(base, exponent) => base.depends_on(var) || exponent.depends_on(var),
            Node::Call(_, arg) => arg.depends_on(var),
        }
    }

    /// Counts the nodes in the expression tree.
    ///
    /// Shared subtrees are counted once per occurrence, which matches the
    /// work a compiled closure performs.
    #[must_use]
    pub fn size(&self) -> usize {
        1 + match self.node() {
            Node::Const(_) | Node::Var(_) => 0,
            Node::Add(children) | Node::Mul(children) => children.iter().map(Expr::size).sum(),
            Node::Pow(base, exponent) => base.size() + exponent.size(),
            Node::Call(_, arg) => arg.size(),
        }
    }

    /// Replaces every occurrence of `var` with `value`.
    #[must_use]
    pub fn substitute(&self, var: Var, value: &Expr) -> Expr {
        if !self.depends_on(var) {
            return self.clone();
        }
        match self.node() {
            Node::Const(_) => self.clone(),
            Node::Var(v) => {
                if *v == var {
                    value.clone()
                } else {
                    self.clone()
                }
            }
            Node::Add(terms) => Expr::sum(terms.iter().map(|t| t.substitute(var, value))),
            Node::Mul(factors) => Expr::product(factors.iter().map(|f| f.substitute(var, value))),
            Node::Pow(base, exponent) => {
                Expr::pow(base.substitute(var, value), exponent.substitute(var, value))
            }
            Node::Call(func, arg) => Expr::call(*func, arg.substitute(var, value)),
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::constant(value)
    }
}

impl From<Var> for Expr {
    fn from(var: Var) -> Self {
        Expr::var(var)
    }
}

fn add(a: Expr, b: Expr) -> Expr {
    Expr::sum([a, b])
}

fn sub(a: Expr, b: Expr) -> Expr {
    Expr::sum([a, Expr::product([Expr::constant(-1.0), b])])
}

fn mul(a: Expr, b: Expr) -> Expr {
    Expr::product([a, b])
}

fn div(a: Expr, b: Expr) -> Expr {
    Expr::product([a, b.recip()])
}

/// Implements a binary operator for every owned/borrowed/`f64` combination.
macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $func:ident) => {
        impl $trait<Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                $func(self, rhs)
            }
        }

        impl $trait<&Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                $func(self, rhs.clone())
            }
        }

        impl $trait<Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                $func(self.clone(), rhs)
            }
        }

        impl $trait<&Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                $func(self.clone(), rhs.clone())
            }
        }

        impl $trait<f64> for Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                $func(self, Expr::constant(rhs))
            }
        }

        impl $trait<f64> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                $func(self.clone(), Expr::constant(rhs))
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                $func(Expr::constant(self), rhs)
            }
        }

        impl $trait<&Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                $func(Expr::constant(self), rhs.clone())
            }
        }
    };
}

impl_binary_op!(Add, add, add);
impl_binary_op!(Sub, sub, sub);
impl_binary_op!(Mul, mul, mul);
impl_binary_op!(Div, div, div);

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::product([Expr::constant(-1.0), self])
    }
}

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        -(self.clone())
    }
}
