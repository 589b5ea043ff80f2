use std::fmt;

use crate::expr::{Expr, Node, Var};

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Var::Coordinate(i) => write!(f, "x{i}"),
            Var::Velocity(i) => write!(f, "v{i}"),
            Var::Affine => write!(f, "s"),
        }
    }
}

/// Binding strength, used to decide where parentheses are needed.
fn precedence(expr: &Expr) -> u8 {
    match expr.node() {
        Node::Add(_) => 1,
        Node::Mul(_) => 2,
        Node::Const(c) if *c < 0.0 => 2,
        Node::Pow(_, _) => 3,
        Node::Const(_) | Node::Var(_) | Node::Call(_, _) => 4,
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, min: u8) -> fmt::Result {
    if precedence(expr) < min {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

/// Splits a term into its sign and magnitude for printing inside a sum.
fn negated(term: &Expr) -> Option<Expr> {
    match term.node() {
        Node::Const(c) if *c < 0.0 => Some(Expr::constant(-c)),
        Node::Mul(factors) => match factors.first().and_then(Expr::as_const) {
            Some(c) if c < 0.0 => Some(Expr::product(
                std::iter::once(Expr::constant(-c)).chain(factors[1..].iter().cloned()),
            )),
            _ => None,
        },
        _ => None,
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Const(c) => write!(f, "{c}"),
            Node::Var(v) => write!(f, "{v}"),
            Node::Add(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    match (i, negated(term)) {
                        (0, _) => write_operand(f, term, 1)?,
                        (_, Some(magnitude)) => {
                            write!(f, " - ")?;
                            write_operand(f, &magnitude, 2)?;
                        }
                        (_, None) => {
                            write!(f, " + ")?;
                            write_operand(f, term, 2)?;
                        }
                    }
                }
                Ok(())
            }
            Node::Mul(factors) => {
                for (i, factor) in factors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "*")?;
                    }
                    write_operand(f, factor, if i == 0 { 2 } else { 3 })?;
                }
                Ok(())
            }
            Node::Pow(base, exponent) => {
                write_operand(f, base, 4)?;
                write!(f, "^")?;
                write_operand(f, exponent, 4)
            }
            Node::Call(func, arg) => write!(f, "{}({arg})", func.name()),
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
