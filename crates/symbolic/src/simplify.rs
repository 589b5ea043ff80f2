use std::cmp::Ordering;

use tracing::warn;

use crate::expr::{Expr, Node};

/// Upper bound on canonicalization passes before giving up on a fixpoint.
const MAX_PASSES: usize = 32;

impl Expr {
    /// Returns an equivalent expression in canonical form.
    ///
    /// Simplification folds constants, merges like terms in sums, merges
    /// equal bases in products, distributes numeric factors over sums and
    /// sorts operands into a fixed order. Structurally different inputs that
    /// reduce to the same canonical form compare equal afterwards.
    ///
    /// Passes repeat until the expression stops changing, so a second call
    /// returns the same expression. After 32 passes without a fixpoint the
    /// last pass is returned as is, with a warning, and may not be idempotent.
    ///
    /// Values are preserved up to rounding. When merged coefficients or
    /// folded constants cancel to within `8 ε` of the magnitudes summed, the
    /// result is taken to be exactly zero and the terms are dropped.
    #[must_use]
    pub fn simplify(&self) -> Expr {
        let (simplified, converged) = fixpoint(self, MAX_PASSES);
        if !converged {
            warn!(passes = MAX_PASSES, "simplification stopped before reaching a fixpoint");
        }
        simplified
    }
}

/// Canonicalizes `expr` until it stops changing, for at most `max_passes`.
///
/// The flag reports whether a fixpoint was reached.
fn fixpoint(expr: &Expr, max_passes: usize) -> (Expr, bool) {
    let mut current = expr.clone();
    for _ in 0..max_passes {
        let next = canonicalize(&current);
        if next == current {
            return (next, true);
        }
        current = next;
    }
    (current, false)
}

fn canonicalize(expr: &Expr) -> Expr {
    match expr.node() {
        Node::Const(_) | Node::Var(_) => expr.clone(),
        Node::Call(func, arg) => Expr::call(*func, canonicalize(arg)),
        Node::Pow(base, exponent) => canonical_pow(canonicalize(base), canonicalize(exponent)),
        Node::Mul(factors) => canonical_product(factors.iter().map(canonicalize)),
        Node::Add(terms) => canonical_sum(terms.iter().map(canonicalize)),
    }
}

fn as_integer(expr: &Expr) -> Option<f64> {
    expr.as_const().filter(|c| c.fract() == 0.0 && c.abs() <= f64::from(i32::MAX))
}

fn canonical_pow(base: Expr, exponent: Expr) -> Expr {
    if let Some(n) = as_integer(&exponent) {
        match base.node() {
            // (x^a)^n = x^(a·n) for integer n
            Node::Pow(inner, a) => return Expr::pow(inner.clone(), a * n),
            // (Π f)^n = Π f^n for integer n
            Node::Mul(factors) => {
                return Expr::product(
                    factors
                        .iter()
                        .map(|f| Expr::pow(f.clone(), exponent.clone())),
                );
            }
            _ => {}
        }
    }
    Expr::pow(base, exponent)
}

/// Splits a factor into base and exponent so equal bases can be merged.
fn base_and_exponent(factor: &Expr) -> (Expr, Expr) {
    match factor.node() {
        Node::Pow(base, exponent) => (base.clone(), exponent.clone()),
        _ => (factor.clone(), Expr::one()),
    }
}

fn canonical_product(factors: impl Iterator<Item = Expr>) -> Expr {
    let flat = Expr::product(factors);
    let Node::Mul(factors) = flat.node() else {
        return flat;
    };

    let mut coefficient = 1.0;
    let mut powers: Vec<(Expr, Vec<Expr>)> = Vec::new();
    for factor in factors {
        if let Some(c) = factor.as_const() {
            coefficient *= c;
            continue;
        }
        let (base, exponent) = base_and_exponent(factor);
        match powers.iter_mut().find(|(b, _)| *b == base) {
            Some((_, exponents)) => exponents.push(exponent),
            None => powers.push((base, vec![exponent])),
        }
    }

    let mut merged: Vec<Expr> = powers
        .into_iter()
        .map(|(base, exponents)| {
            let exponent = if exponents.len() == 1 {
                exponents.into_iter().next().unwrap_or_else(Expr::one)
            } else {
                canonical_sum(exponents.into_iter())
            };
            Expr::pow(base, exponent)
        })
        .filter(|f| !f.is_one())
        .collect();

    // Constant factors produced by merging, such as x^0.
    for f in &merged {
        if let Some(c) = f.as_const() {
            coefficient *= c;
        }
    }
    merged.retain(|f| f.as_const().is_none());

    if coefficient == 0.0 {
        return Expr::zero();
    }

    // c·(a + b) = c·a + c·b
    if coefficient != 1.0 && merged.len() == 1 {
        if let Node::Add(terms) = merged[0].node() {
            return canonical_sum(
                terms
                    .iter()
                    .map(|t| Expr::product([Expr::constant(coefficient), t.clone()])),
            );
        }
    }

    merged.sort_by(compare);
    Expr::product(std::iter::once(Expr::constant(coefficient)).chain(merged))
}

/// Splits a term into a numeric coefficient and the remaining factors.
fn coefficient_and_rest(term: &Expr) -> (f64, Expr) {
    match term.node() {
        Node::Mul(factors) => match factors.first().and_then(Expr::as_const) {
            Some(c) => (c, Expr::product(factors[1..].iter().cloned())),
            None => (1.0, term.clone()),
        },
        _ => (1.0, term.clone()),
    }
}

/// Sums coefficients, treating round-off level cancellation as exact.
fn settle(total: f64, magnitude: f64) -> f64 {
    if total.abs() <= 8.0 * f64::EPSILON * magnitude {
        0.0
    } else {
        total
    }
}

fn canonical_sum(terms: impl Iterator<Item = Expr>) -> Expr {
    let flat = Expr::sum(terms);
    let Node::Add(terms) = flat.node() else {
        return flat;
    };

    let mut constant = 0.0;
    let mut constant_magnitude = 0.0;
    let mut like: Vec<(Expr, f64, f64)> = Vec::new();
    for term in terms {
        if let Some(c) = term.as_const() {
            constant += c;
            constant_magnitude += c.abs();
            continue;
        }
        let (c, rest) = coefficient_and_rest(term);
        match like.iter_mut().find(|(r, _, _)| *r == rest) {
            Some((_, total, magnitude)) => {
                *total += c;
                *magnitude += c.abs();
            }
            None => like.push((rest, c, c.abs())),
        }
    }

    let mut collected: Vec<Expr> = like
        .into_iter()
        .filter_map(|(rest, total, magnitude)| {
            let c = settle(total, magnitude);
            (c != 0.0).then(|| Expr::product([Expr::constant(c), rest]))
        })
        .collect();
    collected.sort_by(compare);

    let constant = settle(constant, constant_magnitude);
    Expr::sum(std::iter::once(Expr::constant(constant)).chain(collected))
}

fn rank(expr: &Expr) -> u8 {
    match expr.node() {
        Node::Const(_) => 0,
        Node::Var(_) => 1,
        Node::Call(_, _) => 2,
        Node::Pow(_, _) => 3,
        Node::Mul(_) => 4,
        Node::Add(_) => 5,
    }
}

/// A total order on expressions used to sort operands.
fn compare(a: &Expr, b: &Expr) -> Ordering {
    rank(a).cmp(&rank(b)).then_with(|| match (a.node(), b.node()) {
        (Node::Const(x), Node::Const(y)) => x.total_cmp(y),
        (Node::Var(x), Node::Var(y)) => x.cmp(y),
        (Node::Call(f, x), Node::Call(g, y)) => f.cmp(g).then_with(|| compare(x, y)),
        (Node::Pow(b1, e1), Node::Pow(b2, e2)) => compare(b1, b2).then_with(|| compare(e1, e2)),
        (Node::Mul(xs), Node::Mul(ys)) | (Node::Add(xs), Node::Add(ys)) => xs
            .iter()
            .zip(ys)
            .map(|(x, y)| compare(x, y))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| xs.len().cmp(&ys.len())),
        _ => Ordering::Equal,
    })
}
