//! Evaluation of expression trees against a tag set.

use super::Expr;
use crate::tag::TagSet;

/// Evaluate an expression against the tags of one package.
///
/// Every operand of `&&` and `||` is evaluated.
pub fn evaluate(expr: &Expr, tags: &TagSet) -> bool {
    match expr {
        Expr::Atom(pattern) => pattern.matches_set(tags),
        Expr::Not(inner) => !evaluate(inner, tags),
        Expr::And(children) => children
            .iter()
            .fold(true, |all, child| evaluate(child, tags) && all),
        Expr::Or(children) => children
            .iter()
            .fold(false, |any, child| evaluate(child, tags) || any),
    }
}
