//! Boolean tag expressions.
//!
//! Syntax:
//!   role::program              - a tag (glob atom) is present
//!   use::*                     - any tag matching the glob is present
//!   !expr                      - NOT, binds to the next operand only
//!   expr1 && expr2             - AND
//!   expr1 || expr2             - OR
//!   (expr)                     - grouping
//!
//! `&&` and `||` share one precedence level and chains associate to the
//! right. Use parentheses to group differently.
//!
//! `!` always starts a negation, so the glob class `[!...]` cannot be written
//! in an expression: use `!` outside the atom instead, e.g.
//! `implemented-in::* && !implemented-in::c`.
//!
//! Trees deeper than [`MAX_DEPTH`] levels are rejected with
//! [`Error::TooDeep`]. A run of one operator counts as a single level.

mod eval;
mod lexer;
mod parser;

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::pattern::TagPattern;
use crate::tag::TagSet;

pub use eval::evaluate;
pub use lexer::{tokenize, Token};
pub use parser::{parse_tokens, MAX_DEPTH};

/// A node of a parsed tag expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A glob atom, true if any tag matches.
    Atom(TagPattern),
    /// `!expr`
    Not(Box<Expr>),
    /// `a && b && ...`, at least two operands.
    And(Vec<Expr>),
    /// `a || b || ...`, at least two operands.
    Or(Vec<Expr>),
}

fn write_run(f: &mut fmt::Formatter, op: &str, children: &[Expr]) -> fmt::Result {
    write!(f, "(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, " {op} ")?;
        }
        write!(f, "{child}")?;
    }
    write!(f, ")")
}

impl fmt::Display for Expr {
    /// Fully parenthesized form that parses back to the same tree.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Atom(pattern) => write!(f, "{pattern}"),
            Expr::Not(inner) => write!(f, "!{inner}"),
            Expr::And(children) => write_run(f, "&&", children),
            Expr::Or(children) => write_run(f, "||", children),
        }
    }
}

/// A compiled tag expression, ready to be applied to many packages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatcher {
    expr: Option<Expr>,
    inverted: bool,
}

impl TagMatcher {
    /// Parse an expression.
    ///
    /// An empty expression matches every tag set.
    ///
    /// # Examples
    ///
    /// ```
    /// use debtags::{TagMatcher, TagSet};
    ///
    /// let matcher = TagMatcher::parse("role::program && (use::edit* || use::viewing)").unwrap();
    /// assert!(matcher.matches(&TagSet::parse_list("role::program, use::editing")));
    /// assert!(!matcher.matches(&TagSet::parse_list("role::program")));
    ///
    /// let all = TagMatcher::parse("").unwrap();
    /// assert!(all.matches(&TagSet::new()));
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        Self::with_inversion(input, false)
    }

    /// Parse an expression, optionally negating the whole of it.
    ///
    /// An inverted empty expression matches nothing.
    pub fn with_inversion(input: &str, inverted: bool) -> Result<Self> {
        let tokens = tokenize(input);
        tracing::debug!(expression = input, tokens = tokens.len(), "parsing tag expression");

        let expr = parse_tokens(tokens)?;
        let expr = match expr {
            Some(expr) if inverted => Some(Expr::Not(Box::new(expr))),
            other => other,
        };
        Ok(TagMatcher { expr, inverted })
    }

    /// The parsed tree, `None` for an empty expression.
    pub fn expr(&self) -> Option<&Expr> {
        self.expr.as_ref()
    }

    /// Whether the whole expression was negated.
    ///
    /// The negation is already part of [`TagMatcher::expr`]; the flag only
    /// decides the result for an empty expression.
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Whether a package with these tags passes the filter.
    pub fn matches(&self, tags: &TagSet) -> bool {
        match &self.expr {
            Some(expr) => evaluate(expr, tags),
            None => !self.inverted,
        }
    }
}

impl FromStr for TagMatcher {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TagMatcher::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tags: &[&str]) -> TagSet {
        tags.iter().copied().collect()
    }

    #[test]
    fn empty_matches_everything() {
        let m = TagMatcher::parse("").unwrap();
        assert!(m.expr().is_none());
        assert!(m.matches(&TagSet::new()));
        assert!(m.matches(&set(&["role::program"])));
    }

    #[test]
    fn inverted_empty_matches_nothing() {
        let m = TagMatcher::with_inversion("  ", true).unwrap();
        assert!(!m.matches(&TagSet::new()));
        assert!(!m.matches(&set(&["role::program"])));
    }

    #[test]
    fn inversion_wraps_tree() {
        let m = TagMatcher::with_inversion("use::*", true).unwrap();
        assert!(matches!(m.expr(), Some(Expr::Not(_))));
        assert!(m.is_inverted());
        assert!(!m.matches(&set(&["use::editing"])));
        assert!(m.matches(&set(&["role::program"])));
    }

    #[test]
    fn unbalanced_parens_is_an_error() {
        assert_eq!(TagMatcher::parse("(a && b"), Err(Error::UnbalancedParens));
    }

    #[test]
    fn from_str() {
        let m: TagMatcher = "a || b".parse().unwrap();
        assert!(m.matches(&set(&["b"])));
    }

    #[test]
    fn display_round_trip() {
        for input in ["a", "!a", "a && b || c", "(a && b) || !(c || d*)", "!!x::[yz]"] {
            let m = TagMatcher::parse(input).unwrap();
            let expr = m.expr().unwrap();
            let reparsed = TagMatcher::parse(&expr.to_string()).unwrap();
            assert_eq!(Some(expr), reparsed.expr(), "{input}");
        }
    }

    #[test]
    fn display_is_parenthesized() {
        let m = TagMatcher::parse("a && b || !c").unwrap();
        assert_eq!(m.expr().unwrap().to_string(), "(a && (b || !c))");
        let m = TagMatcher::parse("a && b && (c || d)").unwrap();
        assert_eq!(m.expr().unwrap().to_string(), "(a && b && (c || d))");
    }

    #[test]
    fn open_paren_alone_is_unbalanced() {
        assert_eq!(TagMatcher::parse("("), Err(Error::UnbalancedParens));
        assert_eq!(TagMatcher::parse("!("), Err(Error::UnbalancedParens));
    }

    #[test]
    fn long_chain_matches() {
        let chain = vec!["use::*"; 10_000].join(" && ");
        let m = TagMatcher::parse(&chain).unwrap();
        assert!(m.matches(&set(&["use::editing"])));
        assert!(!m.matches(&set(&["role::program"])));

        let inverted = TagMatcher::with_inversion(&chain, true).unwrap();
        assert!(inverted.clone().matches(&set(&["role::program"])));
        assert_eq!(inverted.expr().unwrap().to_string().len(), chain.len() + 3);
    }

    #[test]
    fn deep_expression_is_an_error() {
        let deep = format!("{}a{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(TagMatcher::parse(&deep), Err(Error::TooDeep(MAX_DEPTH)));
    }
}
