//! Recursive-descent parser for tag expressions.
//!
//! Grammar:
//!
//! expr    = operand (("&&" | "||") expr)?
//! operand = "(" expr ")" | "!" operand | ATOM
//!
//! The right-hand side of a binary operator is a whole `expr`, so operator
//! chains associate to the right with no precedence between `&&` and `||`:
//! `a && b || c` is `a && (b || c)`.
//!
//! Chains are read in a loop rather than by recursion, and a run of the same
//! operator becomes one node: `a && b && c` is `And([a, b, c])`. Parentheses,
//! `!` and operator changes each add a level, capped at [`MAX_DEPTH`].

use super::lexer::Token;
use super::Expr;
use crate::error::{Error, Result};
use crate::pattern::TagPattern;

/// Deepest expression tree accepted by the parser.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    And,
    Or,
}

impl BinOp {
    fn node(self, children: Vec<Expr>) -> Expr {
        match self {
            BinOp::And => Expr::And(children),
            BinOp::Or => Expr::Or(children),
        }
    }
}

/// A parsed subtree with the number of levels below and including its root.
struct Subtree {
    expr: Expr,
    height: usize,
}

impl Subtree {
    fn wrap(self, wrap: impl FnOnce(Expr) -> Expr) -> Result<Subtree> {
        checked(wrap(self.expr), self.height + 1)
    }
}

fn checked(expr: Expr, height: usize) -> Result<Subtree> {
    if height > MAX_DEPTH {
        return Err(Error::TooDeep(MAX_DEPTH));
    }
    Ok(Subtree { expr, height })
}

/// Operands of one operator run, last operand first.
struct Run {
    op: BinOp,
    children: Vec<Subtree>,
}

impl Run {
    fn close(self) -> Result<Subtree> {
        let height = 1 + self.children.iter().map(|c| c.height).max().unwrap_or(0);
        let children = self.children.into_iter().rev().map(|c| c.expr).collect();
        checked(self.op.node(children), height)
    }
}

/// Group `first op1 e1 op2 e2 ...` from the right.
fn fold_right(first: Subtree, mut rest: Vec<(BinOp, Subtree)>) -> Result<Subtree> {
    let Some((op, last)) = rest.pop() else {
        return Ok(first);
    };

    let mut run = Run {
        op,
        children: vec![last],
    };
    // The operand popped with `op` is the left side of the run being built.
    while let Some((op, operand)) = rest.pop() {
        run.children.push(operand);
        if op != run.op {
            let inner = run.close()?;
            run = Run {
                op,
                children: vec![inner],
            };
        }
    }
    run.children.push(first);
    run.close()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn previous(&self) -> Option<&Token> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    /// Error for running out of input right after the last consumed token.
    fn missing_operand(&self) -> Error {
        match self.previous() {
            Some(Token::LParen) => Error::UnbalancedParens,
            previous => Error::MissingOperand(previous.map(|t| t.to_string()).unwrap_or_default()),
        }
    }

    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_DEPTH {
            return Err(Error::TooDeep(MAX_DEPTH));
        }
        self.depth += 1;
        let parsed = parse(self);
        self.depth -= 1;
        parsed
    }

    fn parse_expr(&mut self) -> Result<Subtree> {
        let first = self.parse_operand()?;
        let mut rest = Vec::new();

        loop {
            let op = match self.peek() {
                None | Some(Token::RParen) => break,
                Some(Token::And) => BinOp::And,
                Some(Token::Or) => BinOp::Or,
                Some(tok) => return Err(Error::UnexpectedToken(tok.to_string())),
            };
            self.advance();
            if self.peek().is_none() {
                return Err(self.missing_operand());
            }
            rest.push((op, self.parse_operand()?));
        }

        fold_right(first, rest)
    }

    fn parse_operand(&mut self) -> Result<Subtree> {
        match self.advance() {
            None => Err(self.missing_operand()),
            Some(Token::LParen) => {
                let inner = self.nested(Self::parse_expr)?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    None => Err(Error::UnbalancedParens),
                    Some(tok) => Err(Error::UnexpectedToken(tok.to_string())),
                }
            }
            Some(Token::Not) => self
                .nested(Self::parse_operand)?
                .wrap(|inner| Expr::Not(Box::new(inner))),
            Some(Token::Atom(atom)) => checked(Expr::Atom(TagPattern::new(&atom)?), 1),
            Some(tok) => Err(Error::UnexpectedToken(tok.to_string())),
        }
    }
}

/// Parse a token stream into an expression tree.
///
/// An empty stream yields `None`, meaning "no filter".
pub fn parse_tokens(tokens: Vec<Token>) -> Result<Option<Expr>> {
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut parser = Parser::new(tokens);
    let parsed = parser.parse_expr()?;
    match parser.advance() {
        None => Ok(Some(parsed.expr)),
        Some(tok) => Err(Error::UnexpectedToken(tok.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::lexer::tokenize;

    fn parse(input: &str) -> Result<Option<Expr>> {
        parse_tokens(tokenize(input))
    }

    fn atom(s: &str) -> Expr {
        Expr::Atom(TagPattern::new(s).unwrap())
    }

    fn not(inner: Expr) -> Expr {
        Expr::Not(Box::new(inner))
    }

    #[test]
    fn single_atom() {
        assert_eq!(parse("role::program").unwrap(), Some(atom("role::program")));
    }

    #[test]
    fn empty_is_no_filter() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn mixed_chain_is_right_associative() {
        assert_eq!(
            parse("a && b || c").unwrap(),
            Some(Expr::And(vec![atom("a"), Expr::Or(vec![atom("b"), atom("c")])]))
        );
        assert_eq!(
            parse("a || b && c").unwrap(),
            Some(Expr::Or(vec![atom("a"), Expr::And(vec![atom("b"), atom("c")])]))
        );
        assert_eq!(
            parse("a && b || c && d").unwrap(),
            Some(Expr::And(vec![
                atom("a"),
                Expr::Or(vec![atom("b"), Expr::And(vec![atom("c"), atom("d")])]),
            ]))
        );
    }

    #[test]
    fn same_operator_run_is_one_node() {
        assert_eq!(
            parse("a && b && c").unwrap(),
            Some(Expr::And(vec![atom("a"), atom("b"), atom("c")]))
        );
        assert_eq!(
            parse("a || b || c && d && e").unwrap(),
            Some(Expr::Or(vec![
                atom("a"),
                atom("b"),
                Expr::And(vec![atom("c"), atom("d"), atom("e")]),
            ]))
        );
    }

    #[test]
    fn parenthesized_group_stays_separate() {
        assert_eq!(
            parse("a && (b && c)").unwrap(),
            Some(Expr::And(vec![atom("a"), Expr::And(vec![atom("b"), atom("c")])]))
        );
    }

    #[test]
    fn parentheses_override() {
        assert_eq!(
            parse("(a && b) || c").unwrap(),
            Some(Expr::Or(vec![Expr::And(vec![atom("a"), atom("b")]), atom("c")]))
        );
    }

    #[test]
    fn not_binds_to_one_operand() {
        assert_eq!(
            parse("!a && b").unwrap(),
            Some(Expr::And(vec![not(atom("a")), atom("b")]))
        );
        assert_eq!(
            parse("!(a && b)").unwrap(),
            Some(not(Expr::And(vec![atom("a"), atom("b")])))
        );
        assert_eq!(parse("!!a").unwrap(), Some(not(not(atom("a")))));
    }

    #[test]
    fn unbalanced_parens() {
        assert_eq!(parse("(a && b"), Err(Error::UnbalancedParens));
        assert_eq!(parse("((a)"), Err(Error::UnbalancedParens));
    }

    #[test]
    fn open_paren_at_end_is_unbalanced() {
        assert_eq!(parse("("), Err(Error::UnbalancedParens));
        assert_eq!(parse("!("), Err(Error::UnbalancedParens));
        assert_eq!(parse("(("), Err(Error::UnbalancedParens));
        assert_eq!(parse("a && ("), Err(Error::UnbalancedParens));
    }

    #[test]
    fn stray_closing_paren() {
        assert_eq!(parse("a)"), Err(Error::UnexpectedToken(")".to_string())));
        assert_eq!(parse("(a))"), Err(Error::UnexpectedToken(")".to_string())));
        assert_eq!(parse(")"), Err(Error::UnexpectedToken(")".to_string())));
    }

    #[test]
    fn operator_without_left_operand() {
        assert_eq!(parse("&& a"), Err(Error::UnexpectedToken("&&".to_string())));
        assert_eq!(parse("a && || b"), Err(Error::UnexpectedToken("||".to_string())));
        assert_eq!(parse("()"), Err(Error::UnexpectedToken(")".to_string())));
    }

    #[test]
    fn operator_without_right_operand() {
        assert_eq!(parse("a &&"), Err(Error::MissingOperand("&&".to_string())));
        assert_eq!(parse("a ||"), Err(Error::MissingOperand("||".to_string())));
        assert_eq!(parse("a && !"), Err(Error::MissingOperand("!".to_string())));
        assert_eq!(parse("!"), Err(Error::MissingOperand("!".to_string())));
    }

    #[test]
    fn adjacent_atoms() {
        assert_eq!(parse("a b"), Err(Error::UnexpectedToken("b".to_string())));
        assert_eq!(parse("a (b)"), Err(Error::UnexpectedToken("(".to_string())));
    }

    #[test]
    fn invalid_glob_atom() {
        assert!(matches!(parse("a && [b"), Err(Error::Pattern { .. })));
    }

    #[test]
    fn negated_class_splits_at_bang() {
        assert!(matches!(
            parse("implemented-in::[!c]"),
            Err(Error::Pattern { pattern, .. }) if pattern == "implemented-in::["
        ));
    }

    #[test]
    fn long_chains_are_flat() {
        let and_chain = vec!["a"; 10_000].join(" && ");
        match parse(&and_chain).unwrap() {
            Some(Expr::And(children)) => assert_eq!(children.len(), 10_000),
            other => panic!("unexpected tree {other:?}"),
        }

        let or_chain = vec!["use::*"; 10_000].join(" || ");
        match parse(&or_chain).unwrap() {
            Some(Expr::Or(children)) => assert_eq!(children.len(), 10_000),
            other => panic!("unexpected tree {other:?}"),
        }
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let alternating: Vec<&str> = (0..10_000)
            .map(|i| if i % 2 == 0 { "a &&" } else { "b ||" })
            .collect();
        let alternating = format!("{} c", alternating.join(" "));
        assert_eq!(parse(&alternating), Err(Error::TooDeep(MAX_DEPTH)));

        let parens = format!("{}a{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(parse(&parens), Err(Error::TooDeep(MAX_DEPTH)));

        let bangs = format!("{}a", "!".repeat(10_000));
        assert_eq!(parse(&bangs), Err(Error::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn nesting_below_the_limit_is_accepted() {
        let parens = format!("{}a{}", "(".repeat(200), ")".repeat(200));
        assert_eq!(parse(&parens).unwrap(), Some(atom("a")));

        let bangs = format!("{}a", "!".repeat(200));
        assert!(parse(&bangs).unwrap().is_some());
    }
}
