//! Tokenizer for tag expressions.

use std::fmt;

use winnow::combinator::{alt, repeat};
use winnow::prelude::*;
use winnow::token::{any, take_while};

/// A token of a tag expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A glob atom such as `use::*`.
    Atom(String),
    /// `&&`
    And,
    /// `||`
    Or,
    /// `!`
    Not,
    /// `(`
    LParen,
    /// `)`
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Atom(atom) => f.write_str(atom),
            Token::And => f.write_str("&&"),
            Token::Or => f.write_str("||"),
            Token::Not => f.write_str("!"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

fn is_atom_char(c: char) -> bool {
    !matches!(c, ' ' | '\t' | '\n' | '&' | '|' | '!' | '(' | ')')
}

fn lex_atom(input: &mut &str) -> ModalResult<Token> {
    take_while(1.., is_atom_char)
        .map(|s: &str| Token::Atom(s.to_string()))
        .parse_next(input)
}

/// Lex one token, or consume one character that starts no token.
fn lex_token(input: &mut &str) -> ModalResult<Option<Token>> {
    alt((
        "&&".value(Some(Token::And)),
        "||".value(Some(Token::Or)),
        '('.value(Some(Token::LParen)),
        ')'.value(Some(Token::RParen)),
        '!'.value(Some(Token::Not)),
        lex_atom.map(Some),
        // whitespace, a lone '&' or '|'
        any.value(None),
    ))
    .parse_next(input)
}

/// Split an expression into tokens.
///
/// Never fails: characters that start no token are dropped.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut remaining = input;
    repeat(0.., lex_token)
        .fold(Vec::new, |mut acc: Vec<Token>, tok: Option<Token>| {
            acc.extend(tok);
            acc
        })
        .parse_next(&mut remaining)
        .unwrap_or_default()
}
