/// Error type for debtags parsing and queries.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// A glob atom could not be compiled.
    #[error("invalid pattern '{pattern}': {reason}")]
    Pattern {
        /// The atom as written in the expression.
        pattern: String,
        /// Message from the glob compiler.
        reason: String,
    },

    /// A token appeared where it is not allowed.
    #[error("unexpected token '{0}' in tag expression")]
    UnexpectedToken(String),

    /// An operator is missing its operand.
    #[error("missing operand after '{0}' in tag expression")]
    MissingOperand(String),

    /// An opening parenthesis was never closed.
    #[error("unbalanced parentheses in tag expression")]
    UnbalancedParens,

    /// The expression nests deeper than the given limit.
    #[error("tag expression nested deeper than {0} levels")]
    TooDeep(usize),

    /// A line of a tag collection could not be parsed.
    #[error("invalid tag collection line {line}: {content}")]
    InvalidCollectionLine {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },

    /// A line of a field:value record could not be parsed.
    #[error("invalid record line {line}: {content}")]
    InvalidRecord {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },

    /// A tag patch line could not be parsed.
    #[error("invalid tag patch line {line}: {content}")]
    InvalidPatch {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },

    /// Unknown output mode name.
    #[error("invalid output mode: {0}")]
    InvalidOutputMode(String),

    /// The tag is not defined in the vocabulary.
    #[error("unknown tag: {0}")]
    UnknownTag(String),

    /// The facet is not defined in the vocabulary.
    #[error("unknown facet: {0}")]
    UnknownFacet(String),

    /// The package is not present in the supplied data.
    #[error("unknown package: {0}")]
    UnknownPackage(String),
}

/// Result type for debtags operations.
pub type Result<T> = std::result::Result<T, Error>;
