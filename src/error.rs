//! Error types for the Simple front-end

use crate::lexer::TokenKind;
use thiserror::Error;

/// Front-end errors
///
/// Lexing never fails: unrecognized input becomes an [`TokenKind::Illegal`] token and is
/// reported here only once the parser runs into it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The parser expected one construct and found a different token
    ///
    /// **Triggered by:** A missing delimiter, an unbalanced `)`, an illegal lexeme or a
    /// form led by something that cannot start it
    /// **Example:** `(:= foo 5555xxxx)` (illegal token where an expression belongs)
    #[error(
        "Syntax error at line {line}, column {column}: expected {expected}, found {found} {literal:?}"
    )]
    UnexpectedToken {
        /// Description of the expected construct
        expected: String,
        /// Kind of the token actually found
        found: TokenKind,
        /// Source text of the token actually found
        literal: String,
        /// Line of the offending token (1-indexed)
        line: usize,
        /// Column of the offending token (0-indexed)
        column: usize,
    },

    /// Forms are nested deeper than the parser is configured to follow
    ///
    /// **Triggered by:** Pathologically nested input such as `(+ 1 (+ 1 (+ 1 ...)))`
    /// **Prevention:** Raise [`crate::ParserOptions::max_depth`]
    #[error("Nesting too deep at line {line}, column {column} (limit: {limit})")]
    NestingTooDeep {
        /// Configured maximum depth
        limit: usize,
        /// Line of the form that crossed the limit
        line: usize,
        /// Column of the form that crossed the limit
        column: usize,
    },
}

impl Error {
    /// Line and column the error points at
    pub fn position(&self) -> (usize, usize) {
        match self {
            Error::UnexpectedToken { line, column, .. } => (*line, *column),
            Error::NestingTooDeep { line, column, .. } => (*line, *column),
        }
    }

    /// Whether the offending token was an illegal lexeme
    pub fn is_lexical(&self) -> bool {
        matches!(
            self,
            Error::UnexpectedToken {
                found: TokenKind::Illegal,
                ..
            }
        )
    }
}

/// Result type for front-end operations
pub type Result<T> = std::result::Result<T, Error>;
