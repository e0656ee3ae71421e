//! # Simple - a fully-parenthesized scripting language front-end
//!
//! Lexer and recursive-descent parser for Simple. Every statement and expression is
//! wrapped in `( … )`, operators are prefix, `:=` binds and `=` rebinds:
//!
//! ```text
//! (:= foo (+ 1 2))
//! (if (== foo 3) (= foo 0)
//! elif (> foo 3) (= foo 1)
//! else (= foo 2))
//!
//! (fn addThenDouble x y
//!     (:= z (+ x y))
//!     (return (* 2 z)))
//!
//! (for (:= i 0) (< i 5) (= i (+ i 1))
//!     (addThenDouble i 2))
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use simple_lang::{parse_source, Expression, Statement};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let program = parse_source("(:= foo (+ foo 1))")?;
//!
//! match &program.statements[0] {
//!     Statement::Assign(stmt) => {
//!         assert_eq!(stmt.name.value, "foo");
//!         assert!(matches!(stmt.value, Expression::Binary(_)));
//!     }
//!     other => panic!("unexpected statement {:?}", other),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Source Code → Lexer → Tokens (pulled on demand) → Parser → Program
//! ```
//!
//! - [`Lexer`] - Turns source text into tokens, whitespace included
//! - [`TokenSource`] - What the parser pulls from: a live [`Lexer`] or a [`TokenBuffer`]
//! - [`Parser`] - Builds the [`Program`] with two tokens of lookahead
//!
//! Whitespace is significant as a separator: the lexer emits each run of it as a
//! delimiter token and the parser requires one between sub-forms.
//!
//! ## Error Handling
//!
//! The lexer never fails; input it cannot classify becomes an `Illegal` token. The parser
//! stops at the first unexpected token and reports what it expected, what it found and
//! where:
//!
//! ```rust
//! use simple_lang::{parse_source, Error, TokenKind};
//!
//! let err = parse_source("(:= foo 5555xxxx)").unwrap_err();
//! assert!(matches!(
//!     err,
//!     Error::UnexpectedToken { found: TokenKind::Illegal, line: 1, column: 8, .. }
//! ));
//! ```
//!
//! ## Logging
//!
//! The parser reports through [`tracing`]: every pulled token at `TRACE`, every completed
//! top-level statement and any parse failure at `DEBUG`. No subscriber is installed here.

pub mod error;
pub mod lexer;
pub mod parser;

/// Version of the Simple front-end
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export main types
pub use error::{Error, Result};
pub use lexer::{Lexer, Token, TokenBuffer, TokenKind, TokenSource};
pub use parser::{
    AssignStatement, Atom, AtomKind, BinaryExpression, ConditionalStatement, ElifBlock, ElseBlock,
    Expression, FnCall, ForLoopStatement, ForUpdate, FunctionAssignStatement, Parser,
    ParserOptions, Program, ReassignStatement, ReturnStatement, Statement,
};

/// Lexes and parses `source` with default options
pub fn parse_source(source: &str) -> Result<Program> {
    Parser::from_source(source).parse_program()
}

/// Lexes and parses `source` with the given options
pub fn parse_source_with(source: &str, options: ParserOptions) -> Result<Program> {
    Parser::with_options(Lexer::new(source), options).parse_program()
}
