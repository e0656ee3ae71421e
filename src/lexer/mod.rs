//! Lexical analysis for Simple
//!
//! Converts source text into a pull-based stream of tokens. Whitespace is kept as
//! delimiter tokens because the grammar uses it to separate sub-forms.

mod scanner;
mod source;
mod token;

pub use scanner::Lexer;
pub use source::{TokenBuffer, TokenSource};
pub use token::{Token, TokenKind};
