use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single token from the source code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The type of token
    pub kind: TokenKind,
    /// Original text of the token (empty for end of file)
    pub literal: String,
    /// Line number where token appears (1-indexed)
    pub line: usize,
    /// Column number where token starts (0-indexed)
    pub column: usize,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(kind: TokenKind, literal: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            literal: literal.into(),
            line,
            column,
        }
    }

    /// Creates an end-of-file token at the given position
    pub fn eof(line: usize, column: usize) -> Self {
        Token::new(TokenKind::Eof, String::new(), line, column)
    }

    /// Checks whether this token is the end-of-file marker
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Position just past the last byte of this token
    pub fn end_position(&self) -> (usize, usize) {
        let mut line = self.line;
        let mut column = self.column;
        for byte in self.literal.bytes() {
            if byte == b'\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }
        (line, column)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} {:?} at {}:{}",
            self.kind, self.literal, self.line, self.column
        )
    }
}

/// All possible token types in Simple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Special
    /// End of file marker
    Eof,
    /// Unrecognized run of bytes
    Illegal,
    /// Run of whitespace separating sub-forms
    Delimiter,

    // Delimiters
    /// Left parenthesis (
    LeftParen,
    /// Right parenthesis )
    RightParen,

    // Literals
    /// Integer literal
    Int,
    /// Boolean literal (`true` or `false`)
    Bool,
    /// Identifier
    Ident,

    // Assignment
    /// First assignment (:=)
    Assign,
    /// Reassignment (=)
    Reassign,

    // Arithmetic
    /// Plus operator (+)
    Add,
    /// Minus operator (-)
    Subtract,
    /// Star operator (*)
    Multiply,
    /// Slash operator (/)
    Divide,
    /// Percent operator (%)
    Modulo,

    // Logical
    /// Logical NOT operator (!)
    Not,
    /// Logical AND operator (&&)
    And,
    /// Logical OR operator (||)
    Or,

    // Comparison
    /// Equality operator (==)
    Equals,
    /// Inequality operator (!=)
    NotEquals,
    /// Less than operator (<)
    LessThan,
    /// Greater than operator (>)
    GreaterThan,
    /// Less than or equal operator (<=)
    LessThanOrEquals,
    /// Greater than or equal operator (>=)
    GreaterThanOrEquals,

    // Keywords
    /// IF keyword
    If,
    /// ELIF keyword (else-if)
    Elif,
    /// ELSE keyword
    Else,
    /// FN keyword
    Fn,
    /// RETURN keyword
    Return,
    /// FOR keyword
    For,
}

lazy_static! {
    /// Reserved words, looked up after a run has been read as an identifier candidate
    static ref KEYWORDS: HashMap<&'static str, TokenKind> = {
        let mut keywords = HashMap::new();
        keywords.insert("if", TokenKind::If);
        keywords.insert("elif", TokenKind::Elif);
        keywords.insert("else", TokenKind::Else);
        keywords.insert("fn", TokenKind::Fn);
        keywords.insert("return", TokenKind::Return);
        keywords.insert("for", TokenKind::For);
        keywords
    };
}

impl TokenKind {
    /// Check if token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::If
                | TokenKind::Elif
                | TokenKind::Else
                | TokenKind::Fn
                | TokenKind::Return
                | TokenKind::For
        )
    }

    /// Check if token can lead a binary expression `(op a b)`
    pub fn is_binary_operator(&self) -> bool {
        matches!(
            self,
            TokenKind::Add
                | TokenKind::Subtract
                | TokenKind::Multiply
                | TokenKind::Divide
                | TokenKind::Modulo
                | TokenKind::Equals
                | TokenKind::NotEquals
                | TokenKind::LessThan
                | TokenKind::GreaterThan
                | TokenKind::LessThanOrEquals
                | TokenKind::GreaterThanOrEquals
                // `&&` and `||` take two operands like the arithmetic operators
                | TokenKind::And
                | TokenKind::Or
        )
    }

    /// Check if token is a leaf expression (integer, boolean or identifier)
    pub fn is_atom(&self) -> bool {
        matches!(self, TokenKind::Int | TokenKind::Bool | TokenKind::Ident)
    }

    /// Get keyword from string
    pub fn keyword(s: &str) -> Option<TokenKind> {
        KEYWORDS.get(s).copied()
    }

    /// Human-readable name used in diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Eof => "end of file",
            TokenKind::Illegal => "illegal token",
            TokenKind::Delimiter => "delimiter",
            TokenKind::LeftParen => "`(`",
            TokenKind::RightParen => "`)`",
            TokenKind::Int => "integer",
            TokenKind::Bool => "boolean",
            TokenKind::Ident => "identifier",
            TokenKind::Assign => "`:=`",
            TokenKind::Reassign => "`=`",
            TokenKind::Add => "`+`",
            TokenKind::Subtract => "`-`",
            TokenKind::Multiply => "`*`",
            TokenKind::Divide => "`/`",
            TokenKind::Modulo => "`%`",
            TokenKind::Not => "`!`",
            TokenKind::And => "`&&`",
            TokenKind::Or => "`||`",
            TokenKind::Equals => "`==`",
            TokenKind::NotEquals => "`!=`",
            TokenKind::LessThan => "`<`",
            TokenKind::GreaterThan => "`>`",
            TokenKind::LessThanOrEquals => "`<=`",
            TokenKind::GreaterThanOrEquals => "`>=`",
            TokenKind::If => "`if`",
            TokenKind::Elif => "`elif`",
            TokenKind::Else => "`else`",
            TokenKind::Fn => "`fn`",
            TokenKind::Return => "`return`",
            TokenKind::For => "`for`",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}
