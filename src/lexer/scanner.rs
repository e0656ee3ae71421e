use super::source::TokenSource;
use super::token::{Token, TokenKind};

/// Pull-based lexer for Simple source text
///
/// Whitespace is not skipped: every run of it becomes a [`TokenKind::Delimiter`] token,
/// so concatenating the literals of all tokens reproduces the input exactly.
#[derive(Debug, Clone)]
pub struct Lexer {
    /// Full source text
    input: String,
    /// Byte offset of `ch`
    position: usize,
    /// Byte offset of the byte after `ch`
    read_position: usize,
    /// Byte under the cursor, 0 once the input is exhausted
    ch: u8,
    /// Line of `ch` (1-indexed)
    line: usize,
    /// Column of `ch` (0-indexed, in bytes)
    column: usize,
}

impl Lexer {
    /// Creates a new lexer over the given source code
    pub fn new(source: &str) -> Self {
        let mut lexer = Lexer {
            input: source.to_string(),
            position: 0,
            read_position: 0,
            ch: 0,
            line: 1,
            column: 0,
        };
        lexer.load(0);
        lexer
    }

    /// Produces the next token, or an end-of-file token once input is exhausted
    pub fn next_token(&mut self) -> Token {
        let start = self.position;
        let (line, column) = (self.line, self.column);

        if self.is_at_end() {
            return Token::eof(line, column);
        }

        let kind = match self.ch {
            b' ' | b'\t' | b'\n' | b'\r' => {
                while !self.is_at_end() && is_whitespace(self.ch) {
                    self.read_char();
                }
                TokenKind::Delimiter
            }

            b'(' => self.single(TokenKind::LeftParen),
            b')' => self.single(TokenKind::RightParen),
            b'+' => self.single(TokenKind::Add),
            b'-' => self.single(TokenKind::Subtract),
            b'*' => self.single(TokenKind::Multiply),
            b'/' => self.single(TokenKind::Divide),
            b'%' => self.single(TokenKind::Modulo),

            b':' if self.peek_char() == b'=' => self.double(TokenKind::Assign),
            b'&' if self.peek_char() == b'&' => self.double(TokenKind::And),
            b'|' if self.peek_char() == b'|' => self.double(TokenKind::Or),

            b'=' if self.peek_char() == b'=' => self.double(TokenKind::Equals),
            b'!' if self.peek_char() == b'=' => self.double(TokenKind::NotEquals),
            b'<' if self.peek_char() == b'=' => self.double(TokenKind::LessThanOrEquals),
            b'>' if self.peek_char() == b'=' => self.double(TokenKind::GreaterThanOrEquals),

            // One-byte forms only stand alone when word-bounded by whitespace
            b'=' if is_whitespace(self.peek_char()) => self.single(TokenKind::Reassign),
            b'!' if is_whitespace(self.peek_char()) => self.single(TokenKind::Not),
            b'<' if is_whitespace(self.peek_char()) => self.single(TokenKind::LessThan),
            b'>' if is_whitespace(self.peek_char()) => self.single(TokenKind::GreaterThan),

            _ => {
                self.read_word();
                classify(&self.input[start..self.position])
            }
        };

        Token::new(kind, &self.input[start..self.position], line, column)
    }

    /// Scans all tokens from source code, including the trailing end-of-file token
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.is_eof();
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.read_char();
        kind
    }

    fn double(&mut self, kind: TokenKind) -> TokenKind {
        self.read_char();
        self.read_char();
        kind
    }

    /// Consumes an identifier candidate: everything up to whitespace or `)`
    fn read_word(&mut self) {
        while !self.is_at_end() && !is_whitespace(self.ch) && self.ch != b')' {
            self.read_char();
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn read_char(&mut self) {
        if self.is_at_end() {
            return;
        }
        if self.ch == b'\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        self.load(self.read_position);
    }

    fn load(&mut self, position: usize) {
        let bytes = self.input.as_bytes();
        self.position = position.min(bytes.len());
        self.read_position = self.position + 1;
        self.ch = bytes.get(self.position).copied().unwrap_or(0);
    }

    fn peek_char(&self) -> u8 {
        self.input
            .as_bytes()
            .get(self.read_position)
            .copied()
            .unwrap_or(0)
    }
}

impl TokenSource for Lexer {
    fn next_token(&mut self) -> Token {
        Lexer::next_token(self)
    }
}

/// Yields tokens up to, but not including, end of file
impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = Lexer::next_token(self);
        if token.is_eof() {
            None
        } else {
            Some(token)
        }
    }
}

fn is_whitespace(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t' | b'\n' | b'\r')
}

/// Classifies a non-whitespace, non-paren run of source text
pub(crate) fn classify(word: &str) -> TokenKind {
    if !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit()) {
        return TokenKind::Int;
    }

    if word == "true" || word == "false" {
        return TokenKind::Bool;
    }

    if let Some(keyword) = TokenKind::keyword(word) {
        return keyword;
    }

    if !word.is_empty() && word.bytes().all(|b| b.is_ascii_alphabetic()) {
        TokenKind::Ident
    } else {
        TokenKind::Illegal
    }
}
