//! Token sources the parser can pull from

use super::token::Token;

/// Anything that can hand out tokens one at a time
///
/// Implementations must keep returning end-of-file tokens once exhausted.
pub trait TokenSource {
    /// Produces the next token
    fn next_token(&mut self) -> Token;
}

impl<S: TokenSource + ?Sized> TokenSource for &mut S {
    fn next_token(&mut self) -> Token {
        (**self).next_token()
    }
}

impl<S: TokenSource + ?Sized> TokenSource for Box<S> {
    fn next_token(&mut self) -> Token {
        (**self).next_token()
    }
}

/// Replays a pre-tokenized sequence
///
/// Tokens after the first end-of-file token are ignored. When the sequence carries no
/// end-of-file token, one is synthesized just past the last token.
#[derive(Debug, Clone)]
pub struct TokenBuffer {
    tokens: std::vec::IntoIter<Token>,
    eof: Token,
    exhausted: bool,
}

impl TokenBuffer {
    /// Creates a buffer that replays `tokens` in order
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof = match tokens.iter().find(|t| t.is_eof()) {
            Some(eof) => eof.clone(),
            None => {
                let (line, column) = tokens
                    .last()
                    .map(Token::end_position)
                    .unwrap_or((1, 0));
                Token::eof(line, column)
            }
        };

        TokenBuffer {
            tokens: tokens.into_iter(),
            eof,
            exhausted: false,
        }
    }
}

impl From<Vec<Token>> for TokenBuffer {
    fn from(tokens: Vec<Token>) -> Self {
        TokenBuffer::new(tokens)
    }
}

impl TokenSource for TokenBuffer {
    fn next_token(&mut self) -> Token {
        if !self.exhausted {
            match self.tokens.next() {
                Some(token) if !token.is_eof() => return token,
                _ => self.exhausted = true,
            }
        }
        self.eof.clone()
    }
}
