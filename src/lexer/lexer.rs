use thiserror::Error;
use super::token::{Token, TokenKind, PIPE};

/// Longest token the lexer keeps, in characters.
pub const MAX_TOKEN_LEN: usize = 1000;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum LexError {
    #[error("mismatched single quote around position {pos}")]
    MismatchedSingleQuote { pos: usize },
    #[error("mismatched double quote around position {pos}")]
    MismatchedDoubleQuote { pos: usize },
}

impl LexError {
    fn mismatched(quote: char, pos: usize) -> Self {
        if quote == '\'' {
            LexError::MismatchedSingleQuote { pos }
        } else {
            LexError::MismatchedDoubleQuote { pos }
        }
    }

    /// Character position of the quote that was never closed.
    pub fn position(&self) -> usize {
        match self {
            LexError::MismatchedSingleQuote { pos } | LexError::MismatchedDoubleQuote { pos } => *pos,
        }
    }
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    max_token_len: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self::with_max_token_len(input, MAX_TOKEN_LEN)
    }

    pub fn with_max_token_len(input: &str, max_token_len: usize) -> Self {
        Lexer {
            // The line ends at the first NUL, as it would for a C string.
            chars: input.chars().take_while(|&c| c != '\0').collect(),
            pos: 0,
            max_token_len,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_spaces();
        match self.peek() {
            None => Ok(None),
            Some(quote @ ('\'' | '"')) => self.read_quoted(quote).map(Some),
            Some(_) => Ok(Some(self.read_word())),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(' ') {
            self.pos += 1;
        }
    }

    fn read_quoted(&mut self, quote: char) -> Result<Token, LexError> {
        let start = self.pos;
        self.pos += 1; // Skip the opening quote
        let mut buf = String::new();
        let mut len = 0;

        loop {
            match self.peek() {
                Some(ch) if ch == quote => {
                    self.pos += 1; // Consume the closing quote
                    return Ok(Token::new(TokenKind::Quoted, buf, (start, self.pos)));
                }
                Some(ch) if len < self.max_token_len => {
                    buf.push(ch);
                    len += 1;
                    self.pos += 1;
                }
                // End of line, or the ceiling was hit before the closing quote
                _ => return Err(LexError::mismatched(quote, start)),
            }
        }
    }

    fn read_word(&mut self) -> Token {
        let start = self.pos;
        let mut buf = String::new();
        let mut len = 0;

        while let Some(ch) = self.peek() {
            if ch == ' ' {
                break;
            }
            // Past the ceiling the rest of the word is dropped
            if len < self.max_token_len {
                buf.push(ch);
                len += 1;
            }
            self.pos += 1;
        }

        let kind = if buf == PIPE { TokenKind::Pipe } else { TokenKind::Word };
        Token::new(kind, buf, (start, self.pos))
    }
}
