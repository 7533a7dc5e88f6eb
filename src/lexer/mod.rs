mod lexer;
mod token;

pub use lexer::{LexError, Lexer, MAX_TOKEN_LEN};
pub use token::{Token, TokenKind, PIPE};

/// Splits `line` into tokens with the default token length ceiling.
pub fn tokenize(line: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(line).tokenize()
}
