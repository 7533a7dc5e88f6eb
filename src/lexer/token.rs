pub const PIPE: &str = "|";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,   // Unquoted word
    Quoted, // '...' or "...", quotes stripped
    Pipe,   // Unquoted |
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,       // Value without quote characters
    pub span: (usize, usize), // Position info [start, end) in characters, quotes included
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: (usize, usize)) -> Self {
        Token { kind, lexeme: lexeme.into(), span }
    }

    /// Only an unquoted `|` separates pipeline stages; `'|'` is an ordinary argument.
    pub fn is_pipe(&self) -> bool {
        self.kind == TokenKind::Pipe
    }

    pub fn as_str(&self) -> &str {
        &self.lexeme
    }

    pub fn into_lexeme(self) -> String {
        self.lexeme
    }
}
