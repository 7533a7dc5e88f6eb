use thiserror::Error;

use crate::config::ConfigError;
use crate::executor::ExecError;
use crate::lexer::LexError;

pub const SHELL_NAME: &str = "tiny-pipe-shell";

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Error parsing input: {0}")]
    Lex(#[from] LexError),
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl ShellError {
    /// The interpreter cannot go on after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShellError::Exec(e) if e.is_fatal())
    }
}
