mod trace;
pub mod ast;
pub mod lexer;
pub mod parser;
pub mod executor;
pub mod environment;
pub mod config;
pub mod prompt;
pub mod repl;
pub mod error;
