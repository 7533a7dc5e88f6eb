use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ast::MAX_ARGS;
use crate::environment::Environment;
use crate::lexer::MAX_TOKEN_LEN;

pub const CONFIG_FILE_NAME: &str = ".tinypipeshrc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub prompt: String,
    pub max_args: usize,
    pub max_token_len: usize,
    pub trace: bool,
}

impl Default for Config {
    fn default() -> Self {
        ConfigLoader::default_config()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error: line {line}: {msg}")]
    Parse { line: usize, msg: String },
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn default_config() -> Config {
        Config {
            prompt: "> ".to_string(),
            max_args: MAX_ARGS,
            max_token_len: MAX_TOKEN_LEN,
            trace: false,
        }
    }

    /// `$HOME/.tinypipeshrc`, when `HOME` is known.
    pub fn default_path(env: &Environment) -> Option<PathBuf> {
        env.home().map(|home| Path::new(home).join(CONFIG_FILE_NAME))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let src = fs::read_to_string(path)?;
        Self::load_from_str(&src)
    }

    pub fn load_from_str(src: &str) -> Result<Config, ConfigError> {
        let mut config = Self::default_config();

        for (lineno, line) in src.lines().enumerate() {
            let lineno = lineno + 1;
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(parse_error(lineno, format!("No '=' found: {}", line)));
            };

            // The prompt keeps its surrounding spaces; everything else is trimmed
            match key.trim() {
                "prompt" => config.prompt = value.to_string(),
                "max_args" => config.max_args = parse_limit(lineno, value)?,
                "max_token_len" => config.max_token_len = parse_limit(lineno, value)?,
                "trace" => {
                    config.trace = match value.trim() {
                        "true" | "on" | "1" => true,
                        "false" | "off" | "0" => false,
                        other => return Err(parse_error(lineno, format!("Invalid bool: {}", other))),
                    }
                }
                k => return Err(parse_error(lineno, format!("Unknown key: {}", k))),
            }
        }

        Ok(config)
    }
}

fn parse_error(line: usize, msg: String) -> ConfigError {
    ConfigError::Parse { line, msg }
}

fn parse_limit(line: usize, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(parse_error(line, format!("Invalid limit: {}", value.trim()))),
    }
}
