use std::collections::HashMap;
use thiserror::Error;

use crate::environment::Environment;
use super::executor::{ExecError, ExecOutcome, ExecStatus};

pub trait BuiltinCommand {
    fn name(&self) -> &'static str;
    fn run(&self, args: &[String], env: &mut Environment) -> ExecStatus;
}

/// Commands that run inside the shell process instead of a forked child.
pub struct BuiltinManager {
    commands: HashMap<String, Box<dyn BuiltinCommand>>,
}

impl BuiltinManager {
    pub fn new() -> Self {
        let mut mgr = BuiltinManager {
            commands: HashMap::new(),
        };
        mgr.register(Box::new(CdCommand));
        mgr.register(Box::new(ExitCommand));
        mgr
    }

    pub fn register(&mut self, cmd: Box<dyn BuiltinCommand>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn execute(&self, name: &str, args: &[String], env: &mut Environment) -> ExecStatus {
        match self.commands.get(name) {
            Some(cmd) => cmd.run(args, env),
            None => Err(ExecError::NoSuchBuiltin(name.to_string())),
        }
    }
}

impl Default for BuiltinManager {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CdError {
    #[error("HOME not set")]
    HomeNotSet,
    #[error("OLDPWD not set")]
    OldpwdNotSet,
}

pub struct CdCommand;

impl CdCommand {
    /// No argument or `~` is the home directory, `-` the previous one,
    /// anything else is taken verbatim.
    pub fn resolve_target(args: &[String], env: &Environment) -> Result<String, CdError> {
        match args.first().map(String::as_str) {
            None | Some("~") => env.home().map(str::to_string).ok_or(CdError::HomeNotSet),
            Some("-") => env.oldpwd().map(str::to_string).ok_or(CdError::OldpwdNotSet),
            Some(dir) => Ok(dir.to_string()),
        }
    }
}

impl BuiltinCommand for CdCommand {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn run(&self, args: &[String], env: &mut Environment) -> ExecStatus {
        let target = match Self::resolve_target(args, env) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("cd: {}", e);
                return Ok(ExecOutcome::Code(1));
            }
        };

        let previous = std::env::current_dir().ok();
        if let Err(e) = std::env::set_current_dir(&target) {
            eprintln!("cd: {}: {}", target, e);
            return Ok(ExecOutcome::Code(1));
        }

        if let Some(prev) = previous {
            env.set("OLDPWD", &prev.to_string_lossy());
        }
        if let Ok(now) = std::env::current_dir() {
            env.set("PWD", &now.to_string_lossy());
        }
        Ok(ExecOutcome::Code(0))
    }
}

pub struct ExitCommand;

impl ExitCommand {
    /// Leading sign and digits of the first argument; `3abc` is 3, anything
    /// without a leading number is 0.
    pub fn status(args: &[String]) -> i32 {
        let Some(arg) = args.first() else {
            return 0;
        };
        let arg = arg.trim_start();
        let (negative, digits) = match arg.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, arg.strip_prefix('+').unwrap_or(arg)),
        };
        let value = digits
            .bytes()
            .take_while(u8::is_ascii_digit)
            .fold(0i32, |acc, d| acc.wrapping_mul(10).wrapping_add(i32::from(d - b'0')));
        if negative { value.wrapping_neg() } else { value }
    }
}

impl BuiltinCommand for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn run(&self, args: &[String], _env: &mut Environment) -> ExecStatus {
        Ok(ExecOutcome::Exit(Self::status(args)))
    }
}
