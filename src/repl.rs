use crate::config::Config;
use crate::environment::Environment;
use crate::error::{ShellError, SHELL_NAME};
use crate::executor::{ExecOutcome, Executor};
use crate::lexer::Lexer;
use crate::parser::build_commands;
use crate::prompt::ShellPrompt;
use crate::shell_trace;

/// Read loop: prompt, read a line, run it, until `exit` or end of input.
pub struct Repl<E: Executor> {
    config: Config,
    env: Environment,
    executor: E,
    prompt: ShellPrompt,
}

impl<E: Executor> Repl<E> {
    pub fn new(config: Config, env: Environment, executor: E) -> Self {
        let prompt = ShellPrompt::new(config.prompt.clone());
        Repl { config, env, executor, prompt }
    }

    /// Runs until the shell should terminate and returns its exit status.
    pub fn run(&mut self) -> i32 {
        loop {
            if let Err(e) = self.prompt.show_prompt() {
                eprintln!("{}: cannot write prompt: {}", SHELL_NAME, e);
            }
            let line = match self.prompt.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => return 0,
                Err(e) => {
                    eprintln!("{}: error reading input: {}", SHELL_NAME, e);
                    return 1;
                }
            };

            match self.process_line(&line) {
                Ok(ExecOutcome::Exit(code)) => return code,
                Ok(ExecOutcome::Code(code)) => {
                    shell_trace!(self.config.trace, "pipeline finished with status {}", code);
                }
                Err(e) if e.is_fatal() => {
                    eprintln!("{}: {}", SHELL_NAME, e);
                    return 1;
                }
                Err(e) => eprintln!("{}: {}", SHELL_NAME, e),
            }
        }
    }

    /// Tokenizes, builds and executes one line. The command list is dropped
    /// before this returns, whatever the outcome.
    pub fn process_line(&mut self, line: &str) -> Result<ExecOutcome, ShellError> {
        let tokens = Lexer::with_max_token_len(line, self.config.max_token_len).tokenize()?;
        let commands = build_commands(tokens, self.config.max_args);
        for warning in commands.warnings() {
            eprintln!("{}: {}", SHELL_NAME, warning);
        }
        shell_trace!(self.config.trace, "{} stage(s)", commands.len());
        Ok(self.executor.exec(commands.stages(), &mut self.env)?)
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}
