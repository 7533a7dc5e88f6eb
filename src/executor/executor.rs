use thiserror::Error;

use crate::ast::CommandStage;
use crate::environment::Environment;

pub type ExecStatus = Result<ExecOutcome, ExecError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    /// Keep reading input; carries the status of the last stage.
    Code(i32),
    /// `exit` ran: terminate the interpreter with this status.
    Exit(i32),
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("fork failed: {0}")]
    Fork(#[source] nix::Error),
    #[error("pipe creation failed: {0}")]
    Pipe(#[source] nix::Error),
    #[error("empty command at pipeline position {index}")]
    EmptyStage { index: usize },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("No such builtin command: {0}")]
    NoSuchBuiltin(String),
}

impl ExecError {
    /// After a failed fork the shell no longer knows the state of its
    /// children, so it stops.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExecError::Fork(_))
    }
}

pub trait Executor {
    fn exec(&mut self, stages: &[CommandStage], env: &mut Environment) -> ExecStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestExecutor {
        pub log: Vec<String>,
    }

    impl Executor for TestExecutor {
        fn exec(&mut self, stages: &[CommandStage], _env: &mut Environment) -> ExecStatus {
            if stages.len() > 1 {
                self.log.push("pipeline".to_string());
            }
            for stage in stages {
                self.log.push(format!("command: {:?}", stage.args()));
                if stage.name() == Some("exit") {
                    return Ok(ExecOutcome::Exit(0));
                }
            }
            Ok(ExecOutcome::Code(0))
        }
    }

    fn dummy_cmd(args: &[&str]) -> CommandStage {
        CommandStage::from_args(args.iter().copied())
    }

    #[test]
    fn test_trait_object_dispatch() {
        let mut exec = TestExecutor { log: vec![] };
        let executor: &mut dyn Executor = &mut exec;
        let mut env = Environment::default();
        let stages = [dummy_cmd(&["ls"]), dummy_cmd(&["wc"])];
        assert_eq!(executor.exec(&stages, &mut env).unwrap(), ExecOutcome::Code(0));
        assert_eq!(exec.log, vec!["pipeline", "command: [\"ls\"]", "command: [\"wc\"]"]);
    }

    #[test]
    fn test_exit_outcome() {
        let mut exec = TestExecutor { log: vec![] };
        let mut env = Environment::default();
        let outcome = exec.exec(&[dummy_cmd(&["exit"])], &mut env).unwrap();
        assert_eq!(outcome, ExecOutcome::Exit(0));
    }

    #[test]
    fn test_only_fork_failure_is_fatal() {
        assert!(ExecError::Fork(nix::Error::EAGAIN).is_fatal());
        assert!(!ExecError::Pipe(nix::Error::EMFILE).is_fatal());
        assert!(!ExecError::EmptyStage { index: 1 }.is_fatal());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ExecError::EmptyStage { index: 2 }.to_string(),
            "empty command at pipeline position 2"
        );
        assert_eq!(
            ExecError::NoSuchBuiltin("jobs".into()).to_string(),
            "No such builtin command: jobs"
        );
    }
}
