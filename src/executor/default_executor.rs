use nix::unistd::{fork, ForkResult, Pid};

use crate::ast::{CommandStage, ExecArgv};
use crate::environment::Environment;
use crate::shell_trace;
use super::builtins::BuiltinManager;
use super::executor::{ExecError, ExecOutcome, ExecStatus, Executor};
use super::pipeline::{self, PipeSet};

/// Forks one process per external stage and chains them with pipes.
/// `cd` and `exit` run in the shell process wherever they appear.
pub struct DefaultExecutor {
    builtins: BuiltinManager,
    trace: bool,
}

impl DefaultExecutor {
    pub fn new() -> Self {
        DefaultExecutor {
            builtins: BuiltinManager::new(),
            trace: false,
        }
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    fn validate(stages: &[CommandStage]) -> Result<(), ExecError> {
        match stages.iter().position(CommandStage::is_empty) {
            Some(index) => Err(ExecError::EmptyStage { index }),
            None => Ok(()),
        }
    }

    // Exec vectors are built before the first fork so the children do not
    // have to allocate them. Built-ins get `None`.
    fn prepare(&self, stages: &[CommandStage]) -> Result<Vec<Option<ExecArgv>>, ExecError> {
        stages
            .iter()
            .map(|stage| match stage.name() {
                Some(name) if self.builtins.is_builtin(name) => Ok(None),
                _ => stage
                    .exec_argv()
                    .map(Some)
                    .map_err(|e| ExecError::InvalidArgument(e.to_string())),
            })
            .collect()
    }

    fn dispatch(
        &self,
        stages: &[CommandStage],
        argvs: &[Option<ExecArgv>],
        pipes: &PipeSet,
        env: &mut Environment,
        spawned: &mut Spawned,
    ) -> Result<Option<i32>, ExecError> {
        let wiring = pipeline::plan(stages.len());
        for (i, stage) in stages.iter().enumerate() {
            let name = stage.name().unwrap_or_default();

            let Some(argv) = &argvs[i] else {
                // Built-in: no fork, so no pipe wiring either
                match self.builtins.execute(name, stage.params(), env)? {
                    ExecOutcome::Exit(code) => return Ok(Some(code)),
                    ExecOutcome::Code(code) => spawned.codes[i] = code,
                }
                continue;
            };

            match unsafe { fork() } {
                Ok(ForkResult::Parent { child }) => {
                    shell_trace!(self.trace, "forked pid {} for stage {} ({})", child, i, name);
                    spawned.children.push((i, child));
                }
                Ok(ForkResult::Child) => pipeline::exec_child(wiring[i], pipes, argv, name),
                Err(e) => return Err(ExecError::Fork(e)),
            }
        }
        Ok(None)
    }
}

/// Per-stage status codes and the children forked so far.
struct Spawned {
    codes: Vec<i32>,
    children: Vec<(usize, Pid)>,
}

impl Spawned {
    fn new(stage_count: usize) -> Self {
        Spawned {
            codes: vec![0; stage_count],
            children: Vec::with_capacity(stage_count),
        }
    }

    /// Waits for every child and returns the code of the last stage.
    fn reap(mut self, trace: bool) -> i32 {
        for (i, pid) in self.children {
            self.codes[i] = pipeline::reap(pid, trace);
        }
        self.codes.last().copied().unwrap_or(0)
    }
}

impl Default for DefaultExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for DefaultExecutor {
    fn exec(&mut self, stages: &[CommandStage], env: &mut Environment) -> ExecStatus {
        if stages.is_empty() {
            return Ok(ExecOutcome::Code(0));
        }
        Self::validate(stages)?;

        let argvs = self.prepare(stages)?;
        let pipes = PipeSet::allocate(stages.len())?;
        shell_trace!(self.trace, "allocated {} pipe(s) for {} stage(s)", pipes.len(), stages.len());

        let mut spawned = Spawned::new(stages.len());
        let dispatched = self.dispatch(stages, &argvs, &pipes, env, &mut spawned);

        // The parent only hands out duplicates; its own copies go before the
        // wait, or readers would never see end-of-stream.
        pipes.close_all();
        let last = spawned.reap(self.trace);

        match dispatched? {
            Some(code) => Ok(ExecOutcome::Exit(code)),
            None => Ok(ExecOutcome::Code(last)),
        }
    }
}
