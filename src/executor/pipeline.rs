use std::io;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};

use nix::errno::Errno;
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{self, Pid};
#[cfg(not(target_vendor = "apple"))]
use nix::fcntl::OFlag;
#[cfg(target_vendor = "apple")]
use nix::fcntl::{fcntl, FcntlArg, FdFlag};

use crate::ast::ExecArgv;
use crate::shell_trace;
use super::executor::ExecError;

/// Exit status of a child whose program could not be executed.
pub const EXEC_FAILURE_STATUS: i32 = 127;

/// Which pipes a stage's standard streams are connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageWiring {
    /// Read end of this pipe becomes stdin.
    pub stdin: Option<usize>,
    /// Write end of this pipe becomes stdout.
    pub stdout: Option<usize>,
}

/// Wiring for every stage of an `n`-stage pipeline. Stage `i` reads pipe
/// `i - 1` and writes pipe `i`; indices follow pipeline position only.
pub fn plan(stage_count: usize) -> Vec<StageWiring> {
    (0..stage_count)
        .map(|i| StageWiring {
            stdin: i.checked_sub(1),
            stdout: (i + 1 < stage_count).then_some(i),
        })
        .collect()
}

// Close-on-exec keeps the descriptors out of unrelated programs; dup2 clears
// the flag on the stdin/stdout copies a stage actually uses.
#[cfg(not(target_vendor = "apple"))]
fn cloexec_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    unistd::pipe2(OFlag::O_CLOEXEC)
}

#[cfg(target_vendor = "apple")]
fn cloexec_pipe() -> nix::Result<(OwnedFd, OwnedFd)> {
    let (r, w) = unistd::pipe()?;
    for fd in [&r, &w] {
        fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
    }
    Ok((r, w))
}

/// The `n - 1` pipes of an `n`-stage pipeline. Dropping the set closes every
/// descriptor the parent still holds.
#[derive(Debug)]
pub struct PipeSet {
    pipes: Vec<(OwnedFd, OwnedFd)>,
}

impl PipeSet {
    pub fn allocate(stage_count: usize) -> Result<Self, ExecError> {
        let count = stage_count.saturating_sub(1);
        let mut pipes = Vec::with_capacity(count);
        for _ in 0..count {
            // Pipes created so far are closed when `pipes` drops on error
            pipes.push(cloexec_pipe().map_err(ExecError::Pipe)?);
        }
        Ok(PipeSet { pipes })
    }

    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    pub fn read_fd(&self, index: usize) -> RawFd {
        self.pipes[index].0.as_raw_fd()
    }

    pub fn write_fd(&self, index: usize) -> RawFd {
        self.pipes[index].1.as_raw_fd()
    }

    /// Every descriptor in the set, read end first for each pipe.
    pub fn raw_fds(&self) -> impl Iterator<Item = RawFd> + '_ {
        self.pipes
            .iter()
            .flat_map(|(r, w)| [r.as_raw_fd(), w.as_raw_fd()])
    }

    pub fn close_all(self) {
        drop(self.pipes);
    }
}

/// Retries a libc call while it fails with EINTR.
fn retry_eintr<F>(mut f: F) -> io::Result<libc::c_int>
where
    F: FnMut() -> libc::c_int,
{
    loop {
        let ret = f();
        if ret != -1 {
            return Ok(ret);
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}

fn write_stderr(msg: &str) {
    // Straight to fd 2: the std stderr lock may be held by a thread that
    // does not exist in the child.
    unsafe {
        libc::write(libc::STDERR_FILENO, msg.as_ptr().cast(), msg.len());
    }
}

fn child_exit(status: i32) -> ! {
    // _exit skips the parent's atexit handlers and buffered output
    unsafe { libc::_exit(status) }
}

/// Runs in a forked child: wires stdin/stdout, closes every pipe descriptor,
/// then replaces the process image. Never returns.
pub fn exec_child(wiring: StageWiring, pipes: &PipeSet, argv: &ExecArgv, name: &str) -> ! {
    if let Some(k) = wiring.stdin {
        let fd = pipes.read_fd(k);
        if let Err(e) = retry_eintr(|| unsafe { libc::dup2(fd, libc::STDIN_FILENO) }) {
            write_stderr(&format!("{}: cannot connect stdin: {}\n", name, e));
            child_exit(EXEC_FAILURE_STATUS);
        }
    }
    if let Some(k) = wiring.stdout {
        let fd = pipes.write_fd(k);
        if let Err(e) = retry_eintr(|| unsafe { libc::dup2(fd, libc::STDOUT_FILENO) }) {
            write_stderr(&format!("{}: cannot connect stdout: {}\n", name, e));
            child_exit(EXEC_FAILURE_STATUS);
        }
    }

    // Any copy left open here keeps readers from seeing end-of-stream.
    for fd in pipes.raw_fds() {
        unsafe {
            libc::close(fd);
        }
    }

    // The runtime ignores SIGPIPE and an ignored disposition survives exec:
    // a writer whose reader is gone must die instead of looping on EPIPE.
    if let Err(e) = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) } {
        write_stderr(&format!("{}: cannot reset SIGPIPE: {}\n", name, e));
        child_exit(EXEC_FAILURE_STATUS);
    }

    let Some(program) = argv.program() else {
        write_stderr("empty command\n");
        child_exit(EXEC_FAILURE_STATUS);
    };
    unsafe {
        libc::execvp(program.as_ptr(), argv.as_ptrs().as_ptr());
    }

    let err = io::Error::last_os_error();
    let reason = if err.kind() == io::ErrorKind::NotFound {
        "command not found".to_string()
    } else {
        err.to_string()
    };
    write_stderr(&format!("{}: {}\n", name, reason));
    child_exit(EXEC_FAILURE_STATUS)
}

/// Blocks until `pid` has terminated and returns its status as a shell
/// exit code (128 + signal for a killed child).
pub fn reap(pid: Pid, trace: bool) -> i32 {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => {
                shell_trace!(trace, "reaped pid {}: exit {}", pid, code);
                return code;
            }
            Ok(WaitStatus::Signaled(_, sig, _)) => {
                shell_trace!(trace, "reaped pid {}: killed by {:?}", pid, sig);
                return 128 + sig as i32;
            }
            // Stopped/continued only show up with WUNTRACED/WCONTINUED
            Ok(_) => continue,
            Err(Errno::EINTR) => continue,
            Err(e) => {
                eprintln!("{}: wait for {} failed: {}", crate::error::SHELL_NAME, pid, e);
                return 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_plan_single_stage() {
        assert_eq!(plan(1), vec![StageWiring { stdin: None, stdout: None }]);
        assert!(plan(0).is_empty());
    }

    #[test]
    fn test_plan_two_stages_share_one_pipe() {
        assert_eq!(
            plan(2),
            vec![
                StageWiring { stdin: None, stdout: Some(0) },
                StageWiring { stdin: Some(0), stdout: None },
            ]
        );
    }

    #[test]
    fn test_plan_chains_adjacent_stages() {
        let wiring = plan(4);
        assert_eq!(wiring[0], StageWiring { stdin: None, stdout: Some(0) });
        assert_eq!(wiring[1], StageWiring { stdin: Some(0), stdout: Some(1) });
        assert_eq!(wiring[2], StageWiring { stdin: Some(1), stdout: Some(2) });
        assert_eq!(wiring[3], StageWiring { stdin: Some(2), stdout: None });
        for pair in wiring.windows(2) {
            assert_eq!(pair[0].stdout, pair[1].stdin);
        }
    }

    #[test]
    fn test_pipe_set_sizes() {
        assert!(PipeSet::allocate(0).unwrap().is_empty());
        assert!(PipeSet::allocate(1).unwrap().is_empty());

        let pipes = PipeSet::allocate(3).unwrap();
        assert_eq!(pipes.len(), 2);
        let fds: HashSet<_> = pipes.raw_fds().collect();
        assert_eq!(fds.len(), 4);
        assert!(fds.contains(&pipes.read_fd(1)));
        assert!(fds.contains(&pipes.write_fd(0)));
        pipes.close_all();
    }

    #[test]
    fn test_pipe_carries_bytes_and_closes() {
        let pipes = PipeSet::allocate(2).unwrap();
        let (r, w) = (pipes.read_fd(0), pipes.write_fd(0));
        let msg = b"hi";
        assert_eq!(unsafe { libc::write(w, msg.as_ptr().cast(), msg.len()) }, 2);
        let mut buf = [0u8; 8];
        assert_eq!(unsafe { libc::read(r, buf.as_mut_ptr().cast(), buf.len()) }, 2);
        assert_eq!(&buf[..2], msg);
        pipes.close_all();
    }
}
