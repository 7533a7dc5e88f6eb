use std::ffi::{CStr, CString, NulError};
use std::os::raw::c_char;
use std::ptr;

/// Most arguments one stage may hold, program name included.
pub const MAX_ARGS: usize = 50;

/// One pipeline stage: a program name followed by its arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandStage {
    args: Vec<String>,
}

impl CommandStage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandStage {
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn push(&mut self, arg: String) {
        self.args.push(arg);
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn argc(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn name(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    /// Arguments after the program name.
    pub fn params(&self) -> &[String] {
        self.args.get(1..).unwrap_or(&[])
    }

    pub fn exec_argv(&self) -> Result<ExecArgv, NulError> {
        ExecArgv::new(&self.args)
    }
}

/// Argument vector in the shape `execvp` expects: C strings plus a pointer
/// table whose last slot is always null.
#[derive(Debug)]
pub struct ExecArgv {
    args: Vec<CString>,
    ptrs: Vec<*const c_char>,
}

impl ExecArgv {
    pub fn new(args: &[String]) -> Result<Self, NulError> {
        let args = args
            .iter()
            .map(|a| CString::new(a.as_bytes()))
            .collect::<Result<Vec<_>, _>>()?;
        // CString data lives on the heap, so these stay valid when `args` moves.
        let ptrs = args
            .iter()
            .map(|a| a.as_ptr())
            .chain(std::iter::once(ptr::null()))
            .collect();
        Ok(ExecArgv { args, ptrs })
    }

    pub fn program(&self) -> Option<&CStr> {
        self.args.first().map(CString::as_c_str)
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn as_ptrs(&self) -> &[*const c_char] {
        &self.ptrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_accessors() {
        let stage = CommandStage::from_args(["grep", "-q", "foo"]);
        assert_eq!(stage.name(), Some("grep"));
        assert_eq!(stage.argc(), 3);
        assert_eq!(stage.params(), ["-q".to_string(), "foo".to_string()]);
        assert!(CommandStage::new().params().is_empty());
        assert_eq!(CommandStage::new().name(), None);
    }

    #[test]
    fn test_exec_argv_ends_with_sentinel() {
        let stage = CommandStage::from_args(["echo", "hi"]);
        let argv = stage.exec_argv().unwrap();
        assert_eq!(argv.len(), 2);
        assert_eq!(argv.as_ptrs().len(), 3);
        assert!(argv.as_ptrs()[2].is_null());
        assert_eq!(argv.program().unwrap().to_str().unwrap(), "echo");

        let second = unsafe { CStr::from_ptr(argv.as_ptrs()[1]) };
        assert_eq!(second.to_str().unwrap(), "hi");
    }

    #[test]
    fn test_empty_stage_is_only_the_sentinel() {
        let argv = CommandStage::new().exec_argv().unwrap();
        assert!(argv.is_empty());
        assert_eq!(argv.as_ptrs(), [ptr::null()]);
    }

    #[test]
    fn test_interior_nul_is_rejected() {
        let stage = CommandStage::from_args(["echo", "a\0b"]);
        assert!(stage.exec_argv().is_err());
    }
}
