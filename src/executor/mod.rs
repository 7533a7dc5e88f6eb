mod executor;
mod default_executor;
pub mod builtins;
pub mod pipeline;

pub use executor::{Executor, ExecError, ExecOutcome, ExecStatus};
pub use default_executor::DefaultExecutor;
