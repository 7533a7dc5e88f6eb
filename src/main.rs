use std::process;

use tiny_pipe_shell::config::{Config, ConfigLoader};
use tiny_pipe_shell::environment::Environment;
use tiny_pipe_shell::error::{ShellError, SHELL_NAME};
use tiny_pipe_shell::executor::DefaultExecutor;
use tiny_pipe_shell::repl::Repl;

fn load_config(env: &Environment) -> Config {
    match ConfigLoader::default_path(env) {
        Some(path) if path.is_file() => ConfigLoader::load_from_file(&path).unwrap_or_else(|e| {
            eprintln!("{}: {}: {}", SHELL_NAME, path.display(), ShellError::from(e));
            ConfigLoader::default_config()
        }),
        _ => ConfigLoader::default_config(),
    }
}

fn main() {
    let env = Environment::new();
    let config = load_config(&env);
    let executor = DefaultExecutor::new().with_trace(config.trace);

    let code = {
        let mut repl = Repl::new(config, env, executor);
        repl.run()
    };
    process::exit(code);
}
