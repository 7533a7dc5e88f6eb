mod builder;

use thiserror::Error;
use crate::ast::CommandStage;
use crate::lexer::Token;

pub use builder::CommandBuilder;

/// Recoverable problems found while grouping tokens; the stages are still built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildWarning {
    #[error("Too many arguments given to command {stage} (limit {max}), extra arguments dropped")]
    TooManyArguments { stage: usize, max: usize },
}

/// Stages of one input line, in pipeline order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandList {
    stages: Vec<CommandStage>,
    warnings: Vec<BuildWarning>,
}

impl CommandList {
    pub fn stages(&self) -> &[CommandStage] {
        &self.stages
    }

    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    /// Number of stages; the executor sizes its pipe set from this.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn into_stages(self) -> Vec<CommandStage> {
        self.stages
    }
}

pub fn build_commands(tokens: Vec<Token>, max_args: usize) -> CommandList {
    CommandBuilder::new(tokens, max_args).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::MAX_ARGS;
    use crate::lexer::tokenize;

    fn lex_and_build(src: &str) -> CommandList {
        build_commands(tokenize(src).unwrap(), MAX_ARGS)
    }

    fn args_of(list: &CommandList) -> Vec<Vec<&str>> {
        list.stages()
            .iter()
            .map(|s| s.args().iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn test_simple_command() {
        let list = lex_and_build("grep foo bar");
        assert_eq!(list.len(), 1);
        assert_eq!(args_of(&list), vec![vec!["grep", "foo", "bar"]]);
        assert!(list.warnings().is_empty());
    }

    #[test]
    fn test_pipeline() {
        let list = lex_and_build("echo hi | cat");
        assert_eq!(args_of(&list), vec![vec!["echo", "hi"], vec!["cat"]]);
    }

    #[test]
    fn test_multistage_pipeline_has_sentinels() {
        let list = lex_and_build("ls -l | grep 'a b' | sort -r | wc -l");
        assert_eq!(list.len(), 4);
        for stage in list.stages() {
            let argv = stage.exec_argv().unwrap();
            assert!(argv.as_ptrs().last().unwrap().is_null());
            assert_eq!(argv.as_ptrs().len(), stage.argc() + 1);
        }
        assert_eq!(list.stages()[1].args(), ["grep".to_string(), "a b".to_string()]);
    }

    #[test]
    fn test_empty_input_has_no_stages() {
        assert!(lex_and_build("").is_empty());
        assert!(build_commands(Vec::new(), MAX_ARGS).into_stages().is_empty());
    }

    #[test]
    fn test_adjacent_and_trailing_pipes_give_empty_stages() {
        let list = lex_and_build("ls | | wc |");
        assert_eq!(args_of(&list), vec![vec!["ls"], vec![], vec!["wc"], vec![]]);

        let lone = lex_and_build("|");
        assert_eq!(lone.len(), 2);
        assert!(lone.stages().iter().all(CommandStage::is_empty));
    }

    #[test]
    fn test_quoted_pipe_stays_an_argument() {
        let list = lex_and_build("echo '|' x");
        assert_eq!(args_of(&list), vec![vec!["echo", "|", "x"]]);
    }

    #[test]
    fn test_too_many_arguments_truncates_and_warns() {
        let list = build_commands(tokenize("a b c d e | f g").unwrap(), 3);
        assert_eq!(args_of(&list), vec![vec!["a", "b", "c"], vec!["f", "g"]]);
        assert_eq!(
            list.warnings(),
            [BuildWarning::TooManyArguments { stage: 0, max: 3 }]
        );
    }

    #[test]
    fn test_too_many_arguments_in_last_stage() {
        let list = build_commands(tokenize("a | b c d e").unwrap(), 2);
        assert_eq!(args_of(&list), vec![vec!["a"], vec!["b", "c"]]);
        assert_eq!(
            list.warnings(),
            [BuildWarning::TooManyArguments { stage: 1, max: 2 }]
        );
    }

    #[test]
    fn test_exactly_max_arguments_is_fine() {
        let line = vec!["x"; MAX_ARGS].join(" ");
        let list = lex_and_build(&line);
        assert_eq!(list.stages()[0].argc(), MAX_ARGS);
        assert!(list.warnings().is_empty());

        let over = vec!["x"; MAX_ARGS + 1].join(" ");
        let list = lex_and_build(&over);
        assert_eq!(list.stages()[0].argc(), MAX_ARGS);
        assert_eq!(list.warnings().len(), 1);
    }
}
