use std::iter::Peekable;
use std::vec::IntoIter;

use crate::ast::CommandStage;
use crate::lexer::Token;
use super::{BuildWarning, CommandList};

/// Groups a token sequence into pipeline stages in a single left-to-right pass.
pub struct CommandBuilder {
    tokens: Peekable<IntoIter<Token>>,
    max_args: usize,
}

impl CommandBuilder {
    pub fn new(tokens: Vec<Token>, max_args: usize) -> Self {
        CommandBuilder {
            tokens: tokens.into_iter().peekable(),
            max_args,
        }
    }

    pub fn build(mut self) -> CommandList {
        let mut list = CommandList::default();
        if self.tokens.peek().is_none() {
            return list;
        }

        loop {
            let (stage, more) = self.next_stage(list.stages.len(), &mut list.warnings);
            list.stages.push(stage);
            if !more {
                return list;
            }
        }
    }

    // Returns the stage and whether a `|` ended it.
    fn next_stage(&mut self, index: usize, warnings: &mut Vec<BuildWarning>) -> (CommandStage, bool) {
        let max = self.max_args;
        let mut stage = CommandStage::new();
        let mut dropped = false;
        let mut more = false;

        for token in self.tokens.by_ref() {
            if token.is_pipe() {
                more = true;
                break;
            }
            // Excess tokens are dropped, never carried into the next stage
            if stage.argc() < max {
                stage.push(token.into_lexeme());
            } else {
                dropped = true;
            }
        }

        if dropped {
            warnings.push(BuildWarning::TooManyArguments { stage: index, max });
        }
        (stage, more)
    }
}
