//! Interactive confirmation prompts.
use std::io::IsTerminal as _;

use anyhow::Result;
use dialoguer::Confirm;

/// Asks the user yes/no questions.
pub trait Prompter: Send + Sync + std::fmt::Debug {
    /// Whether a human can answer prompts (stdin and stdout are terminals).
    fn is_interactive(&self) -> bool;

    /// Ask `question`, returning `default` when the user just presses enter.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read.
    fn confirm(&self, question: &str, default: bool) -> Result<bool>;
}

/// [`Prompter`] backed by `dialoguer` on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerPrompter;

impl Prompter for DialoguerPrompter {
    fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
    }

    fn confirm(&self, question: &str, default: bool) -> Result<bool> {
        Ok(Confirm::new()
            .with_prompt(question)
            .default(default)
            .interact()?)
    }
}

/// [`Prompter`] that never asks and always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedPrompter {
    /// Answer returned by every `confirm` call.
    pub answer: bool,
    /// Value reported by `is_interactive`.
    pub interactive: bool,
}

impl FixedPrompter {
    /// A non-interactive prompter.
    #[must_use]
    pub const fn non_interactive() -> Self {
        Self {
            answer: false,
            interactive: false,
        }
    }

    /// An interactive prompter that always answers `answer`.
    #[must_use]
    pub const fn answering(answer: bool) -> Self {
        Self {
            answer,
            interactive: true,
        }
    }
}

impl Prompter for FixedPrompter {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn confirm(&self, _question: &str, _default: bool) -> Result<bool> {
        Ok(self.answer)
    }
}
