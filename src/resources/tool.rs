//! Command-line tool resource: present when all its commands resolve on `PATH`.
use anyhow::Result;

use super::action::{Action, ActionRunner};
use super::{Applicable, Resource, ResourceState};
use crate::error::StepError;

/// A tool installed by running an action plan.
#[derive(Debug)]
pub struct ToolResource<'a> {
    /// Display name (e.g. "Node.js").
    pub label: String,
    /// Commands that must all resolve for the tool to count as installed.
    pub commands: Vec<String>,
    /// Actions that install the tool.
    pub plan: Vec<Action>,
    runner: ActionRunner<'a>,
}

impl<'a> ToolResource<'a> {
    /// Create a new tool resource.
    #[must_use]
    pub fn new(
        label: &str,
        commands: &[&str],
        plan: Vec<Action>,
        runner: ActionRunner<'a>,
    ) -> Self {
        Self {
            label: label.to_string(),
            commands: commands.iter().map(ToString::to_string).collect(),
            plan,
            runner,
        }
    }

    /// Commands from [`commands`](Self::commands) that do not resolve.
    #[must_use]
    pub fn missing_commands(&self) -> Vec<&str> {
        self.commands
            .iter()
            .map(String::as_str)
            .filter(|cmd| !self.runner.executor().which(cmd))
            .collect()
    }

    /// First line of `<first command> --version`, if it runs.
    #[must_use]
    pub fn version(&self) -> Option<String> {
        let cmd = self.commands.first()?;
        let result = self
            .runner
            .executor()
            .run_unchecked(cmd, &["--version"])
            .ok()?;
        if !result.success {
            return None;
        }
        result
            .stdout
            .lines()
            .next()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
    }
}

impl Applicable for ToolResource<'_> {
    fn description(&self) -> String {
        self.label.clone()
    }

    fn plan(&self) -> Vec<String> {
        self.plan.iter().map(ToString::to_string).collect()
    }

    fn apply(&self) -> Result<()> {
        self.runner.run_all(&self.plan)?;
        if let Some(cmd) = self.missing_commands().first() {
            return Err(StepError::StillMissing {
                command: (*cmd).to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl Resource for ToolResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let missing = self.missing_commands();
        if missing.is_empty() {
            Ok(ResourceState::Correct)
        } else if missing.len() < self.commands.len() {
            Ok(ResourceState::Incorrect {
                current: format!("missing {}", missing.join(", ")),
            })
        } else {
            Ok(ResourceState::Missing)
        }
    }
}
