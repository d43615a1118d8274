//! systemd unit resource: installed, reloaded and enabled.
use anyhow::Result;

use super::action::{Action, ActionRunner};
use super::{Applicable, Resource, ResourceState};

/// A systemd unit that can be checked and enabled.
#[derive(Debug)]
pub struct SystemdUnitResource<'a> {
    /// Unit name (e.g. "docker.service").
    pub name: String,
    /// Also start the unit when enabling it.
    pub start: bool,
    runner: ActionRunner<'a>,
}

impl<'a> SystemdUnitResource<'a> {
    /// Create a new system-scope unit resource that is enabled but not started.
    #[must_use]
    pub fn new(name: &str, runner: ActionRunner<'a>) -> Self {
        Self {
            name: name.to_string(),
            start: false,
            runner,
        }
    }

    /// Start the unit as well as enabling it.
    #[must_use]
    pub const fn started(mut self) -> Self {
        self.start = true;
        self
    }

    fn systemctl(args: &[&str]) -> Action {
        let mut argv = vec!["systemctl"];
        argv.extend_from_slice(args);
        Action::privileged(&argv)
    }

    /// Action that reloads the system manager's unit files.
    #[must_use]
    pub fn daemon_reload() -> Action {
        Self::systemctl(&["daemon-reload"])
    }

    fn actions(&self) -> Vec<Action> {
        if self.start {
            vec![Self::systemctl(&["enable", "--now", self.name.as_str()])]
        } else {
            vec![Self::systemctl(&["enable", self.name.as_str()])]
        }
    }
}

impl Applicable for SystemdUnitResource<'_> {
    fn description(&self) -> String {
        self.name.clone()
    }

    fn plan(&self) -> Vec<String> {
        self.actions().iter().map(ToString::to_string).collect()
    }

    fn apply(&self) -> Result<()> {
        self.runner.run_all(&self.actions())?;
        Ok(())
    }
}

impl Resource for SystemdUnitResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let executor = self.runner.executor();
        if !executor.which("systemctl") {
            return Ok(ResourceState::Invalid {
                reason: "systemctl not available".to_string(),
            });
        }
        let result = executor.run_unchecked("systemctl", &["is-enabled", self.name.as_str()])?;
        if result.success {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }
}
