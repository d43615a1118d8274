//! Supplementary group membership resource.
use anyhow::Result;

use super::action::{Action, ActionRunner};
use super::{Applicable, Resource, ResourceState};

/// Membership of `user` in `group`.
///
/// The change only takes effect for new login sessions.
#[derive(Debug)]
pub struct GroupMembershipResource<'a> {
    /// Account name.
    pub user: String,
    /// Group name.
    pub group: String,
    runner: ActionRunner<'a>,
}

impl<'a> GroupMembershipResource<'a> {
    /// Create a new group membership resource.
    #[must_use]
    pub fn new(user: &str, group: &str, runner: ActionRunner<'a>) -> Self {
        Self {
            user: user.to_string(),
            group: group.to_string(),
            runner,
        }
    }
}

impl Applicable for GroupMembershipResource<'_> {
    fn description(&self) -> String {
        format!("{} in group {}", self.user, self.group)
    }

    fn apply(&self) -> Result<()> {
        self.runner.perform(&Action::privileged(&[
            "usermod",
            "-aG",
            self.group.as_str(),
            self.user.as_str(),
        ]))?;
        Ok(())
    }
}

impl Resource for GroupMembershipResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let result = self
            .runner
            .executor()
            .run_unchecked("id", &["-nG", self.user.as_str()])?;
        if !result.success {
            return Ok(ResourceState::Invalid {
                reason: format!("unknown user {}", self.user),
            });
        }
        if result.stdout.split_whitespace().any(|g| g == self.group) {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Missing)
        }
    }
}
