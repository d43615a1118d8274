//! Step: Node.js runtime.
use anyhow::Result;

use super::{Context, Task, TaskResult, ensure_tool};
use crate::platform::PackageManager;
use crate::resources::action::Action;
use crate::resources::tool::ToolResource;

/// NodeSource setup script for `manager`, if NodeSource publishes one.
#[must_use]
pub fn nodesource_script(manager: PackageManager, major: u32) -> Option<String> {
    match manager {
        PackageManager::Apt => Some(format!("https://deb.nodesource.com/setup_{major}.x")),
        PackageManager::Dnf | PackageManager::Yum => {
            Some(format!("https://rpm.nodesource.com/setup_{major}.x"))
        }
        PackageManager::Pacman | PackageManager::Zypper | PackageManager::Apk => None,
    }
}

/// Actions installing Node.js `major` with `manager`.
#[must_use]
pub fn install_plan(manager: PackageManager, major: u32) -> Vec<Action> {
    if let Some(url) = nodesource_script(manager, major) {
        return vec![
            Action::RunFetched {
                url,
                args: Vec::new(),
            },
            Action::install(manager, &["nodejs"]),
        ];
    }
    match manager {
        PackageManager::Zypper => {
            let node = format!("nodejs{major}");
            let npm = format!("npm{major}");
            vec![Action::install(manager, &[node.as_str(), npm.as_str()])]
        }
        _ => vec![Action::install(manager, &["nodejs", "npm"])],
    }
}

/// Install Node.js from NodeSource or the distribution repositories.
#[derive(Debug)]
pub struct InstallNodejs;

impl Task for InstallNodejs {
    fn id(&self) -> &'static str {
        "nodejs"
    }

    fn name(&self) -> &'static str {
        "Install Node.js"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(manager) = ctx.host.manager else {
            ctx.log
                .warn("install Node.js manually from https://nodejs.org");
            return Ok(TaskResult::Skipped(
                "no supported package manager".to_string(),
            ));
        };
        let major = ctx.settings.node_major;
        let tool = ToolResource::new(
            &format!("Node.js {major}"),
            &["node"],
            install_plan(manager, major),
            ctx.runner(),
        );
        ensure_tool(ctx, tool, "install")
    }
}
