//! Step: compiler toolchain, make, curl and git.
use anyhow::Result;

use super::{Context, Task, TaskResult, ensure_tool};
use crate::error::DetectionError;
use crate::platform::PackageManager;
use crate::resources::action::Action;
use crate::resources::tool::ToolResource;

/// Commands that must resolve for the core dependencies to count as present.
pub const CORE_COMMANDS: [&str; 4] = ["gcc", "make", "curl", "git"];

/// Packages providing [`CORE_COMMANDS`] for `manager`.
#[must_use]
pub const fn core_packages(manager: PackageManager) -> &'static [&'static str] {
    match manager {
        PackageManager::Apt => &["build-essential", "curl", "git"],
        PackageManager::Dnf | PackageManager::Yum | PackageManager::Zypper => {
            &["gcc", "gcc-c++", "make", "curl", "git"]
        }
        PackageManager::Pacman => &["base-devel", "curl", "git"],
        PackageManager::Apk => &["build-base", "curl", "git"],
    }
}

/// Refresh package metadata and install the build toolchain.
#[derive(Debug)]
pub struct InstallCoreDependencies;

impl Task for InstallCoreDependencies {
    fn id(&self) -> &'static str {
        "core-deps"
    }

    fn name(&self) -> &'static str {
        "Install core dependencies"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let manager = ctx
            .host
            .manager
            .ok_or(DetectionError::UnsupportedPackageManager)?;
        ctx.log
            .debug(&format!("using {manager} on {}", ctx.host.distro));
        let tool = ToolResource::new(
            "core dependencies",
            &CORE_COMMANDS,
            vec![
                Action::refresh(manager),
                Action::install(manager, core_packages(manager)),
            ],
            ctx.runner(),
        );
        ensure_tool(ctx, tool, "install")
    }
}
