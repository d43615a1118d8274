//! Step: Visual Studio Code (best effort).
use std::path::PathBuf;

use anyhow::Result;

use super::{Context, Task, TaskResult, ensure_tool};
use crate::platform::PackageManager;
use crate::resources::action::Action;
use crate::resources::tool::ToolResource;

const MICROSOFT_KEY: &str = "https://packages.microsoft.com/keys/microsoft.asc";
const APT_KEYRING: &str = "/etc/apt/keyrings/packages.microsoft.gpg";
const MANUAL: &str = "install VS Code manually from https://code.visualstudio.com/Download";

/// rpm repository definition for VS Code.
pub const RPM_REPO: &str = "[code]
name=Visual Studio Code
baseurl=https://packages.microsoft.com/yumrepos/vscode
enabled=1
gpgcheck=1
gpgkey=https://packages.microsoft.com/keys/microsoft.asc
";

/// Actions installing VS Code, or `None` where no repository exists.
#[must_use]
pub fn install_plan(manager: PackageManager) -> Option<Vec<Action>> {
    let plan = match manager {
        PackageManager::Apt => vec![
            Action::InstallRemote {
                url: MICROSOFT_KEY.to_string(),
                dest: PathBuf::from(APT_KEYRING),
                dearmor: true,
            },
            Action::WriteRoot {
                path: PathBuf::from("/etc/apt/sources.list.d/vscode.list"),
                content: format!(
                    "deb [arch=amd64,arm64,armhf signed-by={APT_KEYRING}] \
                     https://packages.microsoft.com/repos/code stable main\n"
                ),
            },
            Action::refresh(manager),
            Action::install(manager, &["code"]),
        ],
        PackageManager::Dnf | PackageManager::Yum => vec![
            Action::ImportRpmKey {
                url: MICROSOFT_KEY.to_string(),
            },
            Action::WriteRoot {
                path: PathBuf::from("/etc/yum.repos.d/vscode.repo"),
                content: RPM_REPO.to_string(),
            },
            Action::install(manager, &["code"]),
        ],
        PackageManager::Zypper => vec![
            Action::ImportRpmKey {
                url: MICROSOFT_KEY.to_string(),
            },
            Action::WriteRoot {
                path: PathBuf::from("/etc/zypp/repos.d/vscode.repo"),
                content: format!("{RPM_REPO}type=rpm-md\n"),
            },
            Action::refresh(manager),
            Action::install(manager, &["code"]),
        ],
        PackageManager::Pacman => vec![Action::install(manager, &["code"])],
        PackageManager::Apk => return None,
    };
    Some(plan)
}

/// Install VS Code.  Failures never stop the run.
#[derive(Debug)]
pub struct InstallEditor;

impl Task for InstallEditor {
    fn id(&self) -> &'static str {
        "editor"
    }

    fn name(&self) -> &'static str {
        "Install editor"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.settings.editor_enabled()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(plan) = ctx.host.manager.and_then(install_plan) else {
            ctx.log.warn(MANUAL);
            return Ok(TaskResult::Skipped(
                "no VS Code package for this distribution".to_string(),
            ));
        };
        let tool = ToolResource::new("VS Code", &["code"], plan, ctx.runner());
        match ensure_tool(ctx, tool, "install") {
            Ok(result) => Ok(result),
            Err(e) => {
                ctx.log.warn(&format!("VS Code not installed: {e:#}"));
                ctx.log.warn(MANUAL);
                Ok(TaskResult::Skipped("VS Code installation failed".to_string()))
            }
        }
    }
}
