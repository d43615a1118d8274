//! Step: Docker engine and compose plugin, service enablement, group membership.
use std::path::PathBuf;

use anyhow::Result;

use super::{Context, Task, TaskResult, collect_stats, ensure_tool};
use crate::platform::{DistributionIdentity, PackageManager};
use crate::resources::Resource;
use crate::resources::action::Action;
use crate::resources::group::GroupMembershipResource;
use crate::resources::systemd_unit::SystemdUnitResource;
use crate::resources::tool::ToolResource;

const DOCKER_DOWNLOADS: &str = "https://download.docker.com/linux";
const APT_KEYRING: &str = "/etc/apt/keyrings/docker.gpg";
const APT_SOURCE: &str = "/etc/apt/sources.list.d/docker.list";
const YUM_REPO: &str = "/etc/yum.repos.d/docker-ce.repo";

/// Packages from Docker's own repository.
pub const DOCKER_CE: [&str; 4] = [
    "docker-ce",
    "docker-ce-cli",
    "containerd.io",
    "docker-compose-plugin",
];

/// Distributions Docker publishes apt repositories for.
const APT_DISTROS: [&str; 3] = ["ubuntu", "debian", "raspbian"];

/// `deb` line for Docker's apt repository.
#[must_use]
pub fn apt_source_line(distro_id: &str, codename: &str) -> String {
    format!("deb [signed-by={APT_KEYRING}] {DOCKER_DOWNLOADS}/{distro_id} {codename} stable\n")
}

/// Docker's rpm repository family for a distribution id.
#[must_use]
pub fn rpm_family(distro_id: &str) -> &'static str {
    match distro_id {
        "fedora" => "fedora",
        "rhel" => "rhel",
        _ => "centos",
    }
}

/// Actions installing Docker with `manager` on `distro`.
#[must_use]
pub fn install_plan(manager: PackageManager, distro: &DistributionIdentity) -> Vec<Action> {
    match manager {
        PackageManager::Apt => match &distro.codename {
            Some(codename) if APT_DISTROS.contains(&distro.id.as_str()) => vec![
                Action::InstallRemote {
                    url: format!("{DOCKER_DOWNLOADS}/{}/gpg", distro.id),
                    dest: PathBuf::from(APT_KEYRING),
                    dearmor: true,
                },
                Action::WriteRoot {
                    path: PathBuf::from(APT_SOURCE),
                    content: apt_source_line(&distro.id, codename),
                },
                Action::refresh(manager),
                Action::install(manager, &DOCKER_CE),
            ],
            _ => vec![Action::install(manager, &["docker.io", "docker-compose"])],
        },
        PackageManager::Dnf | PackageManager::Yum => vec![
            Action::InstallRemote {
                url: format!(
                    "{DOCKER_DOWNLOADS}/{}/docker-ce.repo",
                    rpm_family(&distro.id)
                ),
                dest: PathBuf::from(YUM_REPO),
                dearmor: false,
            },
            Action::install(manager, &DOCKER_CE),
        ],
        PackageManager::Pacman | PackageManager::Zypper => {
            vec![Action::install(manager, &["docker", "docker-compose"])]
        }
        PackageManager::Apk => vec![Action::install(manager, &["docker", "docker-cli-compose"])],
    }
}

/// Install Docker, enable its service and add the user to the `docker` group.
#[derive(Debug)]
pub struct InstallDocker;

impl Task for InstallDocker {
    fn id(&self) -> &'static str {
        "docker"
    }

    fn name(&self) -> &'static str {
        "Install Docker"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(manager) = ctx.host.manager else {
            ctx.log
                .warn("install Docker manually from https://docs.docker.com/engine/install/");
            return Ok(TaskResult::Skipped(
                "no supported package manager".to_string(),
            ));
        };
        let runner = ctx.runner();
        let tool = ToolResource::new(
            "Docker",
            &["docker"],
            install_plan(manager, &ctx.host.distro),
            runner,
        );
        ensure_tool(ctx, tool, "install")?;

        let mut post: Vec<Box<dyn Resource + '_>> =
            vec![Box::new(SystemdUnitResource::new("docker.service", runner).started())];
        if ctx.user == "root" {
            ctx.log.debug("running as root, docker group not needed");
        } else {
            post.push(Box::new(GroupMembershipResource::new(
                &ctx.user, "docker", runner,
            )));
        }
        let stats = collect_stats(ctx, post, "enable")?;
        if stats.changed > 0 && !ctx.dry_run {
            ctx.log
                .info("log out and back in for docker group membership to take effect");
        }
        Ok(stats.finish(ctx))
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::fetch::FixtureSource;
    use crate::resources::test_helpers::MockExecutor;
    use crate::tasks::test_helpers::{ContextBuilder, ubuntu};
    use std::sync::Arc;

    const UBUNTU_GPG: &str = "https://download.docker.com/linux/ubuntu/gpg";

    fn installed_docker() -> MockExecutor {
        MockExecutor::strict()
            .with_available(&["docker", "systemctl"])
            .on("docker --version", true, "Docker version 24.0.7\n")
            .on("is-enabled docker.service", true, "enabled\n")
            .on("id -nG dev", true, "dev sudo docker\n")
    }

    #[test]
    fn apt_adds_docker_repository_then_installs() {
        let exec = Arc::new(
            MockExecutor::permissive()
                .with_available(&["systemctl"])
                .provides("apt-get install", &["docker"])
                .on("is-enabled", false, "disabled\n")
                .on("id -nG dev", true, "dev sudo\n"),
        );
        let source =
            FixtureSource::new().with(UBUNTU_GPG, b"-----BEGIN PGP PUBLIC KEY BLOCK-----\n");
        let (ctx, _log) = ContextBuilder::new()
            .executor(Arc::clone(&exec))
            .source(source)
            .build();
        InstallDocker.run(&ctx).unwrap();

        let calls = exec.calls();
        let pos = |pat: &str| {
            calls
                .iter()
                .position(|c| c.contains(pat))
                .unwrap_or_else(|| panic!("{pat} not called: {calls:?}"))
        };
        assert!(pos("gpg --dearmor --yes -o /etc/apt/keyrings/docker.gpg") < pos("tee /etc/apt"));
        assert!(pos("docker.list") < pos("apt-get update"));
        assert!(pos("apt-get update") < pos("apt-get install"));
        assert!(calls[pos("apt-get install")].ends_with(&DOCKER_CE.join(" ")));
        assert!(exec.called("systemctl enable --now docker.service"));
        assert!(exec.called("usermod -aG docker dev"));
        assert_eq!(
            String::from_utf8(exec.stdin_for("docker.list").unwrap()).unwrap(),
            "deb [signed-by=/etc/apt/keyrings/docker.gpg] https://download.docker.com/linux/ubuntu jammy stable\n"
        );
    }

    #[test]
    fn second_run_installs_nothing() {
        let exec = Arc::new(installed_docker());
        let (ctx, _log) = ContextBuilder::new().executor(Arc::clone(&exec)).build();
        InstallDocker.run(&ctx).unwrap();
        assert!(!exec.called("apt-get"));
        assert!(!exec.called("usermod"));
        assert!(!exec.called("systemctl enable"));
    }

    #[test]
    fn unknown_apt_distro_falls_back_to_docker_io() {
        let distro = DistributionIdentity {
            id: "linuxmint".to_string(),
            version: "21".to_string(),
            codename: Some("vanessa".to_string()),
        };
        let plan = install_plan(PackageManager::Apt, &distro);
        assert_eq!(plan.len(), 1);
        assert!(plan[0].to_string().ends_with("docker.io docker-compose"));
    }

    #[test]
    fn missing_codename_falls_back_to_docker_io() {
        let distro = DistributionIdentity {
            codename: None,
            ..ubuntu()
        };
        assert_eq!(install_plan(PackageManager::Apt, &distro).len(), 1);
    }

    #[test]
    fn rpm_repository_follows_distribution() {
        let fedora = DistributionIdentity {
            id: "fedora".to_string(),
            version: "40".to_string(),
            codename: None,
        };
        let plan = install_plan(PackageManager::Dnf, &fedora);
        assert_eq!(
            plan[0].to_string(),
            "install https://download.docker.com/linux/fedora/docker-ce.repo -> /etc/yum.repos.d/docker-ce.repo"
        );
        assert_eq!(rpm_family("rocky"), "centos");
    }

    #[test]
    fn apk_uses_cli_compose() {
        let plan = install_plan(PackageManager::Apk, &ubuntu());
        assert_eq!(plan[0].to_string(), "run apk add docker docker-cli-compose");
    }

    #[test]
    fn root_user_skips_group_membership() {
        let exec = Arc::new(installed_docker());
        let (mut ctx, _log) = ContextBuilder::new().executor(Arc::clone(&exec)).build();
        ctx.user = "root".to_string();
        InstallDocker.run(&ctx).unwrap();
        assert!(!exec.called("id -nG"));
    }

    #[test]
    fn install_failure_stops_before_service_setup() {
        let exec = Arc::new(
            MockExecutor::permissive()
                .with_available(&["systemctl"])
                .on("apt-get install", false, ""),
        );
        let (ctx, _log) = ContextBuilder::new()
            .executor(Arc::clone(&exec))
            .source(FixtureSource::new().with(UBUNTU_GPG, b"key"))
            .build();
        assert!(InstallDocker.run(&ctx).is_err());
        assert!(!exec.called("systemctl"));
    }
}
