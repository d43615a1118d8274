//! Step: systemd unit managing the platform's containers.
use anyhow::Result;

use super::{Context, Task, TaskResult, collect_stats};
use crate::resources::file::FileResource;
use crate::resources::systemd_unit::SystemdUnitResource;
use crate::scaffold::{ProjectLayout, UNIT_NAME, unit};

/// Install and enable `healing-platform.service`.
#[derive(Debug)]
pub struct RegisterServiceUnit;

impl Task for RegisterServiceUnit {
    fn id(&self) -> &'static str {
        "service-unit"
    }

    fn name(&self) -> &'static str {
        "Register service unit"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.settings.preset.registers_unit() && ctx.executor.which("systemctl")
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let runner = ctx.runner();
        let file = FileResource::new(ProjectLayout::unit_path(), unit::render(ctx.root()))
            .elevated(runner);
        let mut stats = collect_stats(ctx, [file], "install")?;

        let service = SystemdUnitResource::new(UNIT_NAME, runner);
        if stats.changed > 0 && !ctx.dry_run {
            runner.perform(&SystemdUnitResource::daemon_reload())?;
        }
        stats += collect_stats(ctx, [service], "enable")?;
        Ok(stats.finish(ctx))
    }
}
