//! The ordered install steps and the loop that runs them.
pub mod compose;
mod context;
pub mod core_deps;
pub mod docker;
pub mod docs;
pub mod editor;
pub mod launchers;
pub mod nodejs;
mod processing;
pub mod scaffold;
pub mod service_unit;
pub mod ssh_key;

pub use context::Context;
pub use processing::{
    TaskResult, TaskStats, collect_stats, ensure_tool, process_resource_states, process_resources,
};

use anyhow::Result;

use crate::error::StepError;
use crate::logging::TaskStatus;

/// A named, executable install step.
pub trait Task: Send + Sync {
    /// Short identifier accepted by `--skip` and `--only`.
    fn id(&self) -> &'static str;

    /// Human-readable step name.
    fn name(&self) -> &str;

    /// Whether this step applies to the current preset and host.
    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    /// Execute the step.
    ///
    /// # Errors
    ///
    /// Returns an error if a command fails, a download is rejected, or a file
    /// cannot be written.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// Every install step, in execution order.
#[must_use]
pub fn all_install_tasks() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(core_deps::InstallCoreDependencies),
        Box::new(nodejs::InstallNodejs),
        Box::new(docker::InstallDocker),
        Box::new(editor::InstallEditor),
        Box::new(scaffold::ScaffoldProject),
        Box::new(compose::WriteComposeFile),
        Box::new(service_unit::RegisterServiceUnit),
        Box::new(launchers::WriteLauncherScripts),
        Box::new(ssh_key::GenerateSshKey),
        Box::new(docs::WriteDocumentation),
    ]
}

/// Identifiers of every install step, in execution order.
#[must_use]
pub fn task_ids() -> Vec<&'static str> {
    all_install_tasks().iter().map(|t| t.id()).collect()
}

/// Execute a step, recording the result in the logger.
///
/// # Errors
///
/// Returns [`StepError::ExecutionFailed`] when the step fails; the failure has
/// already been logged and recorded.
pub fn execute(task: &dyn Task, ctx: &Context) -> Result<(), StepError> {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping step: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return Ok(());
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record_task(task.name(), TaskStatus::DryRun, None);
        }
        Err(e) => {
            let reason = format!("{e:#}");
            ctx.log.error(&format!("{}: {reason}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&reason));
            return Err(StepError::ExecutionFailed {
                step: task.name().to_string(),
                reason,
            });
        }
    }
    Ok(())
}

/// Run `tasks` in order, stopping at the first failure.
///
/// Steps whose id is rejected by `selected` are recorded as not applicable
/// and never started, so the summary keeps the install order.
///
/// # Errors
///
/// Returns the first step failure; later steps are not started.
pub fn run_sequence(
    tasks: &[Box<dyn Task>],
    ctx: &Context,
    selected: impl Fn(&str) -> bool,
) -> Result<(), StepError> {
    for task in tasks {
        if selected(task.id()) {
            execute(task.as_ref(), ctx)?;
        } else {
            ctx.log
                .record_task(task.name(), TaskStatus::NotApplicable, Some("not selected"));
        }
    }
    Ok(())
}
