//! Check-then-apply loop shared by every step.
//!
//! Each resource is observed, then reconciled by [`apply`]; the outcomes are
//! folded into a [`TaskStats`] that becomes the step's [`TaskResult`].

mod apply;

use anyhow::Result;

use super::context::Context;
use crate::resources::tool::ToolResource;
use crate::resources::{Resource, ResourceState};

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Step completed successfully.
    Ok,
    /// Step did nothing, for the given reason.
    Skipped(String),
    /// Step ran in dry-run mode.
    DryRun,
}

/// Per-step counters.
///
/// ```
/// use healing_setup::tasks::TaskStats;
///
/// let stats = TaskStats { changed: 1, already_ok: 4, skipped: 1 };
/// assert_eq!(stats.summary(false), "1 changed, 4 already ok, 1 not applicable");
/// assert_eq!(stats.summary(true), "1 would change, 4 already ok, 1 not applicable");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    /// Resources created, installed or rewritten.
    pub changed: u32,
    /// Resources that already matched.
    pub already_ok: u32,
    /// Resources that cannot be applied on this host.
    pub skipped: u32,
}

impl TaskStats {
    /// One-line summary; the `not applicable` count only appears when non-zero.
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        let mut line = format!("{} {verb}, {} already ok", self.changed, self.already_ok);
        if self.skipped > 0 {
            line.push_str(&format!(", {} not applicable", self.skipped));
        }
        line
    }

    /// Log the summary and turn the counters into a step result.
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        ctx.log.info(&self.summary(ctx.dry_run));
        if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        }
    }
}

impl std::ops::AddAssign for TaskStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
    }
}

/// Reconcile every resource and log a summary.
///
/// `verb` names the change in log lines ("install", "write", "enable").
///
/// # Errors
///
/// Returns the first state-check or apply failure; later resources are not
/// touched.
pub fn process_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    verb: &str,
) -> Result<TaskResult> {
    Ok(collect_stats(ctx, resources, verb)?.finish(ctx))
}

/// Like [`process_resources`] but returns the counters without logging a
/// summary, for steps that combine several batches.
///
/// # Errors
///
/// Same as [`process_resources`].
pub fn collect_stats<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    verb: &str,
) -> Result<TaskStats> {
    let mut stats = TaskStats::default();
    for resource in resources {
        let state = resource.current_state()?;
        stats += apply::reconcile(ctx, &resource, state, verb)?;
    }
    Ok(stats)
}

/// Reconcile resources whose state the caller has already observed.
///
/// # Errors
///
/// Returns the first apply failure.
pub fn process_resource_states<R: Resource>(
    ctx: &Context,
    observed: impl IntoIterator<Item = (R, ResourceState)>,
    verb: &str,
) -> Result<TaskResult> {
    let mut stats = TaskStats::default();
    for (resource, state) in observed {
        stats += apply::reconcile(ctx, &resource, state, verb)?;
    }
    Ok(stats.finish(ctx))
}

/// Install a tool unless every one of its commands already resolves.
///
/// An installed tool is reported with its version and left alone.
///
/// # Errors
///
/// Same as [`process_resource_states`].
pub fn ensure_tool(ctx: &Context, tool: ToolResource<'_>, verb: &str) -> Result<TaskResult> {
    let state = tool.current_state()?;
    if state == ResourceState::Correct {
        let version = tool.version().unwrap_or_else(|| "version unknown".to_string());
        ctx.log
            .info(&format!("{} already installed ({version})", tool.label));
    }
    process_resource_states(ctx, [(tool, state)], verb)
}
