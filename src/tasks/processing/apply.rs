//! Bringing one resource from its observed state to the desired one.
use anyhow::{Context as _, Result};

use super::{Context, TaskStats};
use crate::resources::{Applicable, Resource, ResourceState};

/// Reconcile `resource`, observed in `state`, and count the outcome.
pub(super) fn reconcile<R: Resource>(
    ctx: &Context,
    resource: &R,
    state: ResourceState,
    verb: &str,
) -> Result<TaskStats> {
    let desc = resource.description();
    let pending = match state {
        ResourceState::Correct => {
            ctx.log.debug(&format!("ok: {desc}"));
            return Ok(TaskStats {
                already_ok: 1,
                ..TaskStats::default()
            });
        }
        ResourceState::Invalid { reason } => {
            ctx.log.debug(&format!("not applicable: {desc} ({reason})"));
            return Ok(TaskStats {
                skipped: 1,
                ..TaskStats::default()
            });
        }
        ResourceState::Missing => format!("{verb} {desc}"),
        ResourceState::Incorrect { current } => format!("{verb} {desc} (currently {current})"),
    };

    if ctx.dry_run {
        preview(ctx, resource, &pending);
    } else {
        resource
            .apply()
            .with_context(|| format!("failed to {verb} {desc}"))?;
        ctx.log.debug(&format!("done: {pending}"));
    }
    Ok(TaskStats {
        changed: 1,
        ..TaskStats::default()
    })
}

/// Log what applying `resource` would do, one plan entry per line.
fn preview(ctx: &Context, resource: &impl Applicable, pending: &str) {
    ctx.log.dry_run(&format!("would {pending}"));
    for line in resource.plan() {
        ctx.log.dry_run(&format!("  {line}"));
    }
}
