//! Step: optional SSH key pair.
use anyhow::Result;

use super::{Context, Task, TaskResult, process_resource_states};
use crate::config::SshKeyMode;
use crate::resources::ssh_key::SshKeyResource;
use crate::resources::{Resource, ResourceState};

/// Generate `~/.ssh/id_ed25519` when asked to.
#[derive(Debug)]
pub struct GenerateSshKey;

impl Task for GenerateSshKey {
    fn id(&self) -> &'static str {
        "ssh-key"
    }

    fn name(&self) -> &'static str {
        "Generate SSH key"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.settings.ssh_key != SshKeyMode::Never
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let key = SshKeyResource::new(
            ctx.home.join(".ssh").join("id_ed25519"),
            &ctx.settings.ssh_comment,
            &*ctx.executor,
        );
        let state = key.current_state()?;
        if state == ResourceState::Missing
            && ctx.settings.ssh_key == SshKeyMode::Prompt
            && !ctx.dry_run
        {
            if !ctx.prompter.is_interactive() {
                return Ok(TaskResult::Skipped(
                    "not running on a terminal (use --ssh-key always)".to_string(),
                ));
            }
            let question = format!("Generate an SSH key at {}?", key.path.display());
            if !ctx.prompter.confirm(&question, true)? {
                return Ok(TaskResult::Skipped("declined".to_string()));
            }
        }
        let public = key.public_path();
        let generated = state == ResourceState::Missing;
        let result = process_resource_states(ctx, [(key, state)], "generate")?;
        if generated && !ctx.dry_run {
            ctx.log
                .info(&format!("public key: {}", public.display()));
        }
        Ok(result)
    }
}
