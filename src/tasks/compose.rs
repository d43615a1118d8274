//! Step: write the compose descriptor.
use anyhow::Result;

use super::{Context, Task, TaskResult, process_resources};
use crate::resources::file::FileResource;
use crate::scaffold::{COMPOSE_FILE, compose};

/// Write `docker-compose.yml` for the active preset.
#[derive(Debug)]
pub struct WriteComposeFile;

impl Task for WriteComposeFile {
    fn id(&self) -> &'static str {
        "compose"
    }

    fn name(&self) -> &'static str {
        "Write compose file"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let content = compose::render(&ctx.settings)?;
        let file = FileResource::new(ctx.root().join(COMPOSE_FILE), content);
        process_resources(ctx, [file], "write")
    }
}
