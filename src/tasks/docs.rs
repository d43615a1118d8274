//! Step: project README.
use anyhow::Result;

use super::{Context, Task, TaskResult, process_resources};
use crate::resources::file::FileResource;
use crate::scaffold::readme;

/// Write `README.md` describing the generated environment.
#[derive(Debug)]
pub struct WriteDocumentation;

impl Task for WriteDocumentation {
    fn id(&self) -> &'static str {
        "docs"
    }

    fn name(&self) -> &'static str {
        "Write documentation"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let file = FileResource::new(ctx.root().join("README.md"), readme::render(&ctx.settings));
        process_resources(ctx, [file], "write")
    }
}
