//! Step: project directories, service stubs and the dashboard component.
use anyhow::Result;

use super::{Context, Task, TaskResult, collect_stats};
use crate::resources::Resource;
use crate::resources::directory::DirectoryResource;
use crate::resources::file::FileResource;
use crate::scaffold::services;

/// Create the project tree under the configured root.
#[derive(Debug)]
pub struct ScaffoldProject;

impl Task for ScaffoldProject {
    fn id(&self) -> &'static str {
        "scaffold"
    }

    fn name(&self) -> &'static str {
        "Scaffold project"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let layout = ctx.layout();
        ctx.log
            .debug(&format!("project root: {}", layout.root().display()));
        let mut resources: Vec<Box<dyn Resource>> = layout
            .directories()
            .into_iter()
            .map(|dir| Box::new(DirectoryResource::new(dir)) as Box<dyn Resource>)
            .collect();
        resources.extend(services::payloads()?.into_iter().map(|payload| {
            Box::new(FileResource::new(layout.resolve(&payload), payload.content))
                as Box<dyn Resource>
        }));
        Ok(collect_stats(ctx, resources, "create")?.finish(ctx))
    }
}
