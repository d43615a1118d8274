//! Step: start, stop and status scripts.
use anyhow::Result;

use super::{Context, Task, TaskResult, process_resources};
use crate::resources::file::FileResource;
use crate::scaffold::scripts;

/// Write the launcher scripts into the project root.
#[derive(Debug)]
pub struct WriteLauncherScripts;

impl Task for WriteLauncherScripts {
    fn id(&self) -> &'static str {
        "launchers"
    }

    fn name(&self) -> &'static str {
        "Write launcher scripts"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let layout = ctx.layout();
        let files = scripts::payloads().into_iter().map(|payload| {
            let file = FileResource::new(layout.resolve(&payload), payload.content);
            match payload.mode {
                Some(mode) => file.with_mode(mode),
                None => file,
            }
        });
        process_resources(ctx, files, "write")
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::ContextBuilder;
    use std::os::unix::fs::PermissionsExt as _;

    #[test]
    fn scripts_are_executable() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _log) = ContextBuilder::new().rooted_at(dir.path()).build();
        WriteLauncherScripts.run(&ctx).unwrap();
        for name in ["start.sh", "stop.sh", "status.sh"] {
            let meta = std::fs::metadata(ctx.root().join(name)).unwrap();
            assert_eq!(meta.permissions().mode() & 0o777, 0o755, "{name}");
        }
    }

    #[test]
    fn lost_execute_bit_is_restored() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _log) = ContextBuilder::new().rooted_at(dir.path()).build();
        WriteLauncherScripts.run(&ctx).unwrap();
        let start = ctx.root().join("start.sh");
        std::fs::set_permissions(&start, std::fs::Permissions::from_mode(0o644)).unwrap();
        WriteLauncherScripts.run(&ctx).unwrap();
        let mode = std::fs::metadata(&start).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
