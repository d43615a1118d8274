//! Command: install dependencies and scaffold the project.
use std::sync::Arc;

use anyhow::{Result, bail};

use super::CommandSetup;
use crate::cli::{GlobalOpts, InstallOpts};
use crate::config::Overrides;
use crate::exec::SystemExecutor;
use crate::fetch::FixtureSource;
use crate::logging::{Log, Logger};
use crate::tasks::{self, Context};

/// Exit status after Ctrl-C.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Which steps `--skip` and `--only` leave in the run.
#[derive(Debug, Default, Clone)]
pub struct Selection {
    skip: Vec<String>,
    only: Vec<String>,
}

impl Selection {
    /// Validate step ids against the known steps.
    ///
    /// # Errors
    ///
    /// Returns an error naming every unknown id and listing the valid ones.
    pub fn new(skip: &[String], only: &[String]) -> Result<Self> {
        let known = tasks::task_ids();
        let unknown: Vec<&str> = skip
            .iter()
            .chain(only)
            .map(String::as_str)
            .filter(|id| !known.contains(id))
            .collect();
        if !unknown.is_empty() {
            bail!(
                "unknown step(s): {}; valid steps: {}",
                unknown.join(", "),
                known.join(", ")
            );
        }
        Ok(Self {
            skip: skip.to_vec(),
            only: only.to_vec(),
        })
    }

    /// Whether the step `id` runs.
    #[must_use]
    pub fn includes(&self, id: &str) -> bool {
        (self.only.is_empty() || self.only.iter().any(|o| o == id))
            && !self.skip.iter().any(|s| s == id)
    }
}

/// Run the install command.
///
/// # Errors
///
/// Returns an error if configuration is invalid, a step id is unknown, or a
/// step fails.  The summary is printed before a step failure is returned.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("healing-setup {}", crate::version()));

    let selection = Selection::new(&opts.skip, &opts.only)?;
    let overrides = Overrides {
        ssh_key: opts.ssh_key,
        no_admin_ui: opts.no_admin_ui,
        ..Overrides::default()
    };
    let setup = CommandSetup::init(global, overrides, log)?;

    install_interrupt_handler(log);

    let mut ctx = Context::new(
        Arc::new(setup.settings),
        Arc::new(setup.host),
        Arc::clone(log) as Arc<dyn Log>,
        global.dry_run,
        Arc::new(SystemExecutor),
        setup.home,
    )?;
    if global.dry_run {
        // Dry runs never download anything.
        ctx.source = Arc::new(FixtureSource::new());
    }

    let all = tasks::all_install_tasks();
    let outcome = tasks::run_sequence(&all, &ctx, |id| selection.includes(id));

    log.print_summary();
    outcome?;

    if !global.dry_run {
        log.info(&format!(
            "next: cd {} && ./start.sh",
            ctx.root().display()
        ));
    }
    Ok(())
}

/// Report the step in progress and exit with [`INTERRUPTED_EXIT_CODE`] on
/// Ctrl-C.  Partial state is left as-is.
fn install_interrupt_handler(log: &Arc<Logger>) {
    let handler_log = Arc::clone(log);
    let result = ctrlc::set_handler(move || {
        let stage = handler_log
            .current_stage()
            .unwrap_or_else(|| "startup".to_string());
        handler_log.error(&format!("interrupted during '{stage}'"));
        std::process::exit(INTERRUPTED_EXIT_CODE);
    });
    if let Err(e) = result {
        log.debug(&format!("no interrupt handler: {e}"));
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn empty_selection_runs_everything() {
        let selection = Selection::new(&[], &[]).unwrap();
        assert!(tasks::task_ids().iter().all(|id| selection.includes(id)));
    }

    #[test]
    fn skip_removes_named_steps() {
        let selection = Selection::new(&ids(&["editor", "ssh-key"]), &[]).unwrap();
        assert!(!selection.includes("editor"));
        assert!(!selection.includes("ssh-key"));
        assert!(selection.includes("docker"));
    }

    #[test]
    fn only_keeps_named_steps() {
        let selection = Selection::new(&[], &ids(&["compose", "docs"])).unwrap();
        assert!(selection.includes("compose"));
        assert!(selection.includes("docs"));
        assert!(!selection.includes("core-deps"));
    }

    #[test]
    fn skip_wins_over_only() {
        let selection = Selection::new(&ids(&["docs"]), &ids(&["compose", "docs"])).unwrap();
        assert!(selection.includes("compose"));
        assert!(!selection.includes("docs"));
    }

    #[test]
    fn unknown_step_is_rejected_with_valid_list() {
        let err = Selection::new(&ids(&["vscode"]), &[]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unknown step(s): vscode"), "{msg}");
        assert!(msg.contains("core-deps"), "{msg}");
    }
}
