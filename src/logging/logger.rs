//! Run logger: step results for the closing summary, plus the current stage.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{Log, TaskEntry, TaskStatus};
use super::utils::log_file_path;

/// Logger used by the install sequence.
///
/// Messages go through [`tracing`]; the subscriber installed by
/// [`init_subscriber`](super::init_subscriber) decides where they land.  The
/// logger itself remembers step results for the closing summary and the
/// stage in progress, which the interrupt handler reports.
#[derive(Debug)]
pub struct Logger {
    entries: Mutex<Vec<TaskEntry>>,
    stage: Mutex<Option<String>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger for `command` (used to name the log file).
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            stage: Mutex::new(None),
            log_file: log_file_path(command),
        }
    }

    /// Run log location, if the cache directory was writable.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Name of the most recent stage header.
    #[must_use]
    pub fn current_stage(&self) -> Option<String> {
        self.stage.lock().ok().and_then(|g| g.clone())
    }

    /// Every recorded step, in order.
    #[must_use]
    pub fn task_entries(&self) -> Vec<TaskEntry> {
        self.entries
            .lock()
            .map_or_else(|_| Vec::new(), |g| g.clone())
    }

    /// Number of failed steps.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.task_entries()
            .iter()
            .filter(|e| e.status == TaskStatus::Failed)
            .count()
    }

    /// Print one line per recorded step, a tally, and the log file path.
    pub fn print_summary(&self) {
        let entries = self.task_entries();
        if entries.is_empty() {
            return;
        }
        self.stage("Summary");
        for line in summary_lines(&entries) {
            self.info(&line);
        }
        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    fn stage(&self, msg: &str) {
        if let Ok(mut guard) = self.stage.lock() {
            *guard = Some(msg.to_string());
        }
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(TaskEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }
}

/// Marker and colour for a step status.
const fn badge(status: TaskStatus) -> (&'static str, &'static str) {
    match status {
        TaskStatus::Ok => ("✓", "\x1b[32m"),
        TaskStatus::NotApplicable => ("-", "\x1b[2m"),
        TaskStatus::Skipped => ("○", "\x1b[33m"),
        TaskStatus::DryRun => ("~", "\x1b[36m"),
        TaskStatus::Failed => ("✗", "\x1b[31m"),
    }
}

/// Per-step lines followed by the tally.
fn summary_lines(entries: &[TaskEntry]) -> Vec<String> {
    let mut lines: Vec<String> = entries
        .iter()
        .map(|e| {
            let (mark, colour) = badge(e.status);
            let detail = e
                .message
                .as_deref()
                .map(|m| format!(" ({m})"))
                .unwrap_or_default();
            format!("{colour}{mark} {}{detail}\x1b[0m", e.name)
        })
        .collect();
    lines.push(tally(entries));
    lines
}

/// One-line tally such as `10 steps: 8 ok, 1 skipped, 1 n/a`.
fn tally(entries: &[TaskEntry]) -> String {
    let count = |status: TaskStatus| entries.iter().filter(|e| e.status == status).count();
    let mut parts = vec![format!("{} ok", count(TaskStatus::Ok))];
    parts.extend(
        [
            (TaskStatus::Skipped, "skipped"),
            (TaskStatus::NotApplicable, "n/a"),
            (TaskStatus::DryRun, "dry-run"),
            (TaskStatus::Failed, "failed"),
        ]
        .into_iter()
        .filter_map(|(status, label)| {
            let n = count(status);
            (n > 0).then(|| format!("{n} {label}"))
        }),
    );
    format!("{} steps: {}", entries.len(), parts.join(", "))
}
