//! Core logging types: step entries, status, and the [`Log`] trait.

/// Step execution result for summary reporting.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Step name as shown in the summary.
    pub name: String,
    /// Final status of the step.
    pub status: TaskStatus,
    /// Optional detail (skip reason or error description).
    pub message: Option<String>,
}

/// Status of a completed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Step completed successfully.
    Ok,
    /// Step does not apply to this preset or was filtered out.
    NotApplicable,
    /// Step was skipped (tool unavailable, user declined, best-effort failure).
    Skipped,
    /// Step ran in dry-run mode; nothing was changed.
    DryRun,
    /// Step failed; the run stops here.
    Failed,
}

/// Abstraction over logging backends.
///
/// Steps log through this trait so tests can inspect or silence output.
pub trait Log: Send + Sync + std::fmt::Debug {
    /// Log a stage header (one per step).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (console only with `--verbose`).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log what a dry run would have done.
    fn dry_run(&self, msg: &str);
    /// Record a step result for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}
