//! Generated file resource.
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::action::{Action, ActionRunner};
use super::{Applicable, Resource, ResourceState};
use crate::error::StepError;

/// A file whose full content is owned by the installer.
///
/// Files under the project root are written directly.  Files outside the
/// user's reach (e.g. `/etc/systemd/system`) are written through an
/// elevated [`ActionRunner`].
#[derive(Debug)]
pub struct FileResource<'a> {
    /// Destination path.
    pub path: PathBuf,
    /// Desired content.
    pub content: String,
    /// Desired permission bits, if they matter.
    pub mode: Option<u32>,
    elevated: Option<ActionRunner<'a>>,
}

impl<'a> FileResource<'a> {
    /// Create a user-owned file resource.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            mode: None,
            elevated: None,
        }
    }

    /// Require the given permission bits (e.g. `0o755`).
    #[must_use]
    pub const fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Write through an elevated runner instead of directly.
    #[must_use]
    pub const fn elevated(mut self, runner: ActionRunner<'a>) -> Self {
        self.elevated = Some(runner);
        self
    }

    fn write_direct(&self) -> Result<()> {
        ensure_parent_dir(&self.path)?;
        std::fs::write(&self.path, &self.content).map_err(|source| StepError::Write {
            path: self.path.display().to_string(),
            source,
        })?;
        if let Some(mode) = self.mode {
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(mode))
                .with_context(|| format!("chmod {mode:o} {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// Create the parent directory of `path` if needed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

impl Applicable for FileResource<'_> {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn apply(&self) -> Result<()> {
        match &self.elevated {
            Some(runner) => runner.perform(&Action::WriteRoot {
                path: self.path.clone(),
                content: self.content.clone(),
            })?,
            None => self.write_direct()?,
        }
        Ok(())
    }
}

impl Resource for FileResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let Ok(existing) = std::fs::read_to_string(&self.path) else {
            return Ok(if self.path.exists() {
                ResourceState::Incorrect {
                    current: "unreadable".to_string(),
                }
            } else {
                ResourceState::Missing
            });
        };
        if existing != self.content {
            return Ok(ResourceState::Incorrect {
                current: "content differs".to_string(),
            });
        }
        if let Some(mode) = self.mode {
            let current = std::fs::metadata(&self.path)?.permissions().mode() & 0o7777;
            if current != mode {
                return Ok(ResourceState::Incorrect {
                    current: format!("mode {current:o}"),
                });
            }
        }
        Ok(ResourceState::Correct)
    }
}
