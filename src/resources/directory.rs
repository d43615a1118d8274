//! Directory resource.
use std::os::unix::fs::PermissionsExt as _;
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::{Applicable, Resource, ResourceState};

/// A directory that must exist, optionally with specific permission bits.
#[derive(Debug, Clone)]
pub struct DirectoryResource {
    /// Directory path.
    pub path: PathBuf,
    /// Desired permission bits.
    pub mode: Option<u32>,
}

impl DirectoryResource {
    /// Create a new directory resource.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: None,
        }
    }

    /// Require the given permission bits (e.g. `0o700`).
    #[must_use]
    pub const fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }
}

impl Applicable for DirectoryResource {
    fn description(&self) -> String {
        format!("{}/", self.path.display())
    }

    fn apply(&self) -> Result<()> {
        std::fs::create_dir_all(&self.path)
            .with_context(|| format!("creating directory {}", self.path.display()))?;
        if let Some(mode) = self.mode {
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(mode))
                .with_context(|| format!("chmod {mode:o} {}", self.path.display()))?;
        }
        Ok(())
    }
}

impl Resource for DirectoryResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.path.exists() {
            return Ok(ResourceState::Missing);
        }
        if !self.path.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: format!("{} exists and is not a directory", self.path.display()),
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
