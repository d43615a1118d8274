//! SSH key pair resource.
use std::path::PathBuf;

use anyhow::Result;

use super::directory::DirectoryResource;
use super::{Applicable, Resource, ResourceState};
use crate::exec::Executor;

/// An ed25519 key pair at `path` / `path.pub`.
///
/// An existing private key is never replaced.
#[derive(Debug)]
pub struct SshKeyResource<'a> {
    /// Private key path.
    pub path: PathBuf,
    /// Key comment (usually an e-mail address).
    pub comment: String,
    executor: &'a dyn Executor,
}

impl<'a> SshKeyResource<'a> {
    /// Create a new SSH key resource.
    #[must_use]
    pub fn new(path: PathBuf, comment: &str, executor: &'a dyn Executor) -> Self {
        Self {
            path,
            comment: comment.to_string(),
            executor,
        }
    }

    /// Path of the public half.
    #[must_use]
    pub fn public_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".pub");
        PathBuf::from(name)
    }
}

impl Applicable for SshKeyResource<'_> {
    fn description(&self) -> String {
        format!("ed25519 key {}", self.path.display())
    }

    fn apply(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            DirectoryResource::new(dir).with_mode(0o700).apply()?;
        }
        let path = self.path.to_string_lossy();
        self.executor.run(
            "ssh-keygen",
            &[
                "-q",
                "-t",
                "ed25519",
                "-N",
                "",
                "-C",
                self.comment.as_str(),
                "-f",
                &*path,
            ],
        )?;
        Ok(())
    }
}

impl Resource for SshKeyResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        if self.path.exists() {
            Ok(ResourceState::Correct)
        } else if !self.executor.which("ssh-keygen") {
            Ok(ResourceState::Invalid {
                reason: "ssh-keygen not available".to_string(),
            })
        } else {
            Ok(ResourceState::Missing)
        }
    }
}
