//! Filesystem query abstractions for dependency injection.
//!
//! Host detection reads marker files and os-release descriptors through
//! [`FileSystemOps`] so it can be unit-tested against a fake root.
//! Production code uses [`SystemFileSystemOps`]; tests use
//! `MockFileSystemOps`.

use std::path::Path;

/// Abstraction over the read-only filesystem queries used by detection.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Read `path` as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or unreadable.
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Mock [`FileSystemOps`] for unit tests.
///
/// ```ignore
/// let fs = MockFileSystemOps::new()
///     .with_file("/etc/os-release", "ID=debian\nVERSION_ID=\"12\"\n")
///     .with_existing("/etc/debian_version");
/// ```
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    files: std::collections::HashMap<std::path::PathBuf, String>,
}

#[cfg(test)]
impl MockFileSystemOps {
    /// Create an empty mock where nothing exists.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `path` as an existing, empty file.
    #[must_use]
    pub fn with_existing(self, path: impl Into<std::path::PathBuf>) -> Self {
        self.with_file(path, "")
    }

    /// Register `path` as a file with the given contents.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<std::path::PathBuf>, contents: &str) -> Self {
        self.files.insert(path.into(), contents.to_string());
        self
    }
}

#[cfg(test)]
impl FileSystemOps for MockFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
    }
}
