//! Static payloads written into the project root.
//!
//! Everything here is pure: generators take [`Settings`] and return file
//! contents.  Steps decide whether and how the files are written.
pub mod compose;
pub mod readme;
pub mod scripts;
pub mod services;
pub mod unit;

use std::path::{Path, PathBuf};

use crate::config::Settings;

/// A generated file, relative to the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Path relative to the project root.
    pub path: PathBuf,
    /// File content.
    pub content: String,
    /// Permission bits, when they matter.
    pub mode: Option<u32>,
}

impl Payload {
    /// A regular file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            mode: None,
        }
    }

    /// An executable script.
    #[must_use]
    pub fn executable(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            mode: Some(0o755),
            ..Self::new(path, content)
        }
    }
}

/// A scaffolded Node.js service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceSpec {
    /// Directory name under `services/`.
    pub name: &'static str,
    /// Port the service listens on.
    pub port: u16,
}

/// The three stub services, in start order.
pub const SERVICES: [ServiceSpec; 3] = [
    ServiceSpec {
        name: "auth-service",
        port: 3001,
    },
    ServiceSpec {
        name: "protocol-service",
        port: 3002,
    },
    ServiceSpec {
        name: "session-service",
        port: 3003,
    },
];

/// Directories created under the project root besides the service trees.
pub const DIRECTORIES: [&str; 5] = ["services", "dashboard/src", "database", "scripts", "logs"];

/// Compose descriptor file name.
pub const COMPOSE_FILE: &str = "docker-compose.yml";

/// Name of the systemd unit.
pub const UNIT_NAME: &str = "healing-platform.service";

/// Directory systemd unit files are installed into.
pub const UNIT_DIR: &str = "/etc/systemd/system";

/// Absolute paths of everything under `root` the scaffold step owns.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    /// Layout rooted at `settings.root`.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            root: settings.root.clone(),
        }
    }

    /// Project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every directory to create, parents first.
    #[must_use]
    pub fn directories(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.root.clone()];
        dirs.extend(DIRECTORIES.iter().map(|d| self.root.join(d)));
        dirs.extend(
            SERVICES
                .iter()
                .map(|s| self.root.join("services").join(s.name)),
        );
        dirs
    }

    /// Resolve a payload path against the root.
    #[must_use]
    pub fn resolve(&self, payload: &Payload) -> PathBuf {
        self.root.join(&payload.path)
    }

    /// Installed unit file path.
    #[must_use]
    pub fn unit_path() -> PathBuf {
        Path::new(UNIT_DIR).join(UNIT_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directories_start_with_root_and_cover_services() {
        let settings = Settings::defaults(Path::new("/home/dev"));
        let layout = ProjectLayout::new(&settings);
        let dirs = layout.directories();
        assert_eq!(dirs.first().map(PathBuf::as_path), Some(layout.root()));
        for svc in SERVICES {
            assert!(dirs.contains(&layout.root().join("services").join(svc.name)));
        }
        assert!(dirs.contains(&layout.root().join("logs")));
    }

    #[test]
    fn service_ports_are_distinct() {
        let mut ports: Vec<u16> = SERVICES.iter().map(|s| s.port).collect();
        ports.sort_unstable();
        ports.dedup();
        assert_eq!(ports.len(), SERVICES.len());
    }

    #[test]
    fn unit_path_is_system_dir() {
        assert_eq!(
            ProjectLayout::unit_path(),
            Path::new("/etc/systemd/system/healing-platform.service")
        );
    }
}
