//! Package manager and distribution detection.
//!
//! Resolution happens once per run and produces a [`HostProfile`] that is
//! passed explicitly to every step.  Detection itself never fails: an
//! unresolved manager is reported later by the step that needs it.
use std::fmt;
use std::path::Path;

use crate::exec::Executor;
use crate::operations::FileSystemOps;

/// Value used for distribution fields that cannot be determined.
pub const UNKNOWN: &str = "unknown";

/// Standard os-release locations, in lookup order.
pub const OS_RELEASE_PATHS: [&str; 2] = ["/etc/os-release", "/usr/lib/os-release"];

/// One of the six supported package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    /// Debian/Ubuntu.
    Apt,
    /// Fedora and RHEL 8+.
    Dnf,
    /// Older RHEL/CentOS.
    Yum,
    /// Arch Linux.
    Pacman,
    /// openSUSE/SLES.
    Zypper,
    /// Alpine Linux.
    Apk,
}

/// Executable probe order.  The first manager found on `PATH` wins.
pub const PROBE_ORDER: [PackageManager; 6] = [
    PackageManager::Apt,
    PackageManager::Dnf,
    PackageManager::Yum,
    PackageManager::Pacman,
    PackageManager::Zypper,
    PackageManager::Apk,
];

/// Marker files consulted when no manager executable is found, in priority
/// order.
pub const MARKER_FILES: [(&str, PackageManager); 8] = [
    ("/etc/debian_version", PackageManager::Apt),
    ("/etc/fedora-release", PackageManager::Dnf),
    ("/etc/redhat-release", PackageManager::Yum),
    ("/etc/centos-release", PackageManager::Yum),
    ("/etc/arch-release", PackageManager::Pacman),
    ("/etc/SuSE-release", PackageManager::Zypper),
    ("/etc/SUSE-brand", PackageManager::Zypper),
    ("/etc/alpine-release", PackageManager::Apk),
];

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl PackageManager {
    /// Canonical manager name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Apt => "apt",
            Self::Dnf => "dnf",
            Self::Yum => "yum",
            Self::Pacman => "pacman",
            Self::Zypper => "zypper",
            Self::Apk => "apk",
        }
    }

    /// Executable probed on `PATH` to detect this manager.
    #[must_use]
    pub const fn binary(self) -> &'static str {
        match self {
            Self::Apt => "apt-get",
            other => other.name(),
        }
    }

    /// Command line that refreshes the package index.
    #[must_use]
    pub fn update_command(self) -> Vec<String> {
        let argv: &[&str] = match self {
            Self::Apt => &["apt-get", "update"],
            Self::Dnf => &["dnf", "makecache"],
            Self::Yum => &["yum", "makecache"],
            Self::Pacman => &["pacman", "-Sy"],
            Self::Zypper => &["zypper", "--non-interactive", "refresh"],
            Self::Apk => &["apk", "update"],
        };
        argv.iter().map(ToString::to_string).collect()
    }

    /// Command line that installs `packages` non-interactively.
    #[must_use]
    pub fn install_command(self, packages: &[&str]) -> Vec<String> {
        let prefix: &[&str] = match self {
            Self::Apt => &[
                "env",
                "DEBIAN_FRONTEND=noninteractive",
                "apt-get",
                "install",
                "-y",
            ],
            Self::Dnf => &["dnf", "install", "-y"],
            Self::Yum => &["yum", "install", "-y"],
            Self::Pacman => &["pacman", "-S", "--needed", "--noconfirm"],
            Self::Zypper => &["zypper", "--non-interactive", "install"],
            Self::Apk => &["apk", "add"],
        };
        prefix
            .iter()
            .chain(packages)
            .map(ToString::to_string)
            .collect()
    }
}

/// Distribution identity read from os-release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionIdentity {
    /// `ID` field (e.g. `ubuntu`), or `"unknown"`.
    pub id: String,
    /// `VERSION_ID` field (e.g. `22.04`), or `"unknown"`.
    pub version: String,
    /// `VERSION_CODENAME` (or `UBUNTU_CODENAME`), used for apt source lines.
    pub codename: Option<String>,
}

impl DistributionIdentity {
    /// Identity used when no os-release file is present.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            id: UNKNOWN.to_string(),
            version: UNKNOWN.to_string(),
            codename: None,
        }
    }

    /// Parse os-release content.  Missing fields become `"unknown"`.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let field = |key: &str| parse_os_release_field(content, key).filter(|v| !v.is_empty());
        Self {
            id: field("ID").unwrap_or_else(|| UNKNOWN.to_string()),
            version: field("VERSION_ID").unwrap_or_else(|| UNKNOWN.to_string()),
            codename: field("VERSION_CODENAME").or_else(|| field("UBUNTU_CODENAME")),
        }
    }
}

impl fmt::Display for DistributionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version)
    }
}

/// Extract `key=value` from os-release content, stripping quotes.
#[must_use]
pub fn parse_os_release_field(content: &str, key: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let (k, v) = line.trim().split_once('=')?;
        (k == key).then(|| v.trim().trim_matches('"').trim_matches('\'').to_string())
    })
}

/// Resolve the package manager: executables first, then marker files.
pub fn resolve_package_manager(
    executor: &dyn Executor,
    fs: &dyn FileSystemOps,
) -> Option<PackageManager> {
    PROBE_ORDER
        .into_iter()
        .find(|pm| executor.which(pm.binary()))
        .or_else(|| {
            MARKER_FILES
                .iter()
                .find(|(marker, _)| fs.exists(Path::new(marker)))
                .map(|&(_, pm)| pm)
        })
}

/// Read the distribution identity from the first os-release file found.
pub fn read_distribution(fs: &dyn FileSystemOps) -> DistributionIdentity {
    OS_RELEASE_PATHS
        .iter()
        .find_map(|path| fs.read_to_string(Path::new(path)).ok())
        .map_or_else(DistributionIdentity::unknown, |content| {
            DistributionIdentity::parse(&content)
        })
}

/// Everything detected about the host, resolved once per run.
#[derive(Debug, Clone)]
pub struct HostProfile {
    /// Selected package manager, if any was found.
    pub manager: Option<PackageManager>,
    /// Distribution identity (informational).
    pub distro: DistributionIdentity,
}

impl HostProfile {
    /// Detect the current host.
    pub fn detect(executor: &dyn Executor, fs: &dyn FileSystemOps) -> Self {
        Self {
            manager: resolve_package_manager(executor, fs),
            distro: read_distribution(fs),
        }
    }

    /// Create a profile with explicit values.
    #[must_use]
    pub const fn new(manager: Option<PackageManager>, distro: DistributionIdentity) -> Self {
        Self { manager, distro }
    }
}
