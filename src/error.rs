//! Domain-specific error types for the setup engine.
//!
//! Internal modules return typed errors (e.g. [`StepError`], [`FetchError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! SetupError
//! ├── Config(ConfigError)        config file loading and parsing
//! ├── Detection(DetectionError)  package manager resolution
//! ├── Step(StepError)            installation step failures
//! └── Fetch(FetchError)          trusted-source downloads
//! ```

use thiserror::Error;

/// Top-level error type for the setup engine.
#[derive(Error, Debug)]
pub enum SetupError {
    /// Configuration-related error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Host detection error.
    #[error("Detection error: {0}")]
    Detection(#[from] DetectionError),

    /// Installation step error.
    #[error("Step error: {0}")]
    Step(#[from] StepError),

    /// Remote fetch error.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),
}

/// Errors that arise from loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown fields.
    #[error("Invalid config file {path}: {message}")]
    Parse {
        /// Path to the offending file.
        path: String,
        /// Parser diagnostic.
        message: String,
    },

    /// A value was syntactically valid but not acceptable.
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue {
        /// Config key.
        key: String,
        /// Why the value was rejected.
        message: String,
    },
}

/// Errors that arise from resolving the host environment.
#[derive(Error, Debug)]
pub enum DetectionError {
    /// No recognised package manager executable or marker file was found.
    #[error("Unsupported package manager: none of apt, dnf, yum, pacman, zypper, apk was found")]
    UnsupportedPackageManager,
}

/// Errors that arise while executing an installation step.
#[derive(Error, Debug)]
pub enum StepError {
    /// A step failed to execute.
    #[error("Step '{step}' failed: {reason}")]
    ExecutionFailed {
        /// Name of the step that failed.
        step: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The step finished its action but the tool it installs is still absent.
    #[error("'{command}' is still not on PATH after installation")]
    StillMissing {
        /// Command that was expected to resolve.
        command: String,
    },

    /// A file could not be written.
    #[error("Failed to write {path}")]
    Write {
        /// Destination path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from fetching remote installer scripts or keys.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The transfer failed at the transport layer.
    #[error("Failed to download {url}: {message}")]
    Transport {
        /// URL that was requested.
        url: String,
        /// Transport diagnostic.
        message: String,
    },

    /// The payload did not match its pinned SHA-256 digest.
    #[error("Checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// URL that was requested.
        url: String,
        /// Pinned digest.
        expected: String,
        /// Digest of the received payload.
        actual: String,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn config_error_io_display() {
        let e = ConfigError::Io {
            path: "/etc/healing.toml".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("/etc/healing.toml"));
        assert!(e.to_string().contains("IO error reading config file"));
    }

    #[test]
    fn config_error_invalid_value_display() {
        let e = ConfigError::InvalidValue {
            key: "node_major".to_string(),
            message: "must be at least 16".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Invalid value for 'node_major': must be at least 16"
        );
    }

    #[test]
    fn unsupported_package_manager_names_all_managers() {
        let msg = DetectionError::UnsupportedPackageManager.to_string();
        assert!(msg.starts_with("Unsupported package manager"));
        for name in ["apt", "dnf", "yum", "pacman", "zypper", "apk"] {
            assert!(msg.contains(name), "missing {name} in: {msg}");
        }
    }

    #[test]
    fn step_error_execution_failed_display() {
        let e = StepError::ExecutionFailed {
            step: "Install Docker".to_string(),
            reason: "apt-get exited with code 100".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Step 'Install Docker' failed: apt-get exited with code 100"
        );
    }

    #[test]
    fn step_error_write_has_source() {
        use std::error::Error as StdError;
        let e = StepError::Write {
            path: "/opt/x".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.source().is_some());
    }

    #[test]
    fn fetch_error_checksum_display() {
        let e = FetchError::ChecksumMismatch {
            url: "https://example.test/key".to_string(),
            expected: "aa".to_string(),
            actual: "bb".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Checksum mismatch for https://example.test/key: expected aa, got bb"
        );
    }

    #[test]
    fn setup_error_wraps_detection() {
        let e: SetupError = DetectionError::UnsupportedPackageManager.into();
        assert!(e.to_string().contains("Detection error"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<SetupError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<DetectionError>();
        assert_send_sync::<StepError>();
        assert_send_sync::<FetchError>();
    }

    #[test]
    fn step_error_converts_to_anyhow() {
        let e = StepError::StillMissing {
            command: "node".to_string(),
        };
        let _anyhow_err: anyhow::Error = e.into();
    }
}
