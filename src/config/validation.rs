//! Value checks applied after the config file is parsed.
use crate::error::ConfigError;

use super::ConfigFile;

/// Lowest NodeSource major release still published.
const MIN_NODE_MAJOR: u32 = 16;

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

/// Reject values that would only fail later, half-way through an install.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] naming the first bad key.
pub fn validate(file: &ConfigFile) -> Result<(), ConfigError> {
    if let Some(major) = file.node_major
        && !(MIN_NODE_MAJOR..100).contains(&major)
    {
        return Err(invalid(
            "node_major",
            format!("{major} is not a supported Node.js major release"),
        ));
    }
    if let Some(root) = &file.root
        && root.trim().is_empty()
    {
        return Err(invalid("root", "must not be empty"));
    }
    for (url, digest) in &file.pins {
        if !url.starts_with("https://") {
            return Err(invalid(&format!("pins.{url}"), "only https URLs can be pinned"));
        }
        if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid(
                &format!("pins.{url}"),
                "expected a 64-character hex SHA-256 digest",
            ));
        }
    }
    Ok(())
}
