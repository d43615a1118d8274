//! Path resolution, ANSI stripping, and time formatting for the log file.
use std::fs;
use std::path::PathBuf;

/// Strip ANSI CSI sequences (colours, cursor movement) from a string.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        if chars.next() == Some('[') {
            for inner in chars.by_ref() {
                if ('@'..='~').contains(&inner) {
                    break;
                }
            }
        }
    }
    out
}

/// Resolve the cache directory from an environment lookup.
///
/// `$XDG_CACHE_HOME/healing-setup`, else `$HOME/.cache/healing-setup`.
pub(super) fn cache_dir_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
    env("XDG_CACHE_HOME")
        .filter(|v| !v.is_empty())
        .map_or_else(
            || {
                env("HOME")
                    .map_or_else(|| PathBuf::from("."), PathBuf::from)
                    .join(".cache")
            },
            PathBuf::from,
        )
        .join("healing-setup")
}

/// Return the log file path for `command`, creating its directory.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    let dir = cache_dir_with(|k| std::env::var(k).ok());
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

/// Current UTC time as `YYYY-MM-DD HH:MM:SS`.
pub(super) fn format_utc_datetime() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Current UTC time as `HH:MM:SS`.
pub(super) fn format_utc_time() -> String {
    chrono::Utc::now().format("%H:%M:%S").to_string()
}
