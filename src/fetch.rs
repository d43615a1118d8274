//! Trusted-source fetching of remote installer scripts and signing keys.
//!
//! All downloads go through [`TrustedSource`] so steps never talk to the
//! network directly.  [`HttpSource`] trusts TLS transport alone unless a
//! SHA-256 pin is configured for the URL, in which case the payload must
//! match it.
use std::collections::BTreeMap;
use std::fmt::Write as _;

use sha2::{Digest, Sha256};

use crate::error::FetchError;

/// A source of remote payloads.
#[cfg_attr(test, mockall::automock)]
pub trait TrustedSource: Send + Sync + std::fmt::Debug {
    /// Download the payload at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the transfer fails, or
    /// [`FetchError::ChecksumMismatch`] if a configured pin does not match.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// HTTPS-backed [`TrustedSource`] with optional per-URL SHA-256 pins.
#[derive(Debug, Default, Clone)]
pub struct HttpSource {
    pins: BTreeMap<String, String>,
}

impl HttpSource {
    /// Create a source that verifies the given `url → sha256` pins.
    #[must_use]
    pub fn new(pins: BTreeMap<String, String>) -> Self {
        Self {
            pins: pins
                .into_iter()
                .map(|(url, digest)| (url, digest.to_ascii_lowercase()))
                .collect(),
        }
    }
}

impl TrustedSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let transport = |message: String| FetchError::Transport {
            url: url.to_string(),
            message,
        };
        let mut response = ureq::get(url).call().map_err(|e| transport(e.to_string()))?;
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| transport(e.to_string()))?;
        verify_pin(url, &body, self.pins.get(url).map(String::as_str))?;
        Ok(body)
    }
}

/// Check `body` against `expected` (lowercase hex), if a pin is present.
///
/// # Errors
///
/// Returns [`FetchError::ChecksumMismatch`] when the digests differ.
pub fn verify_pin(url: &str, body: &[u8], expected: Option<&str>) -> Result<(), FetchError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let actual = sha256_hex(body);
    if actual == expected {
        Ok(())
    } else {
        Err(FetchError::ChecksumMismatch {
            url: url.to_string(),
            expected: expected.to_string(),
            actual,
        })
    }
}

/// Lowercase hex SHA-256 digest of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(64);
    for b in &digest {
        // write! to a String is infallible.
        write!(hex, "{b:02x}").unwrap_or(());
    }
    hex
}

/// A [`TrustedSource`] serving fixed payloads from memory.
///
/// Used by tests and by dry runs, where nothing may be downloaded.
#[derive(Debug, Default, Clone)]
pub struct FixtureSource {
    payloads: BTreeMap<String, Vec<u8>>,
}

impl FixtureSource {
    /// Create an empty fixture source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    #[must_use]
    pub fn with(mut self, url: &str, body: &[u8]) -> Self {
        self.payloads.insert(url.to_string(), body.to_vec());
        self
    }
}

impl TrustedSource for FixtureSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.payloads
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Transport {
                url: url.to_string(),
                message: "no fixture registered".to_string(),
            })
    }
}
