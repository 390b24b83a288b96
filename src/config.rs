// Backend location and request timeouts.
// The address is resolved once in `main` and handed to the API client;
// nothing else in the crate reads the environment.

use std::fmt;
use std::time::Duration;

/// Environment variable that overrides the compiled-in backend address.
pub const BACKEND_URL_ENV: &str = "BACKEND_URL";

/// Address used when `BACKEND_URL` is unset or empty.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Base URL of the retrieval/answering service, without trailing slashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendAddress(String);

impl BackendAddress {
    /// Resolve the address from `BACKEND_URL`, falling back to the default.
    pub fn resolve() -> Self {
        Self::from_override(std::env::var(BACKEND_URL_ENV).ok().as_deref())
    }

    /// Build an address from an optional override value. Blank overrides
    /// (or ones that are nothing but slashes) select the default.
    pub fn from_override(value: Option<&str>) -> Self {
        let candidate = value
            .map(|v| v.trim().trim_end_matches('/'))
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_BACKEND_URL);
        BackendAddress(candidate.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join an absolute endpoint path (e.g. `/health`) onto the base.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

impl Default for BackendAddress {
    fn default() -> Self {
        BackendAddress(DEFAULT_BACKEND_URL.to_string())
    }
}

impl fmt::Display for BackendAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-operation request timeouts. Uploads and answer generation can take
/// minutes on a cold backend, the health probe should not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub health: Duration,
    pub build_index: Duration,
    pub ask: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            health: Duration::from_secs(10),
            build_index: Duration::from_secs(300),
            ask: Duration::from_secs(120),
        }
    }
}
