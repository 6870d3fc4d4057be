//! ExpertDesk API client configuration.
//!
//! One base URL (scheme, host and versioned path, e.g.
//! `https://expertise.example.com/api/v1`) plus transport settings.
//! Defaults target a local backend. Override via environment variables or
//! explicit construction for staging/testing.

use url::Url;

/// Default base URL when `EXPD_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Configuration for connecting to the ExpertDesk backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL including the versioned path.
    pub api_url: Url,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Call `DELETE /auth/tokens` on logout. Local token removal happens
    /// regardless.
    pub revoke_on_logout: bool,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `EXPD_API_URL` (default: `http://localhost:8000/api/v1`)
    /// - `EXPD_API_TIMEOUT_MS` (default: 30000)
    /// - `EXPD_REVOKE_ON_LOGOUT` (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: env_url("EXPD_API_URL", DEFAULT_API_URL)?,
            timeout_ms: env_u64("EXPD_API_TIMEOUT_MS", DEFAULT_TIMEOUT_MS),
            revoke_on_logout: env_flag("EXPD_REVOKE_ON_LOGOUT", false),
        })
    }

    /// Configuration pointing at a local mock server (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `base` cannot be parsed.
    pub fn local_mock(base: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: Url::parse(base)
                .map_err(|e| ConfigError::InvalidUrl(base.to_string(), e.to_string()))?,
            timeout_ms: 5_000,
            revoke_on_logout: false,
        })
    }

    /// Base URL without trailing slash, ready for `{base}/{path}` joins.
    pub fn base(&self) -> &str {
        self.api_url.as_str().trim_end_matches('/')
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Read an integer variable, falling back to `default` when unset or unparsable.
pub fn env_u64(var: &str, default: u64) -> u64 {
    std::env::var(var)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Read a boolean variable (`1/true/yes/on`, `0/false/no/off`), falling back
/// to `default` when unset or unrecognised.
pub fn env_flag(var: &str, default: bool) -> bool {
    match std::env::var(var) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
