//! ExpertDesk API client error types.
//!
//! The variants follow the back office's failure taxonomy: transport
//! failures, unauthorized responses (which force a local logout), client
//! errors whose server message is shown to the operator verbatim, and
//! server errors shown as a generic message.

use expd_core::DecodeError;

use crate::config::ConfigError;
use crate::storage::StorageError;

/// Errors from ExpertDesk API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP transport error (connection refused, timeout, TLS).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Backend answered 401. The stored token has already been cleared.
    #[error("{endpoint} returned 401: session is no longer valid")]
    Unauthorized { endpoint: String },
    /// Backend returned another non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        /// `message` extracted from the JSON error body, if any.
        message: Option<String>,
        body: String,
    },
    /// Response body did not match the endpoint's envelope.
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: DecodeError,
    },
    /// Login succeeded but no token could be found in the response.
    #[error("{endpoint} returned no bearer token")]
    MissingToken { endpoint: String },
    /// Token storage failure.
    #[error("token storage error: {0}")]
    Storage(#[from] StorageError),
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Generic message for failures whose details are not meant for operators.
pub const GENERIC_FAILURE: &str = "An unexpected error occurred. Please try again later.";

/// Message shown when the session was rejected by the backend.
pub const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";

/// Message shown when the backend cannot be reached.
pub const UNREACHABLE: &str = "Unable to reach the server. Check your connection and try again.";

impl ApiError {
    /// HTTP status carried by the error, if the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the error forced a local logout.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Whether the backend reported the record as missing.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Operator-facing message for a notification.
    ///
    /// 4xx responses surface the server's message verbatim (falling back to
    /// the raw body when it is short plain text); everything else gets a
    /// fixed message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized { .. } => SESSION_EXPIRED.to_string(),
            Self::Api {
                status, message, body, ..
            } if (400..500).contains(status) => match message {
                Some(m) if !m.trim().is_empty() => m.clone(),
                _ if is_plain_text(body) => body.trim().to_string(),
                _ => format!("Request rejected by the server ({status})."),
            },
            Self::Http { .. } => UNREACHABLE.to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

fn is_plain_text(body: &str) -> bool {
    let body = body.trim();
    !body.is_empty() && body.len() <= 200 && !body.starts_with(&['{', '[', '<'][..])
}

/// Pull an operator-facing message out of an error body.
///
/// Understands `{"message": ...}`, `{"error": ...}` and the validation form
/// `{"errors": {"field": ["msg", ...]}}` (first message wins when no
/// top-level message exists).
pub(crate) fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let obj = value.as_object()?;
    for key in ["message", "error"] {
        if let Some(s) = obj.get(key).and_then(|v| v.as_str()) {
            if !s.trim().is_empty() {
                return Some(s.to_string());
            }
        }
    }
    obj.get("errors")?
        .as_object()?
        .values()
        .find_map(|v| match v {
            serde_json::Value::Array(items) => items.iter().find_map(|i| i.as_str()),
            serde_json::Value::String(s) => Some(s.as_str()),
            _ => None,
        })
        .map(str::to_string)
}
