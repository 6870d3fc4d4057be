//! # Shared Record Fragments
//!
//! Fields that recur across back-office records: the status reference
//! attached to most resources and the audit timestamps every record carries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::identity::RecordId;

/// A server-owned record addressable by id.
pub trait Identified {
    /// The record's identifier.
    fn id(&self) -> RecordId;

    /// One-line human label used in listings and notifications.
    fn display_label(&self) -> String {
        format!("#{}", self.id())
    }
}

/// Reference to a status row (`vehicle-states`, assignment statuses, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRef {
    /// Status identifier.
    pub id: RecordId,
    /// Short machine code, e.g. `"V1"`.
    #[serde(default)]
    pub code: Option<String>,
    /// Human label, e.g. `"Neuf"`.
    #[serde(default)]
    pub label: Option<String>,
}

/// Audit timestamps. The backend omits them on some embedded records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamps {
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Reference to a named record embedded in another (brand, model, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    /// Referenced record.
    pub id: RecordId,
    /// Its name, when the backend embeds it.
    #[serde(default, alias = "label")]
    pub name: Option<String>,
}

/// Monetary amount as sent by the backend.
///
/// Amounts arrive as JSON numbers on some endpoints and as decimal strings
/// on others. They are kept as the decimal string so no float rounding
/// happens client-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Amount(String);

impl Amount {
    /// Wrap a decimal string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The decimal string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}
