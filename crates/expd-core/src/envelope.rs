//! # REST Envelopes
//!
//! The back office wraps payloads in one of three shapes:
//!
//! | Shape | Body | Used by |
//! |-------|------|---------|
//! | list | `{data: [T], links: {...}, meta: {...}}` | every `GET /{resource}` |
//! | bare | `T` | most `GET /{resource}/{id}` |
//! | wrapped | `{status, message, data: T}` | create/update on several resources, `GET /auth/user` on some deployments |
//!
//! Single-record shapes are declared per endpoint via [`EnvelopeShape`].
//! [`EnvelopeShape::Either`] exists for endpoints documented as returning
//! both depending on the backend version.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Pagination metadata of a list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// 1-based index of the returned page.
    pub current_page: u32,
    /// Page size the server applied.
    pub per_page: u32,
    /// Total number of records matching the filters.
    pub total: u64,
    /// Index of the last page.
    #[serde(default)]
    pub last_page: Option<u32>,
    /// 1-based position of the first record on this page.
    #[serde(default)]
    pub from: Option<u64>,
    /// 1-based position of the last record on this page.
    #[serde(default)]
    pub to: Option<u64>,
}

impl PageMeta {
    /// Whether another page follows this one.
    pub fn has_next(&self) -> bool {
        match self.last_page {
            Some(last) => self.current_page < last,
            None => u64::from(self.current_page) * u64::from(self.per_page) < self.total,
        }
    }
}

/// Navigation links of a list response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    /// First page URL.
    #[serde(default)]
    pub first: Option<String>,
    /// Last page URL.
    #[serde(default)]
    pub last: Option<String>,
    /// Previous page URL.
    #[serde(default)]
    pub prev: Option<String>,
    /// Next page URL.
    #[serde(default)]
    pub next: Option<String>,
}

/// A page of records as returned by a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEnvelope<T> {
    /// Records on this page.
    pub data: Vec<T>,
    /// Navigation links.
    #[serde(default)]
    pub links: Option<PageLinks>,
    /// Pagination metadata.
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

impl<T> ListEnvelope<T> {
    /// Decode a list body. Some legacy endpoints answer with a bare array;
    /// it is accepted as a single unpaginated page.
    pub fn decode(body: &[u8]) -> Result<Self, DecodeError>
    where
        T: DeserializeOwned,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ListBody<T> {
            Envelope(ListEnvelope<T>),
            Bare(Vec<T>),
        }

        match serde_json::from_slice::<ListBody<T>>(body) {
            Ok(ListBody::Envelope(env)) => Ok(env),
            Ok(ListBody::Bare(data)) => Ok(Self {
                data,
                links: None,
                meta: None,
            }),
            // Re-decode strictly so the error names the field that failed.
            Err(_) => serde_json::from_slice::<ListEnvelope<T>>(body).map_err(|source| {
                DecodeError::Malformed {
                    shape: "list",
                    source,
                }
            }),
        }
    }
}

/// Shape a single-record endpoint is documented to answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeShape {
    /// The record itself.
    Bare,
    /// `{status, message, data}`.
    Wrapped,
    /// Either of the above; wrapped is detected by its `data` key next to
    /// `status` or `message`.
    Either,
}

impl EnvelopeShape {
    fn label(self) -> &'static str {
        match self {
            Self::Bare => "bare",
            Self::Wrapped => "wrapped",
            Self::Either => "bare-or-wrapped",
        }
    }
}

/// A decoded single-record response.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityEnvelope<T> {
    /// `{status, message, data}` wrapper.
    Wrapped {
        /// Server status marker, stringified (`"success"`, `"200"`, `"true"`).
        status: Option<String>,
        /// Server message, typically shown to the operator.
        message: Option<String>,
        /// The record.
        data: T,
    },
    /// The record without wrapper.
    Bare(T),
}

impl<T> EntityEnvelope<T> {
    /// Decode `body` according to the endpoint's declared shape.
    pub fn decode(shape: EnvelopeShape, body: &[u8]) -> Result<Self, DecodeError>
    where
        T: DeserializeOwned,
    {
        match shape {
            EnvelopeShape::Bare => serde_json::from_slice(body)
                .map(Self::Bare)
                .map_err(|source| DecodeError::Malformed {
                    shape: shape.label(),
                    source,
                }),
            EnvelopeShape::Wrapped => decode_wrapped(shape, body),
            EnvelopeShape::Either => {
                let value: serde_json::Value =
                    serde_json::from_slice(body).map_err(|source| DecodeError::Malformed {
                        shape: shape.label(),
                        source,
                    })?;
                if looks_wrapped(&value) {
                    decode_wrapped(shape, body)
                } else {
                    serde_json::from_value(value)
                        .map(Self::Bare)
                        .map_err(|source| DecodeError::Malformed {
                            shape: shape.label(),
                            source,
                        })
                }
            }
        }
    }

    /// The record, dropping any wrapper.
    pub fn into_data(self) -> T {
        match self {
            Self::Wrapped { data, .. } | Self::Bare(data) => data,
        }
    }

    /// The wrapper's message, if the response was wrapped and carried one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Wrapped { message, .. } => message.as_deref(),
            Self::Bare(_) => None,
        }
    }
}

/// Decode a single-record body and return the record.
pub fn decode_entity<T: DeserializeOwned>(
    shape: EnvelopeShape,
    body: &[u8],
) -> Result<T, DecodeError> {
    EntityEnvelope::decode(shape, body).map(EntityEnvelope::into_data)
}

fn looks_wrapped(value: &serde_json::Value) -> bool {
    value.as_object().is_some_and(|obj| {
        obj.contains_key("data") && (obj.contains_key("status") || obj.contains_key("message"))
    })
}

fn decode_wrapped<T: DeserializeOwned>(
    shape: EnvelopeShape,
    body: &[u8],
) -> Result<EntityEnvelope<T>, DecodeError> {
    #[derive(Deserialize)]
    struct Wrapper<T> {
        #[serde(default)]
        status: Option<serde_json::Value>,
        #[serde(default)]
        message: Option<String>,
        data: Option<T>,
    }

    let wrapper: Wrapper<T> =
        serde_json::from_slice(body).map_err(|source| DecodeError::Malformed {
            shape: shape.label(),
            source,
        })?;
    let status = wrapper.status.map(|s| match s {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    });
    match wrapper.data {
        Some(data) => Ok(EntityEnvelope::Wrapped {
            status,
            message: wrapper.message,
            data,
        }),
        None => Err(DecodeError::MissingData {
            status,
            message: wrapper.message,
        }),
    }
}
