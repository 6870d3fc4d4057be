#![deny(missing_docs)]

//! # expd-core -- Shared Vocabulary for ExpertDesk
//!
//! Types every other crate in the workspace speaks: record identifiers,
//! the REST envelopes the back office wraps its payloads in, list filters,
//! and the validation error hierarchy. No internal crate dependencies.
//!
//! ## Envelopes
//!
//! List endpoints always answer `{data: [...], links: {...}, meta: {...}}`.
//! Single-record endpoints are inconsistent across resources: some return
//! the bare record, some wrap it as `{status, message, data}`. Each resource
//! declares its [`EnvelopeShape`] and decoding goes through
//! [`decode_entity`], so the shape is never guessed at the call site.

pub mod domain;
pub mod envelope;
pub mod error;
pub mod filters;
pub mod identity;

pub use domain::{Amount, AuditStamps, Identified, NamedRef, StatusRef};
pub use envelope::{decode_entity, EntityEnvelope, EnvelopeShape, ListEnvelope, PageLinks, PageMeta};
pub use error::{DecodeError, ValidationError};
pub use filters::ListFilters;
pub use identity::RecordId;
