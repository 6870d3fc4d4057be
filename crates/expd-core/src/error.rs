//! # Error Hierarchy
//!
//! Construction and decoding errors for the shared vocabulary, built with
//! `thiserror`. Transport and API errors live in `expd-client`.

use thiserror::Error;

/// Validation errors for domain values built from user input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identifier is not a non-negative integer.
    #[error("invalid record id: \"{0}\" (expected a positive integer)")]
    InvalidRecordId(String),

    /// A required field was empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// Route path does not start with `/`.
    #[error("invalid route path: \"{0}\" (expected an absolute path)")]
    InvalidPath(String),

    /// Filter expression is not `key=value`.
    #[error("invalid filter: \"{0}\" (expected key=value)")]
    InvalidFilter(String),
}

/// Errors while decoding a response envelope.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Body is not valid JSON for the expected shape.
    #[error("malformed {shape} envelope: {source}")]
    Malformed {
        /// The envelope shape that was expected.
        shape: &'static str,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Wrapped envelope carried no `data` payload.
    #[error("wrapped envelope has no data (status: {status:?}, message: {message:?})")]
    MissingData {
        /// `status` field of the wrapper, if any.
        status: Option<String>,
        /// `message` field of the wrapper, if any.
        message: Option<String>,
    },
}
