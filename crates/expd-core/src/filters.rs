//! # List Filters
//!
//! Query parameters sent with list requests. Order is preserved so the
//! generated URL is stable, setting a key twice replaces the earlier value,
//! and empty values are never sent (the backend treats `?status=` as a
//! filter on the empty string).

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Ordered set of list query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilters {
    params: Vec<(String, String)>,
}

impl ListFilters {
    /// Empty filter set (server defaults apply).
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a given 1-based page.
    pub fn page(self, page: u32) -> Self {
        self.with("page", page.to_string())
    }

    /// Request a page size.
    pub fn per_page(self, per_page: u32) -> Self {
        self.with("per_page", per_page.to_string())
    }

    /// Full-text search term.
    pub fn search(self, term: impl Into<String>) -> Self {
        self.with("search", term)
    }

    /// Set a named filter, replacing an earlier value for the same key.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// In-place variant of [`ListFilters::with`].
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.params.push((key, value)),
        }
    }

    /// Parse a `key=value` expression (as typed on the command line) and set it.
    pub fn set_expr(&mut self, expr: &str) -> Result<(), ValidationError> {
        match expr.split_once('=') {
            Some((k, v)) if !k.trim().is_empty() => {
                self.set(k.trim(), v.trim());
                Ok(())
            }
            _ => Err(ValidationError::InvalidFilter(expr.to_string())),
        }
    }

    /// Value currently set for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Requested page, if any.
    pub fn current_page(&self) -> Option<u32> {
        self.get("page").and_then(|p| p.parse().ok())
    }

    /// Parameters to send, in insertion order, empty values dropped.
    pub fn to_query_pairs(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    /// Whether nothing would be sent.
    pub fn is_empty(&self) -> bool {
        self.params.iter().all(|(_, v)| v.is_empty())
    }
}
