//! # Resource Store
//!
//! Client-side state for one resource, layered over its
//! [`ResourceService`]. The lock is `parking_lot` and is never held across
//! an `.await`: each operation flags itself in flight, calls the server,
//! then applies the response in one short write.
//!
//! No optimistic updates. A failed call leaves the collection as it was,
//! records the operator-facing message in `error`, emits an error toast and
//! returns the error to the caller.

use std::sync::Arc;

use expd_client::{ApiError, Resource, ResourceService};
use expd_core::{Identified, ListFilters, PageLinks, PageMeta, RecordId};
use parking_lot::RwLock;

use crate::notify::{Notifier, Toast};

/// Snapshot of a resource's client-side state.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    /// Last fetched page, plus records created or updated since.
    pub items: Vec<T>,
    /// Record loaded by `fetch_one`.
    pub selected: Option<T>,
    /// Pagination of the last fetched page.
    pub meta: Option<PageMeta>,
    pub links: Option<PageLinks>,
    /// Filters of the last successful `fetch`.
    pub filters: ListFilters,
    /// A call is in flight.
    pub loading: bool,
    /// Message of the last failed call, cleared when a new call starts.
    pub error: Option<String>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            meta: None,
            links: None,
            filters: ListFilters::default(),
            loading: false,
            error: None,
        }
    }
}

#[derive(Debug)]
struct Inner<T> {
    state: ResourceState<T>,
    in_flight: u32,
}

/// Cloneable handle; clones share state.
pub struct ResourceStore<R: Resource> {
    service: ResourceService<R>,
    inner: Arc<RwLock<Inner<R::Record>>>,
    notifier: Arc<dyn Notifier>,
}

impl<R: Resource> Clone for ResourceStore<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            inner: Arc::clone(&self.inner),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<R: Resource> std::fmt::Debug for ResourceStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("ResourceStore")
            .field("resource", &R::PATH)
            .field("items", &inner.state.items.len())
            .field("loading", &inner.state.loading)
            .finish()
    }
}

impl<R: Resource> ResourceStore<R> {
    /// Empty store over `service`.
    pub fn new(service: ResourceService<R>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service,
            inner: Arc::new(RwLock::new(Inner {
                state: ResourceState::default(),
                in_flight: 0,
            })),
            notifier,
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ResourceState<R::Record> {
        self.inner.read().state.clone()
    }

    /// Copy of the current collection.
    pub fn items(&self) -> Vec<R::Record> {
        self.inner.read().state.items.clone()
    }

    /// Whether any call is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.read().state.loading
    }

    /// Message of the last failed call.
    pub fn error(&self) -> Option<String> {
        self.inner.read().state.error.clone()
    }

    /// Load one page and replace the collection with it.
    pub async fn fetch(&self, filters: ListFilters) -> Result<Vec<R::Record>, ApiError> {
        self.begin();
        match self.service.list(&filters).await {
            Ok(page) => {
                let items = page.data.clone();
                self.finish(|state| {
                    state.filters = filters;
                    state.items = page.data;
                    state.meta = page.meta;
                    state.links = page.links;
                });
                tracing::debug!(resource = R::PATH, count = items.len(), "fetched");
                Ok(items)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Load one record into `selected`. A missing record clears it.
    pub async fn fetch_one(&self, id: RecordId) -> Result<Option<R::Record>, ApiError> {
        self.begin();
        match self.service.get(id).await {
            Ok(record) => {
                let selected = record.clone();
                self.finish(|state| state.selected = selected);
                Ok(record)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Create a record and append it.
    pub async fn create(&self, payload: &R::Create) -> Result<R::Record, ApiError> {
        self.begin();
        match self.service.create(payload).await {
            Ok(record) => {
                let label = record.display_label();
                let stored = record.clone();
                self.finish(|state| state.items.push(stored));
                self.notifier
                    .notify(Toast::success(format!("{} {label} created.", capitalized(R::NAME))));
                Ok(record)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Update a record and replace it by id.
    pub async fn update(&self, id: RecordId, payload: &R::Update) -> Result<R::Record, ApiError> {
        self.begin();
        match self.service.update(id, payload).await {
            Ok(record) => {
                let label = record.display_label();
                self.finish(|state| replace(state, record.clone()));
                self.notifier
                    .notify(Toast::success(format!("{} {label} updated.", capitalized(R::NAME))));
                Ok(record)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Delete a record and remove it by id.
    pub async fn delete(&self, id: RecordId) -> Result<(), ApiError> {
        self.begin();
        match self.service.delete(id).await {
            Ok(()) => {
                self.finish(|state| remove(state, id));
                self.notifier
                    .notify(Toast::success(format!("{} #{id} deleted.", capitalized(R::NAME))));
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Delete records one after another. The first failure stops the batch;
    /// records deleted before it stay removed. Returns how many were deleted.
    pub async fn delete_many(&self, ids: &[RecordId]) -> Result<usize, ApiError> {
        self.begin();
        let mut deleted = 0;
        for &id in ids {
            if let Err(e) = self.service.delete(id).await {
                tracing::warn!(resource = R::PATH, %id, deleted, "batch delete aborted");
                return Err(self.fail(e));
            }
            self.inner.write().state.items.retain(|r| r.id() != id);
            deleted += 1;
        }
        self.finish(|state| {
            if state
                .selected
                .as_ref()
                .is_some_and(|s| ids.contains(&s.id()))
            {
                state.selected = None;
            }
        });
        self.notifier
            .notify(Toast::success(format!("{deleted} {} record(s) deleted.", R::NAME)));
        Ok(deleted)
    }

    /// Run a state-changing action and replace the record with the result.
    pub async fn action(&self, id: RecordId, action: &str) -> Result<R::Record, ApiError> {
        self.begin();
        match self.service.action(id, action).await {
            Ok(record) => {
                self.finish(|state| replace(state, record.clone()));
                self.notifier.notify(Toast::success(format!(
                    "{} #{id}: {action} done.",
                    capitalized(R::NAME)
                )));
                Ok(record)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Forget everything, e.g. on logout. In-flight calls still settle
    /// their `loading` flag.
    pub fn reset(&self) {
        let mut inner = self.inner.write();
        let loading = inner.in_flight > 0;
        inner.state = ResourceState {
            loading,
            ..ResourceState::default()
        };
    }

    fn begin(&self) {
        let mut inner = self.inner.write();
        inner.in_flight += 1;
        inner.state.loading = true;
        inner.state.error = None;
    }

    fn finish(&self, f: impl FnOnce(&mut ResourceState<R::Record>)) {
        let mut inner = self.inner.write();
        f(&mut inner.state);
        inner.in_flight = inner.in_flight.saturating_sub(1);
        inner.state.loading = inner.in_flight > 0;
    }

    fn fail(&self, error: ApiError) -> ApiError {
        let message = error.user_message();
        tracing::warn!(resource = R::PATH, "{error}");
        self.finish(|state| state.error = Some(message.clone()));
        self.notifier.notify(Toast::error(message));
        error
    }
}

fn replace<T: Identified + Clone>(state: &mut ResourceState<T>, record: T) {
    let id = record.id();
    if let Some(selected) = state.selected.as_mut().filter(|s| s.id() == id) {
        *selected = record.clone();
    }
    if let Some(slot) = state.items.iter_mut().find(|r| r.id() == id) {
        *slot = record;
    }
}

fn remove<T: Identified>(state: &mut ResourceState<T>, id: RecordId) {
    state.items.retain(|r| r.id() != id);
    if state.selected.as_ref().is_some_and(|s| s.id() == id) {
        state.selected = None;
    }
}

fn capitalized(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_first_letter() {
        assert_eq!(capitalized("vehicle state"), "Vehicle state");
        assert_eq!(capitalized(""), "");
    }

    #[test]
    fn default_state_is_idle() {
        let state: ResourceState<u8> = ResourceState::default();
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(state.items.is_empty());
    }
}
