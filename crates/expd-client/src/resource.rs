//! Generic CRUD service over one REST resource.
//!
//! Every back-office resource follows the same route layout:
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/{resource}` | Paginated list, filters as query parameters |
//! | GET    | `/{resource}/{id}` | Single record |
//! | POST   | `/{resource}` | Create |
//! | PUT    | `/{resource}/{id}` | Update |
//! | DELETE | `/{resource}/{id}` | Delete |
//! | POST   | `/{resource}/{id}/{action}` | State-changing action (close, cancel, ...) |
//!
//! What differs per resource is the record type, the payload types and the
//! single-record envelope shape; those are declared by implementing
//! [`Resource`] on a marker type.

use std::marker::PhantomData;

use expd_core::{decode_entity, EnvelopeShape, Identified, ListEnvelope, ListFilters, RecordId};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::ApiClient;

/// A back-office REST resource.
pub trait Resource: Send + Sync + 'static {
    /// Singular human name, used in notifications ("vehicle").
    const NAME: &'static str;
    /// Path segment under the base URL ("vehicles").
    const PATH: &'static str;
    /// Shape of single-record responses (get, create, update, actions).
    const ENTITY_SHAPE: EnvelopeShape;

    /// Record as returned by the backend.
    type Record: Identified
        + DeserializeOwned
        + Serialize
        + Clone
        + PartialEq
        + std::fmt::Debug
        + Send
        + Sync
        + 'static;
    /// Payload of `POST /{resource}`.
    type Create: Serialize + DeserializeOwned + std::fmt::Debug + Send + Sync;
    /// Payload of `PUT /{resource}/{id}`.
    type Update: Serialize + DeserializeOwned + std::fmt::Debug + Send + Sync;
}

/// Typed CRUD client for resource `R`.
pub struct ResourceService<R: Resource> {
    api: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> std::fmt::Debug for ResourceService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceService")
            .field("resource", &R::PATH)
            .finish()
    }
}

impl<R: Resource> ResourceService<R> {
    pub(crate) fn new(api: ApiClient) -> Self {
        Self {
            api,
            _resource: PhantomData,
        }
    }

    /// List records matching `filters`.
    ///
    /// Calls `GET {base}/{resource}?{filters}`.
    pub async fn list(&self, filters: &ListFilters) -> Result<ListEnvelope<R::Record>, ApiError> {
        let body = self.api.get(R::PATH, &filters.to_query_pairs()).await?;
        ListEnvelope::decode(&body).map_err(|source| ApiError::Decode {
            endpoint: format!("GET /{}", R::PATH),
            source,
        })
    }

    /// Get one record. A 404 yields `Ok(None)`.
    ///
    /// Calls `GET {base}/{resource}/{id}`.
    pub async fn get(&self, id: RecordId) -> Result<Option<R::Record>, ApiError> {
        let path = record_path::<R>(id);
        match self.api.get(&path, &[]).await {
            Ok(body) => self.decode(&format!("GET /{path}"), &body).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create a record.
    ///
    /// Calls `POST {base}/{resource}`.
    pub async fn create(&self, payload: &R::Create) -> Result<R::Record, ApiError> {
        let body = self.api.post_json(R::PATH, payload).await?;
        self.decode(&format!("POST /{}", R::PATH), &body)
    }

    /// Replace a record's editable fields.
    ///
    /// Calls `PUT {base}/{resource}/{id}`.
    pub async fn update(&self, id: RecordId, payload: &R::Update) -> Result<R::Record, ApiError> {
        let path = record_path::<R>(id);
        let body = self.api.put_json(&path, payload).await?;
        self.decode(&format!("PUT /{path}"), &body)
    }

    /// Delete a record.
    ///
    /// Calls `DELETE {base}/{resource}/{id}`.
    pub async fn delete(&self, id: RecordId) -> Result<(), ApiError> {
        self.api.delete(&record_path::<R>(id)).await.map(|_| ())
    }

    /// Run a state-changing action and return the updated record.
    ///
    /// Calls `POST {base}/{resource}/{id}/{action}`.
    pub async fn action(&self, id: RecordId, action: &str) -> Result<R::Record, ApiError> {
        let path = format!("{}/{action}", record_path::<R>(id));
        let body = self.api.post_empty(&path).await?;
        self.decode(&format!("POST /{path}"), &body)
    }

    fn decode(&self, endpoint: &str, body: &[u8]) -> Result<R::Record, ApiError> {
        decode_entity(R::ENTITY_SHAPE, body).map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

fn record_path<R: Resource>(id: RecordId) -> String {
    format!("{}/{id}", R::PATH)
}
