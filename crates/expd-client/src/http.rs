//! Bearer-token HTTP transport shared by every service.
//!
//! [`ApiClient`] owns the `reqwest::Client`, the base URL and the token
//! store. Each request:
//!
//! 1. attaches `Authorization: Bearer <token>` when a token is stored;
//! 2. on 401, clears the stored token and bumps the unauthorized signal so
//!    the session layer can drop to signed-out;
//! 3. on any other non-2xx, returns [`ApiError::Api`] with the server's
//!    message extracted.
//!
//! There is no retry: a failed request fails once.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use tokio::sync::watch;

use crate::config::ApiConfig;
use crate::error::{extract_message, ApiError};
use crate::storage::{AuthToken, TokenStore};

/// Cloneable handle to the HTTP transport.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base: String,
    tokens: Arc<dyn TokenStore>,
    unauthorized: watch::Sender<u64>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.inner.base)
            .field("tokens", &self.inner.tokens)
            .finish()
    }
}

impl ApiClient {
    /// Build the transport from configuration and a token store.
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .map_err(|e| ApiError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        let (unauthorized, _) = watch::channel(0);

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base: config.base().to_string(),
                tokens,
                unauthorized,
            }),
        })
    }

    /// The token store this client reads and clears.
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.inner.tokens
    }

    /// Subscribe to forced-logout events. The value counts 401 responses
    /// seen since the client was built; any change means the token was
    /// cleared by the transport.
    pub fn subscribe_unauthorized(&self) -> watch::Receiver<u64> {
        self.inner.unauthorized.subscribe()
    }

    /// Absolute URL for a path relative to the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base, path.trim_start_matches('/'))
    }

    /// `GET {path}` with query parameters.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, ApiError> {
        let (endpoint, req) = self.request(Method::GET, path);
        let req = if query.is_empty() { req } else { req.query(query) };
        self.execute(&endpoint, req, true).await
    }

    /// `POST {path}` with a JSON body.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>, ApiError> {
        let (endpoint, req) = self.request(Method::POST, path);
        self.execute(&endpoint, req.json(body), true).await
    }

    /// `POST {path}` without a body (state-changing actions).
    pub async fn post_empty(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let (endpoint, req) = self.request(Method::POST, path);
        self.execute(&endpoint, req, true).await
    }

    /// `PUT {path}` with a JSON body.
    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>, ApiError> {
        let (endpoint, req) = self.request(Method::PUT, path);
        self.execute(&endpoint, req.json(body), true).await
    }

    /// `PATCH {path}` with a JSON body.
    pub async fn patch_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>, ApiError> {
        let (endpoint, req) = self.request(Method::PATCH, path);
        self.execute(&endpoint, req.json(body), true).await
    }

    /// `DELETE {path}`.
    pub async fn delete(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let (endpoint, req) = self.request(Method::DELETE, path);
        self.execute(&endpoint, req, true).await
    }

    /// `POST {path}` without the bearer token and without the 401 logout
    /// side effect. Used by login, where 401 means bad credentials.
    pub(crate) async fn post_json_anonymous<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>, ApiError> {
        let (endpoint, req) = self.request(Method::POST, path);
        self.execute(&endpoint, req.json(body), false).await
    }

    fn request(&self, method: Method, path: &str) -> (String, RequestBuilder) {
        let endpoint = format!("{method} /{}", path.trim_start_matches('/'));
        let req = self.inner.http.request(method, self.url(path));
        (endpoint, req)
    }

    async fn execute(
        &self,
        endpoint: &str,
        req: RequestBuilder,
        authenticated: bool,
    ) -> Result<Vec<u8>, ApiError> {
        let req = match self.current_token(authenticated)? {
            Some(token) => req.bearer_auth(token.as_str()),
            None => req,
        };

        tracing::debug!(endpoint, "sending request");
        let resp = req.send().await.map_err(|e| {
            tracing::warn!(endpoint, "request failed: {e}");
            ApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            }
        })?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED && authenticated {
            self.force_logout(endpoint);
            return Err(ApiError::Unauthorized {
                endpoint: endpoint.into(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(endpoint, status = status.as_u16(), "request rejected");
            return Err(ApiError::Api {
                endpoint: endpoint.into(),
                status: status.as_u16(),
                message: extract_message(&body),
                body,
            });
        }

        resp.bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| ApiError::Http {
                endpoint: endpoint.into(),
                source: e,
            })
    }

    fn current_token(&self, authenticated: bool) -> Result<Option<AuthToken>, ApiError> {
        if !authenticated {
            return Ok(None);
        }
        Ok(self.inner.tokens.load()?)
    }

    fn force_logout(&self, endpoint: &str) {
        tracing::warn!(endpoint, "backend rejected the session, clearing stored token");
        if let Err(e) = self.inner.tokens.clear() {
            tracing::error!("failed to clear token after 401: {e}");
        }
        self.inner.unauthorized.send_modify(|n| *n += 1);
    }
}
