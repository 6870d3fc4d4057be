//! # Auth Session State Machine
//!
//! ```text
//!             token present              user fetched
//!   Unknown ────────────────▶ Checking ─────────────────▶ Authenticated
//!      │                         │                            │    │
//!      │ no token                │ fetch failed      401/logout │    │ login
//!      ▼                         ▼                            ▼    │
//!   Unauthenticated ◀────────────┴────────────────────────────┘    │
//!      │                                                           │
//!      └──────────────────────── login ───▶ Checking ◀─────────────┘
//! ```
//!
//! Every fetch is attempted once. Any 401 seen by the shared transport,
//! from any service, ends an authenticated session.

use std::sync::Arc;

use expd_client::{Credentials, ExpdClient, TokenStore, User};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::SessionError;

/// Where the session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthPhase {
    /// Nothing checked yet.
    Unknown,
    /// A token exists and the user profile is being fetched.
    Checking,
    /// Token valid and user profile loaded.
    Authenticated,
    /// No token, or the token was rejected.
    Unauthenticated,
}

impl AuthPhase {
    /// Whether `self → next` is part of the lifecycle. Staying in
    /// `Unauthenticated` is allowed so logout is idempotent.
    pub fn can_transition_to(self, next: AuthPhase) -> bool {
        use AuthPhase::*;
        matches!(
            (self, next),
            (Unknown, Checking)
                | (Unknown, Unauthenticated)
                | (Checking, Authenticated)
                | (Checking, Unauthenticated)
                | (Authenticated, Checking)
                | (Authenticated, Unauthenticated)
                | (Unauthenticated, Checking)
                | (Unauthenticated, Unauthenticated)
        )
    }

    /// Whether the phase is still undecided.
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Unknown | Self::Checking)
    }
}

impl std::fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Checking => "checking",
            Self::Authenticated => "authenticated",
            Self::Unauthenticated => "unauthenticated",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
struct SessionState {
    phase: AuthPhase,
    user: Option<User>,
    /// Unauthorized counter observed when the current check started.
    unauthorized_seen: u64,
}

struct Inner {
    client: ExpdClient,
    state: RwLock<SessionState>,
    unauthorized: watch::Receiver<u64>,
    phase_tx: watch::Sender<AuthPhase>,
}

/// Shared auth session. Cheap to clone; clones observe the same state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("Session")
            .field("phase", &state.phase)
            .field("user", &state.user.as_ref().map(|u| u.id))
            .finish()
    }
}

impl Session {
    /// New session in the `Unknown` phase.
    pub fn new(client: ExpdClient) -> Self {
        let unauthorized = client.api().subscribe_unauthorized();
        let seen = *unauthorized.borrow();
        let (phase_tx, _) = watch::channel(AuthPhase::Unknown);
        Self {
            inner: Arc::new(Inner {
                client,
                state: RwLock::new(SessionState {
                    phase: AuthPhase::Unknown,
                    user: None,
                    unauthorized_seen: seen,
                }),
                unauthorized,
                phase_tx,
            }),
        }
    }

    /// The client this session authenticates.
    pub fn client(&self) -> &ExpdClient {
        &self.inner.client
    }

    fn tokens(&self) -> &Arc<dyn TokenStore> {
        self.inner.client.api().tokens()
    }

    /// Current phase, after folding in any forced logout from the transport.
    pub fn phase(&self) -> AuthPhase {
        self.sync_unauthorized();
        self.inner.state.read().phase
    }

    /// The loaded user, if authenticated.
    pub fn user(&self) -> Option<User> {
        self.sync_unauthorized();
        self.inner.state.read().user.clone()
    }

    /// Whether a token is stored right now. Storage failures count as absent.
    pub fn is_authenticated(&self) -> bool {
        self.tokens().is_present()
    }

    /// Watch phase changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthPhase> {
        self.inner.phase_tx.subscribe()
    }

    /// Resolve the initial phase. Only acts from `Unknown`; any other phase
    /// is returned unchanged. The user fetch is attempted exactly once.
    pub async fn initialize(&self) -> AuthPhase {
        if self.phase() != AuthPhase::Unknown {
            return self.phase();
        }

        if !self.is_authenticated() {
            tracing::debug!("no stored token");
            return self.set_unauthenticated();
        }

        if let Err(e) = self.transition(AuthPhase::Checking) {
            tracing::debug!("initialize raced: {e}");
            return self.phase();
        }

        match self.inner.client.auth().user().await {
            Ok(user) => self.set_authenticated(user),
            Err(e) => {
                tracing::warn!("stored token rejected: {e}");
                self.set_unauthenticated()
            }
        }
    }

    /// Exchange credentials for a token, persist it and load the user.
    ///
    /// A failed login leaves the phase untouched, as does a login attempted
    /// while another check is in flight; neither persists the new token. A
    /// failed user fetch after a successful login discards the new token.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, SessionError> {
        let token = self.inner.client.auth().login(credentials).await?;
        self.transition(AuthPhase::Checking)?;
        if let Err(e) = self.tokens().save(&token) {
            self.set_unauthenticated();
            return Err(e.into());
        }
        tracing::info!(email = credentials.email(), "token issued");

        match self.inner.client.auth().user().await {
            Ok(user) => {
                self.set_authenticated(user.clone());
                Ok(user)
            }
            Err(e) => {
                if let Err(clear) = self.tokens().clear() {
                    tracing::warn!("failed to discard token: {clear}");
                }
                self.set_unauthenticated();
                Err(e.into())
            }
        }
    }

    /// End the session. Server-side revocation is attempted only when
    /// configured and its failure is logged, never returned. The local
    /// token is always removed.
    pub async fn logout(&self) -> Result<(), SessionError> {
        if self.inner.client.revoke_on_logout() && self.is_authenticated() {
            if let Err(e) = self.inner.client.auth().revoke().await {
                tracing::warn!("token revocation failed: {e}");
            }
        }

        let cleared = self.tokens().clear();
        self.set_unauthenticated();
        tracing::info!("logged out");
        cleared.map_err(SessionError::from)
    }

    /// Re-fetch the user profile once. Returns `Ok(None)` when the session
    /// is not authenticated. A 401 ends the session; other failures keep
    /// the current user and phase.
    pub async fn refresh_user(&self) -> Result<Option<User>, SessionError> {
        if self.phase() != AuthPhase::Authenticated {
            return Ok(None);
        }

        match self.inner.client.auth().user().await {
            Ok(user) => {
                let mut state = self.inner.state.write();
                if state.phase != AuthPhase::Authenticated {
                    return Ok(None);
                }
                state.user = Some(user.clone());
                Ok(Some(user))
            }
            Err(e) if e.is_unauthorized() => {
                tracing::info!("user refresh rejected, session ended");
                self.set_unauthenticated();
                Err(e.into())
            }
            Err(e) => {
                tracing::warn!("user refresh failed: {e}");
                Err(e.into())
            }
        }
    }

    /// Drop an `Authenticated` phase whose token disappeared from storage.
    pub fn revalidate_token(&self) -> AuthPhase {
        let phase = self.phase();
        if phase == AuthPhase::Authenticated && !self.is_authenticated() {
            tracing::info!("token missing from storage, session ended");
            return self.set_unauthenticated();
        }
        phase
    }

    fn sync_unauthorized(&self) {
        let current = *self.inner.unauthorized.borrow();
        let stale = {
            let state = self.inner.state.read();
            current > state.unauthorized_seen && state.phase == AuthPhase::Authenticated
        };
        if stale {
            tracing::info!("token rejected by the server, session ended");
            self.set_unauthenticated();
        }
    }

    fn transition(&self, next: AuthPhase) -> Result<(), SessionError> {
        let mut state = self.inner.state.write();
        if !state.phase.can_transition_to(next) {
            return Err(SessionError::InvalidTransition {
                from: state.phase,
                to: next,
            });
        }
        if next == AuthPhase::Checking {
            state.unauthorized_seen = *self.inner.unauthorized.borrow();
        }
        state.phase = next;
        drop(state);
        self.inner.phase_tx.send_replace(next);
        Ok(())
    }

    fn set_authenticated(&self, user: User) -> AuthPhase {
        let mut state = self.inner.state.write();
        if state.phase != AuthPhase::Checking {
            return state.phase;
        }
        tracing::info!(user = user.id.get(), "authenticated");
        state.phase = AuthPhase::Authenticated;
        state.user = Some(user);
        drop(state);
        self.inner.phase_tx.send_replace(AuthPhase::Authenticated);
        AuthPhase::Authenticated
    }

    /// Every phase may fall back to `Unauthenticated`.
    fn set_unauthenticated(&self) -> AuthPhase {
        let mut state = self.inner.state.write();
        state.phase = AuthPhase::Unauthenticated;
        state.user = None;
        state.unauthorized_seen = *self.inner.unauthorized.borrow();
        drop(state);
        self.inner.phase_tx.send_replace(AuthPhase::Unauthenticated);
        AuthPhase::Unauthenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [AuthPhase; 4] = [
        AuthPhase::Unknown,
        AuthPhase::Checking,
        AuthPhase::Authenticated,
        AuthPhase::Unauthenticated,
    ];

    #[test]
    fn nothing_returns_to_unknown() {
        for from in ALL {
            assert!(!from.can_transition_to(AuthPhase::Unknown));
        }
    }

    #[test]
    fn authenticated_only_reached_through_checking() {
        for from in ALL {
            assert_eq!(
                from.can_transition_to(AuthPhase::Authenticated),
                from == AuthPhase::Checking,
                "{from} -> authenticated"
            );
        }
    }

    #[test]
    fn checking_cannot_restart() {
        assert!(!AuthPhase::Checking.can_transition_to(AuthPhase::Checking));
    }

    #[test]
    fn pending_phases() {
        assert!(AuthPhase::Unknown.is_pending());
        assert!(AuthPhase::Checking.is_pending());
        assert!(!AuthPhase::Authenticated.is_pending());
        assert!(!AuthPhase::Unauthenticated.is_pending());
    }

    #[test]
    fn phase_serializes_snake_case() {
        let json = serde_json::to_string(&AuthPhase::Unauthenticated).unwrap();
        assert_eq!(json, "\"unauthenticated\"");
    }
}
