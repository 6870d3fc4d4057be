//! # Route Guards
//!
//! A guard turns the session phase into one decision for a protected view:
//!
//! | Phase | Passive | Redirecting | Strict |
//! |-------|---------|-------------|--------|
//! | Unknown / Checking | loading | loading | loading |
//! | Authenticated | render | render | render if the token is still stored |
//! | Unauthenticated | nothing | redirect once | redirect once |
//!
//! `Passive` is meant for views nested under a layout whose own guard
//! already redirects.

use serde::{Deserialize, Serialize};

use crate::routes::sign_in_redirect;
use crate::session::{AuthPhase, Session};

/// Placeholder shown while the session is undecided.
pub const DEFAULT_LOADER: &str = "Loading…";

/// Guard behaviour for unauthenticated sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardVariant {
    /// Render nothing; rely on an enclosing guard to redirect.
    Passive,
    /// Redirect to sign-in with the requested path as return target.
    Redirecting,
    /// As `Redirecting`, and re-check the stored token on every evaluation.
    Strict,
}

/// What the guarded view should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Show the protected content.
    Render,
    /// Show the placeholder, never the content.
    Loading(String),
    /// Navigate to `to`.
    Redirect {
        /// Sign-in URL carrying the return path.
        to: String,
    },
    /// Show nothing.
    Nothing,
}

/// One guard instance per mounted view.
#[derive(Debug, Clone)]
pub struct Guard {
    variant: GuardVariant,
    fallback: Option<String>,
    redirected: bool,
}

impl Guard {
    /// New guard with the default loader.
    pub fn new(variant: GuardVariant) -> Self {
        Self {
            variant,
            fallback: None,
            redirected: false,
        }
    }

    /// Replace the default loading placeholder.
    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// This guard's variant.
    pub fn variant(&self) -> GuardVariant {
        self.variant
    }

    /// Decide for the current phase without starting any check.
    ///
    /// The redirect is issued once; later evaluations while still
    /// unauthenticated yield [`GuardOutcome::Nothing`] until the session
    /// authenticates again.
    pub fn evaluate(&mut self, session: &Session, requested_path: &str) -> GuardOutcome {
        let phase = match self.variant {
            GuardVariant::Strict => session.revalidate_token(),
            _ => session.phase(),
        };

        match phase {
            AuthPhase::Unknown | AuthPhase::Checking => GuardOutcome::Loading(
                self.fallback
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LOADER.to_string()),
            ),
            AuthPhase::Authenticated => {
                self.redirected = false;
                GuardOutcome::Render
            }
            AuthPhase::Unauthenticated => match self.variant {
                GuardVariant::Passive => GuardOutcome::Nothing,
                GuardVariant::Redirecting | GuardVariant::Strict => {
                    if self.redirected {
                        return GuardOutcome::Nothing;
                    }
                    self.redirected = true;
                    tracing::debug!(requested_path, "redirecting to sign-in");
                    GuardOutcome::Redirect {
                        to: sign_in_redirect(requested_path),
                    }
                }
            },
        }
    }

    /// Mount entry point: resolve an `Unknown` session, then evaluate.
    pub async fn resolve(&mut self, session: &Session, requested_path: &str) -> GuardOutcome {
        if session.phase() == AuthPhase::Unknown {
            session.initialize().await;
        }
        self.evaluate(session, requested_path)
    }
}
