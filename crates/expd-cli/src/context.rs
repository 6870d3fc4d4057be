//! Shared command context: one client, one session, one set of stores.

use std::sync::Arc;

use anyhow::{Context, Result};
use expd_client::{ApiConfig, ExpdClient, FileTokenStore};
use expd_session::{Guard, GuardOutcome, GuardVariant, RouteTable, Session};
use expd_store::{Stores, TracingNotifier};

use crate::EXIT_SIGN_IN;

/// Everything a command needs.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub session: Session,
    pub stores: Stores,
    pub routes: RouteTable,
}

impl AppContext {
    /// Build from `EXPD_*` environment variables with the token persisted
    /// in the state directory.
    pub fn from_env() -> Result<Self> {
        let config = ApiConfig::from_env().context("invalid API configuration")?;
        let tokens = FileTokenStore::new(FileTokenStore::default_path());
        tracing::debug!(
            api_url = %config.api_url,
            state = %tokens.path().display(),
            "configuration loaded"
        );
        let client =
            ExpdClient::new(config, Arc::new(tokens)).context("failed to build API client")?;
        Ok(Self::new(client))
    }

    pub fn new(client: ExpdClient) -> Self {
        Self {
            stores: Stores::new(&client, Arc::new(TracingNotifier)),
            session: Session::new(client),
            routes: RouteTable::default_tree(),
        }
    }

    /// Pass a strict guard for `path`. Returns the exit code to stop with,
    /// or `None` to proceed.
    pub async fn require_session(&self, path: &str) -> Option<u8> {
        match Guard::new(GuardVariant::Strict).resolve(&self.session, path).await {
            GuardOutcome::Render => None,
            GuardOutcome::Redirect { to } => {
                eprintln!("Not signed in. Sign in at {to} (run `expd login`).");
                Some(EXIT_SIGN_IN)
            }
            GuardOutcome::Loading(_) | GuardOutcome::Nothing => {
                eprintln!("Not signed in. Run `expd login`.");
                Some(EXIT_SIGN_IN)
            }
        }
    }
}
