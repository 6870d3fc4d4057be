//! # Periodic User Refresh
//!
//! Keeps the signed-in user's profile current by re-fetching it on a fixed
//! interval. Ticks are skipped while the session is not authenticated or,
//! when configured, while the operator's view is hidden. Regaining
//! visibility triggers one immediate refresh.
//!
//! Refreshes run as independent tasks: a slow fetch does not delay the next
//! tick and overlapping fetches are not merged. There is no jitter and no
//! backoff.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use expd_client::config::{env_flag, env_u64};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::session::{AuthPhase, Session};

/// Default refresh period.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(20);

/// Boxed future returned by [`RefreshTarget::refresh`].
pub type RefreshFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Something whose user profile can be re-fetched.
pub trait RefreshTarget: Send + Sync + 'static {
    /// Whether a refresh makes sense right now.
    fn is_active(&self) -> bool;

    /// One fetch. Failures are handled by the target.
    fn refresh(&self) -> RefreshFuture;
}

impl RefreshTarget for Session {
    fn is_active(&self) -> bool {
        self.phase() == AuthPhase::Authenticated
    }

    fn refresh(&self) -> RefreshFuture {
        let session = self.clone();
        Box::pin(async move {
            match session.refresh_user().await {
                Ok(Some(user)) => tracing::debug!(user = user.id.get(), "user refreshed"),
                Ok(None) => {}
                Err(e) => tracing::debug!("user refresh failed: {e}"),
            }
        })
    }
}

/// Refresh timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Time between refreshes.
    pub interval: Duration,
    /// Master switch.
    pub enabled: bool,
    /// Skip ticks while hidden.
    pub only_when_visible: bool,
    /// Refresh immediately when visibility returns.
    pub refresh_on_visibility_change: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            enabled: true,
            only_when_visible: true,
            refresh_on_visibility_change: true,
        }
    }
}

impl RefreshConfig {
    /// Read overrides from the environment:
    ///
    /// - `EXPD_USER_REFRESH_INTERVAL_MS` (default `20000`)
    /// - `EXPD_USER_REFRESH_ENABLED` (default `true`)
    /// - `EXPD_USER_REFRESH_ONLY_WHEN_VISIBLE` (default `true`)
    /// - `EXPD_USER_REFRESH_ON_VISIBILITY_CHANGE` (default `true`)
    ///
    /// A zero interval falls back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let interval_ms = env_u64(
            "EXPD_USER_REFRESH_INTERVAL_MS",
            defaults.interval.as_millis() as u64,
        );
        Self {
            interval: if interval_ms == 0 {
                defaults.interval
            } else {
                Duration::from_millis(interval_ms)
            },
            enabled: env_flag("EXPD_USER_REFRESH_ENABLED", defaults.enabled),
            only_when_visible: env_flag(
                "EXPD_USER_REFRESH_ONLY_WHEN_VISIBLE",
                defaults.only_when_visible,
            ),
            refresh_on_visibility_change: env_flag(
                "EXPD_USER_REFRESH_ON_VISIBILITY_CHANGE",
                defaults.refresh_on_visibility_change,
            ),
        }
    }
}

/// Whether the operator can currently see the application.
#[derive(Debug, Clone)]
pub struct Visibility {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Visibility {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Visibility {
    /// New handle with an initial state.
    pub fn new(visible: bool) -> Self {
        let (tx, _) = watch::channel(visible);
        Self { tx: Arc::new(tx) }
    }

    /// Update visibility. Setting the current value again is not a change.
    pub fn set_visible(&self, visible: bool) {
        self.tx.send_if_modified(|v| {
            let changed = *v != visible;
            *v = visible;
            changed
        });
    }

    /// Current visibility.
    pub fn is_visible(&self) -> bool {
        *self.tx.borrow()
    }

    /// Watch visibility changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Starts refresh tasks.
#[derive(Debug)]
pub struct UserRefresher;

impl UserRefresher {
    /// Spawn the refresh loop. A disabled config yields a paused handle that
    /// can be enabled later. Must be called within a Tokio runtime.
    pub fn start<T: RefreshTarget>(
        target: T,
        config: RefreshConfig,
        visibility: Visibility,
    ) -> RefreshHandle {
        let (enabled_tx, enabled_rx) = watch::channel(config.enabled);
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run(
            Arc::new(target),
            config,
            visibility.subscribe(),
            enabled_rx,
            stop_rx,
        ));
        tracing::debug!(interval_ms = config.interval.as_millis() as u64, "user refresh started");
        RefreshHandle {
            enabled: enabled_tx,
            stop: stop_tx,
            task: Some(task),
        }
    }
}

/// Controls a running refresh loop. Dropping the handle stops the loop.
#[derive(Debug)]
pub struct RefreshHandle {
    enabled: watch::Sender<bool>,
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    /// Pause or resume ticks without stopping the loop.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.send_replace(enabled);
    }

    /// Whether ticks currently fetch.
    pub fn is_enabled(&self) -> bool {
        *self.enabled.borrow()
    }

    /// Whether the loop is still running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// End the loop and wait for it. No fetch starts after this returns.
    pub async fn stop(mut self) {
        self.stop.send_replace(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("user refresh task ended abnormally: {e}");
            }
        }
        tracing::debug!("user refresh stopped");
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run<T: RefreshTarget>(
    target: Arc<T>,
    config: RefreshConfig,
    mut visibility: watch::Receiver<bool>,
    enabled: watch::Receiver<bool>,
    mut stop: watch::Receiver<bool>,
) {
    let mut ticker = interval_at(Instant::now() + config.interval, config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut visibility_open = true;

    loop {
        tokio::select! {
            biased;
            _ = stop.changed() => break,
            _ = ticker.tick() => {
                let visible = *visibility.borrow();
                if *enabled.borrow()
                    && (visible || !config.only_when_visible)
                    && target.is_active()
                {
                    tokio::spawn(target.refresh());
                }
            }
            changed = visibility.changed(), if visibility_open => {
                if changed.is_err() {
                    visibility_open = false;
                    continue;
                }
                let visible = *visibility.borrow_and_update();
                if visible
                    && config.refresh_on_visibility_change
                    && *enabled.borrow()
                    && target.is_active()
                {
                    tracing::debug!("visible again, refreshing user");
                    tokio::spawn(target.refresh());
                }
            }
        }
    }
}
