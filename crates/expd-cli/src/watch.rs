//! `expd watch`: run the periodic user refresh and report profile changes
//! until Ctrl-C or until the session ends.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use expd_session::{AuthPhase, RefreshConfig, UserRefresher, Visibility};

use crate::auth::print_user;
use crate::context::AppContext;
use crate::EXIT_SIGN_IN;

/// Arguments for `expd watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Override the refresh interval in milliseconds.
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

/// Execute `expd watch`.
pub async fn run_watch(ctx: &AppContext, args: &WatchArgs) -> Result<u8> {
    if let Some(code) = ctx.require_session("/dashboard/profile").await {
        return Ok(code);
    }

    let mut config = RefreshConfig::from_env();
    if let Some(ms) = args.interval_ms.filter(|ms| *ms > 0) {
        config.interval = Duration::from_millis(ms);
    }
    let handle = UserRefresher::start(ctx.session.clone(), config, Visibility::new(true));
    tracing::info!(interval_ms = config.interval.as_millis() as u64, "watching session");

    let mut phases = ctx.session.subscribe();
    let mut last = ctx.session.user();
    if let Some(user) = &last {
        print_user(user);
    }

    let mut poll = tokio::time::interval(Duration::from_secs(1));
    let code = loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                break 0;
            }
            changed = phases.changed() => {
                if changed.is_err() {
                    break 0;
                }
            }
            _ = poll.tick() => {}
        }

        if ctx.session.phase() == AuthPhase::Unauthenticated {
            println!("Session ended. Run `expd login`.");
            break EXIT_SIGN_IN;
        }
        let current = ctx.session.user();
        if current != last {
            if let Some(user) = &current {
                println!("-- profile changed");
                print_user(user);
            }
            last = current;
        }
    };

    handle.stop().await;
    Ok(code)
}
