//! # Session Subcommands
//!
//! `login`, `logout` and `whoami`. The token is persisted between runs by
//! the context's token store.

use anyhow::{bail, Context, Result};
use clap::Args;
use expd_client::{Credentials, User};
use expd_session::routes::return_path;
use expd_session::AuthPhase;

use crate::context::AppContext;
use crate::EXIT_SIGN_IN;

/// Arguments for `expd login`.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email.
    #[arg(long)]
    pub email: String,

    /// Account password.
    #[arg(long, env = "EXPD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Query string of the sign-in URL a guard redirected to
    /// (`redirect=%2Fdashboard%2F...`). Prints where to continue.
    #[arg(long)]
    pub redirect: Option<String>,
}

/// Execute `expd login`.
pub async fn run_login(ctx: &AppContext, args: &LoginArgs) -> Result<u8> {
    let Some(password) = args.password.as_deref() else {
        bail!("password required (--password or EXPD_PASSWORD)");
    };
    let credentials = Credentials::new(args.email.as_str(), password)?;

    let user = ctx
        .session
        .login(&credentials)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .context("sign-in failed")?;
    println!("Signed in as {} <{}>", user.name, user.email);

    if let Some(next) = args.redirect.as_deref().and_then(return_path) {
        println!("Continue at {next}");
    }
    Ok(0)
}

/// Execute `expd logout`.
pub async fn run_logout(ctx: &AppContext) -> Result<u8> {
    ctx.session.logout().await?;
    ctx.stores.reset_all();
    println!("Signed out.");
    Ok(0)
}

/// Execute `expd whoami`.
pub async fn run_whoami(ctx: &AppContext) -> Result<u8> {
    match ctx.session.initialize().await {
        AuthPhase::Authenticated => match ctx.session.user() {
            Some(user) => {
                print_user(&user);
                Ok(0)
            }
            None => {
                println!("Not signed in.");
                Ok(EXIT_SIGN_IN)
            }
        },
        _ => {
            println!("Not signed in.");
            Ok(EXIT_SIGN_IN)
        }
    }
}

pub(crate) fn print_user(user: &User) {
    println!("{} <{}>", user.name, user.email);
    if let Some(role) = &user.role {
        println!("  role:        {}", role.code());
    }
    if let Some(entity) = &user.entity {
        println!("  entity:      {}", entity.name);
    }
    if !user.permissions.is_empty() {
        println!("  permissions: {}", user.permissions.join(", "));
    }
}
