//! # expd CLI entry point
//!
//! Parses command-line arguments, sets up logging and dispatches to the
//! subcommand handlers in the `expd_cli` library.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use expd_cli::auth::{run_login, run_logout, run_whoami, LoginArgs};
use expd_cli::navigate::{run_open, OpenArgs};
use expd_cli::resource::{run_resource, ResourceArgs};
use expd_cli::stats::{run_stats, StatsArgs};
use expd_cli::watch::{run_watch, WatchArgs};
use expd_cli::AppContext;

/// ExpertDesk back office from the command line.
///
/// Configuration comes from `EXPD_*` environment variables; the session
/// token is kept in `$EXPD_STATE_DIR/session.json` (default `~/.expd`).
#[derive(Parser, Debug)]
#[command(name = "expd", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and keep the token for later commands.
    Login(LoginArgs),
    /// Sign out and forget the token.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Resolve a back-office path through its guards.
    Open(OpenArgs),
    /// Dashboard statistics.
    Stats(StatsArgs),
    /// Keep the profile fresh and report changes until Ctrl-C.
    Watch(WatchArgs),

    /// Expertise assignments.
    Assignments(ResourceArgs),
    /// Vehicles.
    Vehicles(ResourceArgs),
    /// Vehicle states reference table.
    VehicleStates(ResourceArgs),
    /// Vehicle brands reference table.
    VehicleBrands(ResourceArgs),
    /// Vehicle models reference table.
    VehicleModels(ResourceArgs),
    /// Insurers.
    Insurers(ResourceArgs),
    /// Repairers.
    Repairers(ResourceArgs),
    /// Clients (vehicle owners).
    Clients(ResourceArgs),
    /// Invoices.
    Invoices(ResourceArgs),
    /// Payments.
    Payments(ResourceArgs),
    /// Back-office users.
    Users(ResourceArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!("expd CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let ctx = match AppContext::from_env() {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            return ExitCode::from(1);
        }
    };

    let stores = &ctx.stores;
    let result = match &cli.command {
        Commands::Login(args) => run_login(&ctx, args).await,
        Commands::Logout => run_logout(&ctx).await,
        Commands::Whoami => run_whoami(&ctx).await,
        Commands::Open(args) => run_open(&ctx, args).await,
        Commands::Stats(args) => run_stats(&ctx, args).await,
        Commands::Watch(args) => run_watch(&ctx, args).await,
        Commands::Assignments(args) => run_resource(&ctx, &stores.assignments, args).await,
        Commands::Vehicles(args) => run_resource(&ctx, &stores.vehicles, args).await,
        Commands::VehicleStates(args) => run_resource(&ctx, &stores.vehicle_states, args).await,
        Commands::VehicleBrands(args) => run_resource(&ctx, &stores.vehicle_brands, args).await,
        Commands::VehicleModels(args) => run_resource(&ctx, &stores.vehicle_models, args).await,
        Commands::Insurers(args) => run_resource(&ctx, &stores.insurers, args).await,
        Commands::Repairers(args) => run_resource(&ctx, &stores.repairers, args).await,
        Commands::Clients(args) => run_resource(&ctx, &stores.clients, args).await,
        Commands::Invoices(args) => run_resource(&ctx, &stores.invoices, args).await,
        Commands::Payments(args) => run_resource(&ctx, &stores.payments, args).await,
        Commands::Users(args) => run_resource(&ctx, &stores.users, args).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::debug!("{e:?}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Verbosity maps to a default filter; `RUST_LOG` overrides it. Logs go to
/// stderr so command output stays pipeable.
fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
