//! # expd-cli -- Command-Line Back Office for ExpertDesk
//!
//! Provides the `expd` binary: the back-office screens as commands, behind
//! the same session, guards and stores the library crates implement.
//!
//! ## Subcommands
//!
//! - `expd login` / `expd logout` / `expd whoami`: session lifecycle.
//! - `expd open <path>`: resolve a back-office route through its guards.
//! - `expd <resource> list|get|create|update|delete|action`: CRUD on one
//!   resource, behind a strict guard.
//! - `expd stats`: dashboard statistics.
//! - `expd watch`: keep the profile fresh and report changes until Ctrl-C.
//!
//! ## Exit Codes
//!
//! `0` success, `1` error, `2` sign-in required.

pub mod auth;
pub mod context;
pub mod navigate;
pub mod resource;
pub mod stats;
pub mod watch;

pub use context::AppContext;

/// Exit code when the operator must sign in first.
pub const EXIT_SIGN_IN: u8 = 2;
