//! # expd-session -- Session Lifecycle for ExpertDesk
//!
//! Decides, for every screen or command, whether protected content may be
//! shown, a loading placeholder is due, or the operator must sign in.
//!
//! ## Components
//!
//! - [`session`]: the auth state machine
//!   (`Unknown → Checking → Authenticated | Unauthenticated`), login,
//!   logout, and single-attempt user fetches.
//! - [`guard`]: the three guard variants that turn a session phase into a
//!   render/loading/redirect decision.
//! - [`routes`]: the back-office route table with layout guards and the
//!   sign-in redirect/return-path helpers.
//! - [`refresh`]: the cancellable task re-fetching the user profile on a
//!   fixed interval.
//!
//! ## State Ownership
//!
//! A [`Session`] is an explicit, cloneable handle passed to whoever needs
//! it. There is no process-wide session singleton.

pub mod error;
pub mod guard;
pub mod refresh;
pub mod routes;
pub mod session;

pub use error::SessionError;
pub use guard::{Guard, GuardOutcome, GuardVariant, DEFAULT_LOADER};
pub use refresh::{RefreshConfig, RefreshHandle, RefreshTarget, UserRefresher, Visibility};
pub use routes::{
    return_path, sign_in_redirect, Navigation, ResolvedRoute, RouteAccess, RouteTable, SIGN_IN_PATH,
};
pub use session::{AuthPhase, Session};
