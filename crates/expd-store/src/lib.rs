//! # expd-store -- Client-Side Resource State
//!
//! One [`ResourceStore`] per back-office resource holds the last fetched
//! page, the selected record, the active filters and `loading`/`error`
//! flags. Every mutation goes to the server first; local state changes only
//! once the server has answered. Outcomes are reported to the operator
//! through a [`Notifier`].
//!
//! Stores are handles built from an explicit [`Stores`] registry. Nothing
//! here is process-global.

pub mod notify;
pub mod registry;
pub mod store;

pub use notify::{Notifier, Toast, ToastLevel, ToastQueue, TracingNotifier};
pub use registry::Stores;
pub use store::{ResourceState, ResourceStore};
