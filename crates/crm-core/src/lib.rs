//! Navigation core for the membership administration client.
//!
//! This crate owns everything about client-side navigation that does not touch
//! a browser API:
//!
//! - [`parse_tree_url`] - maps a URL onto an ordered view stack using a [`RouteTree`]
//! - [`NavigationState`] - the current stack plus derived location strings
//! - [`NavigationController`] - history synchronization, dirty-page guard,
//!   write-retry debouncing and render-error recovery, driven through a
//!   [`Platform`] implementation
//!
//! The browser application supplies the [`Platform`] and renders one page per
//! [`NavigationStackItem`].

pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod location;
mod matcher;
pub mod permissions;
pub mod route;
mod stack;
mod state;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::NavigationConfig;
pub use controller::{
    NavOutcome, NavRequest, NavigationController, Phase, Platform, RecoveryAction, StateHandle,
    TimerKind,
};
pub use error::{HistoryError, RouteError};
pub use history::{HistoryState, PersistedItem};
pub use matcher::{ParsedUrl, parse_tree_url};
pub use permissions::{PermissionSet, Permissions};
pub use route::{Route, RouteKind, RoutePattern, RouteTree};
pub use stack::{Matches, NavigationStackItem, PageAction, PageMeta, StackView, UrlState};
pub use state::NavigationState;
