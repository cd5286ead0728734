//! Browser utilities.
//!
//! - [`dom`] - window, history and storage accessors
//! - [`cache`] - typed sessionStorage access

pub mod cache;
pub mod dom;
