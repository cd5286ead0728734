//! Errors raised by pages while rendering.
//!
//! A page returns `Err(PageError)` from its view; the error boundary around
//! each stack level turns it into a render failure for the navigation
//! controller.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    /// The route names a component that is not registered.
    #[error("no page registered for component '{0}'")]
    UnknownComponent(String),

    /// A URL capture the page depends on is missing or malformed.
    #[error("invalid parameter '{name}': {value:?}")]
    InvalidParam { name: String, value: String },

    /// Stored page data could not be read back.
    #[error("corrupt page data: {0}")]
    CorruptData(String),
}
