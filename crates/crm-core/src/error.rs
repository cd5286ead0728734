//! Error types for the navigation core.
//!
//! Only conditions that callers have to handle are errors. A URL that matches
//! no route or a route the user may not see is ordinary control flow and
//! produces a placeholder stack item instead.
//!
//! - [`RouteError`] - route tree construction failures
//! - [`HistoryError`] - failed writes to the platform's session history

use thiserror::Error;

/// Route tree construction errors.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A regular-expression route path does not compile.
    #[error("invalid route pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Session history errors.
///
/// Browsers throw from `pushState`/`replaceState` when they are called too
/// often or when the state payload exceeds the storage quota.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Browser window not available
    #[error("browser window not available")]
    NoWindow,
    /// The history API threw
    #[error("history write rejected: {0}")]
    WriteRejected(String),
    /// The payload could not be converted for storage
    #[error("failed to encode history state: {0}")]
    Encode(String),
}
