//! Navigation configuration.
//!
//! Centralizes the constants that shape history synchronization. The
//! controller reads them through [`NavigationConfig`] so hosts and tests can
//! override individual values.

// =============================================================================
// Location Limits
// =============================================================================

/// Longest location written to the address bar.
///
/// Some browsers refuse to store longer URLs in session history.
pub const MAX_URL_LENGTH: usize = 1887;

/// Query string written in place of an overlong query (`?T`).
pub const TRUNCATED_QUERY: &str = "T";

// =============================================================================
// History Timers
// =============================================================================

/// Save-state interval in milliseconds.
pub const SAVE_INTERVAL_MS: u32 = 500;

/// Save-state interval on browsers that rate-limit `history.replaceState`.
pub const SAVE_INTERVAL_RATE_LIMITED_MS: u32 = 2000;

/// Debounce window before retrying a rejected history write.
pub const NAVIGATE_RETRY_MS: u32 = 400;

// =============================================================================
// Render Error Recovery
// =============================================================================

/// Automatic reloads allowed before the user has to reload manually.
pub const MAX_AUTO_RELOADS: u32 = 2;

/// Lifetime of the reload counter in milliseconds.
pub const RELOAD_COUNTER_WINDOW_MS: f64 = 60_000.0;

/// sessionStorage key of the reload counter.
pub const RELOAD_COUNTER_KEY: &str = "navigation.auto_reloads";

// =============================================================================
// Dirty Guard
// =============================================================================

/// Prompt shown when leaving a page with unsaved changes.
pub const DIRTY_CONFIRM_MESSAGE: &str =
    "This page has unsaved changes. Are you sure you want to leave it?";

/// Runtime navigation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationConfig {
    pub max_url_length: usize,
    pub save_interval_ms: u32,
    pub save_interval_rate_limited_ms: u32,
    pub retry_debounce_ms: u32,
    pub max_auto_reloads: u32,
    pub reload_window_ms: f64,
    pub reload_counter_key: String,
    pub dirty_message: String,
}

impl NavigationConfig {
    /// Save-state interval for the current browser.
    pub fn save_interval(&self, rate_limited: bool) -> u32 {
        if rate_limited {
            self.save_interval_rate_limited_ms
        } else {
            self.save_interval_ms
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            max_url_length: MAX_URL_LENGTH,
            save_interval_ms: SAVE_INTERVAL_MS,
            save_interval_rate_limited_ms: SAVE_INTERVAL_RATE_LIMITED_MS,
            retry_debounce_ms: NAVIGATE_RETRY_MS,
            max_auto_reloads: MAX_AUTO_RELOADS,
            reload_window_ms: RELOAD_COUNTER_WINDOW_MS,
            reload_counter_key: RELOAD_COUNTER_KEY.to_string(),
            dirty_message: DIRTY_CONFIRM_MESSAGE.to_string(),
        }
    }
}
