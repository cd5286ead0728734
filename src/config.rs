//! Application configuration.
//!
//! Centralizes the constants of the admin shell. Navigation tuning lives in
//! [`crm_core::NavigationConfig`]; this module only holds what the browser
//! layer needs on top of it.

use crm_core::NavigationConfig;

// =============================================================================
// Application Metadata
// =============================================================================

/// Application name shown in the app bar when no page reports a title.
pub const APP_NAME: &str = "CRM Admin";

/// Id of the element the app is mounted into.
pub const MOUNT_ELEMENT_ID: &str = "app";

// =============================================================================
// Session Storage Keys
// =============================================================================

/// Permission set written by the login flow.
pub const PERMISSIONS_KEY: &str = "crm.permissions";

// =============================================================================
// Browser Quirks
// =============================================================================

/// User-agent fragments of browsers that throttle `history.pushState` and
/// `history.replaceState` and throw once the budget is exceeded.
pub const RATE_LIMITED_HISTORY_AGENTS: &[&str] = &["Safari"];

/// User-agent fragments that also contain "Safari" but are not affected.
pub const UNLIMITED_HISTORY_AGENTS: &[&str] = &["Chrome", "Chromium", "Android"];

/// Navigation settings for the browser.
pub fn navigation_config() -> NavigationConfig {
    NavigationConfig::default()
}
