//! DOM and Web API utility functions.
//!
//! Provides safe, consistent access to browser APIs with proper error handling.

use web_sys::{History, Storage, Window};

use crate::config::{RATE_LIMITED_HISTORY_AGENTS, UNLIMITED_HISTORY_AGENTS};

/// Get the browser window object.
#[inline]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Get sessionStorage.
#[inline]
pub fn session_storage() -> Option<Storage> {
    window()?.session_storage().ok()?
}

/// Get the session history object.
#[inline]
pub fn history() -> Option<History> {
    window()?.history().ok()
}

// =============================================================================
// Browser Navigation
// =============================================================================

/// Current location as `pathname?query`, without origin and fragment.
pub fn current_location() -> String {
    let Some(window) = window() else {
        return "/".to_string();
    };
    let location = window.location();
    let pathname = location.pathname().unwrap_or_else(|_| "/".to_string());
    let search = location.search().unwrap_or_default();
    format!("{}{}", pathname, search)
}

/// Whether the browser throttles history writes.
///
/// Detected by user agent: Safari limits `pushState`/`replaceState` calls
/// per time window, Chromium-based browsers that also advertise "Safari" do
/// not.
pub fn is_history_rate_limited() -> bool {
    let Some(agent) = window().and_then(|w| w.navigator().user_agent().ok()) else {
        return false;
    };
    is_rate_limited_agent(&agent)
}

fn is_rate_limited_agent(agent: &str) -> bool {
    RATE_LIMITED_HISTORY_AGENTS.iter().any(|a| agent.contains(a))
        && !UNLIMITED_HISTORY_AGENTS.iter().any(|a| agent.contains(a))
}

/// Scroll the window back to the top.
pub fn scroll_to_top() {
    if let Some(window) = window() {
        window.scroll_to_with_x_and_y(0.0, 0.0);
    }
}

/// Set the document title.
pub fn set_title(title: &str) {
    if let Some(document) = window().and_then(|w| w.document()) {
        document.set_title(title);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safari_is_rate_limited() {
        let agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 \
                     (KHTML, like Gecko) Version/17.4 Safari/605.1.15";
        assert!(is_rate_limited_agent(agent));
    }

    #[test]
    fn test_chrome_is_not_rate_limited() {
        let agent = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                     (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";
        assert!(!is_rate_limited_agent(agent));
    }

    #[test]
    fn test_firefox_is_not_rate_limited() {
        let agent = "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0";
        assert!(!is_rate_limited_agent(agent));
    }
}
