//! Typed sessionStorage access.
//!
//! Values are stored as JSON for the current browser session. The login flow
//! leaves the permission set here; the navigation controller keeps its reload
//! counter through [`get_raw`]/[`set_raw`].

use serde::de::DeserializeOwned;

use super::dom;

/// Get cached data from sessionStorage.
///
/// Returns `None` if the key doesn't exist or deserialization fails.
pub fn get<T: DeserializeOwned>(key: &str) -> Option<T> {
    let json = get_raw(key)?;
    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring malformed session entry {}: {}", key, e);
            None
        }
    }
}

/// Get the raw string stored under `key`.
pub fn get_raw(key: &str) -> Option<String> {
    dom::session_storage()?.get_item(key).ok()?
}

/// Store a raw string. Returns `false` if storage is unavailable or full.
pub fn set_raw(key: &str, value: &str) -> bool {
    dom::session_storage().is_some_and(|storage| storage.set_item(key, value).is_ok())
}
