//! Browser implementation of the navigation [`Platform`].
//!
//! - history entries carry the [`HistoryState`] payload as a plain JS object
//! - timers are gloo [`Interval`]/[`Timeout`] handles; dropping one cancels it
//! - timer callbacks reach the controller through a [`TimerSlot`] that is
//!   filled once the controller is stored

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crm_core::{HistoryError, HistoryState, NavigationState, Platform, TimerKind};
use gloo_timers::callback::{Interval, Timeout};
use serde::Serialize;
use wasm_bindgen::JsValue;

use crate::config::APP_NAME;
use crate::utils::{cache, dom};

/// Receiver for fired timers.
pub type TimerDispatch = Box<dyn Fn(TimerKind)>;

/// Late-bound [`TimerDispatch`], shared with every scheduled callback.
#[derive(Clone, Default)]
pub struct TimerSlot(Rc<RefCell<Option<TimerDispatch>>>);

impl TimerSlot {
    pub fn set(&self, dispatch: impl Fn(TimerKind) + 'static) {
        *self.0.borrow_mut() = Some(Box::new(dispatch));
    }

    fn fire(&self, timer: TimerKind) {
        if let Some(dispatch) = self.0.borrow().as_ref() {
            dispatch(timer);
        }
    }
}

#[allow(dead_code)]
enum TimerHandle {
    Interval(Interval),
    Timeout(Timeout),
}

pub struct WebPlatform {
    timers: HashMap<TimerKind, TimerHandle>,
    slot: TimerSlot,
    rate_limited: bool,
}

impl WebPlatform {
    pub fn new() -> Self {
        Self {
            timers: HashMap::new(),
            slot: TimerSlot::default(),
            rate_limited: dom::is_history_rate_limited(),
        }
    }

    /// Slot to fill with the controller's timer handler.
    pub fn timer_slot(&self) -> TimerSlot {
        self.slot.clone()
    }
}

impl Default for WebPlatform {
    fn default() -> Self {
        Self::new()
    }
}

/// Read the navigation payload of a history entry.
///
/// Entries written by other code or by an older schema yield `None`.
pub fn decode_history_state(value: JsValue) -> Option<HistoryState> {
    if value.is_null() || value.is_undefined() {
        return None;
    }
    serde_wasm_bindgen::from_value::<HistoryState>(value)
        .ok()
        .filter(HistoryState::is_current)
}

fn encode_history_state(state: &HistoryState) -> Result<JsValue, HistoryError> {
    // Maps must become plain objects to read back through `from_value`.
    state
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| HistoryError::Encode(e.to_string()))
}

fn js_error(err: JsValue) -> HistoryError {
    HistoryError::WriteRejected(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

impl Platform for WebPlatform {
    fn location(&self) -> String {
        dom::current_location()
    }

    fn history_state(&self) -> Option<HistoryState> {
        decode_history_state(dom::history()?.state().ok()?)
    }

    fn push_state(&mut self, state: &HistoryState, url: &str) -> Result<(), HistoryError> {
        let history = dom::history().ok_or(HistoryError::NoWindow)?;
        let value = encode_history_state(state)?;
        history
            .push_state_with_url(&value, "", Some(url))
            .map_err(js_error)
    }

    fn replace_state(&mut self, state: &HistoryState, url: &str) -> Result<(), HistoryError> {
        let history = dom::history().ok_or(HistoryError::NoWindow)?;
        let value = encode_history_state(state)?;
        history
            .replace_state_with_url(&value, "", Some(url))
            .map_err(js_error)
    }

    fn go(&mut self, delta: i64) {
        let Some(history) = dom::history() else {
            return;
        };
        let delta = delta.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        if let Err(e) = history.go_with_delta(delta) {
            log::warn!("history.go({}) failed: {:?}", delta, e);
        }
    }

    fn confirm(&mut self, message: &str) -> bool {
        dom::window()
            .and_then(|w| w.confirm_with_message(message).ok())
            .unwrap_or(true)
    }

    fn set_timer(&mut self, timer: TimerKind, delay_ms: u32) {
        self.clear_timer(timer);
        let slot = self.slot.clone();
        let handle = if timer.repeats() {
            TimerHandle::Interval(Interval::new(delay_ms, move || slot.fire(timer)))
        } else {
            TimerHandle::Timeout(Timeout::new(delay_ms, move || slot.fire(timer)))
        };
        self.timers.insert(timer, handle);
    }

    fn clear_timer(&mut self, timer: TimerKind) {
        // Dropping the handle cancels it.
        self.timers.remove(&timer);
    }

    fn reload(&mut self) {
        if let Some(window) = dom::window()
            && let Err(e) = window.location().reload()
        {
            log::error!("Reload failed: {:?}", e);
        }
    }

    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    fn session_get(&self, key: &str) -> Option<String> {
        cache::get_raw(key)
    }

    fn session_set(&mut self, key: &str, value: &str) {
        if !cache::set_raw(key, value) {
            log::warn!("Could not write session entry {}", key);
        }
    }

    fn is_history_rate_limited(&self) -> bool {
        self.rate_limited
    }

    fn page_changed(&mut self, state: &NavigationState) {
        log::debug!("Page changed: {}", state.full_location());
        let title = state
            .top()
            .meta
            .title
            .as_deref()
            .map(|title| format!("{} - {}", title, APP_NAME))
            .unwrap_or_else(|| APP_NAME.to_string());
        dom::set_title(&title);
        dom::scroll_to_top();
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use crm_core::PersistedItem;
    use wasm_bindgen_test::*;

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_payload_survives_history_entry() {
        let mut platform = WebPlatform::new();
        let state = HistoryState::new(
            3,
            vec![PersistedItem {
                view_path: "/votes".to_string(),
                data: Some(serde_json::json!({ "tab": "results", "expanded": true })),
                query: "sort=desc".to_string(),
            }],
            "/votes?sort=desc",
        );

        platform.replace_state(&state, "/votes?sort=desc").unwrap();

        assert_eq!(platform.location(), "/votes?sort=desc");
        assert_eq!(platform.history_state(), Some(state));
    }

    #[wasm_bindgen_test]
    fn test_foreign_payload_is_ignored() {
        let foreign = JsValue::from_str("not ours");
        assert_eq!(decode_history_state(foreign), None);
        assert_eq!(decode_history_state(JsValue::NULL), None);
    }
}
