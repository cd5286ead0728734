//! In-memory [`Platform`] for tests.
//!
//! Models session history as a list of entries with a cursor. Writes can be
//! made to fail, confirmation answers are queued, and timers are recorded
//! instead of run: tests fire them with [`MockPlatform::fire`] and hand the
//! kind to [`NavigationController::on_timer`](crate::NavigationController::on_timer).

use std::collections::{HashMap, VecDeque};

use crate::controller::{Platform, TimerKind};
use crate::error::HistoryError;
use crate::history::HistoryState;
use crate::state::NavigationState;

/// One successful history write.
#[derive(Debug, Clone, PartialEq)]
pub struct MockWrite {
    pub url: String,
    pub state: HistoryState,
    pub pushed: bool,
}

#[derive(Debug, Clone)]
pub struct MockPlatform {
    entries: Vec<(String, Option<HistoryState>)>,
    cursor: usize,
    writes: Vec<MockWrite>,
    failing_writes: u32,
    confirm_answers: VecDeque<bool>,
    timers: HashMap<TimerKind, u32>,
    go_calls: Vec<i64>,
    reloads: u32,
    session: HashMap<String, String>,
    now_ms: f64,
    rate_limited: bool,
    page_changes: u32,
}

impl MockPlatform {
    /// A fresh session showing `url` without a history payload.
    pub fn new(url: &str) -> Self {
        Self {
            entries: vec![(url.to_string(), None)],
            cursor: 0,
            writes: Vec::new(),
            failing_writes: 0,
            confirm_answers: VecDeque::new(),
            timers: HashMap::new(),
            go_calls: Vec::new(),
            reloads: 0,
            session: HashMap::new(),
            now_ms: 1_000_000.0,
            rate_limited: false,
            page_changes: 0,
        }
    }

    /// Attach a payload to the current entry, as after a reload.
    pub fn with_history_state(mut self, state: HistoryState) -> Self {
        self.entries[self.cursor].1 = Some(state);
        self
    }

    pub fn with_rate_limit(mut self) -> Self {
        self.rate_limited = true;
        self
    }

    /// Make the next `count` history writes throw.
    pub fn fail_next_writes(&mut self, count: u32) {
        self.failing_writes = count;
    }

    /// Queue the answer to the next confirmation prompt. Unqueued prompts
    /// are accepted.
    pub fn answer_confirm(&mut self, answer: bool) {
        self.confirm_answers.push_back(answer);
    }

    pub fn advance(&mut self, ms: f64) {
        self.now_ms += ms;
    }

    /// Delay of the armed `timer`, if any.
    pub fn timer(&self, timer: TimerKind) -> Option<u32> {
        self.timers.get(&timer).copied()
    }

    /// Fire `timer` if armed. One-shot timers disarm.
    pub fn fire(&mut self, timer: TimerKind) -> bool {
        if !self.timers.contains_key(&timer) {
            return false;
        }
        if !timer.repeats() {
            self.timers.remove(&timer);
        }
        true
    }

    /// Move through history like the browser's back/forward buttons and
    /// return what the popstate event would carry.
    pub fn traverse(&mut self, delta: i64) -> Option<(String, Option<HistoryState>)> {
        let target = self.cursor as i64 + delta;
        if target < 0 || target as usize >= self.entries.len() {
            return None;
        }
        self.cursor = target as usize;
        Some(self.entries[self.cursor].clone())
    }

    pub fn writes(&self) -> &[MockWrite] {
        &self.writes
    }

    pub fn go_calls(&self) -> &[i64] {
        &self.go_calls
    }

    pub fn reloads(&self) -> u32 {
        self.reloads
    }

    pub fn page_changes(&self) -> u32 {
        self.page_changes
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn current_entry(&self) -> Option<&HistoryState> {
        self.entries[self.cursor].1.as_ref()
    }

    fn check_write(&mut self) -> Result<(), HistoryError> {
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err(HistoryError::WriteRejected(
                "SecurityError: attempt to use history.pushState() more than 100 times"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

impl Platform for MockPlatform {
    fn location(&self) -> String {
        self.entries[self.cursor].0.clone()
    }

    fn history_state(&self) -> Option<HistoryState> {
        self.current_entry().cloned()
    }

    fn push_state(&mut self, state: &HistoryState, url: &str) -> Result<(), HistoryError> {
        self.check_write()?;
        self.entries.truncate(self.cursor + 1);
        self.entries.push((url.to_string(), Some(state.clone())));
        self.cursor += 1;
        self.writes.push(MockWrite {
            url: url.to_string(),
            state: state.clone(),
            pushed: true,
        });
        Ok(())
    }

    fn replace_state(&mut self, state: &HistoryState, url: &str) -> Result<(), HistoryError> {
        self.check_write()?;
        self.entries[self.cursor] = (url.to_string(), Some(state.clone()));
        self.writes.push(MockWrite {
            url: url.to_string(),
            state: state.clone(),
            pushed: false,
        });
        Ok(())
    }

    fn go(&mut self, delta: i64) {
        self.go_calls.push(delta);
        let target = (self.cursor as i64 + delta).clamp(0, self.entries.len() as i64 - 1);
        self.cursor = target as usize;
    }

    fn confirm(&mut self, _message: &str) -> bool {
        self.confirm_answers.pop_front().unwrap_or(true)
    }

    fn set_timer(&mut self, timer: TimerKind, delay_ms: u32) {
        self.timers.insert(timer, delay_ms);
    }

    fn clear_timer(&mut self, timer: TimerKind) {
        self.timers.remove(&timer);
    }

    fn reload(&mut self) {
        self.reloads += 1;
    }

    fn now_ms(&self) -> f64 {
        self.now_ms
    }

    fn session_get(&self, key: &str) -> Option<String> {
        self.session.get(key).cloned()
    }

    fn session_set(&mut self, key: &str, value: &str) {
        self.session.insert(key.to_string(), value.to_string());
    }

    fn is_history_rate_limited(&self) -> bool {
        self.rate_limited
    }

    fn page_changed(&mut self, _state: &NavigationState) {
        self.page_changes += 1;
    }
}
