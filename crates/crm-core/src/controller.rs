//! Navigation controller.
//!
//! Owns one [`NavigationState`] and keeps it in sync with the platform's
//! session history. All browser interaction goes through an injected
//! [`Platform`], so the controller itself is a plain single-threaded state
//! machine:
//!
//! ```text
//! Idle ──request──▶ Navigating ──▶ Idle
//!   │                              ▲
//!   └──render error──▶ Error ──reload──┘
//! ```
//!
//! # History writes
//!
//! - Navigations are written with `pushState`; query edits and navigations to
//!   the current location with `replaceState`.
//! - Changes that need no new entry (page data, frozen queries of lower
//!   levels) only mark the state dirty. A save timer flushes dirty state with
//!   `replaceState`, slower on browsers that rate-limit it.
//! - A rejected write is retried after a debounce window. Requests arriving
//!   during the window replace the pending write, so only the most recent
//!   destination is ever written.

use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::NavigationConfig;
use crate::error::HistoryError;
use crate::history::HistoryState;
use crate::matcher::parse_tree_url;
use crate::permissions::Permissions;
use crate::route::RouteTree;
use crate::stack::PageMeta;
use crate::state::NavigationState;

// ============================================================================
// Platform
// ============================================================================

/// Timers the controller schedules through the platform.
///
/// At most one timer of each kind is armed at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Repeating; flushes dirty state with `replaceState`.
    SaveState,
    /// One-shot; retries a rejected history write.
    NavigateRetry,
}

impl TimerKind {
    pub fn repeats(self) -> bool {
        matches!(self, Self::SaveState)
    }
}

/// Browser primitives used by the controller.
pub trait Platform {
    /// The current location (`pathname[?query]` or an absolute URL).
    fn location(&self) -> String;

    /// The payload of the current history entry, if it is a current-schema payload.
    fn history_state(&self) -> Option<HistoryState>;

    fn push_state(&mut self, state: &HistoryState, url: &str) -> Result<(), HistoryError>;

    fn replace_state(&mut self, state: &HistoryState, url: &str) -> Result<(), HistoryError>;

    /// Move `delta` entries through session history. Fires a popstate later.
    fn go(&mut self, delta: i64);

    /// Blocking yes/no prompt.
    fn confirm(&mut self, message: &str) -> bool;

    /// Arm `timer`, replacing an armed timer of the same kind.
    /// [`TimerKind::repeats`] timers fire every `delay_ms`.
    fn set_timer(&mut self, timer: TimerKind, delay_ms: u32);

    fn clear_timer(&mut self, timer: TimerKind);

    /// Full page reload.
    fn reload(&mut self);

    /// Milliseconds since the epoch.
    fn now_ms(&self) -> f64;

    fn session_get(&self, key: &str) -> Option<String>;

    fn session_set(&mut self, key: &str, value: &str);

    /// Whether this browser throttles `replaceState` aggressively.
    fn is_history_rate_limited(&self) -> bool {
        false
    }

    /// Called after a navigation changed the displayed page.
    fn page_changed(&mut self, _state: &NavigationState) {}
}

// ============================================================================
// Requests and outcomes
// ============================================================================

/// A page-initiated or programmatic navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavRequest {
    /// Navigate to `href`. Out-of-tree targets are appended on top of the
    /// current stack.
    Navigate {
        href: String,
        replace: bool,
        out_of_tree: bool,
    },
    /// Push `segment` on top of the level at `index`.
    Push {
        index: usize,
        segment: String,
        replace: bool,
    },
    /// Close the level at `index` and everything above it.
    Pop { index: usize, replace: bool },
    /// Leave state `key` of the level at `index`.
    PopState {
        index: usize,
        key: String,
        replace: bool,
    },
}

impl NavRequest {
    pub fn navigate(href: impl Into<String>) -> Self {
        Self::Navigate {
            href: href.into(),
            replace: false,
            out_of_tree: false,
        }
    }

    pub fn replace(&self) -> bool {
        match self {
            Self::Navigate { replace, .. }
            | Self::Push { replace, .. }
            | Self::Pop { replace, .. }
            | Self::PopState { replace, .. } => *replace,
        }
    }
}

/// What became of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// The new state is shown and written to history.
    Committed { pushed: bool },
    /// Stored without touching the URL; flushed by the next save.
    Stored,
    /// Waiting for a history-write retry or for the running transition.
    Deferred,
    /// The user kept the dirty page.
    Canceled,
    /// Nothing to do.
    Ignored,
}

/// Handle to one active state-kind segment of a level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateHandle {
    pub index: usize,
    pub key: String,
}

impl StateHandle {
    /// The request leaving this state.
    pub fn pop(&self, replace: bool) -> NavRequest {
        NavRequest::PopState {
            index: self.index,
            key: self.key.clone(),
            replace,
        }
    }
}

/// Recovery chosen after a page failed to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// A full reload was started.
    AutoReload,
    /// The reload budget is spent; the user has to reload.
    ManualReload,
}

/// Controller lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Navigating,
    Error {
        message: String,
        action: RecoveryAction,
    },
}

/// Automatic reloads done recently, kept in sessionStorage across reloads.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct ReloadCounter {
    count: u32,
    last_ms: f64,
}

struct PendingWrite {
    state: NavigationState,
    replace: bool,
}

// ============================================================================
// Controller
// ============================================================================

pub struct NavigationController<P: Platform> {
    platform: P,
    routes: Arc<RouteTree>,
    perms: Arc<dyn Permissions>,
    config: NavigationConfig,
    state: NavigationState,
    phase: Phase,
    /// Index of the current history entry.
    history_index: u64,
    /// `state` differs from the payload stored in history.
    state_dirty: bool,
    /// The top page has unsaved edits.
    page_dirty: bool,
    /// Swallow the popstate caused by undoing a cancelled back/forward step.
    suppress_next_pop: bool,
    pending_write: Option<PendingWrite>,
    deferred: Option<NavRequest>,
    revision: u64,
}

impl<P: Platform> NavigationController<P> {
    /// Read the state from the current URL and history entry and start the
    /// save timer.
    pub fn mount(
        mut platform: P,
        routes: Arc<RouteTree>,
        perms: Arc<dyn Permissions>,
        config: NavigationConfig,
    ) -> Self {
        let url = platform.location();
        let persisted = platform.history_state();
        let history_index = persisted.as_ref().map_or(0, |s| s.index);

        let mut state = NavigationState::new(&url, persisted.as_ref(), &routes, perms.as_ref());
        state.set_max_url_length(config.max_url_length);

        let interval = config.save_interval(platform.is_history_rate_limited());
        platform.clear_timer(TimerKind::SaveState);
        platform.set_timer(TimerKind::SaveState, interval);
        info!("navigation mounted at {} (save every {}ms)", state.full_location(), interval);

        let mut controller = Self {
            platform,
            routes,
            perms,
            config,
            state,
            phase: Phase::Idle,
            history_index,
            state_dirty: true,
            page_dirty: false,
            suppress_next_pop: false,
            pending_write: None,
            deferred: None,
            revision: 0,
        };
        controller.flush_save();
        controller
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Run a navigation request.
    ///
    /// A dirty page asks for confirmation first. Requests issued while
    /// another transition is running are deferred; only the last one runs.
    pub fn request(&mut self, request: NavRequest) -> NavOutcome {
        match self.phase {
            Phase::Navigating => {
                debug!("deferring {:?} until the running transition ends", request);
                self.deferred = Some(request);
                return NavOutcome::Deferred;
            }
            Phase::Error { .. } => {
                debug!("ignoring {:?}: navigation is in the error state", request);
                return NavOutcome::Ignored;
            }
            Phase::Idle => {}
        }

        let Some(next) = self.next_state(&request) else {
            debug!("ignoring {:?}: no such level or state", request);
            return NavOutcome::Ignored;
        };
        if !self.confirm_leave() {
            return NavOutcome::Canceled;
        }

        self.phase = Phase::Navigating;
        self.flush_save();
        let outcome = self.write(next, request.replace());
        self.phase = Phase::Idle;

        match self.deferred.take() {
            Some(deferred) => self.request(deferred),
            None => outcome,
        }
    }

    /// Shorthand for [`NavRequest::Navigate`].
    pub fn navigate(&mut self, href: &str, replace: bool, out_of_tree: bool) -> NavOutcome {
        self.request(NavRequest::Navigate {
            href: href.to_string(),
            replace,
            out_of_tree,
        })
    }

    /// Compute the state a request leads to, without committing it.
    fn next_state(&self, request: &NavRequest) -> Option<NavigationState> {
        let routes = self.routes.as_ref();
        let perms = self.perms.as_ref();
        let mut next = self.state.clone();

        match request {
            NavRequest::Navigate {
                href,
                out_of_tree: true,
                ..
            } => next.push_out_of_tree(href, routes, perms),
            NavRequest::Navigate { href, .. } => next.navigate(href, None, routes, perms),
            NavRequest::Push { index, segment, .. } => {
                let href = next.href_for_push(*index, segment)?;
                next.navigate(&href, None, routes, perms);
            }
            NavRequest::Pop { index, .. } => {
                if !next.pop_level(*index, routes, perms) {
                    return None;
                }
            }
            NavRequest::PopState { index, key, .. } => {
                if !next.pop_state(*index, key) {
                    return None;
                }
            }
        }
        Some(next)
    }

    /// Browser back/forward.
    ///
    /// `persisted` is the payload of the entry the browser moved to.
    pub fn on_pop_state(&mut self, url: &str, persisted: Option<HistoryState>) -> NavOutcome {
        if self.suppress_next_pop {
            self.suppress_next_pop = false;
            debug!("ignoring popstate caused by an undone history step");
            return NavOutcome::Ignored;
        }
        if matches!(self.phase, Phase::Error { .. }) {
            return NavOutcome::Ignored;
        }

        if self.page_dirty {
            if !self.platform.confirm(&self.config.dirty_message) {
                // There is no way to cancel a popstate; step back to where we were.
                let delta = persisted
                    .as_ref()
                    .map(|s| self.history_index as i64 - s.index as i64)
                    .filter(|delta| *delta != 0)
                    .unwrap_or(1);
                self.suppress_next_pop = true;
                self.platform.go(delta);
                return NavOutcome::Canceled;
            }
            self.page_dirty = false;
        }

        self.cancel_pending_write();

        let mut next = self.state.clone();
        next.navigate(url, persisted.as_ref(), &self.routes, self.perms.as_ref());
        self.commit(next);

        match persisted {
            Some(state) => self.history_index = state.index,
            None => {
                // Entry created outside the controller, e.g. a fragment link.
                self.history_index += 1;
                self.state_dirty = true;
            }
        }
        self.platform.page_changed(&self.state);
        NavOutcome::Committed { pushed: false }
    }

    /// A page reported a new query string for its level.
    ///
    /// The top level's query is written straight to the URL with
    /// `replaceState`; other levels store it until the next save. While a
    /// failed write is parked the query only goes into the parked state if
    /// that state shows the same level on top; it never replaces the parked
    /// navigation.
    pub fn on_query_change(&mut self, index: usize, query: &str) -> NavOutcome {
        if index >= self.state.len() || self.state.items()[index].query == query {
            return NavOutcome::Ignored;
        }

        if let Some(pending) = self.pending_write.as_mut() {
            let view_path = &self.state.items()[index].view_path;
            let same_level = pending
                .state
                .item(index)
                .is_some_and(|item| &item.view_path == view_path);
            let parked_top = same_level && pending.state.is_top(index);
            if same_level {
                pending.state.set_query(index, query);
            }
            self.state.set_query(index, query);
            self.state_dirty = true;
            self.revision += 1;
            return if parked_top {
                debug!("query of level {} folded into the parked write", index);
                NavOutcome::Deferred
            } else {
                NavOutcome::Stored
            };
        }

        if !self.state.is_top(index) {
            self.state.set_query(index, query);
            self.state_dirty = true;
            self.revision += 1;
            return NavOutcome::Stored;
        }

        let mut next = self.state.clone();
        next.set_query(index, query);
        self.write(next, true)
    }

    // ------------------------------------------------------------------
    // History writes
    // ------------------------------------------------------------------

    fn write(&mut self, next: NavigationState, replace: bool) -> NavOutcome {
        if self.pending_write.is_some() {
            self.schedule_retry(next, replace);
            return NavOutcome::Deferred;
        }

        let replace = replace || next.full_location() == self.state.full_location();
        let index = if replace {
            self.history_index
        } else {
            self.history_index + 1
        };
        let payload = next.to_history_state(index);
        let url = next.url_location().to_string();

        let result = if replace {
            self.platform.replace_state(&payload, &url)
        } else {
            self.platform.push_state(&payload, &url)
        };

        match result {
            Ok(()) => {
                debug!(
                    "{} {}",
                    if replace { "replaced" } else { "pushed" },
                    next.full_location()
                );
                self.history_index = index;
                self.commit(next);
                self.state_dirty = false;
                if !replace {
                    self.platform.page_changed(&self.state);
                }
                NavOutcome::Committed { pushed: !replace }
            }
            Err(err) => {
                warn!(
                    "history write failed, retrying in {}ms: {}",
                    self.config.retry_debounce_ms, err
                );
                self.schedule_retry(next, replace);
                NavOutcome::Deferred
            }
        }
    }

    /// Park `next` until the retry timer fires, replacing any parked write.
    fn schedule_retry(&mut self, next: NavigationState, replace: bool) {
        // A parked push that never happened must not turn into a replace.
        let replace = replace
            && self
                .pending_write
                .as_ref()
                .is_none_or(|pending| pending.replace);
        self.pending_write = Some(PendingWrite {
            state: next,
            replace,
        });
        self.platform.clear_timer(TimerKind::NavigateRetry);
        self.platform
            .set_timer(TimerKind::NavigateRetry, self.config.retry_debounce_ms);
    }

    fn cancel_pending_write(&mut self) {
        if self.pending_write.take().is_some() {
            self.platform.clear_timer(TimerKind::NavigateRetry);
        }
    }

    fn retry_pending_write(&mut self) -> NavOutcome {
        let Some(pending) = self.pending_write.take() else {
            return NavOutcome::Ignored;
        };
        self.write(pending.state, pending.replace)
    }

    /// Write dirty state to the current history entry.
    fn flush_save(&mut self) {
        if !self.state_dirty {
            return;
        }
        let payload = self.state.to_history_state(self.history_index);
        match self
            .platform
            .replace_state(&payload, self.state.url_location())
        {
            Ok(()) => self.state_dirty = false,
            Err(err) => warn!("saving navigation state failed: {}", err),
        }
    }

    fn commit(&mut self, next: NavigationState) {
        self.state = next;
        self.revision += 1;
    }

    /// A timer armed through [`Platform::set_timer`] fired.
    pub fn on_timer(&mut self, timer: TimerKind) -> NavOutcome {
        match timer {
            TimerKind::SaveState => {
                self.flush_save();
                NavOutcome::Ignored
            }
            TimerKind::NavigateRetry => self.retry_pending_write(),
        }
    }

    // ------------------------------------------------------------------
    // Dirty guard
    // ------------------------------------------------------------------

    /// Mark the top page as having (or no longer having) unsaved edits.
    pub fn set_page_dirty(&mut self, dirty: bool) {
        self.page_dirty = dirty;
    }

    pub fn is_page_dirty(&self) -> bool {
        self.page_dirty
    }

    /// Whether `beforeunload` has to be intercepted.
    pub fn before_unload(&self) -> bool {
        self.page_dirty
    }

    /// Ask before leaving a dirty page. `true` means go ahead.
    fn confirm_leave(&mut self) -> bool {
        if !self.page_dirty {
            return true;
        }
        if self.platform.confirm(&self.config.dirty_message) {
            self.page_dirty = false;
            true
        } else {
            debug!("navigation cancelled by the user");
            false
        }
    }

    // ------------------------------------------------------------------
    // Page updates
    // ------------------------------------------------------------------

    /// Title and actions reported by the page at `index`.
    pub fn set_meta(&mut self, index: usize, meta: PageMeta) {
        if self.state.item(index).is_some_and(|item| item.meta == meta) {
            return;
        }
        if self.state.set_meta(index, meta) {
            self.revision += 1;
        }
    }

    /// Page payload persisted with the history entry.
    pub fn set_data(&mut self, index: usize, data: Option<Value>) {
        if self.state.set_data(index, data) {
            self.state_dirty = true;
            self.revision += 1;
        }
    }

    pub fn set_scroll(&mut self, index: usize, scroll_top: f64) {
        self.state.set_scroll(index, scroll_top);
    }

    /// Handles for the active state-kind segments of the level at `index`.
    pub fn state_handles(&self, index: usize) -> Vec<StateHandle> {
        self.state
            .item(index)
            .map(|item| {
                item.state_keys()
                    .map(|key| StateHandle {
                        index,
                        key: key.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether pushing `segment` onto the level at `index` opens a page of
    /// its own, as opposed to a NotFound or Forbidden level or a state of an
    /// existing one.
    pub fn can_push(&self, index: usize, segment: &str) -> bool {
        let Some(href) = self.state.href_for_push(index, segment) else {
            return false;
        };
        parse_tree_url(&href, None, &self.routes, self.perms.as_ref())
            .stack
            .last()
            .is_some_and(|top| !top.view.is_placeholder() && top.view_path == href)
    }

    /// Swap the permissions and re-match the current location, so
    /// Forbidden levels turn into real pages (or the other way round).
    pub fn set_permissions(&mut self, perms: Arc<dyn Permissions>) -> bool {
        if Arc::ptr_eq(&self.perms, &perms) {
            return false;
        }
        self.perms = perms;

        let persisted = self.state.to_history_state(self.history_index);
        let mut next = self.state.clone();
        next.navigate(
            self.state.full_location(),
            Some(&persisted),
            &self.routes,
            self.perms.as_ref(),
        );
        debug!("permissions changed, re-matched {}", next.full_location());
        self.commit(next);
        self.state_dirty = true;
        true
    }

    // ------------------------------------------------------------------
    // Render errors
    // ------------------------------------------------------------------

    /// A mounted page failed to render.
    ///
    /// Reloads automatically while the session's reload budget lasts, then
    /// leaves the reload to the user.
    pub fn on_render_error(&mut self, message: &str) -> RecoveryAction {
        error!("page at {} failed to render: {}", self.state.full_location(), message);

        let now = self.platform.now_ms();
        let key = self.config.reload_counter_key.clone();
        let mut counter = self
            .platform
            .session_get(&key)
            .and_then(|raw| serde_json::from_str::<ReloadCounter>(&raw).ok())
            .filter(|counter| now - counter.last_ms < self.config.reload_window_ms)
            .unwrap_or_default();

        let action = if counter.count < self.config.max_auto_reloads {
            counter.count += 1;
            counter.last_ms = now;
            if let Ok(raw) = serde_json::to_string(&counter) {
                self.platform.session_set(&key, &raw);
            }
            RecoveryAction::AutoReload
        } else {
            RecoveryAction::ManualReload
        };

        self.phase = Phase::Error {
            message: message.to_string(),
            action,
        };
        self.revision += 1;

        if action == RecoveryAction::AutoReload {
            info!("reloading after render error ({} of {})", counter.count, self.config.max_auto_reloads);
            self.reload();
        }
        action
    }

    /// Full page reload, saving the current state first.
    pub fn reload(&mut self) {
        self.state_dirty = true;
        self.flush_save();
        self.platform.reload();
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Increases whenever something a page may display changed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn history_index(&self) -> u64 {
        self.history_index
    }

    pub fn has_pending_write(&self) -> bool {
        self.pending_write.is_some()
    }

    pub fn routes(&self) -> &Arc<RouteTree> {
        &self.routes
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPlatform;
    use crate::permissions::PermissionSet;
    use crate::route::{Route, RoutePattern};
    use crate::stack::StackView;
    use serde_json::json;

    fn routes() -> Arc<RouteTree> {
        Arc::new(RouteTree::new([
            Route::bottom("").with_id("home"),
            Route::bottom("members")
                .with_id("members")
                .requires_perm("codeholders.read")
                .with_child(
                    Route::stack(RoutePattern::regex(r"\d+").unwrap())
                        .with_match_key("id")
                        .with_child(Route::state("edit", "edit")),
                ),
            Route::bottom("votes").with_id("votes"),
        ]))
    }

    fn mount_at(url: &str) -> NavigationController<MockPlatform> {
        NavigationController::mount(
            MockPlatform::new(url),
            routes(),
            Arc::new(PermissionSet::new().with_perm("*")),
            NavigationConfig::default(),
        )
    }

    #[test]
    fn test_mount_writes_initial_payload() {
        let nav = mount_at("/members/42");
        assert_eq!(nav.state().len(), 2);
        assert_eq!(nav.platform().writes().len(), 1);
        assert!(!nav.platform().writes()[0].pushed);
        assert_eq!(nav.platform().timer(TimerKind::SaveState), Some(500));
        assert_eq!(nav.phase(), &Phase::Idle);
    }

    #[test]
    fn test_mount_uses_rate_limited_interval() {
        let nav = NavigationController::mount(
            MockPlatform::new("/").with_rate_limit(),
            routes(),
            Arc::new(PermissionSet::dummy()),
            NavigationConfig::default(),
        );
        assert_eq!(nav.platform().timer(TimerKind::SaveState), Some(2000));
    }

    #[test]
    fn test_navigate_pushes_entry() {
        let mut nav = mount_at("/members");
        let outcome = nav.navigate("/members/42", false, false);

        assert_eq!(outcome, NavOutcome::Committed { pushed: true });
        assert_eq!(nav.platform().location(), "/members/42");
        assert_eq!(nav.history_index(), 1);
        assert_eq!(nav.platform().page_changes(), 1);
    }

    #[test]
    fn test_navigate_to_same_location_replaces() {
        let mut nav = mount_at("/members");
        let outcome = nav.navigate("/members", false, false);
        assert_eq!(outcome, NavOutcome::Committed { pushed: false });
        assert_eq!(nav.history_index(), 0);
    }

    #[test]
    fn test_dirty_page_blocks_navigation() {
        let mut nav = mount_at("/members/42/edit");
        nav.set_page_dirty(true);
        assert!(nav.before_unload());

        nav.platform_mut().answer_confirm(false);
        assert_eq!(nav.navigate("/votes", false, false), NavOutcome::Canceled);
        assert_eq!(nav.state().pathname(), "/members/42/edit");
        assert!(nav.is_page_dirty());

        nav.platform_mut().answer_confirm(true);
        assert_eq!(
            nav.navigate("/votes", false, false),
            NavOutcome::Committed { pushed: true }
        );
        assert!(!nav.is_page_dirty());
    }

    #[test]
    fn test_push_and_pop_requests() {
        let mut nav = mount_at("/members?page=3");
        nav.request(NavRequest::Push {
            index: 0,
            segment: "42".to_string(),
            replace: false,
        });
        assert_eq!(nav.state().full_location(), "/members/42");

        nav.request(NavRequest::Pop {
            index: 1,
            replace: false,
        });
        assert_eq!(nav.state().full_location(), "/members?page=3");
    }

    #[test]
    fn test_state_handles_pop() {
        let mut nav = mount_at("/members/42/edit");
        let handles = nav.state_handles(1);
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].key, "edit");

        nav.request(handles[0].pop(true));
        assert_eq!(nav.state().pathname(), "/members/42");
        assert!(nav.state_handles(1).is_empty());
    }

    #[test]
    fn test_invalid_request_is_ignored() {
        let mut nav = mount_at("/members");
        let outcome = nav.request(NavRequest::Pop {
            index: 4,
            replace: false,
        });
        assert_eq!(outcome, NavOutcome::Ignored);
    }

    #[test]
    fn test_invalid_request_does_not_prompt() {
        let mut nav = mount_at("/members/42/edit");
        nav.set_page_dirty(true);
        nav.platform_mut().answer_confirm(false);

        let outcome = nav.request(NavRequest::Pop {
            index: 4,
            replace: false,
        });
        assert_eq!(outcome, NavOutcome::Ignored);
        assert!(nav.is_page_dirty());

        // The queued answer is still there for the next real navigation.
        assert_eq!(nav.navigate("/votes", false, false), NavOutcome::Canceled);
        assert_eq!(nav.state().pathname(), "/members/42/edit");
    }

    #[test]
    fn test_can_push_only_into_child_pages() {
        let nav = mount_at("/members/42");
        assert!(nav.can_push(0, "7"));
        assert!(!nav.can_push(0, "abc"));
        assert!(!nav.can_push(1, "edit"));
        assert!(!nav.can_push(1, "files"));
        assert!(!nav.can_push(5, "7"));

        let nav = mount_at("/votes");
        assert!(!nav.can_push(0, "1"));
    }

    #[test]
    fn test_pop_of_out_of_tree_level_uncovers_stack() {
        let mut nav = mount_at("/members/42");
        nav.navigate("/votes", false, true);
        assert_eq!(nav.state().len(), 3);

        nav.request(NavRequest::Pop {
            index: 2,
            replace: false,
        });
        let paths: Vec<_> = nav
            .state()
            .items()
            .iter()
            .map(|i| i.view_path.as_str())
            .collect();
        assert_eq!(paths, vec!["/members", "/members/42"]);
        assert_eq!(nav.platform().location(), "/members/42");
    }

    #[test]
    fn test_query_change_on_top_replaces_url() {
        let mut nav = mount_at("/members/42");
        let writes = nav.platform().writes().len();

        let outcome = nav.on_query_change(1, "tab=files");
        assert_eq!(outcome, NavOutcome::Committed { pushed: false });
        assert_eq!(nav.platform().location(), "/members/42?tab=files");
        assert_eq!(nav.platform().writes().len(), writes + 1);
        assert_eq!(nav.on_query_change(1, "tab=files"), NavOutcome::Ignored);
    }

    #[test]
    fn test_query_change_updates_parked_write_of_same_level() {
        let mut nav = mount_at("/members");
        nav.platform_mut().fail_next_writes(1);

        assert_eq!(nav.on_query_change(0, "page=2"), NavOutcome::Deferred);
        assert_eq!(nav.on_query_change(0, "page=3"), NavOutcome::Deferred);
        assert_eq!(nav.state().query(), "page=3");

        nav.platform_mut().fire(TimerKind::NavigateRetry);
        assert_eq!(
            nav.on_timer(TimerKind::NavigateRetry),
            NavOutcome::Committed { pushed: false }
        );
        let last = nav.platform().writes().last().unwrap();
        assert_eq!(last.url, "/members?page=3");
        assert!(!last.pushed);
    }

    #[test]
    fn test_query_change_below_top_waits_for_save() {
        let mut nav = mount_at("/members/42");
        let writes = nav.platform().writes().len();

        assert_eq!(nav.on_query_change(0, "page=2"), NavOutcome::Stored);
        assert_eq!(nav.platform().writes().len(), writes);

        nav.on_timer(TimerKind::SaveState);
        assert_eq!(nav.platform().writes().len(), writes + 1);
        let saved = nav.platform().current_entry().unwrap();
        assert_eq!(saved.stack[0].query, "page=2");

        // Nothing left to flush
        nav.on_timer(TimerKind::SaveState);
        assert_eq!(nav.platform().writes().len(), writes + 1);
    }

    #[test]
    fn test_set_data_is_saved_on_next_tick() {
        let mut nav = mount_at("/members/42");
        nav.set_data(1, Some(json!({"draft": "x"})));
        nav.on_timer(TimerKind::SaveState);
        let saved = nav.platform().current_entry().unwrap();
        assert_eq!(saved.stack[1].data, Some(json!({"draft": "x"})));
    }

    #[test]
    fn test_meta_update_bumps_revision_only_on_change() {
        let mut nav = mount_at("/members");
        let revision = nav.revision();
        let meta = PageMeta {
            title: Some("Members".to_string()),
            actions: Vec::new(),
        };
        nav.set_meta(0, meta.clone());
        assert_eq!(nav.revision(), revision + 1);
        nav.set_meta(0, meta);
        assert_eq!(nav.revision(), revision + 1);
    }

    #[test]
    fn test_permission_change_reparses() {
        let mut nav = NavigationController::mount(
            MockPlatform::new("/members/42"),
            routes(),
            Arc::new(PermissionSet::new()),
            NavigationConfig::default(),
        );
        assert_eq!(nav.state().top().view, StackView::Forbidden);

        let perms: Arc<dyn Permissions> =
            Arc::new(PermissionSet::new().with_perm("codeholders.read"));
        assert!(nav.set_permissions(perms.clone()));
        assert_eq!(nav.state().len(), 2);
        assert_eq!(nav.state().current_page_id(), Some("members"));
        assert!(!nav.set_permissions(perms));
    }

    #[test]
    fn test_render_error_reload_budget() {
        let mut nav = mount_at("/votes");

        assert_eq!(nav.on_render_error("boom"), RecoveryAction::AutoReload);
        assert_eq!(nav.on_render_error("boom"), RecoveryAction::AutoReload);
        assert_eq!(nav.on_render_error("boom"), RecoveryAction::ManualReload);
        assert_eq!(nav.platform().reloads(), 2);
        assert!(matches!(nav.phase(), Phase::Error { .. }));
        assert_eq!(nav.navigate("/members", false, false), NavOutcome::Ignored);
    }

    #[test]
    fn test_reload_counter_expires() {
        let mut nav = mount_at("/votes");
        nav.on_render_error("boom");
        nav.on_render_error("boom");
        nav.platform_mut().advance(61_000.0);
        assert_eq!(nav.on_render_error("boom"), RecoveryAction::AutoReload);
    }
}
