//! Navigation state: the current view stack and its derived locations.

use log::debug;
use serde_json::Value;

use crate::config::{MAX_URL_LENGTH, TRUNCATED_QUERY};
use crate::history::{HistoryState, PersistedItem};
use crate::location::{format_location, is_within, join_path, parent_path};
use crate::matcher::parse_tree_url;
use crate::permissions::Permissions;
use crate::route::RouteTree;
use crate::stack::{NavigationStackItem, PageMeta};

/// The current view stack plus the locations derived from its top level.
///
/// Every mutation re-derives the locations, so `pathname`, `query`,
/// `full_location` and `url_location` always describe the stack.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    stack: Vec<NavigationStackItem>,
    pathname: String,
    query: String,
    full_location: String,
    url_location: String,
    max_url_length: usize,
}

impl NavigationState {
    /// Build the state for `url`.
    pub fn new(
        url: &str,
        persisted: Option<&HistoryState>,
        tree: &RouteTree,
        perms: &dyn Permissions,
    ) -> Self {
        let mut state = Self {
            stack: parse_tree_url(url, persisted, tree, perms).stack,
            pathname: String::new(),
            query: String::new(),
            full_location: String::new(),
            url_location: String::new(),
            max_url_length: MAX_URL_LENGTH,
        };
        state.update_location();
        state
    }

    /// Change the longest location written to the address bar.
    pub fn set_max_url_length(&mut self, max_url_length: usize) {
        self.max_url_length = max_url_length;
        self.update_location();
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Re-run the matcher for `url` and carry over what the previous stack
    /// knew about levels that are still shown.
    ///
    /// A level is still shown when the new stack has the same route node at
    /// the same view path and index. Such levels keep their page data, meta
    /// and scroll position; levels below the new top also keep their frozen
    /// query.
    pub fn navigate(
        &mut self,
        url: &str,
        persisted: Option<&HistoryState>,
        tree: &RouteTree,
        perms: &dyn Permissions,
    ) {
        let mut stack = parse_tree_url(url, persisted, tree, perms).stack;
        let top = stack.len() - 1;

        for (i, item) in stack.iter_mut().enumerate() {
            let Some(old) = self.stack.get(i) else {
                break;
            };
            if !item.same_identity(old) {
                continue;
            }
            item.data = old.data.clone();
            if i != top {
                item.query = old.query.clone();
            }
            item.meta = old.meta.clone();
            item.scroll_top = old.scroll_top;
        }

        self.stack = stack;
        self.update_location();
    }

    /// Append `segment` (one or more path segments) to the current pathname.
    pub fn push(&mut self, segment: &str, tree: &RouteTree, perms: &dyn Permissions) {
        let href = join_path(&self.pathname, segment);
        self.navigate(&href, None, tree, perms);
    }

    /// Remove the last segment of the current pathname.
    ///
    /// The level that ends up on top gets its frozen query back.
    pub fn pop(&mut self, tree: &RouteTree, perms: &dyn Permissions) {
        let href = self.href_with_frozen_query(parent_path(&self.pathname));
        self.navigate(&href, None, tree, perms);
    }

    /// Close the level at `index` and every level above it.
    ///
    /// A level that sits in the tree under the one below it is closed by
    /// navigating to its parent path. A level appended by
    /// [`push_out_of_tree`](Self::push_out_of_tree) has no parent path on the
    /// stack, so closing it uncovers the levels it was pushed onto. Either
    /// way the level that ends up on top gets its frozen query back.
    ///
    /// Returns `false` for an unknown index.
    pub fn pop_level(&mut self, index: usize, tree: &RouteTree, perms: &dyn Permissions) -> bool {
        let Some(item) = self.stack.get(index) else {
            return false;
        };
        let appended = index
            .checked_sub(1)
            .and_then(|below| self.stack.get(below))
            .is_some_and(|below| !is_within(&item.view_path, &below.view_path));

        if appended {
            debug!("closing out-of-tree level {}", item.view_path);
            self.stack.truncate(index);
            self.update_location();
        } else {
            let href = self.href_with_frozen_query(parent_path(&item.view_path));
            self.navigate(&href, None, tree, perms);
        }
        true
    }

    /// Show `url` on top of the current stack.
    ///
    /// Only the last level of the target is appended; the visible hierarchy
    /// stays as it is. Used for links that cross route-tree branches.
    pub fn push_out_of_tree(&mut self, url: &str, tree: &RouteTree, perms: &dyn Permissions) {
        let mut target = parse_tree_url(url, None, tree, perms).stack;
        if let Some(item) = target.pop() {
            debug!("out-of-tree push of {} onto {}", item.view_path, self.pathname);
            self.stack.push(item);
        }
        self.update_location();
    }

    /// Remove state `key` from the level at `index`, along with the states
    /// attached after it and every level above `index`.
    ///
    /// Returns `false` when the level or state does not exist.
    pub fn pop_state(&mut self, index: usize, key: &str) -> bool {
        let Some(item) = self.stack.get_mut(index) else {
            return false;
        };
        if !item.truncate_state(key) {
            return false;
        }
        self.stack.truncate(index + 1);
        self.update_location();
        true
    }

    /// Re-derive `pathname`, `query` and both location strings from the top
    /// level.
    pub fn update_location(&mut self) {
        if self.stack.is_empty() {
            self.stack.push(NavigationStackItem::not_found("/"));
        }
        let top = &self.stack[self.stack.len() - 1];

        self.pathname = top.full_path();
        self.query = top.query.clone();
        self.full_location = format_location(&self.pathname, &self.query);
        self.url_location = self.full_location.clone();

        // Only the query can be dropped, and only when that shortens the URL.
        if self.full_location.len() > self.max_url_length && !self.query.is_empty() {
            let truncated = format!("{}?{}", self.pathname, TRUNCATED_QUERY);
            if truncated.len() < self.full_location.len() {
                self.url_location = truncated;
            }
        }
    }

    // ------------------------------------------------------------------
    // Per-level updates
    // ------------------------------------------------------------------

    /// Set the query of the level at `index`. Returns `false` for an unknown index.
    pub fn set_query(&mut self, index: usize, query: impl Into<String>) -> bool {
        let Some(item) = self.stack.get_mut(index) else {
            return false;
        };
        item.query = query.into();
        self.update_location();
        true
    }

    pub fn set_data(&mut self, index: usize, data: Option<Value>) -> bool {
        self.stack
            .get_mut(index)
            .map(|item| item.data = data)
            .is_some()
    }

    pub fn set_meta(&mut self, index: usize, meta: PageMeta) -> bool {
        self.stack
            .get_mut(index)
            .map(|item| item.meta = meta)
            .is_some()
    }

    pub fn set_scroll(&mut self, index: usize, scroll_top: f64) -> bool {
        self.stack
            .get_mut(index)
            .map(|item| item.scroll_top = Some(scroll_top))
            .is_some()
    }

    // ------------------------------------------------------------------
    // Relative locations
    // ------------------------------------------------------------------

    /// Location of `segment` pushed on top of the level at `index`.
    pub fn href_for_push(&self, index: usize, segment: &str) -> Option<String> {
        self.stack
            .get(index)
            .map(|item| join_path(&item.full_path(), segment))
    }

    /// Location shown after the level at `index` is closed, with the frozen
    /// query of the level that becomes the top.
    pub fn href_for_pop(&self, index: usize) -> Option<String> {
        self.stack
            .get(index)
            .map(|item| self.href_with_frozen_query(parent_path(&item.view_path)))
    }

    fn href_with_frozen_query(&self, path: String) -> String {
        let query = self
            .stack
            .iter()
            .rev()
            .find(|item| item.full_path() == path || item.view_path == path)
            .map(|item| item.query.as_str())
            .unwrap_or_default();
        format_location(&path, query)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn items(&self) -> &[NavigationStackItem] {
        &self.stack
    }

    pub fn item(&self, index: usize) -> Option<&NavigationStackItem> {
        self.stack.get(index)
    }

    pub fn top(&self) -> &NavigationStackItem {
        &self.stack[self.top_index()]
    }

    pub fn top_index(&self) -> usize {
        self.stack.len() - 1
    }

    pub fn is_top(&self, index: usize) -> bool {
        index == self.top_index()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Always `false`; the stack holds at least one level.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// `pathname[?query]`, never truncated.
    pub fn full_location(&self) -> &str {
        &self.full_location
    }

    /// The location written to the address bar, truncated to `pathname?T`
    /// when the full location is too long.
    pub fn url_location(&self) -> &str {
        &self.url_location
    }

    pub fn is_truncated(&self) -> bool {
        self.url_location != self.full_location
    }

    /// Id of the first level, walking up from the bottom, whose route has one.
    pub fn current_page_id(&self) -> Option<&str> {
        self.stack
            .iter()
            .find_map(|item| item.view.route().and_then(|route| route.id()))
    }

    /// Payload to store with this state's history entry.
    pub fn to_history_state(&self, index: u64) -> HistoryState {
        let stack = self
            .stack
            .iter()
            .map(|item| PersistedItem {
                view_path: item.view_path.clone(),
                data: item.data.clone(),
                query: item.query.clone(),
            })
            .collect();
        HistoryState::new(index, stack, self.full_location.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::PermissionSet;
    use crate::route::{Route, RoutePattern};
    use crate::stack::{PageAction, StackView};
    use serde_json::json;

    fn tree() -> RouteTree {
        RouteTree::new([
            Route::bottom("").with_id("home"),
            Route::bottom("members").with_id("members").with_child(
                Route::stack(RoutePattern::regex(r"\d+").unwrap())
                    .with_match_key("id")
                    .with_child(Route::state("edit", "edit"))
                    .with_child(Route::stack("files").with_id("member-files")),
            ),
            Route::bottom("lists").with_id("lists").with_child(
                Route::stack(RoutePattern::regex(r"\d+").unwrap())
                    .with_match_key("list")
                    .with_child(Route::stack("preview")),
            ),
        ])
    }

    fn perms() -> PermissionSet {
        PermissionSet::new().with_perm("*")
    }

    fn state(url: &str) -> NavigationState {
        NavigationState::new(url, None, &tree(), &perms())
    }

    #[test]
    fn test_locations_follow_top() {
        let nav = state("/members/42/edit?tab=1");
        assert_eq!(nav.pathname(), "/members/42/edit");
        assert_eq!(nav.query(), "tab=1");
        assert_eq!(nav.full_location(), "/members/42/edit?tab=1");
        assert_eq!(nav.url_location(), nav.full_location());
        assert!(!nav.is_truncated());
    }

    #[test]
    fn test_reconcile_preserves_matching_levels() {
        let tree = tree();
        let perms = perms();
        let mut nav = NavigationState::new("/members?page=2", None, &tree, &perms);
        nav.set_data(0, Some(json!("x")));
        nav.set_meta(
            0,
            PageMeta {
                title: Some("Members".to_string()),
                actions: vec![PageAction {
                    id: "add".to_string(),
                    label: "Add".to_string(),
                }],
            },
        );
        nav.push("42", &tree, &perms);
        nav.set_data(1, Some(json!({"draft": true})));

        nav.push("files", &tree, &perms);

        assert_eq!(nav.len(), 3);
        assert_eq!(nav.items()[0].data, Some(json!("x")));
        assert_eq!(nav.items()[0].query, "page=2");
        assert_eq!(nav.items()[0].meta.title.as_deref(), Some("Members"));
        assert_eq!(nav.items()[1].data, Some(json!({"draft": true})));
        assert_eq!(nav.items()[2].data, None);
        assert_eq!(nav.items()[2].meta, PageMeta::default());
        assert_eq!(nav.pathname(), "/members/42/files");
    }

    #[test]
    fn test_pop_restores_frozen_query() {
        let tree = tree();
        let perms = perms();
        let mut nav = NavigationState::new("/members?page=2", None, &tree, &perms);
        nav.push("42", &tree, &perms);
        assert_eq!(nav.query(), "");

        nav.pop(&tree, &perms);
        assert_eq!(nav.full_location(), "/members?page=2");
        assert_eq!(nav.len(), 1);
    }

    #[test]
    fn test_pop_removes_state_segment() {
        let tree = tree();
        let perms = perms();
        let mut nav = NavigationState::new("/members/42/edit", None, &tree, &perms);
        nav.pop(&tree, &perms);
        assert_eq!(nav.pathname(), "/members/42");
        assert!(!nav.top().has_state("edit"));
    }

    #[test]
    fn test_navigate_to_other_section() {
        let tree = tree();
        let perms = perms();
        let mut nav = NavigationState::new("/members/42/files", None, &tree, &perms);
        nav.set_data(0, Some(json!(1)));
        nav.navigate("/lists", None, &tree, &perms);

        assert_eq!(nav.len(), 1);
        assert_eq!(nav.current_page_id(), Some("lists"));
        assert_eq!(nav.items()[0].data, None);
    }

    #[test]
    fn test_push_out_of_tree_appends_target_top() {
        let tree = tree();
        let perms = perms();
        let mut nav = NavigationState::new("/lists/7", None, &tree, &perms);
        nav.push_out_of_tree("/members/42/files?x=1", &tree, &perms);

        let paths: Vec<_> = nav.items().iter().map(|i| i.view_path.as_str()).collect();
        assert_eq!(paths, vec!["/lists", "/lists/7", "/members/42/files"]);
        assert_eq!(nav.full_location(), "/members/42/files?x=1");
        assert_eq!(nav.current_page_id(), Some("lists"));
    }

    #[test]
    fn test_pop_level_uncovers_stack_under_out_of_tree_level() {
        let tree = tree();
        let perms = perms();
        let mut nav = NavigationState::new("/lists/7?sort=desc", None, &tree, &perms);
        nav.set_data(1, Some(json!({"selected": "a"})));
        nav.push_out_of_tree("/members/42/files", &tree, &perms);
        assert_eq!(nav.item(1).map(|i| i.query.as_str()), Some("sort=desc"));

        assert!(nav.pop_level(2, &tree, &perms));

        let paths: Vec<_> = nav.items().iter().map(|i| i.view_path.as_str()).collect();
        assert_eq!(paths, vec!["/lists", "/lists/7"]);
        assert_eq!(nav.full_location(), "/lists/7?sort=desc");
        assert_eq!(nav.top().data, Some(json!({"selected": "a"})));
    }

    #[test]
    fn test_pop_level_in_tree_goes_to_parent_path() {
        let tree = tree();
        let perms = perms();
        let mut nav = NavigationState::new("/members/42/files", None, &tree, &perms);
        assert!(nav.pop_level(2, &tree, &perms));
        assert_eq!(nav.pathname(), "/members/42");
        assert!(!nav.pop_level(7, &tree, &perms));
    }

    #[test]
    fn test_pop_state_leaves_edit() {
        let mut nav = state("/members/42/edit");
        assert!(nav.pop_state(1, "edit"));
        assert_eq!(nav.pathname(), "/members/42");
        assert!(!nav.pop_state(1, "edit"));
        assert!(!nav.pop_state(5, "edit"));
    }

    #[test]
    fn test_pop_state_on_lower_level_drops_upper_levels() {
        let tree = tree();
        let perms = perms();
        let mut nav = NavigationState::new("/members/42/edit", None, &tree, &perms);
        nav.push_out_of_tree("/lists/3", &tree, &perms);
        assert_eq!(nav.len(), 3);

        assert!(nav.pop_state(1, "edit"));
        assert_eq!(nav.len(), 2);
        assert_eq!(nav.full_location(), "/members/42");
    }

    #[test]
    fn test_long_query_is_truncated() {
        let tree = tree();
        let perms = perms();
        let query = format!("q={}", "x".repeat(2000));
        let nav = NavigationState::new(&format!("/lists?{}", query), None, &tree, &perms);

        assert!(nav.is_truncated());
        assert_eq!(nav.url_location(), "/lists?T");
        assert!(nav.url_location().len() < nav.full_location().len());

        let persisted = nav.to_history_state(4);
        let restored = NavigationState::new(nav.url_location(), Some(&persisted), &tree, &perms);
        assert_eq!(restored.full_location(), nav.full_location());

        let degraded = NavigationState::new(nav.url_location(), None, &tree, &perms);
        assert_eq!(degraded.full_location(), "/lists");
    }

    #[test]
    fn test_long_path_without_query_is_not_truncated() {
        let tree = tree();
        let perms = perms();
        let mut nav = NavigationState::new("/lists/7", None, &tree, &perms);
        nav.set_max_url_length(4);
        assert_eq!(nav.url_location(), "/lists/7");
        assert!(!nav.is_truncated());

        // A one-character query is no longer than the sentinel
        nav.set_query(1, "a");
        assert_eq!(nav.url_location(), "/lists/7?a");
        assert!(nav.url_location().len() <= nav.full_location().len());
    }

    #[test]
    fn test_custom_url_limit() {
        let mut nav = state("/lists?abc=def");
        nav.set_max_url_length(8);
        assert_eq!(nav.url_location(), "/lists?T");
    }

    #[test]
    fn test_set_query_on_top_updates_location() {
        let mut nav = state("/members/42");
        assert!(nav.set_query(1, "tab=files"));
        assert_eq!(nav.full_location(), "/members/42?tab=files");
        assert!(nav.set_query(0, "page=3"));
        assert_eq!(nav.full_location(), "/members/42?tab=files");
        assert!(!nav.set_query(9, "x"));
    }

    #[test]
    fn test_relative_hrefs() {
        let mut nav = state("/members/42/edit");
        nav.set_query(0, "page=2");
        assert_eq!(nav.href_for_push(0, "7").as_deref(), Some("/members/7"));
        assert_eq!(
            nav.href_for_push(1, "files").as_deref(),
            Some("/members/42/edit/files")
        );
        assert_eq!(nav.href_for_pop(1).as_deref(), Some("/members?page=2"));
        assert_eq!(nav.href_for_pop(0).as_deref(), Some("/"));
        assert_eq!(nav.href_for_pop(2), None);
    }

    #[test]
    fn test_placeholders_have_no_page_id() {
        let nav = state("/nowhere");
        assert_eq!(nav.top().view, StackView::NotFound);
        assert_eq!(nav.current_page_id(), None);
    }

    #[test]
    fn test_history_state_round_trip() {
        let tree = tree();
        let perms = perms();
        let mut nav = NavigationState::new("/members/42", None, &tree, &perms);
        nav.set_query(0, "page=5");
        nav.set_data(1, Some(json!({"editing": false})));

        let persisted = nav.to_history_state(2);
        assert_eq!(persisted.index, 2);
        assert_eq!(persisted.href, "/members/42");

        let restored = NavigationState::new("/members/42", Some(&persisted), &tree, &perms);
        assert_eq!(restored.items()[0].query, "page=5");
        assert_eq!(restored.items()[1].data, Some(json!({"editing": false})));
    }
}
