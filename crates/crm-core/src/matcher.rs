//! URL tree matcher.
//!
//! Maps a URL onto an ordered view stack by walking its path segments through
//! the route tree. The walk is a pure function of its inputs; the route tree
//! is never mutated.

use log::debug;

use crate::history::HistoryState;
use crate::location::{Location, path_of, split_segments};
use crate::permissions::Permissions;
use crate::route::{RouteKind, RouteTree, find_route};
use crate::stack::{Matches, NavigationStackItem, StackView};

/// Result of matching a URL against the route tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUrl {
    /// Never empty.
    pub stack: Vec<NavigationStackItem>,
    pub pathname: String,
    pub query: String,
}

/// Match `url` against `tree`.
///
/// `persisted` is the history payload stored with the URL, if any. It
/// restores page data and frozen queries of levels whose view path is
/// unchanged, and recovers the query of a truncated location (`?T`).
/// Without it a truncated query is dropped.
pub fn parse_tree_url(
    url: &str,
    persisted: Option<&HistoryState>,
    tree: &RouteTree,
    perms: &dyn Permissions,
) -> ParsedUrl {
    let location = Location::parse(url);
    let query = resolve_query(&location, persisted);
    let segments = split_segments(&location.pathname);
    let pathname = path_of(&segments);

    let stack = build_stack(&segments, &pathname, persisted, tree, perms);
    finish(stack, pathname, query)
}

/// The real query of `location`, recovering truncated queries from `persisted`.
fn resolve_query(location: &Location, persisted: Option<&HistoryState>) -> String {
    if !location.is_truncated() {
        return location.query.clone();
    }

    let recovered = persisted
        .filter(|state| !state.href.is_empty())
        .map(|state| Location::parse(&state.href))
        .filter(|href| href.pathname == location.pathname)
        .map(|href| href.query);

    match recovered {
        Some(query) => query,
        None => {
            debug!(
                "dropping truncated query of {}: no history state to recover it from",
                location.pathname
            );
            String::new()
        }
    }
}

/// Walk the segments. Placeholder levels cover the whole `pathname` so the
/// requested URL stays in the address bar.
fn build_stack(
    segments: &[&str],
    pathname: &str,
    persisted: Option<&HistoryState>,
    tree: &RouteTree,
    perms: &dyn Permissions,
) -> Vec<NavigationStackItem> {
    let mut stack: Vec<NavigationStackItem> = Vec::new();
    let mut matches = Matches::new();
    let mut candidates = tree.roots();

    for (i, segment) in segments.iter().enumerate() {
        let path = path_of(&segments[..=i]);

        let Some((route, captures)) = find_route(candidates, segment) else {
            debug!("no route for segment {:?} of {}", segment, pathname);
            return vec![NavigationStackItem::not_found(pathname)];
        };

        if !route.is_allowed(perms) {
            debug!("access to {} denied", path);
            return vec![NavigationStackItem::forbidden(pathname)];
        }

        if *route.kind() == RouteKind::Bottom {
            stack.clear();
            matches.clear();
        }
        if let Some(key) = route.match_key() {
            matches.insert(key.to_string(), captures.clone());
        }

        match route.kind() {
            RouteKind::Bottom | RouteKind::Stack => {
                let mut item = NavigationStackItem::new(StackView::Route(route.clone()), path);
                item.captures = captures;
                item.matches = matches.clone();

                if let Some(saved) = persisted.and_then(|s| s.item_at(stack.len(), &item.view_path))
                {
                    item.data = saved.data.clone();
                    item.query = saved.query.clone();
                }
                stack.push(item);
            }
            RouteKind::State { key } => {
                let Some(top) = stack.last_mut() else {
                    debug!("state route {:?} has no view level to attach to", key);
                    return vec![NavigationStackItem::not_found(pathname)];
                };
                top.attach_state(key, segment);
                top.matches = matches.clone();
            }
        }

        candidates = route.children();
    }

    stack
}

fn finish(mut stack: Vec<NavigationStackItem>, pathname: String, query: String) -> ParsedUrl {
    if stack.is_empty() {
        stack.push(NavigationStackItem::not_found(pathname.clone()));
    }
    if let Some(top) = stack.last_mut() {
        top.query = query.clone();
    }

    ParsedUrl {
        stack,
        pathname,
        query,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::PersistedItem;
    use crate::permissions::PermissionSet;
    use crate::route::{Route, RoutePattern};
    use serde_json::json;

    fn tree() -> RouteTree {
        RouteTree::new([
            Route::bottom("").with_id("home"),
            Route::bottom("members")
                .with_id("members")
                .requires_perm("codeholders.read")
                .with_child(
                    Route::stack(RoutePattern::regex(r"\d+").unwrap())
                        .with_match_key("id")
                        .with_child(
                            Route::state("edit", "edit")
                                .requires_perm("codeholders.update")
                                .with_child(Route::state("history", "history")),
                        )
                        .with_child(Route::stack("files")),
                ),
            Route::bottom("lists").with_id("lists"),
        ])
    }

    fn all_perms() -> PermissionSet {
        PermissionSet::new().with_perm("*")
    }

    fn view_paths(parsed: &ParsedUrl) -> Vec<&str> {
        parsed.stack.iter().map(|i| i.view_path.as_str()).collect()
    }

    #[test]
    fn test_root_matches_empty_segment() {
        let parsed = parse_tree_url("/", None, &tree(), &all_perms());
        assert_eq!(view_paths(&parsed), vec!["/"]);
        assert_eq!(parsed.stack[0].view.route().unwrap().id(), Some("home"));
    }

    #[test]
    fn test_member_edit_with_state() {
        let parsed = parse_tree_url("/members/42/edit", None, &tree(), &all_perms());

        assert_eq!(view_paths(&parsed), vec!["/members", "/members/42"]);
        let top = &parsed.stack[1];
        assert_eq!(top.matches.get("id"), Some(&vec!["42".to_string()]));
        assert!(top.has_state("edit"));
        assert_eq!(top.state_path, "/edit");
        assert_eq!(top.full_path(), "/members/42/edit");
        assert_eq!(parsed.pathname, "/members/42/edit");
    }

    #[test]
    fn test_nested_state_segments() {
        let parsed = parse_tree_url("/members/42/edit/history", None, &tree(), &all_perms());
        let top = parsed.stack.last().unwrap();
        assert_eq!(top.state_keys().collect::<Vec<_>>(), vec!["edit", "history"]);
        assert_eq!(top.state_path, "/edit/history");
    }

    #[test]
    fn test_top_receives_query() {
        let parsed = parse_tree_url("/members/42?tab=files", None, &tree(), &all_perms());
        assert_eq!(parsed.stack[0].query, "");
        assert_eq!(parsed.stack[1].query, "tab=files");
        assert_eq!(parsed.query, "tab=files");
    }

    #[test]
    fn test_not_found_replaces_stack() {
        let parsed = parse_tree_url("/members/abc/edit", None, &tree(), &all_perms());
        assert_eq!(parsed.stack.len(), 1);
        assert_eq!(parsed.stack[0].view, StackView::NotFound);
        assert_eq!(parsed.stack[0].view_path, "/members/abc/edit");
    }

    #[test]
    fn test_empty_tree_yields_not_found() {
        let parsed = parse_tree_url("/anything", None, &RouteTree::default(), &all_perms());
        assert_eq!(parsed.stack.len(), 1);
        assert_eq!(parsed.stack[0].view, StackView::NotFound);
    }

    #[test]
    fn test_forbidden_short_circuits() {
        let perms = PermissionSet::new().with_perm("codeholders.read");
        let parsed = parse_tree_url("/members/42/edit/history", None, &tree(), &perms);

        assert_eq!(parsed.stack.len(), 1);
        assert_eq!(parsed.stack[0].view, StackView::Forbidden);
        assert_eq!(parsed.stack[0].view_path, "/members/42/edit/history");
    }

    #[test]
    fn test_dummy_perms_allow_everything() {
        let parsed = parse_tree_url("/members/42/edit", None, &tree(), &PermissionSet::dummy());
        assert_eq!(parsed.stack.len(), 2);
        assert!(parsed.stack.iter().all(|i| !i.view.is_placeholder()));
    }

    #[test]
    fn test_state_route_without_level_is_not_found() {
        let tree = RouteTree::new([Route::state("search", "search")]);
        let parsed = parse_tree_url("/search", None, &tree, &all_perms());
        assert_eq!(parsed.stack[0].view, StackView::NotFound);
    }

    #[test]
    fn test_bottom_clears_previous_levels() {
        let tree = RouteTree::new([Route::stack("a").with_match_key("a").with_child(
            Route::bottom("b").with_id("b").with_child(Route::stack("c")),
        )]);
        let parsed = parse_tree_url("/a/b/c", None, &tree, &all_perms());

        assert_eq!(view_paths(&parsed), vec!["/a/b", "/a/b/c"]);
        assert_eq!(parsed.stack[0].view.route().unwrap().id(), Some("b"));
        assert!(parsed.stack[1].matches.get("a").is_none());
    }

    #[test]
    fn test_view_paths_are_strict_prefixes() {
        let parsed = parse_tree_url("/members/42/files", None, &tree(), &all_perms());
        for pair in parsed.stack.windows(2) {
            let lower = split_segments(&pair[0].view_path);
            let upper = split_segments(&pair[1].view_path);
            assert!(lower.len() < upper.len());
            assert_eq!(&upper[..lower.len()], &lower[..]);
        }
    }

    #[test]
    fn test_parse_is_idempotent() {
        let perms = all_perms();
        let tree = tree();
        let first = parse_tree_url("/members/42/edit?x=1", None, &tree, &perms);
        let second = parse_tree_url("/members/42/edit?x=1", None, &tree, &perms);
        assert_eq!(first, second);
    }

    #[test]
    fn test_persisted_state_restores_matching_levels() {
        let persisted = HistoryState::new(
            1,
            vec![
                PersistedItem {
                    view_path: "/members".to_string(),
                    data: Some(json!({"selected": [42]})),
                    query: "filter=active".to_string(),
                },
                PersistedItem {
                    view_path: "/members/43".to_string(),
                    data: Some(json!("stale")),
                    query: String::new(),
                },
            ],
            "/members/42",
        );
        let parsed = parse_tree_url("/members/42", Some(&persisted), &tree(), &all_perms());

        assert_eq!(parsed.stack[0].data, Some(json!({"selected": [42]})));
        assert_eq!(parsed.stack[0].query, "filter=active");
        assert_eq!(parsed.stack[1].data, None);
    }

    #[test]
    fn test_truncated_query_recovered_from_href() {
        let persisted = HistoryState::new(0, Vec::new(), "/lists?long=query");
        let parsed = parse_tree_url("/lists?T", Some(&persisted), &tree(), &all_perms());
        assert_eq!(parsed.query, "long=query");
        assert_eq!(parsed.stack[0].query, "long=query");
    }

    #[test]
    fn test_truncated_query_without_history_is_dropped() {
        let parsed = parse_tree_url("/lists?T", None, &tree(), &all_perms());
        assert_eq!(parsed.query, "");
        assert_eq!(parsed.stack.len(), 1);

        let foreign = HistoryState::new(0, Vec::new(), "/members?other=path");
        let parsed = parse_tree_url("/lists?T", Some(&foreign), &tree(), &all_perms());
        assert_eq!(parsed.query, "");
    }
}
