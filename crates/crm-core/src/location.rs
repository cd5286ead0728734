//! URL splitting and path helpers.
//!
//! Locations are handled as `pathname` plus `query` (without the leading `?`).
//! Fragments are discarded.

use crate::config::TRUNCATED_QUERY;

/// A URL split into the parts navigation cares about.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    /// Normalized path, always starting with `/` and never ending with one
    /// (except for the root itself).
    pub pathname: String,
    /// Query string without the leading `?`.
    pub query: String,
}

impl Location {
    /// Parse an absolute (`https://host/path?q`) or root-relative (`/path?q`) URL.
    pub fn parse(url: &str) -> Self {
        let url = url.trim();
        let without_origin = match url.find("://") {
            Some(scheme_end) => {
                let rest = &url[scheme_end + 3..];
                rest.find(['/', '?']).map_or("", |i| &rest[i..])
            }
            None => url,
        };

        let without_fragment = without_origin
            .split_once('#')
            .map_or(without_origin, |(before, _)| before);

        let (path, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, query),
            None => (without_fragment, ""),
        };

        Self {
            pathname: normalize_path(path),
            query: query.to_string(),
        }
    }

    /// Whether the query is the truncation sentinel.
    pub fn is_truncated(&self) -> bool {
        self.query == TRUNCATED_QUERY
    }

    /// Format back into `pathname[?query]`.
    pub fn to_href(&self) -> String {
        format_location(&self.pathname, &self.query)
    }
}

/// Split a path into its non-empty segments.
///
/// The root path yields a single empty segment so that the route tree always
/// has something to match.
pub fn split_segments(path: &str) -> Vec<&str> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        vec![""]
    } else {
        segments
    }
}

/// Build the path for a run of segments, e.g. `["a", "b"]` -> `/a/b`.
pub fn path_of(segments: &[&str]) -> String {
    let joined = segments
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");
    format!("/{}", joined)
}

/// Normalize a raw path: collapse empty segments, ensure a leading slash.
pub fn normalize_path(path: &str) -> String {
    path_of(&split_segments(path))
}

/// Append a relative path (one or more segments) to `base`.
pub fn join_path(base: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = split_segments(base);
    segments.extend(relative.split('/').filter(|s| !s.is_empty()));
    path_of(&segments)
}

/// Remove the last segment of a path. The root is its own parent.
pub fn parent_path(path: &str) -> String {
    let segments = split_segments(path);
    path_of(&segments[..segments.len().saturating_sub(1)])
}

/// Whether `path` lies at or below `base`, compared segment by segment.
pub fn is_within(path: &str, base: &str) -> bool {
    let base = split_segments(base);
    let path = split_segments(path);
    base == [""] || path.starts_with(&base)
}

/// Format `pathname` and `query` as a location string.
pub fn format_location(pathname: &str, query: &str) -> String {
    if query.is_empty() {
        pathname.to_string()
    } else {
        format!("{}?{}", pathname, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_within() {
        assert!(is_within("/members/42", "/members"));
        assert!(is_within("/members", "/members"));
        assert!(is_within("/members", "/"));
        assert!(!is_within("/membership", "/members"));
        assert!(!is_within("/members/42/files", "/votes/7"));
    }

    #[test]
    fn test_parse_relative() {
        let loc = Location::parse("/members/42?filter=x#top");
        assert_eq!(loc.pathname, "/members/42");
        assert_eq!(loc.query, "filter=x");
    }

    #[test]
    fn test_parse_absolute() {
        let loc = Location::parse("https://admin.example.org/payments/?T");
        assert_eq!(loc.pathname, "/payments");
        assert!(loc.is_truncated());

        let loc = Location::parse("https://admin.example.org");
        assert_eq!(loc.pathname, "/");
        assert_eq!(loc.query, "");

        let loc = Location::parse("https://admin.example.org?q=1");
        assert_eq!(loc.pathname, "/");
        assert_eq!(loc.query, "q=1");
    }

    #[test]
    fn test_split_segments() {
        assert_eq!(split_segments("/"), vec![""]);
        assert_eq!(split_segments(""), vec![""]);
        assert_eq!(split_segments("//a///b/"), vec!["a", "b"]);
    }

    #[test]
    fn test_join_and_parent() {
        assert_eq!(join_path("/", "members"), "/members");
        assert_eq!(join_path("/members", "42/edit"), "/members/42/edit");
        assert_eq!(join_path("/members", ""), "/members");
        assert_eq!(parent_path("/members/42"), "/members");
        assert_eq!(parent_path("/members"), "/");
        assert_eq!(parent_path("/"), "/");
    }

    #[test]
    fn test_format_location() {
        assert_eq!(format_location("/a", ""), "/a");
        assert_eq!(format_location("/a", "b=c"), "/a?b=c");
        assert_eq!(Location::parse("/a?b=c").to_href(), "/a?b=c");
    }
}
