//! Route tree.
//!
//! The tree is static, read-only data supplied by the application. Each node
//! matches exactly one path segment and decides whether the match opens a new
//! view level ([`RouteKind::Stack`]), switches top-level section
//! ([`RouteKind::Bottom`]) or attaches sub-state to the current level
//! ([`RouteKind::State`]).

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::RouteError;
use crate::permissions::Permissions;

// ============================================================================
// Pattern
// ============================================================================

/// What a route matches against a single path segment.
#[derive(Clone)]
pub enum RoutePattern {
    /// Exact segment text.
    Literal(String),
    /// Regular expression, anchored to the whole segment.
    Regex(Regex),
}

impl RoutePattern {
    pub fn literal(segment: impl Into<String>) -> Self {
        Self::Literal(segment.into())
    }

    /// Compile a regex pattern. The pattern is anchored on both ends.
    pub fn regex(pattern: &str) -> Result<Self, RouteError> {
        Regex::new(&format!("^(?:{})$", pattern))
            .map(Self::Regex)
            .map_err(|source| RouteError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Match a segment, returning the whole match followed by every capture
    /// group. Groups that did not participate are empty strings.
    pub fn captures(&self, segment: &str) -> Option<Vec<String>> {
        match self {
            Self::Literal(literal) => (literal.as_str() == segment).then(|| vec![segment.to_string()]),
            Self::Regex(regex) => regex.captures(segment).map(|caps| {
                caps.iter()
                    .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                    .collect()
            }),
        }
    }
}

impl fmt::Debug for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "Literal({:?})", literal),
            Self::Regex(regex) => write!(f, "Regex({:?})", regex.as_str()),
        }
    }
}

impl From<&str> for RoutePattern {
    fn from(segment: &str) -> Self {
        Self::literal(segment)
    }
}

// ============================================================================
// Route
// ============================================================================

/// How a matched route affects the view stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKind {
    /// Clears the stack, then opens a new level (top-level section).
    Bottom,
    /// Opens a new level on top of the stack.
    Stack,
    /// Attaches sub-state named `key` to the current top level.
    State { key: String },
}

/// Permission gate evaluated when a route matches.
pub type RouteGuard = Arc<dyn Fn(&dyn Permissions) -> bool + Send + Sync>;

/// A node of the route tree.
pub struct Route {
    id: Option<String>,
    pattern: RoutePattern,
    match_key: Option<String>,
    kind: RouteKind,
    guard: Option<RouteGuard>,
    component: Option<String>,
    children: Vec<Arc<Route>>,
}

impl Route {
    pub fn new(kind: RouteKind, pattern: impl Into<RoutePattern>) -> Self {
        Self {
            id: None,
            pattern: pattern.into(),
            match_key: None,
            kind,
            guard: None,
            component: None,
            children: Vec::new(),
        }
    }

    pub fn bottom(pattern: impl Into<RoutePattern>) -> Self {
        Self::new(RouteKind::Bottom, pattern)
    }

    pub fn stack(pattern: impl Into<RoutePattern>) -> Self {
        Self::new(RouteKind::Stack, pattern)
    }

    pub fn state(key: impl Into<String>, pattern: impl Into<RoutePattern>) -> Self {
        Self::new(RouteKind::State { key: key.into() }, pattern)
    }

    /// Page id reported by [`NavigationState::current_page_id`](crate::NavigationState::current_page_id).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Store this segment's captures under `key` in the accumulated matches.
    pub fn with_match_key(mut self, key: impl Into<String>) -> Self {
        self.match_key = Some(key.into());
        self
    }

    pub fn with_guard<G>(mut self, guard: G) -> Self
    where
        G: Fn(&dyn Permissions) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Arc::new(guard));
        self
    }

    /// Shorthand for a guard requiring a single permission.
    pub fn requires_perm(self, perm: impl Into<String>) -> Self {
        let perm = perm.into();
        self.with_guard(move |perms| perms.has_perm(&perm))
    }

    /// Key of the page component mounted for this route.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn with_child(mut self, child: Route) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Route>) -> Self {
        self.children.extend(children.into_iter().map(Arc::new));
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn match_key(&self) -> Option<&str> {
        self.match_key.as_deref()
    }

    pub fn kind(&self) -> &RouteKind {
        &self.kind
    }

    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }

    pub fn children(&self) -> &[Arc<Route>] {
        &self.children
    }

    /// Evaluate the guard. Dummy permissions allow everything.
    pub fn is_allowed(&self, perms: &dyn Permissions) -> bool {
        if perms.is_dummy() {
            return true;
        }
        self.guard.as_ref().is_none_or(|guard| guard(perms))
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("id", &self.id)
            .field("pattern", &self.pattern)
            .field("match_key", &self.match_key)
            .field("kind", &self.kind)
            .field("has_guard", &self.guard.is_some())
            .field("component", &self.component)
            .field("children", &self.children.len())
            .finish()
    }
}

// ============================================================================
// Tree
// ============================================================================

/// The root list of the route tree.
#[derive(Debug, Clone, Default)]
pub struct RouteTree {
    roots: Vec<Arc<Route>>,
}

impl RouteTree {
    pub fn new(roots: impl IntoIterator<Item = Route>) -> Self {
        Self {
            roots: roots.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn roots(&self) -> &[Arc<Route>] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// First route in `candidates` matching `segment`, with its captures.
///
/// Order in the tree is the tie-break.
pub fn find_route<'a>(
    candidates: &'a [Arc<Route>],
    segment: &str,
) -> Option<(&'a Arc<Route>, Vec<String>)> {
    candidates
        .iter()
        .find_map(|route| route.pattern.captures(segment).map(|caps| (route, caps)))
}
