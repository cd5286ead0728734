//! Navigation stack items.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::route::Route;

/// Captures accumulated along the stack, keyed by each route's match key.
pub type Matches = BTreeMap<String, Vec<String>>;

/// What a stack level displays.
#[derive(Clone)]
pub enum StackView {
    /// A page from the route tree.
    Route(Arc<Route>),
    /// No route matched the URL.
    NotFound,
    /// A route matched but its guard denied access.
    Forbidden,
}

impl StackView {
    pub fn route(&self) -> Option<&Arc<Route>> {
        match self {
            Self::Route(route) => Some(route),
            Self::NotFound | Self::Forbidden => None,
        }
    }

    pub fn component(&self) -> Option<&str> {
        self.route().and_then(|route| route.component())
    }

    pub fn is_placeholder(&self) -> bool {
        !matches!(self, Self::Route(_))
    }
}

/// Views are equal when they are the same route node, not an equal one.
impl PartialEq for StackView {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Route(a), Self::Route(b)) => Arc::ptr_eq(a, b),
            (Self::NotFound, Self::NotFound) | (Self::Forbidden, Self::Forbidden) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for StackView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Route(route) => f
                .debug_tuple("Route")
                .field(&route.id().or(route.component()))
                .finish(),
            Self::NotFound => write!(f, "NotFound"),
            Self::Forbidden => write!(f, "Forbidden"),
        }
    }
}

/// Marker for an active state-kind segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlState {
    /// The URL segment that activated the state.
    pub segment: String,
}

/// A page action shown in the app bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAction {
    pub id: String,
    pub label: String,
}

/// Title and actions reported by the mounted page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub title: Option<String>,
    pub actions: Vec<PageAction>,
}

/// One view level of the navigation stack.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationStackItem {
    pub view: StackView,
    /// Path up to and including this level's segment.
    pub view_path: String,
    /// State segments attached to this level, e.g. `/edit`.
    pub state_path: String,
    /// Captures of this level's segment.
    pub captures: Vec<String>,
    /// Captures of this level and all levels below, by match key.
    pub matches: Matches,
    /// Active state-kind segments in the order they appear in the URL.
    pub state: Vec<(String, UrlState)>,
    /// Live for the top level, frozen at its last value for all others.
    pub query: String,
    /// Opaque page payload round-tripped through history state.
    pub data: Option<Value>,
    pub meta: PageMeta,
    pub scroll_top: Option<f64>,
}

impl NavigationStackItem {
    pub fn new(view: StackView, view_path: impl Into<String>) -> Self {
        Self {
            view,
            view_path: view_path.into(),
            state_path: String::new(),
            captures: Vec::new(),
            matches: Matches::new(),
            state: Vec::new(),
            query: String::new(),
            data: None,
            meta: PageMeta::default(),
            scroll_top: None,
        }
    }

    pub fn not_found(view_path: impl Into<String>) -> Self {
        Self::new(StackView::NotFound, view_path)
    }

    pub fn forbidden(view_path: impl Into<String>) -> Self {
        Self::new(StackView::Forbidden, view_path)
    }

    /// `view_path` followed by `state_path`.
    pub fn full_path(&self) -> String {
        if self.state_path.is_empty() {
            self.view_path.clone()
        } else if self.view_path == "/" {
            self.state_path.clone()
        } else {
            format!("{}{}", self.view_path, self.state_path)
        }
    }

    /// Same route node at the same path.
    pub fn same_identity(&self, other: &Self) -> bool {
        self.view == other.view && self.view_path == other.view_path
    }

    pub fn has_state(&self, key: &str) -> bool {
        self.state.iter().any(|(k, _)| k == key)
    }

    pub fn state_keys(&self) -> impl Iterator<Item = &str> {
        self.state.iter().map(|(k, _)| k.as_str())
    }

    pub(crate) fn attach_state(&mut self, key: &str, segment: &str) {
        self.state.push((
            key.to_string(),
            UrlState {
                segment: segment.to_string(),
            },
        ));
        self.state_path.push('/');
        self.state_path.push_str(segment);
    }

    /// Drop the state `key` and every state attached after it.
    pub(crate) fn truncate_state(&mut self, key: &str) -> bool {
        let Some(pos) = self.state.iter().position(|(k, _)| k == key) else {
            return false;
        };
        self.state.truncate(pos);
        self.state_path = self
            .state
            .iter()
            .map(|(_, s)| format!("/{}", s.segment))
            .collect();
        true
    }
}
