//! Page registry.
//!
//! Routes name their page by component key; [`render`] maps the key to a
//! view. The placeholders shown for unmatched and forbidden levels live here
//! too.

mod home;
mod placeholder;
mod record;
mod section;

use leptos::prelude::*;

use crate::components::navigation::PageProps;
use crate::error::PageError;

pub use home::HomePage;
pub use placeholder::{ForbiddenPage, NotFoundPage};
pub use record::RecordPage;
pub use section::SectionPage;

/// Render the page registered under `component`.
pub fn render(component: Option<&str>, props: PageProps) -> Result<AnyView, PageError> {
    match component {
        Some("home") => Ok(view! { <HomePage props=props /> }.into_any()),
        Some("section") => Ok(view! { <SectionPage props=props /> }.into_any()),
        Some("record") => Ok(view! { <RecordPage props=props /> }.into_any()),
        Some(other) => Err(PageError::UnknownComponent(other.to_string())),
        None => Err(PageError::UnknownComponent(props.view_path)),
    }
}

/// Human-readable title for a path segment, e.g. `payment-orgs` → `Payment orgs`.
pub fn segment_title(segment: &str) -> String {
    let text = segment.replace(['-', '_'], " ");
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Last segment of a view path.
pub fn last_segment(view_path: &str) -> &str {
    view_path.rsplit('/').next().unwrap_or_default()
}
