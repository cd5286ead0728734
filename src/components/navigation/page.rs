//! What a mounted page receives from its stack level.

use crm_core::{Matches, NavOutcome, NavRequest, PageMeta, StateHandle};
use leptos::prelude::*;
use serde_json::Value;

use super::context::NavigationContext;

/// Navigation operations bound to one stack level.
#[derive(Clone, Copy)]
pub struct PageNav {
    index: usize,
    ctx: NavigationContext,
}

impl PageNav {
    pub fn new(index: usize, ctx: NavigationContext) -> Self {
        Self { index, ctx }
    }

    /// Open `segment` on top of this level.
    pub fn push(&self, segment: &str, replace: bool) -> NavOutcome {
        self.ctx.request(NavRequest::Push {
            index: self.index,
            segment: segment.to_string(),
            replace,
        })
    }

    /// Whether [`push`](Self::push) of `segment` would open a page rather
    /// than a NotFound level.
    pub fn can_push(&self, segment: &str) -> bool {
        self.ctx
            .with_untracked(|c| c.can_push(self.index, segment))
            .unwrap_or(false)
    }

    /// Close this level and everything above it.
    pub fn pop(&self, replace: bool) -> NavOutcome {
        self.ctx.request(NavRequest::Pop {
            index: self.index,
            replace,
        })
    }

    /// Leave one of this level's states.
    pub fn pop_state(&self, handle: &StateHandle, replace: bool) -> NavOutcome {
        self.ctx.request(handle.pop(replace))
    }

    pub fn navigate(&self, href: &str) -> NavOutcome {
        self.ctx.request(NavRequest::navigate(href))
    }

    /// Open `href` on top of the stack even though it lives elsewhere in
    /// the tree.
    pub fn open(&self, href: &str) -> NavOutcome {
        self.ctx.request(NavRequest::Navigate {
            href: href.to_string(),
            replace: false,
            out_of_tree: true,
        })
    }

    pub fn set_query(&self, query: &str) -> NavOutcome {
        self.ctx
            .run(|c| c.on_query_change(self.index, query))
            .unwrap_or(NavOutcome::Ignored)
    }

    pub fn set_data(&self, data: Option<Value>) {
        self.ctx.run(|c| c.set_data(self.index, data));
    }

    pub fn set_meta(&self, meta: PageMeta) {
        self.ctx.run(|c| c.set_meta(self.index, meta));
    }

    /// Mark unsaved edits; leaving the page then asks for confirmation.
    pub fn set_dirty(&self, dirty: bool) {
        self.ctx.run(|c| c.set_page_dirty(dirty));
    }
}

/// Everything a page component gets.
#[derive(Clone)]
pub struct PageProps {
    pub view_path: String,
    /// Captures of this level's own segment.
    pub captures: Vec<String>,
    pub matches: Signal<Matches>,
    pub query: Signal<String>,
    pub state: Signal<Vec<StateHandle>>,
    pub data: Signal<Option<Value>>,
    pub nav: PageNav,
}

impl PageProps {
    pub fn new(index: usize, view_path: String, ctx: NavigationContext) -> Self {
        let captures = ctx
            .with_untracked(|c| c.state().item(index).map(|item| item.captures.clone()))
            .flatten()
            .unwrap_or_default();

        Self {
            view_path,
            captures,
            matches: Signal::derive(move || {
                ctx.with(|c| c.state().item(index).map(|item| item.matches.clone()))
                    .flatten()
                    .unwrap_or_default()
            }),
            query: Signal::derive(move || {
                ctx.with(|c| c.state().item(index).map(|item| item.query.clone()))
                    .flatten()
                    .unwrap_or_default()
            }),
            state: Signal::derive(move || ctx.with(|c| c.state_handles(index)).unwrap_or_default()),
            data: Signal::derive(move || {
                ctx.with(|c| c.state().item(index).and_then(|item| item.data.clone()))
                    .flatten()
            }),
            nav: PageNav::new(index, ctx),
        }
    }
}
