//! One view level of the stack.

use crm_core::{NavigationStackItem, RecoveryAction, StackView};
use leptos::error::Errors;
use leptos::prelude::*;

use super::context::{NavigationContext, use_navigation};
use super::css;
use super::page::{PageNav, PageProps};
use crate::pages::{self, ForbiddenPage, NotFoundPage};

/// What a level shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LevelContent {
    Page(Option<String>),
    NotFound,
    Forbidden,
}

/// Identity of a rendered level.
///
/// A level is remounted only when its key changes; query or data updates
/// reach the mounted page through its signals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LevelKey {
    pub index: usize,
    pub view_path: String,
    pub content: LevelContent,
}

impl LevelKey {
    pub fn new(index: usize, item: &NavigationStackItem) -> Self {
        let content = match &item.view {
            StackView::Route(route) => LevelContent::Page(route.component().map(str::to_string)),
            StackView::NotFound => LevelContent::NotFound,
            StackView::Forbidden => LevelContent::Forbidden,
        };
        Self {
            index,
            view_path: item.view_path.clone(),
            content,
        }
    }
}

#[component]
pub fn StackLevel(level: LevelKey) -> impl IntoView {
    let ctx = use_navigation();
    let index = level.index;
    let nav = PageNav::new(index, ctx);

    let is_top = Signal::derive(move || ctx.with(|c| c.state().is_top(index)).unwrap_or(false));
    let class = move || {
        if is_top.get() {
            format!("{} {}", css::level, css::top)
        } else {
            css::level.to_string()
        }
    };

    // Restore the scroll position the level had when it was last shown.
    let node_ref = NodeRef::<leptos::html::Section>::new();
    let saved_scroll = ctx
        .with_untracked(|c| c.state().item(index).and_then(|item| item.scroll_top))
        .flatten();
    Effect::new(move |_| {
        if let Some(el) = node_ref.get()
            && let Some(top) = saved_scroll
        {
            el.set_scroll_top(top as i32);
        }
    });

    let on_scroll = move |ev: leptos::ev::Event| {
        let el = event_target::<web_sys::Element>(&ev);
        let top = f64::from(el.scroll_top());
        ctx.run(|c| c.set_scroll(index, top));
    };

    let content = match level.content {
        LevelContent::NotFound => view! { <NotFoundPage nav=nav /> }.into_any(),
        LevelContent::Forbidden => view! { <ForbiddenPage nav=nav /> }.into_any(),
        LevelContent::Page(component) => {
            let props = PageProps::new(index, level.view_path, ctx);
            view! {
                <ErrorBoundary fallback=move |errors| view! { <RenderFailure errors=errors /> }>
                    {pages::render(component.as_deref(), props)}
                </ErrorBoundary>
            }
            .into_any()
        }
    };

    view! {
        <section node_ref=node_ref class=class on:scroll=on_scroll>
            {content}
        </section>
    }
}

// ============================================================================
// Render failure
// ============================================================================

/// Shown in place of a page that failed to render.
///
/// Reports the failure to the controller once. While the reload budget
/// lasts the controller reloads by itself; after that the user gets a
/// reload button.
#[component]
fn RenderFailure(errors: ArcRwSignal<Errors>) -> impl IntoView {
    let ctx = use_navigation();
    let message = errors
        .get_untracked()
        .into_iter()
        .map(|(_, e)| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    let action = ctx.run(|c| c.on_render_error(&message));
    let manual = action != Some(RecoveryAction::AutoReload);

    view! {
        <div class=css::failure role="alert">
            <h2>"This page could not be shown"</h2>
            <details>
                <summary>"Error details"</summary>
                <pre>{message}</pre>
            </details>
            {if manual {
                view! { <ReloadButton ctx=ctx /> }.into_any()
            } else {
                view! { <p>"Reloading…"</p> }.into_any()
            }}
        </div>
    }
}

#[component]
fn ReloadButton(ctx: NavigationContext) -> impl IntoView {
    view! {
        <button class=css::button on:click=move |_| {
            ctx.run(|c| c.reload());
        }>"Reload page"</button>
    }
}
