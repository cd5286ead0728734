//! Stack navigation.
//!
//! Mounts the [`NavigationController`] on the browser and renders its stack:
//!
//! - **URL is the source of truth**: the stack is re-derived from the
//!   location on every transition and on back/forward
//! - **Levels are keyed**: a level stays mounted while its depth and view
//!   path are unchanged, so query edits never remount a page
//! - **popstate/beforeunload**: native listeners forward to the controller
//! - **Render errors**: each level has its own error boundary

mod context;
mod level;
mod page;

use std::sync::Arc;

use crm_core::{NavRequest, NavigationController, PermissionSet, Permissions, RouteTree};
use leptos::prelude::*;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::Closure;

use crate::config::{APP_NAME, navigation_config};
use crate::platform::WebPlatform;

pub use context::{NavigationContext, use_navigation};
pub use level::{LevelKey, StackLevel};
pub use page::{PageNav, PageProps};

stylance::import_crate_style!(css, "src/components/navigation/navigation.module.css");

#[component]
pub fn Navigation(
    routes: Arc<RouteTree>,
    #[prop(into)] permissions: Signal<Arc<PermissionSet>>,
    children: Children,
) -> impl IntoView {
    let platform = WebPlatform::new();
    let timers = platform.timer_slot();
    let perms: Arc<dyn Permissions> = permissions.get_untracked();
    let controller = NavigationController::mount(platform, routes, perms, navigation_config());

    let ctx = NavigationContext::new(controller);
    timers.set(move |timer| {
        ctx.run(|c| c.on_timer(timer));
    });
    provide_context(ctx);

    // Re-match the location whenever the permission set is replaced
    Effect::new(move |_| {
        let perms: Arc<dyn Permissions> = permissions.get();
        ctx.run(|c| c.set_permissions(perms));
    });

    #[cfg(target_arch = "wasm32")]
    install_listeners(ctx);

    let levels = Memo::new(move |_| {
        ctx.with(|c| {
            c.state()
                .items()
                .iter()
                .enumerate()
                .map(|(index, item)| LevelKey::new(index, item))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default()
    });

    view! {
        <div class=css::layout>
            <aside class=css::sidebar>{children()}</aside>
            <div class=css::main>
                <AppBar />
                <div class=css::stack>
                    <For
                        each=move || levels.get()
                        key=|level| level.clone()
                        children=|level| view! { <StackLevel level=level /> }
                    />
                </div>
            </div>
        </div>
    }
}

/// Title and actions of the top page.
///
/// An action's id is a segment pushed on top of the current page.
#[component]
fn AppBar() -> impl IntoView {
    let ctx = use_navigation();

    let title = Memo::new(move |_| {
        ctx.with(|c| c.state().top().meta.title.clone())
            .flatten()
            .unwrap_or_else(|| APP_NAME.to_string())
    });
    let actions = Memo::new(move |_| {
        ctx.with(|c| (c.state().top_index(), c.state().top().meta.actions.clone()))
            .unwrap_or_default()
    });

    view! {
        <header class=css::appBar>
            <h1 class=css::title>{title}</h1>
            <div class=css::actions>
                <For
                    each=move || {
                        let (index, actions) = actions.get();
                        actions.into_iter().map(move |action| (index, action))
                    }
                    key=|(index, action)| (*index, action.id.clone())
                    children=move |(index, action)| {
                        let segment = action.id.clone();
                        view! {
                            <button
                                class=css::button
                                on:click=move |_| {
                                    ctx.request(NavRequest::Push {
                                        index,
                                        segment: segment.clone(),
                                        replace: false,
                                    });
                                }
                            >
                                {action.label}
                            </button>
                        }
                    }
                />
            </div>
        </header>
    }
}

// ============================================================================
// Browser events
// ============================================================================

#[cfg(target_arch = "wasm32")]
fn install_listeners(ctx: NavigationContext) {
    use wasm_bindgen::JsCast;

    use crate::platform::decode_history_state;
    use crate::utils::dom;

    let Some(window) = dom::window() else {
        log::error!("No window; navigation listeners not installed");
        return;
    };

    let on_pop_state = Closure::wrap(Box::new(move |event: web_sys::PopStateEvent| {
        let persisted = decode_history_state(event.state());
        let url = dom::current_location();
        ctx.run(|c| c.on_pop_state(&url, persisted));
    }) as Box<dyn Fn(web_sys::PopStateEvent)>);

    let on_before_unload = Closure::wrap(Box::new(move |event: web_sys::BeforeUnloadEvent| {
        if ctx.with_untracked(|c| c.before_unload()).unwrap_or(false) {
            event.prevent_default();
            event.set_return_value(crm_core::config::DIRTY_CONFIRM_MESSAGE);
        }
    }) as Box<dyn Fn(web_sys::BeforeUnloadEvent)>);

    if let Err(e) = window
        .add_event_listener_with_callback("popstate", on_pop_state.as_ref().unchecked_ref())
    {
        log::error!("Failed to listen for popstate: {:?}", e);
    }
    if let Err(e) = window.add_event_listener_with_callback(
        "beforeunload",
        on_before_unload.as_ref().unchecked_ref(),
    ) {
        log::error!("Failed to listen for beforeunload: {:?}", e);
    }

    // Keep the closures alive for the lifetime of the app
    on_pop_state.forget();
    on_before_unload.forget();
}
