//! Root application module.
//!
//! Contains the main App component, AppContext definition, and
//! application-level setup logic following Leptos conventions.

use std::sync::Arc;

use crm_core::{PermissionSet, RouteTree};
use leptos::prelude::*;

use crate::components::{Navigation, Sidebar};
use crate::config::PERMISSIONS_KEY;
use crate::utils::cache;

// ============================================================================
// AppContext
// ============================================================================

/// Application-wide reactive context.
///
/// Provided at the root of the component tree and accessed from any child
/// with `use_context::<AppContext>()`.
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Permissions of the signed-in user. Starts out as the dummy set,
    /// which allows every route, until the real set is loaded.
    pub permissions: RwSignal<Arc<PermissionSet>>,
}

impl AppContext {
    pub fn new() -> Self {
        Self {
            permissions: RwSignal::new(Arc::new(PermissionSet::dummy())),
        }
    }

    /// Replace the permission set with the one the login flow stored.
    pub fn load_permissions(&self) {
        match cache::get::<PermissionSet>(PERMISSIONS_KEY) {
            Some(perms) => {
                log::info!("Loaded permissions");
                self.permissions.set(Arc::new(perms));
            }
            None => log::debug!("No stored permissions; keeping the dummy set"),
        }
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Root application component with error boundary.
///
/// - Creates and provides the global AppContext
/// - Loads permissions once mounted
/// - Renders the navigation stack next to the section sidebar
#[component]
pub fn App(routes: Arc<RouteTree>) -> impl IntoView {
    let ctx = AppContext::new();
    provide_context(ctx);

    Effect::new(move |_| ctx.load_permissions());

    view! {
        <ErrorBoundary
            fallback=|errors| view! {
                <div style="
                    max-width: 600px;
                    margin: 4rem auto;
                    padding: 2rem;
                    font-family: system-ui, sans-serif;
                ">
                    <h1 style="color: #d64545;">"Something went wrong"</h1>
                    <p>"An unexpected error occurred. Please try reloading the page."</p>
                    <ul style="color: #d64545;">
                        {move || errors.get()
                            .into_iter()
                            .map(|(_, e)| view! { <li>{e.to_string()}</li> })
                            .collect::<Vec<_>>()
                        }
                    </ul>
                    <button on:click=move |_| {
                        if let Some(window) = web_sys::window() {
                            let _ = window.location().reload();
                        }
                    }>
                        "Reload Page"
                    </button>
                </div>
            }
        >
            <Navigation routes=routes.clone() permissions=ctx.permissions>
                <Sidebar />
            </Navigation>
        </ErrorBoundary>
    }
}
