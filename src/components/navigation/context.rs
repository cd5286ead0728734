//! Reactive handle to the navigation controller.

use crm_core::{NavOutcome, NavRequest, NavigationController};
use leptos::prelude::*;

use crate::platform::WebPlatform;

type Controller = NavigationController<WebPlatform>;

/// Shared access to the mounted [`NavigationController`].
///
/// The controller is not `Send` (it owns browser handles), so it lives in a
/// local [`StoredValue`]. Every mutation goes through [`run`](Self::run),
/// which mirrors the controller's revision into a signal; readers that go
/// through [`with`](Self::with) re-run when it changes.
#[derive(Clone, Copy)]
pub struct NavigationContext {
    controller: StoredValue<Controller, LocalStorage>,
    revision: RwSignal<u64>,
}

impl NavigationContext {
    pub fn new(controller: Controller) -> Self {
        let revision = RwSignal::new(controller.revision());
        Self {
            controller: StoredValue::new_local(controller),
            revision,
        }
    }

    /// Mutate the controller and publish the new revision.
    pub fn run<R>(&self, f: impl FnOnce(&mut Controller) -> R) -> Option<R> {
        let result = self.controller.try_update_value(f);
        self.sync_revision();
        result
    }

    /// Read the controller, tracking its revision.
    pub fn with<R>(&self, f: impl FnOnce(&Controller) -> R) -> Option<R> {
        self.revision.track();
        self.controller.try_with_value(f)
    }

    /// Read the controller without subscribing.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&Controller) -> R) -> Option<R> {
        self.controller.try_with_value(f)
    }

    pub fn request(&self, request: NavRequest) -> NavOutcome {
        self.run(|c| c.request(request)).unwrap_or(NavOutcome::Ignored)
    }

    fn sync_revision(&self) {
        if let Some(revision) = self.controller.try_with_value(|c| c.revision())
            && self.revision.get_untracked() != revision
        {
            self.revision.set(revision);
        }
    }
}

/// Get the navigation context provided by [`Navigation`](super::Navigation).
pub fn use_navigation() -> NavigationContext {
    use_context::<NavigationContext>().expect("NavigationContext must be provided by Navigation")
}
