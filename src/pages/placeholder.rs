use leptos::prelude::*;

use crate::components::navigation::PageNav;

stylance::import_crate_style!(css, "src/pages/pages.module.css");

#[component]
pub fn NotFoundPage(nav: PageNav) -> impl IntoView {
    view! {
        <div class=css::placeholder>
            <h2>"Page not found"</h2>
            <p>"Nothing lives at this address."</p>
            <button class=css::button on:click=move |_| {
                nav.navigate("/");
            }>"Go to start"</button>
        </div>
    }
}

#[component]
pub fn ForbiddenPage(nav: PageNav) -> impl IntoView {
    view! {
        <div class=css::placeholder>
            <h2>"Access denied"</h2>
            <p>"You do not have permission to view this page."</p>
            <button class=css::button on:click=move |_| {
                nav.navigate("/");
            }>"Go to start"</button>
        </div>
    }
}
