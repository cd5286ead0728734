//! Section list shown next to the stack.

use crm_core::NavRequest;
use leptos::prelude::*;

use crate::components::navigation::use_navigation;
use crate::config::APP_NAME;
use crate::routes::SECTIONS;

stylance::import_crate_style!(css, "src/components/sidebar.module.css");

#[component]
pub fn Sidebar() -> impl IntoView {
    let ctx = use_navigation();

    // First segment of the current pathname
    let active = Memo::new(move |_| {
        ctx.with(|c| {
            c.state()
                .pathname()
                .trim_start_matches('/')
                .split('/')
                .next()
                .unwrap_or_default()
                .to_string()
        })
        .unwrap_or_default()
    });

    view! {
        <nav class=css::sidebar>
            <button class=css::brand on:click=move |_| {
                ctx.request(NavRequest::navigate("/"));
            }>{APP_NAME}</button>
            {SECTIONS
                .iter()
                .map(|(segment, label)| {
                    let class = move || {
                        if active.get() == *segment {
                            format!("{} {}", css::item, css::active)
                        } else {
                            css::item.to_string()
                        }
                    };
                    view! {
                        <a
                            class=class
                            href=format!("/{}", segment)
                            on:click=move |ev| {
                                ev.prevent_default();
                                ctx.request(NavRequest::navigate(format!("/{}", segment)));
                            }
                        >
                            {*label}
                        </a>
                    }
                })
                .collect::<Vec<_>>()}
        </nav>
    }
}
