use crm_core::PageMeta;
use leptos::prelude::*;

use crate::components::navigation::PageProps;
use crate::config::APP_NAME;
use crate::routes::SECTIONS;

stylance::import_crate_style!(css, "src/pages/pages.module.css");

/// Start page with a tile per section.
#[component]
pub fn HomePage(props: PageProps) -> impl IntoView {
    let nav = props.nav;
    Effect::new(move |_| {
        nav.set_meta(PageMeta {
            title: Some(APP_NAME.to_string()),
            actions: Vec::new(),
        });
    });

    view! {
        <div class=css::tiles>
            {SECTIONS
                .iter()
                .map(|(segment, label)| {
                    let href = format!("/{}", segment);
                    view! {
                        <button class=css::tile on:click=move |_| {
                            nav.navigate(&href);
                        }>{*label}</button>
                    }
                })
                .collect::<Vec<_>>()}
        </div>
    }
}
