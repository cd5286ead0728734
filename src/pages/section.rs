//! Generic list page used by every section.

use crm_core::PageMeta;
use leptos::prelude::*;

use super::{last_segment, segment_title};
use crate::components::navigation::PageProps;

stylance::import_crate_style!(css, "src/pages/pages.module.css");

/// Rows shown by a section list.
const ROW_COUNT: u32 = 25;

/// Row id used to ask whether the section has record pages.
const SAMPLE_ROW: &str = "1";

/// Search text carried in the level query as `q=...`.
fn search_of(query: &str) -> String {
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("q="))
        .and_then(|raw| js_sys::decode_uri_component(&raw.replace('+', " ")).ok())
        .map(String::from)
        .unwrap_or_default()
}

fn query_of(search: &str) -> String {
    if search.is_empty() {
        String::new()
    } else {
        format!("q={}", String::from(js_sys::encode_uri_component(search)))
    }
}

#[component]
pub fn SectionPage(props: PageProps) -> impl IntoView {
    let nav = props.nav;
    let title = segment_title(last_segment(&props.view_path));

    let meta_title = title.clone();
    Effect::new(move |_| {
        nav.set_meta(PageMeta {
            title: Some(meta_title.clone()),
            actions: Vec::new(),
        });
    });

    let query = props.query;
    let search = Memo::new(move |_| search_of(&query.get()));
    let rows = Memo::new(move |_| {
        let needle = search.get().to_lowercase();
        (1..=ROW_COUNT)
            .map(|id| id.to_string())
            .filter(|id| needle.is_empty() || id.contains(&needle))
            .collect::<Vec<_>>()
    });

    let opens_rows = nav.can_push(SAMPLE_ROW);

    let on_input = move |ev: leptos::ev::Event| {
        nav.set_query(&query_of(&event_target_value(&ev)));
    };

    view! {
        <div class=css::page>
            <input
                class=css::search
                type="search"
                placeholder=format!("Search {}", title.to_lowercase())
                prop:value=move || search.get()
                on:input=on_input
            />
            <ul class=css::rows>
                <For
                    each=move || rows.get()
                    key=|id| id.clone()
                    children=move |id| {
                        let label = format!("#{}", id);
                        if opens_rows {
                            view! {
                                <li>
                                    <button class=css::row on:click=move |_| {
                                        nav.push(&id, false);
                                    }>{label}</button>
                                </li>
                            }
                            .into_any()
                        } else {
                            view! { <li class=css::entry>{label}</li> }.into_any()
                        }
                    }
                />
            </ul>
        </div>
    }
}
