//! Detail page of a single record, with an `/edit` state.

use crm_core::location::parent_path;
use crm_core::{PageAction, PageMeta};
use leptos::prelude::*;
use serde::{Deserialize, Serialize};

use super::{last_segment, segment_title};
use crate::components::navigation::PageProps;
use crate::error::PageError;

stylance::import_crate_style!(css, "src/pages/pages.module.css");

/// Sub-pages reachable from a record, by parent section.
const RECORD_LINKS: &[(&str, &[(&str, &str)])] = &[
    ("codeholders", &[("history", "History"), ("files", "Files")]),
    ("congresses", &[("instances", "Instances")]),
];

/// Codeholder opened on top of a vote record.
const VOTE_AUTHOR: &str = "/codeholders/1";

/// Unsaved edits, kept in the level's page data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Draft {
    notes: String,
}

fn read_draft(data: Option<serde_json::Value>) -> Result<Draft, PageError> {
    match data {
        None => Ok(Draft::default()),
        Some(value) => {
            serde_json::from_value(value).map_err(|e| PageError::CorruptData(e.to_string()))
        }
    }
}

#[component]
pub fn RecordPage(props: PageProps) -> Result<impl IntoView, PageError> {
    let id = props
        .captures
        .first()
        .filter(|id| !id.is_empty())
        .cloned()
        .ok_or_else(|| PageError::InvalidParam {
            name: "id".to_string(),
            value: props.view_path.clone(),
        })?;

    let nav = props.nav;
    let section = last_segment(&parent_path(&props.view_path)).to_string();
    let title = format!("{} #{}", segment_title(&section), id);
    let links = RECORD_LINKS
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, links)| *links)
        .unwrap_or_default();
    let is_vote = section == "votes";

    let editing = Signal::derive(move || props.state.get().iter().any(|h| h.key == "edit"));
    let edit_handle = move || props.state.get().into_iter().find(|h| h.key == "edit");

    let meta_title = title.clone();
    Effect::new(move |_| {
        let actions = if editing.get() {
            Vec::new()
        } else {
            vec![PageAction {
                id: "edit".to_string(),
                label: "Edit".to_string(),
            }]
        };
        nav.set_meta(PageMeta {
            title: Some(meta_title.clone()),
            actions,
        });
    });

    let matches = props.matches;
    let data = props.data;
    let draft = move || read_draft(data.get());

    let on_notes = move |ev: leptos::ev::Event| {
        let draft = Draft {
            notes: event_target_value(&ev),
        };
        match serde_json::to_value(&draft) {
            Ok(value) => {
                nav.set_data(Some(value));
                nav.set_dirty(true);
            }
            Err(e) => log::error!("Failed to store draft: {}", e),
        }
    };

    let finish_editing = move |keep: bool| {
        nav.set_dirty(false);
        if !keep {
            nav.set_data(None);
        }
        if let Some(handle) = edit_handle() {
            nav.pop_state(&handle, false);
        }
    };

    Ok(view! {
        <div class=css::page>
            <h2>{title}</h2>
            <dl class=css::matches>
                {move || {
                    matches
                        .get()
                        .into_iter()
                        .map(|(key, captures)| {
                            let value = captures.first().cloned().unwrap_or_default();
                            view! {
                                <dt>{key}</dt>
                                <dd>{value}</dd>
                            }
                        })
                        .collect::<Vec<_>>()
                }}
            </dl>
            {move || {
                draft()
                    .map(|draft| {
                        if editing.get() {
                            view! {
                                <div class=css::form>
                                    <textarea
                                        class=css::notes
                                        prop:value=draft.notes
                                        on:input=on_notes
                                    />
                                    <div class=css::buttons>
                                        <button class=css::button on:click=move |_| {
                                            finish_editing(true)
                                        }>"Save"</button>
                                        <button class=css::secondary on:click=move |_| {
                                            finish_editing(false)
                                        }>"Cancel"</button>
                                    </div>
                                </div>
                            }
                            .into_any()
                        } else {
                            view! { <p class=css::notesView>{draft.notes}</p> }.into_any()
                        }
                    })
            }}
            <div class=css::buttons>
                {links
                    .iter()
                    .map(|(segment, label)| {
                        view! {
                            <button class=css::secondary on:click=move |_| {
                                nav.push(segment, false);
                            }>{*label}</button>
                        }
                    })
                    .collect::<Vec<_>>()}
                {is_vote.then(|| view! {
                    <button class=css::secondary on:click=move |_| {
                        nav.open(VOTE_AUTHOR);
                    }>"Open author"</button>
                })}
                <button class=css::secondary on:click=move |_| {
                    nav.pop(false);
                }>"Close"</button>
            </div>
        </div>
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_is_an_empty_draft() {
        assert_eq!(read_draft(None), Ok(Draft::default()));
    }

    #[test]
    fn test_stored_draft_reads_back() {
        let value = serde_json::json!({ "notes": "call back on monday" });
        assert_eq!(
            read_draft(Some(value)).map(|d| d.notes),
            Ok("call back on monday".to_string())
        );
    }

    #[test]
    fn test_foreign_data_is_corrupt() {
        let value = serde_json::json!([1, 2, 3]);
        assert!(matches!(read_draft(Some(value)), Err(PageError::CorruptData(_))));
    }
}
