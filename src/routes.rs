//! Route tree of the admin application.
//!
//! Every top-level section is a [`Route::bottom`]; selecting one from the
//! sidebar replaces the whole stack. Records open as [`Route::stack`] levels
//! on top of their section, and editing is a [`Route::state`] of the record.

use crm_core::{Route, RouteError, RoutePattern, RouteTree};

/// Numeric record id, captured as `id`.
const ID_PATTERN: &str = r"\d+";

/// Top-level sections shown in the sidebar, as `(segment, label)`.
pub const SECTIONS: &[(&str, &str)] = &[
    ("codeholders", "Codeholders"),
    ("payments", "Payments"),
    ("votes", "Votes"),
    ("congresses", "Congresses"),
    ("newsletters", "Newsletters"),
    ("lists", "Lists"),
];

pub fn admin_routes() -> Result<RouteTree, RouteError> {
    Ok(RouteTree::new([
        Route::bottom("").with_id("home").with_component("home"),
        codeholders()?,
        payments()?,
        votes()?,
        congresses()?,
        Route::bottom("newsletters")
            .with_id("newsletters")
            .with_component("section")
            .requires_perm("newsletters.read"),
        Route::bottom("lists")
            .with_id("lists")
            .with_component("section")
            .requires_perm("lists.read"),
    ]))
}

/// A record level: `/<id>` with an `/edit` state.
fn record(
    id: &str,
    pattern: &str,
    match_key: &str,
    update_perm: &str,
) -> Result<Route, RouteError> {
    Ok(Route::stack(RoutePattern::regex(pattern)?)
        .with_id(id)
        .with_match_key(match_key)
        .with_component("record")
        .with_child(
            Route::state("edit", "edit")
                .with_id(format!("{}-edit", id))
                .requires_perm(update_perm),
        ))
}

fn codeholders() -> Result<Route, RouteError> {
    Ok(Route::bottom("codeholders")
        .with_id("codeholders")
        .with_component("section")
        .requires_perm("codeholders.read")
        .with_child(
            record("codeholder", ID_PATTERN, "id", "codeholders.update")?.with_children([
                Route::stack("history")
                    .with_id("codeholder-history")
                    .with_component("section")
                    .requires_perm("codeholders.hist.read"),
                Route::stack("files")
                    .with_id("codeholder-files")
                    .with_component("section")
                    .requires_perm("codeholders.files.read"),
            ]),
        ))
}

fn payments() -> Result<Route, RouteError> {
    Ok(Route::bottom("payments")
        .with_id("payments")
        .with_component("section")
        .requires_perm("pay.read")
        .with_children([
            Route::stack("orgs")
                .with_id("payment-orgs")
                .with_component("section")
                .requires_perm("pay.orgs.read")
                .with_child(record("payment-org", ID_PATTERN, "id", "pay.orgs.update")?),
            Route::stack("intents")
                .with_id("payment-intents")
                .with_component("section")
                .requires_perm("pay.intents.read")
                .with_child(record("payment-intent", r"\w+", "intent", "pay.intents.update")?),
        ]))
}

fn votes() -> Result<Route, RouteError> {
    Ok(Route::bottom("votes")
        .with_id("votes")
        .with_component("section")
        .requires_perm("votes.read")
        .with_child(record("vote", ID_PATTERN, "id", "votes.update")?))
}

fn congresses() -> Result<Route, RouteError> {
    Ok(Route::bottom("congresses")
        .with_id("congresses")
        .with_component("section")
        .requires_perm("congresses.read")
        .with_child(
            record("congress", ID_PATTERN, "id", "congresses.update")?.with_child(
                Route::stack("instances")
                    .with_id("congress-instances")
                    .with_component("section")
                    .with_child(record(
                        "congress-instance",
                        ID_PATTERN,
                        "instance",
                        "congresses.update",
                    )?),
            ),
        ))
}
