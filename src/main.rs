mod app;
mod components;
mod config;
mod error;
mod pages;
mod platform;
mod routes;
mod utils;

use std::sync::Arc;

use app::App;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::config::MOUNT_ELEMENT_ID;

fn main() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    wasm_logger::init(wasm_logger::Config::new(level));

    let routes = Arc::new(routes::admin_routes().expect("Admin route tree must be valid"));

    let root = document()
        .get_element_by_id(MOUNT_ELEMENT_ID)
        .expect("Failed to find #app element")
        .unchecked_into::<web_sys::HtmlElement>();

    mount_to(root, move || view! { <App routes=routes.clone() /> }).forget();
}
