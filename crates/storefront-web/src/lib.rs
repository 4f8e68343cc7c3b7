//! Storefront Web Frontend
//!
//! Leptos-based WASM frontend: the landing page with the buy button and the
//! success page the payment gateway returns buyers to.

mod api;
mod app;
mod components;
mod pages;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
