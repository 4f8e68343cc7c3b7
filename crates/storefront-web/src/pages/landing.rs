//! Landing Page

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;
use storefront_core::{CheckoutFlow, wire::ProductResponse};

use crate::api;

#[component]
pub fn LandingPage() -> impl IntoView {
    let product = RwSignal::new(None::<ProductResponse>);
    let load_error = RwSignal::new(None::<String>);
    let flow = RwSignal::new(CheckoutFlow::new());

    // The gateway's cancel URL points back here with ?canceled=true
    let canceled = use_query_map().with_untracked(|q| q.get("canceled").is_some());

    leptos::task::spawn_local(async move {
        match api::fetch_product().await {
            Ok(loaded) => product.set(Some(loaded)),
            Err(e) => load_error.set(Some(e.message)),
        }
    });

    let buy = move |_| {
        if !flow.try_update(CheckoutFlow::start_checkout).unwrap_or(false) {
            return;
        }

        leptos::task::spawn_local(async move {
            match api::create_checkout(1).await {
                Ok(url) => {
                    let target = flow
                        .try_update(|f| f.session_created(url).map(ToString::to_string))
                        .flatten();
                    let navigated = target.is_some_and(|url| {
                        web_sys::window().is_some_and(|w| w.location().set_href(&url).is_ok())
                    });
                    if !navigated {
                        flow.update(|f| f.session_failed("Unable to open the checkout page"));
                    }
                }
                Err(e) => flow.update(|f| f.session_failed(e.message)),
            }
        });
    };

    view! {
        <div class="landing">
            <header class="hero">
                {move || match product.get() {
                    Some(p) => view! {
                        <h1>{p.name}</h1>
                        <p class="tagline">{p.description}</p>
                        <div class="price">{p.display_price}</div>
                    }
                    .into_any(),
                    None => match load_error.get() {
                        Some(message) => view! { <p class="error">{message}</p> }.into_any(),
                        None => view! { <p class="loading">"Loading..."</p> }.into_any(),
                    },
                }}
                <div class="cta">
                    <button
                        class="btn btn-primary"
                        on:click=buy
                        disabled=move || product.with(Option::is_none) || flow.with(CheckoutFlow::is_busy)
                    >
                        {move || if flow.with(CheckoutFlow::is_busy) { "Processing..." } else { "Buy Now" }}
                    </button>
                </div>
                <Show when=move || canceled>
                    <p class="notice">"Checkout canceled. You have not been charged."</p>
                </Show>
                {move || {
                    flow.with(|f| f.last_error().map(ToString::to_string))
                        .map(|message| view! { <p class="error">{message}</p> })
                }}
            </header>
        </div>
    }
}
