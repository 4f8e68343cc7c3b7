//! UI Components

use leptos::prelude::*;
use storefront_core::{FailureReason, ResendTracker, flow::SUPPORT_EMAIL, wire::VerifySessionResponse};

use crate::api;

/// Confirmation with the download link and the resend form
#[component]
pub fn PurchaseComplete(purchase: VerifySessionResponse) -> impl IntoView {
    let email = purchase.customer_email.unwrap_or_default();
    let asset_url = RwSignal::new(None::<String>);

    leptos::task::spawn_local(async move {
        if let Ok(product) = api::fetch_product().await {
            asset_url.set(Some(product.asset_url));
        }
    });

    view! {
        <section class="purchase-complete">
            <h1>"Thank you for your purchase!"</h1>
            <p>"Your book is ready."</p>
            {move || match asset_url.get() {
                Some(href) => view! {
                    <a href=href class="btn btn-primary" download="">"Download your book"</a>
                }
                .into_any(),
                None => view! { <p class="loading">"Preparing your download link..."</p> }.into_any(),
            }}
            <ResendForm email=email />
        </section>
    }
}

/// "Email me the link again". Every submit sends one more email.
#[component]
pub fn ResendForm(email: String) -> impl IntoView {
    let (email, set_email) = signal(email);
    let tracker = RwSignal::new(ResendTracker::default());

    let submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let address = email.get_untracked();
        if !tracker.try_update(|t| t.begin(&address)).unwrap_or(false) {
            return;
        }

        leptos::task::spawn_local(async move {
            let delivered = api::send_download(&address).await.is_ok();
            tracker.update(|t| t.finish(delivered));
        });
    };

    view! {
        <form class="resend" on:submit=submit>
            <label>"Send the download link to"</label>
            <input
                type="email"
                placeholder="you@example.com"
                prop:value=move || email.get()
                on:input=move |ev| set_email.set(event_target_value(&ev))
            />
            <button type="submit" class="btn" disabled=move || tracker.with(ResendTracker::is_sending)>
                {move || if tracker.with(ResendTracker::is_sending) { "Sending..." } else { "Email me the link" }}
            </button>
            <p class="status">{move || tracker.with(|t| t.status().message())}</p>
        </form>
    }
}

#[component]
pub fn VerificationProblem(reason: FailureReason) -> impl IntoView {
    let mailto = format!("mailto:{SUPPORT_EMAIL}");

    view! {
        <section class="verification-problem">
            <h1>"Something went wrong"</h1>
            <p class="error">{reason.message()}</p>
            <p>
                "Need help? Contact "
                <a href=mailto>{SUPPORT_EMAIL}</a>
            </p>
            <a href="/" class="btn">"Back to the store"</a>
        </section>
    }
}
