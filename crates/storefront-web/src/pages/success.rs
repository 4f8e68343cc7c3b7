//! Success Page
//!
//! Where the gateway sends buyers back to. The purchase is confirmed with the
//! server before anything is shown; the redirect itself proves nothing.

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;
use storefront_core::{CheckoutFlow, FailureReason, FlowState};

use crate::api;
use crate::components::{PurchaseComplete, VerificationProblem};

#[component]
pub fn SuccessPage() -> impl IntoView {
    let session_id = use_query_map().with_untracked(|q| q.get("session_id"));
    let flow = RwSignal::new(CheckoutFlow::returning(session_id));

    if let Some(id) = flow.try_update(CheckoutFlow::start_verification).flatten() {
        leptos::task::spawn_local(async move {
            match api::verify_session(&id).await {
                Ok(purchase) => flow.update(|f| f.verification_succeeded(purchase)),
                Err(e) => flow.update(|f| f.verification_failed(FailureReason::from_code(e.code))),
            }
        });
    }

    view! {
        <div class="success">
            {move || match flow.with(|f| f.state().clone()) {
                FlowState::Success { purchase } => {
                    view! { <PurchaseComplete purchase=purchase /> }.into_any()
                }
                FlowState::VerificationFailed { reason } => {
                    view! { <VerificationProblem reason=reason /> }.into_any()
                }
                _ => view! { <p class="loading">"Verifying your purchase..."</p> }.into_any(),
            }}
        </div>
    }
}
