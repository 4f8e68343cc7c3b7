//! HTTP Handlers

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::Serialize;

use storefront_core::{
    CheckoutRequest, StorefrontError,
    wire::{
        CheckoutBody, CheckoutResponse, ErrorResponse, ProductResponse, SendDownloadRequest,
        SendDownloadResponse, VerifySessionQuery, VerifySessionResponse,
    },
};

use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub gateway: String,
    pub mailer: String,
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Log the full error, answer with the generic message only
fn api_error(context: &'static str, err: &StorefrontError) -> ApiError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        tracing::error!(kind = ?err.kind(), error = %err, "{context}");
    } else {
        tracing::warn!(kind = ?err.kind(), error = %err, "{context}");
    }

    (status, Json(ErrorResponse::from(err)))
}

fn bad_body(context: &'static str, rejection: &JsonRejection) -> ApiError {
    api_error(
        context,
        &StorefrontError::InvalidInput(format!("Invalid request body: {}", rejection.body_text())),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        gateway: state.gateway_name.clone(),
        mailer: state.notifier.mailer_name().to_string(),
    })
}

/// The product on sale, with the configured price and download link
pub async fn product_info(State(state): State<AppState>) -> Json<ProductResponse> {
    Json(state.product.as_ref().clone())
}

/// Create a hosted checkout session for the product
pub async fn create_checkout(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutBody>, JsonRejection>,
) -> ApiResult<CheckoutResponse> {
    let Json(body) = payload.map_err(|e| bad_body("Checkout error", &e))?;

    let request =
        CheckoutRequest::from_body(&body).map_err(|e| api_error("Checkout error", &e))?;

    let session = state
        .checkout
        .create(&request)
        .await
        .map_err(|e| api_error("Checkout error", &e))?;

    Ok(Json(CheckoutResponse {
        url: session.redirect_url,
    }))
}

/// Confirm that a returning buyer's session is paid
pub async fn verify_session(
    State(state): State<AppState>,
    query: Result<Query<VerifySessionQuery>, QueryRejection>,
) -> ApiResult<VerifySessionResponse> {
    let session_id = query.ok().and_then(|Query(q)| q.session_id);

    let purchase = state
        .verifier
        .verify(session_id.as_deref())
        .await
        .map_err(|e| api_error("Session verification error", &e))?;

    if state.fulfill_on_verify {
        if let Some(email) = purchase.customer_email() {
            // Delivery problems never change the verification answer
            if let Err(e) = state.notifier.send(email).await {
                tracing::warn!(
                    session_id = %purchase.session_id(),
                    error = %e,
                    "Automatic delivery failed"
                );
            }
        }
    }

    Ok(Json(VerifySessionResponse::from(&purchase)))
}

/// Email the download link (again)
pub async fn send_download(
    State(state): State<AppState>,
    payload: Result<Json<SendDownloadRequest>, JsonRejection>,
) -> ApiResult<SendDownloadResponse> {
    let Json(body) = payload.map_err(|e| bad_body("Send download error", &e))?;

    state
        .notifier
        .send(&body.email)
        .await
        .map_err(|e| api_error("Send download error", &e))?;

    Ok(Json(SendDownloadResponse { success: true }))
}
