//! API Client

use serde::de::DeserializeOwned;
use storefront_core::{
    ErrorCode,
    wire::{
        CheckoutBody, CheckoutResponse, ErrorResponse, ProductResponse, SendDownloadRequest,
        SendDownloadResponse, VerifySessionResponse,
    },
};

/// A failed call as the pages see it
#[derive(Clone, Debug)]
pub struct ApiError {
    pub message: String,
    /// Present when the server answered with an error body
    pub code: Option<ErrorCode>,
}

impl ApiError {
    fn transport(err: &reqwest::Error) -> Self {
        Self {
            message: err.to_string(),
            code: None,
        }
    }

    fn from_body(body: ErrorResponse) -> Self {
        Self {
            message: body.error,
            code: Some(body.code),
        }
    }
}

/// reqwest on WASM needs absolute URLs
fn origin() -> String {
    web_sys::window()
        .and_then(|w| w.location().origin().ok())
        .unwrap_or_else(|| "http://localhost:3000".into())
}

fn endpoint(origin: &str, path: &str) -> String {
    format!("{}/api{path}", origin.trim_end_matches('/'))
}

async fn read<T: DeserializeOwned>(
    response: reqwest::Response,
    fallback: &str,
) -> Result<T, ApiError> {
    if response.status().is_success() {
        return response.json::<T>().await.map_err(|e| ApiError::transport(&e));
    }

    match response.json::<ErrorResponse>().await {
        Ok(body) => Err(ApiError::from_body(body)),
        Err(_) => Err(ApiError {
            message: fallback.into(),
            code: None,
        }),
    }
}

/// Product name, price and download link as configured on the server
pub async fn fetch_product() -> Result<ProductResponse, ApiError> {
    let response = reqwest::Client::new()
        .get(endpoint(&origin(), "/product"))
        .send()
        .await
        .map_err(|e| ApiError::transport(&e))?;

    read(response, "Failed to load product").await
}

/// Create a checkout session; returns the hosted payment page URL
pub async fn create_checkout(quantity: u32) -> Result<String, ApiError> {
    let body = CheckoutBody {
        quantity: Some(serde_json::Value::from(quantity)),
        price_id: None,
    };

    let response = reqwest::Client::new()
        .post(endpoint(&origin(), "/checkout"))
        .json(&body)
        .send()
        .await
        .map_err(|e| ApiError::transport(&e))?;

    let created: CheckoutResponse = read(response, "Failed to create checkout session").await?;
    Ok(created.url)
}

/// Ask the server whether the session the buyer came back with is paid
pub async fn verify_session(session_id: &str) -> Result<VerifySessionResponse, ApiError> {
    let response = reqwest::Client::new()
        .get(endpoint(&origin(), "/verify-session"))
        .query(&[("session_id", session_id)])
        .send()
        .await
        .map_err(|e| ApiError::transport(&e))?;

    read(response, "Failed to verify session").await
}

/// Email the download link to `email`
pub async fn send_download(email: &str) -> Result<(), ApiError> {
    let body = SendDownloadRequest {
        email: email.to_string(),
    };

    let response = reqwest::Client::new()
        .post(endpoint(&origin(), "/send-download"))
        .json(&body)
        .send()
        .await
        .map_err(|e| ApiError::transport(&e))?;

    let sent: SendDownloadResponse = read(response, "Failed to send email").await?;
    if sent.success {
        Ok(())
    } else {
        Err(ApiError {
            message: "Failed to send email".into(),
            code: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        assert_eq!(
            endpoint("https://shop.test/", "/checkout"),
            "https://shop.test/api/checkout"
        );
        assert_eq!(
            endpoint("http://localhost:3000", "/verify-session"),
            "http://localhost:3000/api/verify-session"
        );
    }

    #[test]
    fn test_error_body_keeps_code() {
        let body: ErrorResponse =
            serde_json::from_str(r#"{"error":"Payment not completed","code":"PAYMENT_INCOMPLETE"}"#)
                .unwrap();
        let err = ApiError::from_body(body);
        assert_eq!(err.message, "Payment not completed");
        assert_eq!(err.code, Some(ErrorCode::PaymentIncomplete));
    }
}
