//! End-to-end tests of the HTTP boundary against the in-memory gateway and
//! mailer.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use storefront_core::{PaymentStatus, Product, StoreUrls};
use storefront_mail::MemoryMailer;
use storefront_payments::MockGateway;
use storefront_server::{StoreSettings, app, state::AppState};

struct Harness {
    gateway: Arc<MockGateway>,
    mailer: Arc<MemoryMailer>,
    router: Router,
}

fn settings(fulfill_on_verify: bool) -> StoreSettings {
    StoreSettings {
        urls: StoreUrls::new("https://shop.test").unwrap(),
        product: Product::default(),
        mail_from: "noreply@shop.test".into(),
        asset_url: "https://shop.test/downloads/stand-out-and-scale.pdf".into(),
        fulfill_on_verify,
    }
}

fn harness(fulfill_on_verify: bool) -> Harness {
    harness_with(&settings(fulfill_on_verify))
}

fn harness_with(settings: &StoreSettings) -> Harness {
    let gateway = Arc::new(MockGateway::new());
    let mailer = Arc::new(MemoryMailer::new());
    let state = AppState::new(gateway.clone(), mailer.clone(), settings);

    Harness {
        gateway,
        mailer,
        router: app(state, None),
    }
}

async fn call(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// `https://checkout.mock.test/pay/<id>?...` -> `<id>`
fn session_id_from(url: &str) -> String {
    let path = url.split('?').next().unwrap();
    path.rsplit('/').next().unwrap().to_string()
}

#[tokio::test]
async fn test_checkout_pay_and_verify() {
    let h = harness(false);

    let (status, body) = call(&h.router, post_json("/api/checkout", &json!({"quantity": 1}))).await;
    assert_eq!(status, StatusCode::OK);
    let url = body["url"].as_str().unwrap();
    assert!(url.contains("amount=2500"), "{url}");

    let session_id = session_id_from(url);
    let session = h.gateway.session(&session_id).await.unwrap();
    let request = session.request.unwrap();
    assert_eq!(request.line_items[0].unit_amount, 2500);
    assert_eq!(request.line_items[0].quantity, 1);

    assert!(h.gateway.complete_payment(&session_id, "a@b.com").await);
    let back = h.gateway.success_redirect(&session_id).await.unwrap();
    assert_eq!(back, format!("https://shop.test/success?session_id={session_id}"));

    let (status, body) = call(
        &h.router,
        get(&format!("/api/verify-session?session_id={session_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"customer_email": "a@b.com", "payment_status": "paid"}));
}

#[tokio::test]
async fn test_verify_known_paid_session() {
    let h = harness(false);
    h.gateway
        .insert_session("cs_test_123", PaymentStatus::Paid, Some("a@b.com"))
        .await;

    let (status, body) = call(&h.router, get("/api/verify-session?session_id=cs_test_123")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"customer_email": "a@b.com", "payment_status": "paid"}));

    // Refreshing the page verifies again with the same answer
    let (again_status, again_body) =
        call(&h.router, get("/api/verify-session?session_id=cs_test_123")).await;
    assert_eq!(again_status, status);
    assert_eq!(again_body, body);
    assert_eq!(h.gateway.retrieve_calls(), 2);
}

#[tokio::test]
async fn test_unpaid_session_is_rejected() {
    let h = harness(false);
    h.gateway
        .insert_session("cs_test_unpaid", PaymentStatus::Unpaid, None)
        .await;
    h.gateway
        .insert_session("cs_test_free", PaymentStatus::NoPaymentRequired, None)
        .await;

    for id in ["cs_test_unpaid", "cs_test_free"] {
        let (status, body) =
            call(&h.router, get(&format!("/api/verify-session?session_id={id}"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Payment not completed");
        assert_eq!(body["code"], "PAYMENT_INCOMPLETE");
        assert!(body.get("payment_status").is_none());
    }
}

#[tokio::test]
async fn test_missing_session_id_skips_gateway() {
    let h = harness(false);

    for uri in ["/api/verify-session", "/api/verify-session?session_id="] {
        let (status, body) = call(&h.router, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing session_id parameter");
        assert_eq!(body["code"], "MISSING_PARAMETER");
    }
    assert_eq!(h.gateway.retrieve_calls(), 0);
}

#[tokio::test]
async fn test_unknown_session_is_invalid() {
    let h = harness(false);
    let (status, body) = call(&h.router, get("/api/verify-session?session_id=cs_test_nope")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid session");
    assert_eq!(body["code"], "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn test_gateway_outage() {
    let h = harness(false);
    h.gateway
        .insert_session("cs_test_123", PaymentStatus::Paid, Some("a@b.com"))
        .await;
    h.gateway.set_outage(true);

    let (status, body) = call(&h.router, get("/api/verify-session?session_id=cs_test_123")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to verify session", "code": "VERIFICATION_FAILED"}));

    let (status, body) = call(&h.router, post_json("/api/checkout", &json!({"quantity": 1}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to create checkout session");
    assert!(!body.to_string().contains("unavailable"));
}

#[tokio::test]
async fn test_invalid_quantities_never_reach_gateway() {
    let h = harness(false);

    for quantity in [json!(0), json!(-1), json!(1.5), json!("1")] {
        let (status, body) = call(
            &h.router,
            post_json("/api/checkout", &json!({"quantity": quantity})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{quantity}");
        assert_eq!(body["code"], "INVALID_INPUT");
    }
    assert_eq!(h.gateway.create_calls(), 0);
}

#[tokio::test]
async fn test_checkout_defaults_and_price_ids() {
    let h = harness(false);

    let (status, body) = call(&h.router, post_json("/api/checkout", &json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["url"].as_str().unwrap().contains("quantity=1"));

    let (status, body) = call(
        &h.router,
        post_json("/api/checkout", &json!({"priceId": "price_unknown"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(h.gateway.create_calls(), 1);
}

#[tokio::test]
async fn test_oversized_order_is_rejected() {
    let h = harness(false);
    let (status, body) = call(
        &h.router,
        post_json("/api/checkout", &json!({"quantity": u32::MAX})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(h.gateway.create_calls(), 0);
}

#[tokio::test]
async fn test_product_follows_configuration() {
    let mut configured = settings(false);
    configured.product.unit_amount = 799;
    configured.asset_url = "https://shop.test/files/book.pdf".into();
    let h = harness_with(&configured);

    let (status, body) = call(&h.router, get("/api/product")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_price"], "$7.99");
    assert_eq!(body["unit_amount"], 799);
    assert_eq!(body["name"], "Stand Out and Scale");
    assert_eq!(body["asset_url"], "https://shop.test/files/book.pdf");

    // The page shows what checkout charges and what the email links to
    let (_, checkout) = call(&h.router, post_json("/api/checkout", &json!({"quantity": 1}))).await;
    assert!(checkout["url"].as_str().unwrap().contains("amount=799"));

    call(
        &h.router,
        post_json("/api/send-download", &json!({"email": "user@example.com"})),
    )
    .await;
    assert!(h.mailer.sent().await[0].html.contains("https://shop.test/files/book.pdf"));
}

#[tokio::test]
async fn test_malformed_body() {
    let h = harness(false);
    let request = Request::builder()
        .method("POST")
        .uri("/api/checkout")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = call(&h.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_send_download_every_time() {
    let h = harness(false);

    for _ in 0..3 {
        let (status, body) = call(
            &h.router,
            post_json("/api/send-download", &json!({"email": "user@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true}));
    }

    let sent = h.mailer.sent().await;
    assert_eq!(sent.len(), 3);
    assert!(sent[0].html.contains("https://shop.test/downloads/stand-out-and-scale.pdf"));
    assert_eq!(sent[0].from, "noreply@shop.test");
}

#[tokio::test]
async fn test_send_download_provider_outage() {
    let h = harness(false);
    h.mailer.set_failing(true);

    let (status, body) = call(
        &h.router,
        post_json("/api/send-download", &json!({"email": "user@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to send email");

    // The failure is per request; the next one goes through
    h.mailer.set_failing(false);
    let (status, _) = call(
        &h.router,
        post_json("/api/send-download", &json!({"email": "user@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_send_download_requires_email() {
    let h = harness(false);
    for body in [json!({}), json!({"email": ""}), json!({"email": "not-an-address"})] {
        let (status, response) = call(&h.router, post_json("/api/send-download", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response["code"], "INVALID_INPUT");
    }
    assert!(h.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn test_fulfill_on_verify() {
    let h = harness(true);
    h.gateway
        .insert_session("cs_test_123", PaymentStatus::Paid, Some("a@b.com"))
        .await;

    let (status, _) = call(&h.router, get("/api/verify-session?session_id=cs_test_123")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.mailer.sent_to("a@b.com").await, 1);

    // A failed delivery does not turn a paid verification into an error
    h.mailer.set_failing(true);
    let (status, body) = call(&h.router, get("/api/verify-session?session_id=cs_test_123")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payment_status"], "paid");
}

#[tokio::test]
async fn test_health() {
    let h = harness(false);
    let (status, body) = call(&h.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["gateway"], "mock");
    assert_eq!(body["mailer"], "memory");
}
