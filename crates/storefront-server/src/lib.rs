//! Storefront HTTP server
//!
//! Axum router for the purchase handshake plus the static web client.

pub mod config;
pub mod handlers;
pub mod state;

use std::path::Path;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::handlers::{
    create_checkout, health_check, product_info, send_download, verify_session,
};
use crate::state::AppState;

pub use config::{AppConfig, GatewayConfig, StoreSettings};

/// Build the application router
///
/// With a `static_dir`, unknown paths are served from it and fall back to
/// its `index.html` so client-side routes (`/success`) resolve.
pub fn app(state: AppState, static_dir: Option<&Path>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/product", get(product_info))
        .route("/checkout", post(create_checkout))
        .route("/verify-session", get(verify_session))
        .route("/send-download", post(send_download));

    let mut router = Router::new()
        .route("/health", get(health_check))
        .nest("/api", api);

    if let Some(dir) = static_dir {
        router = router.fallback_service(
            ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html"))),
        );
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
