//! Storefront HTTP Server
//!
//! Serves the checkout, verification and download endpoints together with
//! the WASM storefront.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_core::{Mailer, PaymentGateway};
use storefront_mail::SendGridMailer;
use storefront_payments::{MockGateway, StripeGateway};
use storefront_server::{AppConfig, GatewayConfig, app, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    // Initialize payments
    let gateway: Arc<dyn PaymentGateway> = match &config.gateway {
        GatewayConfig::Stripe(stripe) => {
            tracing::info!("✓ Stripe configured");
            Arc::new(StripeGateway::new(stripe))
        }
        GatewayConfig::Mock => {
            tracing::warn!("⚠ PAYMENT_GATEWAY=mock - every checkout is marked paid");
            Arc::new(MockGateway::instant())
        }
    };

    // Initialize mail
    let mailer: Arc<dyn Mailer> = Arc::new(
        SendGridMailer::new(config.sendgrid.clone()).context("failed to build mail client")?,
    );
    tracing::info!("✓ SendGrid configured");

    tracing::info!(
        product = %config.store.product.name,
        price = %config.store.product.display_price(),
        fulfill_on_verify = config.store.fulfill_on_verify,
        "Selling"
    );

    let state = AppState::new(gateway, mailer, &config.store);
    let router = app(state, Some(&config.static_dir));

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 storefront running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  GET  /api/product         - Product and download link");
    tracing::info!("  POST /api/checkout        - Create checkout session");
    tracing::info!("  GET  /api/verify-session  - Verify a returning session");
    tracing::info!("  POST /api/send-download   - Email the download link");
    tracing::info!("");

    axum::serve(listener, router).await?;

    Ok(())
}
