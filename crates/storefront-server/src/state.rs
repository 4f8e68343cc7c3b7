//! Application State

use std::sync::Arc;

use storefront_core::{
    CheckoutService, FulfillmentNotifier, Mailer, PaymentGateway, SessionVerifier,
    wire::ProductResponse,
};

use crate::config::StoreSettings;

/// Shared application state, built once at startup
#[derive(Clone)]
pub struct AppState {
    /// Creates hosted checkout sessions
    pub checkout: Arc<CheckoutService>,

    /// Confirms sessions against the gateway
    pub verifier: Arc<SessionVerifier>,

    /// Sends the download email
    pub notifier: Arc<FulfillmentNotifier>,

    /// Product details served to the web client
    pub product: Arc<ProductResponse>,

    /// Gateway label for health output
    pub gateway_name: String,

    pub fulfill_on_verify: bool,
}

impl AppState {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        mailer: Arc<dyn Mailer>,
        settings: &StoreSettings,
    ) -> Self {
        Self {
            checkout: Arc::new(CheckoutService::new(
                gateway.clone(),
                settings.product.clone(),
                settings.urls.clone(),
            )),
            verifier: Arc::new(SessionVerifier::new(gateway.clone())),
            notifier: Arc::new(FulfillmentNotifier::new(mailer, settings.delivery_template())),
            product: Arc::new(ProductResponse::new(&settings.product, settings.asset_url.clone())),
            gateway_name: gateway.name().to_string(),
            fulfill_on_verify: settings.fulfill_on_verify,
        }
    }
}
