//! Checkout
//!
//! Turns a buyer's intent into a gateway session for the configured product.

use std::sync::Arc;

use crate::catalog::{Product, Quantity, StoreUrls};
use crate::error::{Result, StorefrontError};
use crate::gateway::{CheckoutSession, PaymentGateway, SessionRequest};
use crate::wire::CheckoutBody;

/// Validated request to buy the product
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub quantity: Quantity,
    pub price_id: Option<String>,
}

impl CheckoutRequest {
    /// Validate a raw request body; a missing quantity means one copy
    pub fn from_body(body: &CheckoutBody) -> Result<Self> {
        let quantity = match &body.quantity {
            None | Some(serde_json::Value::Null) => Quantity::ONE,
            Some(value) => Quantity::from_json(value)?,
        };

        Ok(Self {
            quantity,
            price_id: body.price_id.clone(),
        })
    }
}

/// Creates checkout sessions for the single product on sale
pub struct CheckoutService {
    gateway: Arc<dyn PaymentGateway>,
    product: Product,
    urls: StoreUrls,
}

impl CheckoutService {
    pub fn new(gateway: Arc<dyn PaymentGateway>, product: Product, urls: StoreUrls) -> Self {
        Self {
            gateway,
            product,
            urls,
        }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Build the gateway request without sending it
    pub fn session_request(&self, request: &CheckoutRequest) -> Result<SessionRequest> {
        let item = self
            .product
            .line_item(request.quantity, request.price_id.as_deref())?;

        let session_request = SessionRequest {
            line_items: vec![item],
            success_url: self.urls.success_template(),
            cancel_url: self.urls.cancel_url(),
        };
        session_request.validate()?;

        Ok(session_request)
    }

    /// Create a hosted checkout session
    ///
    /// Input problems are reported before the gateway is contacted; every
    /// failure after that point is a [`StorefrontError::PaymentGateway`].
    pub async fn create(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
        let session_request = self.session_request(request)?;

        let session = self
            .gateway
            .create_session(&session_request)
            .await
            .map_err(|e| match e {
                StorefrontError::PaymentGateway(_) => e,
                other => StorefrontError::PaymentGateway(other.to_string()),
            })?;

        tracing::info!(
            session_id = %session.id,
            quantity = request.quantity.get(),
            amount = session_request.total_amount().unwrap_or_default(),
            gateway = self.gateway.name(),
            "Created checkout session"
        );

        Ok(session)
    }
}
