//! Stripe Checkout Integration
//!
//! Implements [`PaymentGateway`] with the "Stripe Checkout (Hosted)" approach:
//! one-off payment-mode sessions, card only, no automatic tax.

use async_trait::async_trait;
use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionId, CheckoutSessionMode,
    CheckoutSessionPaymentStatus, Client, CreateCheckoutSession, CreateCheckoutSessionLineItems,
    CreateCheckoutSessionLineItemsPriceData, CreateCheckoutSessionLineItemsPriceDataProductData,
    CreateCheckoutSessionPaymentMethodTypes, Currency, ErrorCode, StripeError,
};

use storefront_core::{
    CheckoutSession, LineItem, PaymentGateway, PaymentStatus, Result, SessionDetails,
    SessionRequest, StorefrontError,
};

/// Stripe credentials and endpoint
#[derive(Clone)]
pub struct StripeConfig {
    pub secret_key: String,

    /// Override for the API base URL (stripe-mock, proxies)
    pub api_base: Option<String>,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl StripeConfig {
    /// Build from a variable lookup; `STRIPE_SECRET_KEY` is required
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = lookup("STRIPE_SECRET_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| StorefrontError::Config("STRIPE_SECRET_KEY not set".into()))?;

        Ok(Self {
            secret_key,
            api_base: lookup("STRIPE_API_BASE").filter(|url| !url.trim().is_empty()),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Stripe client wrapper
pub struct StripeGateway {
    client: Client,
}

impl StripeGateway {
    /// Create a new Stripe gateway
    pub fn new(config: &StripeConfig) -> Self {
        let client = match config.api_base.as_deref() {
            Some(base) => Client::from_url(base, config.secret_key.clone()),
            None => Client::new(config.secret_key.clone()),
        };
        Self { client }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(&StripeConfig::from_env()?))
    }

    /// Get the underlying Stripe client
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

/// Stripe's currency enum deserializes from lowercase ISO codes
fn parse_currency(code: &str) -> Result<Currency> {
    serde_json::from_value(serde_json::Value::String(code.to_lowercase()))
        .map_err(|_| StorefrontError::PaymentGateway(format!("Unsupported currency: {code}")))
}

fn stripe_line_item(item: &LineItem) -> Result<CreateCheckoutSessionLineItems> {
    let quantity = Some(u64::from(item.quantity));

    if let Some(price) = &item.gateway_price_id {
        return Ok(CreateCheckoutSessionLineItems {
            price: Some(price.clone()),
            quantity,
            ..Default::default()
        });
    }

    Ok(CreateCheckoutSessionLineItems {
        quantity,
        price_data: Some(CreateCheckoutSessionLineItemsPriceData {
            currency: parse_currency(&item.currency)?,
            unit_amount: Some(item.unit_amount),
            product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                name: item.name.clone(),
                description: Some(item.description.clone()),
                images: item.image_url.clone().map(|url| vec![url]),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    })
}

const fn payment_status(status: &CheckoutSessionPaymentStatus) -> PaymentStatus {
    match status {
        CheckoutSessionPaymentStatus::Paid => PaymentStatus::Paid,
        CheckoutSessionPaymentStatus::Unpaid => PaymentStatus::Unpaid,
        CheckoutSessionPaymentStatus::NoPaymentRequired => PaymentStatus::NoPaymentRequired,
    }
}

/// Only a missing resource means the id is unknown. Stripe reports bad keys
/// and permission problems as `invalid_request_error` too; those stay
/// gateway failures.
fn retrieve_error(session_id: &str, err: StripeError) -> StorefrontError {
    match err {
        StripeError::Stripe(request)
            if request.http_status == 404
                || matches!(request.code, Some(ErrorCode::ResourceMissing)) =>
        {
            StorefrontError::SessionNotFound(session_id.to_string())
        }
        other => StorefrontError::PaymentGateway(other.to_string()),
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_session(&self, request: &SessionRequest) -> Result<CheckoutSession> {
        request.validate()?;

        let line_items = request
            .line_items
            .iter()
            .map(stripe_line_item)
            .collect::<Result<Vec<_>>>()?;

        let mut params = CreateCheckoutSession::new();
        params.success_url = Some(&request.success_url);
        params.cancel_url = Some(&request.cancel_url);
        params.mode = Some(CheckoutSessionMode::Payment);
        params.payment_method_types = Some(vec![CreateCheckoutSessionPaymentMethodTypes::Card]);
        params.line_items = Some(line_items);

        let session = StripeCheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Stripe session creation failed");
                StorefrontError::PaymentGateway(e.to_string())
            })?;

        let redirect_url = session.url.ok_or_else(|| {
            StorefrontError::PaymentGateway("No checkout URL returned".into())
        })?;

        Ok(CheckoutSession {
            id: session.id.to_string(),
            redirect_url,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails> {
        // Rejects ids without the cs_ prefix before any network call
        let id: CheckoutSessionId = session_id
            .parse()
            .map_err(|_| StorefrontError::SessionNotFound(session_id.to_string()))?;

        let session = StripeCheckoutSession::retrieve(&self.client, &id, &[])
            .await
            .map_err(|e| {
                let mapped = retrieve_error(session_id, e);
                if matches!(mapped, StorefrontError::SessionNotFound(_)) {
                    tracing::warn!(session_id = %session_id, "Stripe session not found");
                } else {
                    tracing::error!(session_id = %session_id, error = %mapped, "Stripe session lookup failed");
                }
                mapped
            })?;

        let customer_email = session
            .customer_details
            .as_ref()
            .and_then(|details| details.email.clone())
            .or(session.customer_email);

        Ok(SessionDetails {
            payment_status: payment_status(&session.payment_status),
            customer_email,
        })
    }

    fn name(&self) -> &str {
        "stripe"
    }
}
