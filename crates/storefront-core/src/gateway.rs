//! Payment Gateway Strategy
//!
//! Common interface for hosted payment processors. The application never
//! stores session state itself: it asks the gateway to create a session,
//! hands the redirect URL to the browser, and later asks the gateway again
//! what happened to that session.
//!
//! ```text
//! create_session ──▶ { id, redirect_url } ──▶ browser ──▶ hosted page
//!                                                            │
//! retrieve_session(id) ◀── success_url?session_id=<id> ◀─────┘
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StorefrontError};

/// Placeholder the gateway replaces with the real session id on redirect
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Outcome of a checkout session, as reported by the gateway
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
}

impl PaymentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Unpaid => "unpaid",
            Self::NoPaymentRequired => "no_payment_required",
        }
    }

    pub const fn is_paid(&self) -> bool {
        matches!(self, Self::Paid)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One purchasable line on the hosted checkout page
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub description: String,

    /// Price per unit in the currency's smallest unit (cents for USD)
    pub unit_amount: i64,

    /// ISO currency code, lowercase
    pub currency: String,

    pub quantity: u32,

    #[serde(default)]
    pub image_url: Option<String>,

    /// Price object already registered at the gateway; replaces the inline
    /// amount when present
    #[serde(default)]
    pub gateway_price_id: Option<String>,
}

/// Largest single charge in minor units (Stripe's ceiling of 999,999.99)
pub const MAX_TOTAL_AMOUNT: i64 = 99_999_999;

/// Everything the gateway needs to open a session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRequest {
    pub line_items: Vec<LineItem>,

    /// Must contain [`SESSION_ID_PLACEHOLDER`]
    pub success_url: String,

    pub cancel_url: String,
}

impl SessionRequest {
    /// Check the request before it is sent anywhere
    pub fn validate(&self) -> Result<()> {
        if self.line_items.is_empty() {
            return Err(StorefrontError::InvalidInput(
                "Checkout requires at least one item".into(),
            ));
        }

        for item in &self.line_items {
            if item.quantity == 0 {
                return Err(StorefrontError::InvalidInput(
                    "Quantity must be a positive integer".into(),
                ));
            }
            if item.unit_amount < 0 {
                return Err(StorefrontError::InvalidInput(format!(
                    "Unit amount for {} must not be negative",
                    item.name
                )));
            }
        }

        match self.total_amount() {
            Some(total) if total <= MAX_TOTAL_AMOUNT => {}
            _ => {
                return Err(StorefrontError::InvalidInput(
                    "Order total exceeds the maximum charge".into(),
                ));
            }
        }

        if !self.success_url.contains(SESSION_ID_PLACEHOLDER) {
            return Err(StorefrontError::Config(format!(
                "success URL must contain {SESSION_ID_PLACEHOLDER}"
            )));
        }

        Ok(())
    }

    /// Sum of all line items in minor units; `None` on overflow
    pub fn total_amount(&self) -> Option<i64> {
        self.line_items.iter().try_fold(0_i64, |total, item| {
            item.unit_amount
                .checked_mul(i64::from(item.quantity))
                .and_then(|line| total.checked_add(line))
        })
    }
}

/// A session freshly created at the gateway
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Opaque gateway token
    pub id: String,

    /// Hosted checkout page to send the browser to
    pub redirect_url: String,
}

/// What the gateway currently says about a session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDetails {
    pub payment_status: PaymentStatus,
    pub customer_email: Option<String>,
}

/// Payment gateway trait (Strategy pattern)
///
/// Implement this for each processor. Implementations must not retry on
/// their own and must report unknown ids as
/// [`StorefrontError::SessionNotFound`].
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Register a pending payment and get the hosted page URL
    async fn create_session(&self, request: &SessionRequest) -> Result<CheckoutSession>;

    /// Read the current status of a session. Pure and idempotent.
    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails>;

    /// Gateway name
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: u32, unit_amount: i64) -> LineItem {
        LineItem {
            name: "Book".into(),
            description: "A book".into(),
            unit_amount,
            currency: "usd".into(),
            quantity,
            image_url: None,
            gateway_price_id: None,
        }
    }

    fn request(items: Vec<LineItem>) -> SessionRequest {
        SessionRequest {
            line_items: items,
            success_url: format!("https://shop.test/success?session_id={SESSION_ID_PLACEHOLDER}"),
            cancel_url: "https://shop.test/?canceled=true".into(),
        }
    }

    #[test]
    fn test_valid_request() {
        let req = request(vec![item(2, 2500)]);
        assert!(req.validate().is_ok());
        assert_eq!(req.total_amount(), Some(5000));
    }

    #[test]
    fn test_free_item_is_allowed() {
        assert!(request(vec![item(1, 0)]).validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_quantity_and_negative_amount() {
        assert!(matches!(
            request(vec![item(0, 2500)]).validate(),
            Err(StorefrontError::InvalidInput(_))
        ));
        assert!(matches!(
            request(vec![item(1, -1)]).validate(),
            Err(StorefrontError::InvalidInput(_))
        ));
        assert!(request(vec![]).validate().is_err());
    }

    #[test]
    fn test_oversized_total_is_input_error() {
        let overflow = request(vec![item(u32::MAX, i64::MAX / 2)]);
        assert_eq!(overflow.total_amount(), None);
        assert!(matches!(
            overflow.validate(),
            Err(StorefrontError::InvalidInput(_))
        ));

        let too_large = request(vec![item(40_000, 2500)]);
        assert_eq!(too_large.total_amount(), Some(100_000_000));
        assert!(matches!(
            too_large.validate(),
            Err(StorefrontError::InvalidInput(_))
        ));

        assert!(request(vec![item(39_999, 2500)]).validate().is_ok());
    }

    #[test]
    fn test_success_url_needs_placeholder() {
        let mut req = request(vec![item(1, 2500)]);
        req.success_url = "https://shop.test/success".into();
        assert!(matches!(req.validate(), Err(StorefrontError::Config(_))));
    }

    #[test]
    fn test_payment_status_wire_format() {
        let status: PaymentStatus = serde_json::from_str("\"no_payment_required\"").unwrap();
        assert_eq!(status, PaymentStatus::NoPaymentRequired);
        assert!(!status.is_paid());
        assert_eq!(PaymentStatus::Paid.to_string(), "paid");
    }
}
