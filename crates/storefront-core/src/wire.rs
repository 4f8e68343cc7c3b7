//! HTTP wire types shared by the server and the browser client

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::error::{ErrorCode, StorefrontError};
use crate::gateway::PaymentStatus;
use crate::verification::VerifiedPurchase;

/// `POST /api/checkout` body
///
/// `quantity` stays an untyped JSON value so that `1.5` or `"2"` can be
/// rejected with a proper message instead of a parse failure.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CheckoutBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<serde_json::Value>,

    #[serde(default, rename = "priceId", skip_serializing_if = "Option::is_none")]
    pub price_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub url: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct VerifySessionQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifySessionResponse {
    pub customer_email: Option<String>,
    pub payment_status: PaymentStatus,
}

impl From<&VerifiedPurchase> for VerifySessionResponse {
    fn from(purchase: &VerifiedPurchase) -> Self {
        Self {
            customer_email: purchase.customer_email().map(ToString::to_string),
            payment_status: purchase.payment_status(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SendDownloadRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendDownloadResponse {
    pub success: bool,
}

/// `GET /api/product`: what the store sells, as configured on the server
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductResponse {
    pub name: String,
    pub description: String,
    /// Minor units
    pub unit_amount: i64,
    pub currency: String,
    /// Formatted for display, e.g. `$25.00`
    pub display_price: String,
    pub image_url: Option<String>,
    /// Download link of the purchased asset
    pub asset_url: String,
}

impl ProductResponse {
    pub fn new(product: &Product, asset_url: impl Into<String>) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            unit_amount: product.unit_amount,
            currency: product.currency.clone(),
            display_price: product.display_price(),
            image_url: product.image_url.clone(),
            asset_url: asset_url.into(),
        }
    }
}

/// Body of every non-2xx response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: ErrorCode,
}

impl From<&StorefrontError> for ErrorResponse {
    fn from(err: &StorefrontError) -> Self {
        Self {
            error: err.user_message(),
            code: err.code(),
        }
    }
}
