//! # storefront-core
//!
//! Purchase handshake for a single-product storefront: create a hosted
//! checkout session, verify it server-side on return, deliver the asset.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  CheckoutService    SessionVerifier     FulfillmentNotifier  │
//! │        │                  │                     │            │
//! │        └──── PaymentGateway (Strategy) ─┘      Mailer        │
//! └──────────────────────────────────────────────────────────────┘
//!             ▲                                      ▲
//!     storefront-payments                     storefront-mail
//! ```
//!
//! `CheckoutFlow` in [`flow`] is the browser side of the same handshake and
//! carries no I/O, so the web client and tests share it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_core::{CheckoutRequest, CheckoutService, SessionVerifier};
//!
//! let checkout = CheckoutService::new(gateway.clone(), product, urls);
//! let session = checkout.create(&CheckoutRequest::default()).await?;
//! // Redirect user to: session.redirect_url
//!
//! let purchase = SessionVerifier::new(gateway).verify(Some(&session.id)).await?;
//! ```

pub mod catalog;
pub mod checkout;
pub mod error;
pub mod flow;
pub mod fulfillment;
pub mod gateway;
pub mod verification;
pub mod wire;

pub use catalog::{Product, Quantity, StoreUrls};
pub use checkout::{CheckoutRequest, CheckoutService};
pub use error::{ErrorCode, ErrorKind, Result, StorefrontError};
pub use flow::{CheckoutFlow, FailureReason, FlowState, ResendStatus, ResendTracker};
pub use fulfillment::{DeliveryTemplate, EmailMessage, FulfillmentNotifier, FulfillmentRequest, Mailer};
pub use gateway::{
    CheckoutSession, LineItem, PaymentGateway, PaymentStatus, SessionDetails, SessionRequest,
};
pub use verification::{SessionVerifier, VerifiedPurchase};
