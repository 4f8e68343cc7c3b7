//! # storefront-payments
//!
//! Payment gateway adapters for the storefront.
//!
//! ## Stripe Checkout (Hosted)
//!
//! **Flow:** Your site → Redirect to Stripe's hosted page → Redirect back
//!
//! ```text
//! ┌─────────────┐     ┌─────────────────┐     ┌──────────────────────┐
//! │  Your Site  │────▶│  Stripe Hosted  │────▶│  Your Site           │
//! │  (landing)  │     │  Checkout Page  │     │  /success?session_id │
//! └─────────────┘     └─────────────────┘     └──────────────────────┘
//! ```
//!
//! The session id on the way back is untrusted; the success page asks the
//! server, which asks Stripe, before anything is shown.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_payments::{StripeConfig, StripeGateway};
//!
//! let gateway = StripeGateway::new(&StripeConfig::from_env()?);
//! let session = gateway.create_session(&request).await?;
//!
//! // Redirect user to: session.redirect_url
//! ```
//!
//! [`MockGateway`] keeps sessions in memory for tests and local demos.

mod mock;
mod stripe_gateway;

pub use mock::{MockGateway, MockSession};
pub use stripe_gateway::{StripeConfig, StripeGateway};
