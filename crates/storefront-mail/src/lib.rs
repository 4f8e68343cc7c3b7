//! # storefront-mail
//!
//! Mail providers for delivering purchased assets.
//!
//! ## Providers
//!
//! - **SendGrid** (default): v3 `mail/send` over HTTPS
//! - **Memory**: keeps messages in memory, for tests and demos
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_mail::SendGridMailer;
//!
//! let mailer = Arc::new(SendGridMailer::from_env()?);
//! let notifier = FulfillmentNotifier::new(mailer, template);
//! notifier.send("buyer@example.com").await?;
//! ```

mod memory;
#[cfg(feature = "sendgrid")]
pub mod sendgrid;

pub use memory::MemoryMailer;
#[cfg(feature = "sendgrid")]
pub use sendgrid::{SendGridConfig, SendGridMailer};

// Re-export core types for convenience
pub use storefront_core::{EmailMessage, Mailer};
