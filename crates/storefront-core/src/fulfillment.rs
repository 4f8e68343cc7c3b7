//! Fulfillment
//!
//! Delivers the purchased asset by email. Each call is one independent send:
//! no queue, no retry, no record of earlier sends. Buyers may ask for the
//! link as often as they like.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StorefrontError};

/// A single outgoing email
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html: String,
}

/// Mail transport trait (Strategy pattern)
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Hand one message to the provider. Must not retry.
    async fn send(&self, message: &EmailMessage) -> Result<()>;

    /// Provider name
    fn name(&self) -> &str;
}

/// What to deliver and to whom
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FulfillmentRequest {
    pub recipient_email: String,
    pub asset_url: String,
}

impl FulfillmentRequest {
    pub fn new(recipient_email: &str, asset_url: impl Into<String>) -> Result<Self> {
        let recipient_email = recipient_email.trim();
        if recipient_email.is_empty() {
            return Err(StorefrontError::InvalidInput("Email address is required".into()));
        }
        if !looks_like_email(recipient_email) {
            return Err(StorefrontError::InvalidInput("Email address is not valid".into()));
        }

        Ok(Self {
            recipient_email: recipient_email.to_string(),
            asset_url: asset_url.into(),
        })
    }
}

/// Shape check only; the mail provider decides what is deliverable
fn looks_like_email(address: &str) -> bool {
    if address.chars().any(char::is_whitespace) {
        return false;
    }
    match address.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Sender and wording of the delivery email
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryTemplate {
    pub from: String,
    pub product_name: String,
    pub asset_url: String,
}

impl DeliveryTemplate {
    pub fn render(&self, request: &FulfillmentRequest) -> EmailMessage {
        let html = format!(
            "<h2>Thank you for your purchase!</h2>\
             <p>Your book is ready to download:</p>\
             <p><a href=\"{url}\">Download {name} (PDF)</a></p>\
             <p>If you have any questions, reply to this email.</p>",
            url = request.asset_url,
            name = self.product_name,
        );

        EmailMessage {
            to: request.recipient_email.clone(),
            from: self.from.clone(),
            subject: format!("Your {} Book", self.product_name),
            html,
        }
    }
}

/// Sends the download link for the purchased asset
pub struct FulfillmentNotifier {
    mailer: Arc<dyn Mailer>,
    template: DeliveryTemplate,
}

impl FulfillmentNotifier {
    pub fn new(mailer: Arc<dyn Mailer>, template: DeliveryTemplate) -> Self {
        Self { mailer, template }
    }

    pub fn mailer_name(&self) -> &str {
        self.mailer.name()
    }

    /// Send one delivery email to `recipient_email`
    pub async fn send(&self, recipient_email: &str) -> Result<()> {
        let request = FulfillmentRequest::new(recipient_email, self.template.asset_url.clone())?;
        let message = self.template.render(&request);

        self.mailer.send(&message).await.map_err(|e| match e {
            StorefrontError::Delivery(_) => e,
            other => StorefrontError::Delivery(other.to_string()),
        })?;

        tracing::info!(mailer = self.mailer.name(), "Sent download email");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CollectingMailer {
        sent: Mutex<Vec<EmailMessage>>,
        down: bool,
    }

    #[async_trait]
    impl Mailer for CollectingMailer {
        async fn send(&self, message: &EmailMessage) -> Result<()> {
            if self.down {
                return Err(StorefrontError::Delivery("503 Service Unavailable".into()));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }

        fn name(&self) -> &str {
            "collecting"
        }
    }

    fn template() -> DeliveryTemplate {
        DeliveryTemplate {
            from: "noreply@shop.test".into(),
            product_name: "Stand Out and Scale".into(),
            asset_url: "https://shop.test/downloads/book.pdf".into(),
        }
    }

    #[test]
    fn test_email_shape_check() {
        assert!(looks_like_email("user@example.com"));
        assert!(!looks_like_email("user@"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("user example.com"));
        assert!(!looks_like_email("a@b@c"));
    }

    #[test]
    fn test_render_contains_asset_link() {
        let request = FulfillmentRequest::new(" user@example.com ", "https://shop.test/x.pdf").unwrap();
        let message = template().render(&request);
        assert_eq!(message.to, "user@example.com");
        assert_eq!(message.subject, "Your Stand Out and Scale Book");
        assert!(message.html.contains("href=\"https://shop.test/x.pdf\""));
    }

    #[tokio::test]
    async fn test_every_call_sends() {
        let mailer = Arc::new(CollectingMailer::default());
        let notifier = FulfillmentNotifier::new(mailer.clone(), template());

        for _ in 0..3 {
            notifier.send("user@example.com").await.unwrap();
        }
        assert_eq!(mailer.sent.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_address_is_input_error() {
        let mailer = Arc::new(CollectingMailer::default());
        let notifier = FulfillmentNotifier::new(mailer.clone(), template());

        let err = notifier.send("  ").await.unwrap_err();
        assert!(matches!(err, StorefrontError::InvalidInput(_)));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_is_delivery_error() {
        let mailer = Arc::new(CollectingMailer {
            down: true,
            ..Default::default()
        });
        let err = FulfillmentNotifier::new(mailer, template())
            .send("user@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, StorefrontError::Delivery(_)));
        assert_eq!(err.user_message(), "Failed to send email");
    }
}
