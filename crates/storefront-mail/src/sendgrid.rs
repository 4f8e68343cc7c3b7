//! SendGrid Mail Provider
//!
//! Implementation of [`Mailer`] over the SendGrid v3 `mail/send` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use storefront_core::{EmailMessage, Mailer, Result, StorefrontError};

pub const DEFAULT_API_BASE: &str = "https://api.sendgrid.com";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// SendGrid provider configuration
#[derive(Clone)]
pub struct SendGridConfig {
    pub api_key: String,

    /// API base URL
    pub api_base: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for SendGridConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl SendGridConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Build from a variable lookup; `SENDGRID_API_KEY` is required
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("SENDGRID_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| StorefrontError::Config("SENDGRID_API_KEY not set".into()))?;

        let timeout_secs = match lookup("MAIL_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                StorefrontError::Config(format!("MAIL_TIMEOUT_SECS is not a number: {raw}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            api_base: lookup("SENDGRID_API_BASE")
                .map_or_else(|| DEFAULT_API_BASE.into(), |url| url.trim_end_matches('/').to_string()),
            timeout_secs,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    mime: &'static str,
    value: &'a str,
}

/// Request body of `POST /v3/mail/send`
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

impl<'a> SendRequest<'a> {
    fn from_message(message: &'a EmailMessage) -> Self {
        Self {
            personalizations: vec![Personalization {
                to: vec![Address { email: &message.to }],
            }],
            from: Address {
                email: &message.from,
            },
            subject: &message.subject,
            content: vec![Content {
                mime: "text/html",
                value: &message.html,
            }],
        }
    }
}

/// SendGrid mail provider
pub struct SendGridMailer {
    client: reqwest::Client,
    config: SendGridConfig,
}

impl SendGridMailer {
    pub fn new(config: SendGridConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StorefrontError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(SendGridConfig::from_env()?)
    }

    fn endpoint(&self) -> String {
        format!("{}/v3/mail/send", self.config.api_base)
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&SendRequest::from_message(message))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "SendGrid request failed");
                StorefrontError::Delivery(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "SendGrid rejected message");
            return Err(StorefrontError::Delivery(format!("SendGrid returned {status}")));
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "sendgrid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn message() -> EmailMessage {
        EmailMessage {
            to: "user@example.com".into(),
            from: "noreply@shop.test".into(),
            subject: "Your Book".into(),
            html: "<p>hi</p>".into(),
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = SendGridConfig::new("SG.key");
        assert_eq!(config.api_base, "https://api.sendgrid.com");
        assert_eq!(config.timeout_secs, 10);
        assert!(!format!("{config:?}").contains("SG.key"));
    }

    #[test]
    fn test_config_from_lookup() {
        assert!(matches!(
            SendGridConfig::from_lookup(|_| None),
            Err(StorefrontError::Config(_))
        ));

        let vars = HashMap::from([
            ("SENDGRID_API_KEY", "SG.key"),
            ("SENDGRID_API_BASE", "http://localhost:3030/"),
            ("MAIL_TIMEOUT_SECS", "3"),
        ]);
        let config =
            SendGridConfig::from_lookup(|k| vars.get(k).map(ToString::to_string)).unwrap();
        assert_eq!(config.api_base, "http://localhost:3030");
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn test_request_body() {
        let message = message();
        let body = serde_json::to_value(SendRequest::from_message(&message)).unwrap();
        assert_eq!(
            body,
            json!({
                "personalizations": [{"to": [{"email": "user@example.com"}]}],
                "from": {"email": "noreply@shop.test"},
                "subject": "Your Book",
                "content": [{"type": "text/html", "value": "<p>hi</p>"}],
            })
        );
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_delivery_error() {
        let mailer = SendGridMailer::new(SendGridConfig {
            api_base: "http://127.0.0.1:9".into(),
            timeout_secs: 2,
            ..SendGridConfig::new("SG.key")
        })
        .unwrap();

        let err = mailer.send(&message()).await.unwrap_err();
        assert!(matches!(err, StorefrontError::Delivery(_)));
    }
}
