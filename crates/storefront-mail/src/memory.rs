//! In-memory mailer for tests and local demos

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use storefront_core::{EmailMessage, Mailer, Result, StorefrontError};

/// Keeps every message instead of sending it
#[derive(Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<EmailMessage>>,
    failing: AtomicBool,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every message as if the provider were down
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_to(&self, address: &str) -> usize {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|message| message.to == address)
            .count()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorefrontError::Delivery("memory mailer set to fail".into()));
        }
        tracing::debug!(to = %message.to, subject = %message.subject, "Captured email");
        self.sent.lock().await.push(message.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
