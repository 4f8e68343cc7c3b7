//! Session Verification
//!
//! The session id that comes back on the success URL is only a capability
//! token: anyone can type one into the address bar. Purchase confirmation is
//! released only after the gateway itself reports the session as paid.

use std::sync::Arc;

use crate::error::{Result, StorefrontError};
use crate::gateway::{PaymentGateway, PaymentStatus};

/// Proof that the gateway reported a session as paid
///
/// Only [`SessionVerifier::verify`] can build one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedPurchase {
    session_id: String,
    customer_email: Option<String>,
}

impl VerifiedPurchase {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn customer_email(&self) -> Option<&str> {
        self.customer_email.as_deref()
    }

    pub const fn payment_status(&self) -> PaymentStatus {
        PaymentStatus::Paid
    }
}

/// Checks a session against the gateway before anything is released
pub struct SessionVerifier {
    gateway: Arc<dyn PaymentGateway>,
}

impl SessionVerifier {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    /// Verify that `session_id` names a paid session
    ///
    /// Blank ids fail without a gateway call. A gateway that cannot answer
    /// yields [`StorefrontError::Verification`], a session that answers
    /// "not paid" yields [`StorefrontError::PaymentIncomplete`].
    pub async fn verify(&self, session_id: Option<&str>) -> Result<VerifiedPurchase> {
        let session_id = session_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(StorefrontError::MissingParameter("session_id"))?;

        let details = self
            .gateway
            .retrieve_session(session_id)
            .await
            .map_err(|e| match e {
                StorefrontError::SessionNotFound(_) => e,
                other => StorefrontError::Verification(other.to_string()),
            })?;

        if !details.payment_status.is_paid() {
            tracing::info!(
                session_id = %session_id,
                status = %details.payment_status,
                "Session not paid"
            );
            return Err(StorefrontError::PaymentIncomplete(details.payment_status));
        }

        tracing::info!(session_id = %session_id, "Verified paid session");

        Ok(VerifiedPurchase {
            session_id: session_id.to_string(),
            customer_email: details.customer_email,
        })
    }
}
