//! Error Types
//!
//! Every failure in the purchase handshake is one of these variants. Each
//! variant belongs to a coarse [`ErrorKind`] so callers can branch without
//! knowing which SDK produced the failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gateway::PaymentStatus;

/// Result type alias for storefront operations
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Storefront error types
#[derive(Error, Debug)]
pub enum StorefrontError {
    /// Creating or reading a session at the payment gateway failed
    #[error("Payment gateway error: {0}")]
    PaymentGateway(String),

    /// The gateway does not know this session id (or it is malformed)
    #[error("Checkout session not found: {0}")]
    SessionNotFound(String),

    /// The session exists but has not been paid
    #[error("Payment not completed (status: {0})")]
    PaymentIncomplete(PaymentStatus),

    /// The session could not be verified (gateway outage, bad response)
    #[error("Verification failed: {0}")]
    Verification(String),

    /// The mail provider rejected the message or could not be reached
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// A required request parameter was not supplied
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    /// Caller supplied a value that cannot be used
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse error discriminant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Gateway,
    Verification,
    Delivery,
    Input,
    Config,
}

/// Machine-readable code sent to clients next to the message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    MissingParameter,
    InvalidInput,
    CheckoutError,
    SessionNotFound,
    PaymentIncomplete,
    VerificationFailed,
    DeliveryError,
    ConfigError,
}

impl StorefrontError {
    /// Which layer the error belongs to
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PaymentGateway(_) => ErrorKind::Gateway,
            Self::SessionNotFound(_) | Self::PaymentIncomplete(_) | Self::Verification(_) => {
                ErrorKind::Verification
            }
            Self::Delivery(_) => ErrorKind::Delivery,
            Self::MissingParameter(_) | Self::InvalidInput(_) => ErrorKind::Input,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::PaymentGateway(_) => ErrorCode::CheckoutError,
            Self::SessionNotFound(_) => ErrorCode::SessionNotFound,
            Self::PaymentIncomplete(_) => ErrorCode::PaymentIncomplete,
            Self::Verification(_) => ErrorCode::VerificationFailed,
            Self::Delivery(_) => ErrorCode::DeliveryError,
            Self::MissingParameter(_) => ErrorCode::MissingParameter,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// HTTP status the boundary should answer with
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::SessionNotFound(_)
            | Self::PaymentIncomplete(_)
            | Self::MissingParameter(_)
            | Self::InvalidInput(_) => 400,
            Self::PaymentGateway(_)
            | Self::Verification(_)
            | Self::Delivery(_)
            | Self::Config(_) => 500,
        }
    }

    /// Check if the client may simply repeat the request
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::PaymentGateway(_) | Self::Verification(_) | Self::Delivery(_)
        )
    }

    /// Get user-friendly message
    ///
    /// Never includes text that came back from an external service.
    pub fn user_message(&self) -> String {
        match self {
            Self::PaymentGateway(_) => "Failed to create checkout session".into(),
            Self::SessionNotFound(_) => "Invalid session".into(),
            Self::PaymentIncomplete(_) => "Payment not completed".into(),
            Self::Verification(_) => "Failed to verify session".into(),
            Self::Delivery(_) => "Failed to send email".into(),
            Self::MissingParameter(name) => format!("Missing {name} parameter"),
            Self::InvalidInput(msg) => msg.clone(),
            Self::Config(_) => "Service configuration error.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpaid_and_unverifiable_are_distinct() {
        let unpaid = StorefrontError::PaymentIncomplete(PaymentStatus::Unpaid);
        let outage = StorefrontError::Verification("connection reset".into());

        assert_eq!(unpaid.kind(), outage.kind());
        assert_ne!(unpaid.code(), outage.code());
        assert_eq!(unpaid.status_code(), 400);
        assert_eq!(outage.status_code(), 500);
        assert!(!unpaid.is_retryable());
        assert!(outage.is_retryable());
    }

    #[test]
    fn test_user_message_hides_gateway_detail() {
        let err = StorefrontError::PaymentGateway("Invalid API Key provided: sk_live_****".into());
        assert_eq!(err.user_message(), "Failed to create checkout session");
        assert!(err.to_string().contains("Invalid API Key"));
    }

    #[test]
    fn test_missing_parameter_message() {
        let err = StorefrontError::MissingParameter("session_id");
        assert_eq!(err.user_message(), "Missing session_id parameter");
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn test_error_code_wire_format() {
        let json = serde_json::to_string(&ErrorCode::PaymentIncomplete).unwrap();
        assert_eq!(json, "\"PAYMENT_INCOMPLETE\"");
    }
}
