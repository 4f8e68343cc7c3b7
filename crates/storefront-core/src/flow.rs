//! Client Purchase Flow
//!
//! Browser-side state machine for one purchase. It owns no I/O: the page
//! performs the requests and reports the outcome back through the
//! transition methods.
//!
//! ```text
//! Idle ─▶ CreatingSession ─▶ Redirecting ─▶ (hosted checkout)
//!  ▲            │
//!  └── failed ──┘
//!
//! Returned ─▶ Verifying ─▶ Success
//!    │            └──────▶ VerificationFailed
//!    └─ no session_id ───▶ VerificationFailed(MissingSession)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::wire::VerifySessionResponse;

pub const SUPPORT_EMAIL: &str = "support@brandora.app";

/// Why the success page could not confirm a purchase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The return URL carried no session id
    MissingSession,
    /// The gateway says the session is not paid
    PaymentIncomplete,
    /// The session could not be checked at all
    Unverifiable,
}

impl FailureReason {
    /// Map the server's error code; unknown codes count as unverifiable
    pub const fn from_code(code: Option<ErrorCode>) -> Self {
        match code {
            Some(ErrorCode::PaymentIncomplete) => Self::PaymentIncomplete,
            Some(ErrorCode::MissingParameter) => Self::MissingSession,
            _ => Self::Unverifiable,
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            Self::MissingSession => "No session ID found",
            Self::PaymentIncomplete => {
                "Your payment has not been completed. You have not been charged for this order."
            }
            Self::Unverifiable => {
                "We couldn't verify your purchase. If you completed payment, please contact us and we'll sort it out."
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    CreatingSession,
    Redirecting { url: String },
    Returned { session_id: Option<String> },
    Verifying { session_id: String },
    Success { purchase: VerifySessionResponse },
    VerificationFailed { reason: FailureReason },
}

/// One purchase, from the buy button to the confirmation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckoutFlow {
    state: FlowState,
    last_error: Option<String>,
}

impl Default for CheckoutFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutFlow {
    /// Flow for the landing page
    pub const fn new() -> Self {
        Self {
            state: FlowState::Idle,
            last_error: None,
        }
    }

    /// Flow for the page the gateway redirects back to
    pub fn returning(session_id: Option<String>) -> Self {
        let session_id = session_id.filter(|id| !id.trim().is_empty());
        Self {
            state: FlowState::Returned { session_id },
            last_error: None,
        }
    }

    pub const fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// A request is in flight; the trigger control must be disabled
    pub const fn is_busy(&self) -> bool {
        matches!(
            self.state,
            FlowState::CreatingSession | FlowState::Redirecting { .. } | FlowState::Verifying { .. }
        )
    }

    /// Buy button pressed. Returns `false` when the press must be ignored.
    pub fn start_checkout(&mut self) -> bool {
        if self.state != FlowState::Idle {
            tracing::debug!(state = ?self.state, "Ignoring duplicate checkout trigger");
            return false;
        }
        self.state = FlowState::CreatingSession;
        self.last_error = None;
        true
    }

    /// Session created; returns the URL to navigate to
    pub fn session_created(&mut self, url: String) -> Option<&str> {
        if self.state != FlowState::CreatingSession {
            return None;
        }
        self.state = FlowState::Redirecting { url };
        match &self.state {
            FlowState::Redirecting { url } => Some(url),
            _ => None,
        }
    }

    /// Session creation failed; back to idle with the error kept for display
    pub fn session_failed(&mut self, message: impl Into<String>) {
        if matches!(
            self.state,
            FlowState::CreatingSession | FlowState::Redirecting { .. }
        ) {
            self.state = FlowState::Idle;
            self.last_error = Some(message.into());
        }
    }

    /// Leave `Returned`; yields the id to verify
    ///
    /// Without an id the flow fails immediately and nothing should be
    /// requested.
    pub fn start_verification(&mut self) -> Option<String> {
        let FlowState::Returned { session_id } = &self.state else {
            return None;
        };

        match session_id.clone() {
            Some(id) => {
                self.state = FlowState::Verifying {
                    session_id: id.clone(),
                };
                Some(id)
            }
            None => {
                self.fail(FailureReason::MissingSession);
                None
            }
        }
    }

    /// Server answered 2xx; success still requires a `paid` status
    pub fn verification_succeeded(&mut self, purchase: VerifySessionResponse) {
        if !matches!(self.state, FlowState::Verifying { .. }) {
            return;
        }
        if purchase.payment_status.is_paid() {
            self.state = FlowState::Success { purchase };
        } else {
            self.fail(FailureReason::PaymentIncomplete);
        }
    }

    pub fn verification_failed(&mut self, reason: FailureReason) {
        if matches!(self.state, FlowState::Verifying { .. }) {
            self.fail(reason);
        }
    }

    fn fail(&mut self, reason: FailureReason) {
        self.last_error = Some(reason.message().to_string());
        self.state = FlowState::VerificationFailed { reason };
    }
}

/// Status of the "resend download email" form
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResendStatus {
    Ready,
    Sending,
    Sent,
    Failed,
    MissingEmail,
}

impl ResendStatus {
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Ready | Self::Sending => "",
            Self::Sent => "Email sent! Check your inbox.",
            Self::Failed => "Failed to send email. Please try again or contact support.",
            Self::MissingEmail => "Please enter your email address",
        }
    }
}

/// Resend form state. Only one send at a time, no cap on the number of sends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResendTracker {
    status: ResendStatus,
    attempts: u32,
}

impl Default for ResendTracker {
    fn default() -> Self {
        Self {
            status: ResendStatus::Ready,
            attempts: 0,
        }
    }
}

impl ResendTracker {
    pub const fn status(&self) -> ResendStatus {
        self.status
    }

    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    pub const fn is_sending(&self) -> bool {
        matches!(self.status, ResendStatus::Sending)
    }

    /// Submit pressed. Returns `false` when nothing should be sent.
    pub fn begin(&mut self, email: &str) -> bool {
        if self.is_sending() {
            return false;
        }
        if email.trim().is_empty() {
            self.status = ResendStatus::MissingEmail;
            return false;
        }
        self.status = ResendStatus::Sending;
        self.attempts = self.attempts.saturating_add(1);
        true
    }

    pub fn finish(&mut self, delivered: bool) {
        if self.is_sending() {
            self.status = if delivered {
                ResendStatus::Sent
            } else {
                ResendStatus::Failed
            };
        }
    }
}
