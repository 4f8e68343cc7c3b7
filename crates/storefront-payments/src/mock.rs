//! Mock Payment Gateway
//!
//! In-memory gateway for tests and local demos. Sessions live in a bounded
//! map; tests decide when a session becomes paid.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use storefront_core::{
    CheckoutSession, PaymentGateway, PaymentStatus, Result, SessionDetails, SessionRequest,
    StorefrontError, gateway::SESSION_ID_PLACEHOLDER,
};

const DEFAULT_CHECKOUT_BASE: &str = "https://checkout.mock.test";

/// Sessions kept before the oldest are forgotten
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// A session held by the mock
#[derive(Clone, Debug)]
pub struct MockSession {
    pub request: Option<SessionRequest>,
    pub payment_status: PaymentStatus,
    pub customer_email: Option<String>,
}

/// Session map that evicts in insertion order once full
#[derive(Debug)]
struct SessionTable {
    by_id: HashMap<String, MockSession>,
    order: VecDeque<String>,
    capacity: usize,
}

impl SessionTable {
    fn new(capacity: usize) -> Self {
        Self {
            by_id: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn insert(&mut self, session_id: String, session: MockSession) {
        if self.by_id.insert(session_id.clone(), session).is_some() {
            return;
        }
        self.order.push_back(session_id);

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.by_id.remove(&oldest);
            }
        }
    }

    fn get(&self, session_id: &str) -> Option<&MockSession> {
        self.by_id.get(session_id)
    }

    fn get_mut(&mut self, session_id: &str) -> Option<&mut MockSession> {
        self.by_id.get_mut(session_id)
    }

    fn len(&self) -> usize {
        self.by_id.len()
    }
}

/// In-memory gateway with call counters and an outage switch
pub struct MockGateway {
    sessions: RwLock<SessionTable>,
    checkout_base: String,

    /// Sessions are paid as soon as they are created
    instant_payment: bool,

    outage: AtomicBool,
    create_calls: AtomicUsize,
    retrieve_calls: AtomicUsize,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(SessionTable::new(DEFAULT_MAX_SESSIONS)),
            checkout_base: DEFAULT_CHECKOUT_BASE.into(),
            instant_payment: false,
            outage: AtomicBool::new(false),
            create_calls: AtomicUsize::new(0),
            retrieve_calls: AtomicUsize::new(0),
        }
    }

    /// Demo mode: every session is paid at once and the redirect goes
    /// straight back to the success URL
    pub fn instant() -> Self {
        Self {
            instant_payment: true,
            ..Self::new()
        }
    }

    /// Keep at most `capacity` sessions; older ones become unknown
    #[must_use]
    pub fn with_capacity(self, capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(SessionTable::new(capacity)),
            ..self
        }
    }

    /// Register a session that was "created elsewhere"
    pub async fn insert_session(
        &self,
        session_id: impl Into<String>,
        payment_status: PaymentStatus,
        customer_email: Option<&str>,
    ) {
        self.sessions.write().await.insert(
            session_id.into(),
            MockSession {
                request: None,
                payment_status,
                customer_email: customer_email.map(ToString::to_string),
            },
        );
    }

    /// Simulate the buyer finishing the hosted page. Returns `false` for
    /// unknown sessions.
    pub async fn complete_payment(&self, session_id: &str, customer_email: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(session) => {
                session.payment_status = PaymentStatus::Paid;
                session.customer_email = Some(customer_email.to_string());
                true
            }
            None => false,
        }
    }

    /// Where the hosted page would send the buyer back to
    pub async fn success_redirect(&self, session_id: &str) -> Option<String> {
        let sessions = self.sessions.read().await;
        let request = sessions.get(session_id)?.request.as_ref()?;
        Some(request.success_url.replace(SESSION_ID_PLACEHOLDER, session_id))
    }

    pub async fn session(&self, session_id: &str) -> Option<MockSession> {
        self.sessions.read().await.get(session_id).cloned()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Make every call fail as if the gateway were unreachable
    pub fn set_outage(&self, down: bool) {
        self.outage.store(down, Ordering::SeqCst);
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn retrieve_calls(&self) -> usize {
        self.retrieve_calls.load(Ordering::SeqCst)
    }

    fn check_outage(&self) -> Result<()> {
        if self.outage.load(Ordering::SeqCst) {
            return Err(StorefrontError::PaymentGateway(
                "mock gateway unavailable".into(),
            ));
        }
        Ok(())
    }

    fn redirect_url(&self, session_id: &str, request: &SessionRequest) -> String {
        if self.instant_payment {
            return request.success_url.replace(SESSION_ID_PLACEHOLDER, session_id);
        }

        let quantity: u32 = request.line_items.iter().map(|item| item.quantity).sum();
        let currency = request
            .line_items
            .first()
            .map_or("usd", |item| item.currency.as_str());

        format!(
            "{}/pay/{session_id}?amount={}&currency={currency}&quantity={quantity}",
            self.checkout_base,
            request.total_amount().unwrap_or_default(),
        )
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_session(&self, request: &SessionRequest) -> Result<CheckoutSession> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_outage()?;
        request.validate()?;

        let id = format!("cs_test_{}", uuid::Uuid::new_v4().simple());
        let redirect_url = self.redirect_url(&id, request);
        let payment_status = if self.instant_payment {
            PaymentStatus::Paid
        } else {
            PaymentStatus::Unpaid
        };

        // Demo sessions never go through success_redirect
        self.sessions.write().await.insert(
            id.clone(),
            MockSession {
                request: (!self.instant_payment).then(|| request.clone()),
                payment_status,
                customer_email: None,
            },
        );

        Ok(CheckoutSession { id, redirect_url })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionDetails> {
        self.retrieve_calls.fetch_add(1, Ordering::SeqCst);
        self.check_outage()?;

        let sessions = self.sessions.read().await;
        let session = sessions
            .get(session_id)
            .ok_or_else(|| StorefrontError::SessionNotFound(session_id.to_string()))?;

        Ok(SessionDetails {
            payment_status: session.payment_status,
            customer_email: session.customer_email.clone(),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
