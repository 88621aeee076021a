//! Order session
//!
//! Owns the one backend order a customer builds up over a session: the first
//! submission creates it, later ones append to it, a background poller keeps
//! the snapshot fresh, checkout pays for it and `complete_session` forgets it.
//!
//! # Stale responses
//!
//! Poll results arrive as [`SessionEvent`]s tagged with the order id and the
//! session revision at the time the fetch was issued. Every applied
//! create/append and every `complete_session` bumps the revision, so a slow
//! poll can never overwrite a newer snapshot or resurrect a finished session.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use kiosk_client::{ClientError, ClientResult, KioskApi};
use shared::order::{OrderAddItemsRequest, OrderCheckoutRequest, OrderCreateRequest, OrderItemRequest};
use shared::{Demographics, Order, OrderId, PaymentMethod};
use thiserror::Error;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::cart::CartLine;
use crate::events::EventSink;
use crate::scheduler::ScheduledTask;

// ============================================================================
// Types
// ============================================================================

/// Latest known server order for this session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OrderState {
    #[default]
    NoOrder,
    Active(Order),
}

impl OrderState {
    pub fn order(&self) -> Option<&Order> {
        match self {
            Self::NoOrder => None,
            Self::Active(order) => Some(order),
        }
    }

    pub fn order_id(&self) -> Option<OrderId> {
        self.order().map(|o| o.id)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}

#[derive(Debug)]
pub enum SessionEvent {
    /// A background fetch finished
    Polled {
        order_id: OrderId,
        revision: u64,
        result: ClientResult<Order>,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// Checkout was requested before any order exists
    #[error("No active order")]
    NoActiveOrder,

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl SessionError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Client(e) if e.is_unauthorized())
    }
}

/// What `send_order` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Nothing to send
    Skipped,
    Created(OrderId),
    Appended(OrderId),
}

/// What `apply_poll` did with a poll response
#[derive(Debug)]
pub enum PollOutcome {
    Applied,
    /// Response belongs to another order or predates a newer snapshot
    Discarded,
    /// Fetch failed; retried on the next tick
    Failed(ClientError),
}

// ============================================================================
// Manager
// ============================================================================

pub struct OrderSessionManager {
    api: Arc<dyn KioskApi>,
    state: OrderState,
    demographics: Option<Demographics>,
    paid_with: Option<PaymentMethod>,
    revision: Arc<AtomicU64>,
    poller: Option<ScheduledTask>,
    poll_interval: Duration,
    sink: EventSink<SessionEvent>,
}

impl OrderSessionManager {
    pub fn new(api: Arc<dyn KioskApi>, poll_interval: Duration, sink: EventSink<SessionEvent>) -> Self {
        Self {
            api,
            state: OrderState::NoOrder,
            demographics: None,
            paid_with: None,
            revision: Arc::new(AtomicU64::new(0)),
            poller: None,
            poll_interval,
            sink,
        }
    }

    /// Attributes forwarded on the next order-create call
    pub fn set_demographics(&mut self, demographics: Demographics) {
        self.demographics = Some(demographics);
    }

    pub fn demographics(&self) -> Option<Demographics> {
        self.demographics
    }

    pub fn state(&self) -> &OrderState {
        &self.state
    }

    pub fn order(&self) -> Option<&Order> {
        self.state.order()
    }

    pub fn order_id(&self) -> Option<OrderId> {
        self.state.order_id()
    }

    /// Method the order was paid with, once checkout succeeded
    pub fn paid_with(&self) -> Option<PaymentMethod> {
        self.paid_with
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(|p| !p.is_finished())
    }

    /// Total of everything submitted this session, from the current snapshot
    pub fn session_total(&self) -> i64 {
        self.order().map_or(0, Order::total)
    }

    /// Submit cart lines: create the order on the first call, append after.
    ///
    /// `on_success` runs only after the server accepted the lines. On error
    /// nothing changes, so the caller can retry with the same lines.
    pub async fn send_order<F>(&mut self, lines: &[CartLine], on_success: F) -> Result<Submission, SessionError>
    where
        F: FnOnce(),
    {
        if lines.is_empty() {
            tracing::debug!("Nothing to send");
            return Ok(Submission::Skipped);
        }
        let items: Vec<OrderItemRequest> = lines.iter().map(CartLine::to_request).collect();

        let submission = match self.state.order_id() {
            None => {
                let request = OrderCreateRequest {
                    items,
                    age_group: self.demographics.map(|d| d.age_group),
                    gender: self.demographics.map(|d| d.gender),
                };
                let order = self.api.create_order(&request).await?;
                let order_id = order.id;
                tracing::info!(order_id = %order_id, lines = request.items.len(), "Order created");
                self.apply_snapshot(order);
                self.start_polling(order_id);
                Submission::Created(order_id)
            }
            Some(order_id) => {
                let order = self.api.add_items(order_id, &OrderAddItemsRequest { items }).await?;
                if order.id != order_id {
                    return Err(ClientError::InvalidResponse(format!(
                        "Appended to order {} but server returned order {}",
                        order_id, order.id
                    ))
                    .into());
                }
                tracing::info!(order_id = %order_id, lines = lines.len(), "Items appended");
                self.apply_snapshot(order);
                Submission::Appended(order_id)
            }
        };

        on_success();
        Ok(submission)
    }

    /// Pay for the current order. The snapshot is kept for the ticket view.
    pub async fn checkout(&mut self, method: PaymentMethod) -> Result<OrderId, SessionError> {
        let Some(order_id) = self.state.order_id() else {
            tracing::error!(method = %method, "Checkout requested without an active order");
            return Err(SessionError::NoActiveOrder);
        };
        self.api
            .checkout(order_id, &OrderCheckoutRequest { payment_method: method })
            .await?;
        self.paid_with = Some(method);
        tracing::info!(order_id = %order_id, method = %method, "Order checked out");
        Ok(order_id)
    }

    /// Forget the order, stop polling and clear the captured attributes. Idempotent.
    pub fn complete_session(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.cancel();
        }
        self.revision.fetch_add(1, Ordering::AcqRel);
        if let Some(order_id) = self.state.order_id() {
            tracing::info!(order_id = %order_id, "Session completed");
        }
        self.state = OrderState::NoOrder;
        self.demographics = None;
        self.paid_with = None;
    }

    /// Apply a poll result if it still describes the current snapshot.
    pub fn apply_poll(&mut self, event: SessionEvent) -> PollOutcome {
        let SessionEvent::Polled {
            order_id,
            revision,
            result,
        } = event;

        let order = match result {
            Ok(order) => order,
            Err(e) => {
                tracing::warn!(order_id = %order_id, error = %e, "Order poll failed");
                return PollOutcome::Failed(e);
            }
        };

        let current = self.revision.load(Ordering::Acquire);
        if self.state.order_id() != Some(order_id) || order.id != order_id || revision != current {
            tracing::debug!(
                order_id = %order_id,
                revision,
                current,
                "Discarding stale poll response"
            );
            return PollOutcome::Discarded;
        }

        if let Some(previous) = self.state.order()
            && previous.status != order.status
        {
            tracing::info!(order_id = %order_id, status = ?order.status, "Order status changed");
        }
        self.state = OrderState::Active(order);
        PollOutcome::Applied
    }

    fn apply_snapshot(&mut self, order: Order) {
        self.revision.fetch_add(1, Ordering::AcqRel);
        self.state = OrderState::Active(order);
    }

    fn start_polling(&mut self, order_id: OrderId) {
        if self.is_polling() {
            return;
        }
        let api = Arc::clone(&self.api);
        let sink = self.sink.clone();
        let revision = Arc::clone(&self.revision);
        let period = self.poll_interval;

        self.poller = Some(ScheduledTask::spawn("order-poll", async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let issued_at = revision.load(Ordering::Acquire);
                let result = api.fetch_order(order_id).await;
                let event = SessionEvent::Polled {
                    order_id,
                    revision: issued_at,
                    result,
                };
                if !sink.send(event) {
                    break;
                }
            }
        }));
    }
}
