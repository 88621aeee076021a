//! Kiosk event channel
//!
//! Timers and background requests never touch kiosk state directly. They send
//! a [`KioskEvent`] over one unbounded channel and the [`Kiosk`](crate::Kiosk)
//! applies it on its own task, one event at a time.

use std::fmt;
use tokio::sync::mpsc;

use crate::notification::NotificationEvent;
use crate::payment::PaymentEvent;
use crate::session::SessionEvent;
use crate::ticket::TicketEvent;

/// Everything that can wake the kiosk besides a direct user call
#[derive(Debug)]
pub enum KioskEvent {
    Session(SessionEvent),
    Payment(PaymentEvent),
    Notification(NotificationEvent),
    Ticket(TicketEvent),
}

pub type EventSender = mpsc::UnboundedSender<KioskEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<KioskEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Typed sender for one component's events
pub struct EventSink<E> {
    tx: EventSender,
    wrap: fn(E) -> KioskEvent,
}

impl<E> EventSink<E> {
    pub fn new(tx: EventSender, wrap: fn(E) -> KioskEvent) -> Self {
        Self { tx, wrap }
    }

    /// Returns false once the kiosk has gone away
    pub fn send(&self, event: E) -> bool {
        self.tx.send((self.wrap)(event)).is_ok()
    }
}

impl<E> Clone for EventSink<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            wrap: self.wrap,
        }
    }
}

impl<E> fmt::Debug for EventSink<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}
