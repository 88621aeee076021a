//! Kiosk timing configuration

use std::time::Duration;

use crate::payment::PaymentTiming;

/// Every fixed delay the kiosk runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KioskConfig {
    /// Order refresh period while an order is active
    pub poll_interval: Duration,
    /// Payment progress tick, step and settle delay
    pub payment: PaymentTiming,
    /// Notification auto-hide delay
    pub notification_timeout: Duration,
    /// Ticket screen auto-dismiss delay
    pub ticket_dismiss: Duration,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            payment: PaymentTiming::default(),
            notification_timeout: Duration::from_secs(3),
            ticket_dismiss: Duration::from_secs(8),
        }
    }
}

impl KioskConfig {
    /// Defaults, overridden by `KIOSK_POLL_INTERVAL_MS`, `KIOSK_NOTIFICATION_MS`
    /// and `KIOSK_TICKET_DISMISS_MS`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let millis = |name: &str, default: Duration| {
            lookup(name)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(default)
        };
        let defaults = Self::default();
        Self {
            poll_interval: millis("KIOSK_POLL_INTERVAL_MS", defaults.poll_interval),
            payment: defaults.payment,
            notification_timeout: millis("KIOSK_NOTIFICATION_MS", defaults.notification_timeout),
            ticket_dismiss: millis("KIOSK_TICKET_DISMISS_MS", defaults.ticket_dismiss),
        }
    }
}
