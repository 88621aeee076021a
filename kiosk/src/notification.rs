//! Single-slot toast

use std::fmt;
use std::time::Duration;

use crate::events::EventSink;
use crate::scheduler::{ScheduledTask, next_generation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationEvent {
    /// Auto-hide timer for notification `seq` fired
    Expired { seq: u64 },
}

struct Visible {
    seq: u64,
    notification: Notification,
    _timer: ScheduledTask,
}

/// Shows at most one notification; a newer one preempts the current one.
pub struct NotificationQueue {
    current: Option<Visible>,
    hide_after: Duration,
    sink: EventSink<NotificationEvent>,
}

impl NotificationQueue {
    pub fn new(hide_after: Duration, sink: EventSink<NotificationEvent>) -> Self {
        Self {
            current: None,
            hide_after,
            sink,
        }
    }

    /// Replace whatever is showing and re-arm the auto-hide timer
    pub fn show(&mut self, message: impl Into<String>, kind: NotificationKind) -> u64 {
        let seq = next_generation();
        let notification = Notification {
            message: message.into(),
            kind,
        };
        tracing::debug!(seq, %kind, message = %notification.message, "Notification shown");
        let timer = ScheduledTask::once(
            "notification-hide",
            self.hide_after,
            self.sink.clone(),
            NotificationEvent::Expired { seq },
        );
        self.current = Some(Visible {
            seq,
            notification,
            _timer: timer,
        });
        seq
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Hide if `seq` is still the one showing
    pub fn expire(&mut self, seq: u64) {
        if self.current.as_ref().is_some_and(|v| v.seq == seq) {
            self.current = None;
        }
    }

    pub fn handle(&mut self, event: NotificationEvent) {
        match event {
            NotificationEvent::Expired { seq } => self.expire(seq),
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref().map(|v| &v.notification)
    }
}

impl fmt::Debug for NotificationQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationQueue")
            .field("current", &self.current())
            .field("hide_after", &self.hide_after)
            .finish()
    }
}
