//! Top-level kiosk screens
//!
//! A fixed transition table drives which screen is active. Anything not in
//! the table is rejected with [`TransitionError`], except authentication
//! loss which returns to `Login` from everywhere else.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KioskState {
    #[default]
    Login,
    Standby,
    AttributeCapture,
    Ordering,
    Ticket,
}

impl fmt::Display for KioskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Login => "LOGIN",
            Self::Standby => "STANDBY",
            Self::AttributeCapture => "ATTRIBUTE_CAPTURE",
            Self::Ordering => "ORDERING",
            Self::Ticket => "TICKET",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Authenticated,
    AuthenticationLost,
    Start,
    AttributesCaptured,
    CaptureFailed,
    CheckedOut,
    TicketCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Illegal transition {event:?} from {from}")]
    Illegal { from: KioskState, event: Transition },
}

use KioskState::*;
use Transition::*;

/// `(from, event, to)`
const TRANSITIONS: &[(KioskState, Transition, KioskState)] = &[
    (Login, Authenticated, Standby),
    (Standby, Start, AttributeCapture),
    (AttributeCapture, AttributesCaptured, Ordering),
    (AttributeCapture, CaptureFailed, Standby),
    (Ordering, CheckedOut, Ticket),
    (Ticket, TicketCompleted, Standby),
];

/// Target state for `event` from `from`, if legal
pub fn target(from: KioskState, event: Transition) -> Option<KioskState> {
    if event == AuthenticationLost {
        return (from != Login).then_some(Login);
    }
    TRANSITIONS
        .iter()
        .find(|(f, e, _)| *f == from && *e == event)
        .map(|(_, _, to)| *to)
}

#[derive(Debug, Default)]
pub struct KioskStateMachine {
    state: KioskState,
}

impl KioskStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> KioskState {
        self.state
    }

    pub fn can_fire(&self, event: Transition) -> bool {
        target(self.state, event).is_some()
    }

    pub fn fire(&mut self, event: Transition) -> Result<KioskState, TransitionError> {
        let from = self.state;
        let to = target(from, event).ok_or(TransitionError::Illegal { from, event })?;
        self.state = to;
        tracing::info!(from = %from, to = %to, ?event, "Kiosk state changed");
        Ok(to)
    }
}
