//! Kiosk error type

use kiosk_client::ClientError;
use shared::{ItemId, OptionId};
use thiserror::Error;

use crate::capture::CaptureError;
use crate::machine::{KioskState, TransitionError};
use crate::payment::PaymentError;
use crate::session::SessionError;

#[derive(Debug, Error)]
pub enum KioskError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Expected {expected} screen, kiosk is on {actual}")]
    WrongState {
        expected: KioskState,
        actual: KioskState,
    },

    #[error("Unknown item {0}")]
    UnknownItem(ItemId),

    #[error("Option {option} is not available for item {item}")]
    UnknownOption { item: ItemId, option: OptionId },

    #[error("Item {0} is sold out")]
    SoldOut(ItemId),

    #[error("Nothing has been ordered yet")]
    NoActiveOrder,

    #[error("Payment is not open")]
    PaymentNotOpen,
}

impl KioskError {
    /// Programming errors the UI sequencing should never allow
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::Session(SessionError::NoActiveOrder) | Self::Transition(_)
        )
    }

    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Client(e) => e.is_unauthorized(),
            Self::Session(e) => e.is_unauthorized(),
            Self::NotAuthenticated => true,
            _ => false,
        }
    }
}

pub type KioskResult<T> = Result<T, KioskError>;
