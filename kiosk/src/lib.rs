//! Self-service ordering kiosk
//!
//! Sequences one customer session across the kiosk screens
//! (login → standby → attribute capture → ordering → ticket) on top of the
//! ordering backend:
//!
//! - [`cart`]: pending lines, merged by item and option set
//! - [`session`]: the backend order for the session, with polling
//! - [`payment`]: the payment modal sub-flow
//! - [`machine`]: the screen transition table
//! - [`notification`], [`ticket`]: user feedback and the call-number ticket
//! - [`controller`]: [`Kiosk`], which composes all of the above
//!
//! Timers are [`scheduler::ScheduledTask`]s owned by the component that
//! started them and report back through [`events::KioskEvent`].

pub mod capture;
pub mod cart;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod logger;
pub mod machine;
pub mod menu;
pub mod notification;
pub mod payment;
pub mod scheduler;
pub mod session;
pub mod ticket;

#[cfg(test)]
mod test_support;

pub use capture::{CameraCapture, CaptureError, DemographicCapture, SurveyCapture};
pub use cart::{CartLine, CartModel};
pub use config::KioskConfig;
pub use controller::Kiosk;
pub use error::{KioskError, KioskResult};
pub use machine::{KioskState, KioskStateMachine, Transition};
pub use notification::{Notification, NotificationKind, NotificationQueue};
pub use payment::{PaymentFlow, PaymentStep};
pub use session::{OrderSessionManager, OrderState, Submission};
pub use ticket::{TicketFormatter, call_number};
