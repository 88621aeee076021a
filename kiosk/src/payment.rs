//! Payment modal
//!
//! `Select → Action → Processing → Done`. The customer picks a method,
//! performs the simulated physical step, then a progress counter runs to 100
//! and, after a short settle delay, the flow yields the confirmed method
//! exactly once. Processing cannot be cancelled.

use std::fmt;
use std::time::Duration;

use shared::PaymentMethod;
use thiserror::Error;

use crate::events::EventSink;
use crate::scheduler::{ScheduledTask, next_generation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStep {
    Select,
    Action,
    Processing,
    Done,
}

impl fmt::Display for PaymentStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Select => "select",
            Self::Action => "action",
            Self::Processing => "processing",
            Self::Done => "done",
        };
        f.write_str(s)
    }
}

/// Timer events, tagged with the processing run that scheduled them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEvent {
    Tick { run: u64 },
    Settled { run: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("Cannot {action} while payment is in the {step} step")]
    InvalidStep {
        step: PaymentStep,
        action: &'static str,
    },

    #[error("Payment is processing and cannot be cancelled")]
    NotCancelable,
}

/// Progress timer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentTiming {
    pub tick: Duration,
    /// Percentage points added per tick
    pub step: u8,
    pub settle: Duration,
}

impl Default for PaymentTiming {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(200),
            step: 10,
            settle: Duration::from_millis(500),
        }
    }
}

pub struct PaymentFlow {
    total: i64,
    method: PaymentMethod,
    step: PaymentStep,
    progress: u8,
    run: u64,
    timing: PaymentTiming,
    sink: EventSink<PaymentEvent>,
    timer: Option<ScheduledTask>,
}

impl PaymentFlow {
    pub fn new(total: i64, timing: PaymentTiming, sink: EventSink<PaymentEvent>) -> Self {
        Self {
            total,
            method: PaymentMethod::default(),
            step: PaymentStep::Select,
            progress: 0,
            run: 0,
            timing: PaymentTiming {
                step: timing.step.clamp(1, 100),
                ..timing
            },
            sink,
            timer: None,
        }
    }

    pub fn step(&self) -> PaymentStep {
        self.step
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    /// Percent complete, 0..=100
    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Text for the current step
    pub fn prompt(&self) -> &'static str {
        match self.step {
            PaymentStep::Select => "Choose a payment method",
            PaymentStep::Action => self.method.action_prompt(),
            PaymentStep::Processing => "Processing payment...",
            PaymentStep::Done => "Payment complete",
        }
    }

    pub fn select_method(&mut self, method: PaymentMethod) -> Result<(), PaymentError> {
        self.expect_step(PaymentStep::Select, "select a method")?;
        self.method = method;
        Ok(())
    }

    /// Select → Action
    pub fn confirm(&mut self) -> Result<(), PaymentError> {
        self.expect_step(PaymentStep::Select, "confirm")?;
        self.step = PaymentStep::Action;
        tracing::debug!(method = %self.method, "Payment method confirmed");
        Ok(())
    }

    /// Action → Select
    pub fn back(&mut self) -> Result<(), PaymentError> {
        self.expect_step(PaymentStep::Action, "go back")?;
        self.reset(PaymentStep::Select);
        Ok(())
    }

    /// Abandon the flow before processing starts
    pub fn cancel(&mut self) -> Result<(), PaymentError> {
        match self.step {
            PaymentStep::Processing => Err(PaymentError::NotCancelable),
            PaymentStep::Select | PaymentStep::Action => {
                self.reset(PaymentStep::Select);
                Ok(())
            }
            PaymentStep::Done => Ok(()),
        }
    }

    /// Action → Processing; starts a fresh progress run
    pub fn complete_action(&mut self) -> Result<(), PaymentError> {
        self.expect_step(PaymentStep::Action, "complete the action")?;
        self.step = PaymentStep::Processing;
        self.progress = 0;
        self.run = next_generation();
        let run = self.run;
        self.timer = Some(ScheduledTask::every(
            "payment-progress",
            self.timing.tick,
            self.sink.clone(),
            move || PaymentEvent::Tick { run },
        ));
        tracing::info!(method = %self.method, total = self.total, "Payment processing");
        Ok(())
    }

    /// Advance progress by one step; arms the settle timer at 100.
    pub fn tick(&mut self) -> u8 {
        if self.step != PaymentStep::Processing || self.progress >= 100 {
            return self.progress;
        }
        self.progress = self.progress.saturating_add(self.timing.step).min(100);
        if self.progress == 100 {
            self.timer = Some(ScheduledTask::once(
                "payment-settle",
                self.timing.settle,
                self.sink.clone(),
                PaymentEvent::Settled { run: self.run },
            ));
        }
        self.progress
    }

    /// Apply a timer event. Returns the method once, when payment settles.
    pub fn handle(&mut self, event: PaymentEvent) -> Option<PaymentMethod> {
        let run = match event {
            PaymentEvent::Tick { run } | PaymentEvent::Settled { run } => run,
        };
        if run != self.run || self.step != PaymentStep::Processing {
            tracing::debug!(?event, current = self.run, "Ignoring payment event from another run");
            return None;
        }
        match event {
            PaymentEvent::Tick { .. } => {
                self.tick();
                None
            }
            PaymentEvent::Settled { .. } if self.progress == 100 => {
                self.step = PaymentStep::Done;
                self.timer = None;
                tracing::info!(method = %self.method, "Payment settled");
                Some(self.method)
            }
            PaymentEvent::Settled { .. } => None,
        }
    }

    fn reset(&mut self, step: PaymentStep) {
        self.timer = None;
        self.progress = 0;
        self.step = step;
    }

    fn expect_step(&self, expected: PaymentStep, action: &'static str) -> Result<(), PaymentError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(PaymentError::InvalidStep {
                step: self.step,
                action,
            })
        }
    }
}

impl fmt::Debug for PaymentFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentFlow")
            .field("total", &self.total)
            .field("method", &self.method)
            .field("step", &self.step)
            .field("progress", &self.progress)
            .field("run", &self.run)
            .finish()
    }
}
