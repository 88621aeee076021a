//! Cancellable scheduled tasks
//!
//! Every recurring or delayed callback in the kiosk (order polling, payment
//! progress, notification auto-hide, ticket auto-dismiss) is a
//! [`ScheduledTask`] owned by the component that started it. Dropping the
//! handle aborts the task, so tearing a component down can never leave a
//! timer behind that mutates a dead session.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::events::EventSink;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique tag for one timer run.
///
/// Events carry the generation they were scheduled under; receivers compare
/// it with their current one and drop anything older.
pub fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Handle to a spawned timer task; aborted on drop
#[derive(Debug)]
pub struct ScheduledTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Run an arbitrary future under a cancellable handle
    pub fn spawn<F>(name: &'static str, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::debug!(task = name, "Scheduled task started");
        Self {
            name,
            handle: tokio::spawn(future),
        }
    }

    /// Deliver `event` once after `delay`
    pub fn once<E>(name: &'static str, delay: Duration, sink: EventSink<E>, event: E) -> Self
    where
        E: Send + 'static,
    {
        Self::spawn(name, async move {
            tokio::time::sleep(delay).await;
            sink.send(event);
        })
    }

    /// Deliver `make()` every `period`, first one period from now
    pub fn every<E, F>(name: &'static str, period: Duration, sink: EventSink<E>, mut make: F) -> Self
    where
        E: Send + 'static,
        F: FnMut() -> E + Send + 'static,
    {
        Self::spawn(name, async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !sink.send(make()) {
                    break;
                }
            }
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Abort now (same as dropping the handle)
    pub fn cancel(self) {}
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            self.handle.abort();
            tracing::debug!(task = self.name, "Scheduled task cancelled");
        }
    }
}
