//! Cancellable timers and the debouncer built on them.
//!
//! [`TimerDriver`] is the only piece that knows about a runtime; the
//! debouncer just schedules and cancels through it.

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use futures::future::BoxFuture;
use tokio::task::JoinHandle;

pub trait TimerHandle: Send {
    /// Prevents the task from starting if the timer has not fired yet. A task
    /// that already started is left alone.
    fn cancel(&self);
}

pub trait TimerDriver: Send + Sync {
    fn schedule(&self, delay: Duration, task: BoxFuture<'static, ()>) -> Box<dyn TimerHandle>;
}

pub struct TokioTimerDriver;

struct TokioTimer {
    handle: JoinHandle<()>,
}

impl TimerHandle for TokioTimer {
    fn cancel(&self) {
        self.handle.abort();
    }
}

impl TimerDriver for TokioTimerDriver {
    fn schedule(&self, delay: Duration, task: BoxFuture<'static, ()>) -> Box<dyn TimerHandle> {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // detached so cancelling the timer never aborts a running task
            tokio::spawn(task);
        });
        Box::new(TokioTimer { handle })
    }
}

/// Runs only the most recently triggered task, once `delay` has passed
/// without another trigger.
pub struct Debouncer {
    delay: Duration,
    driver: Arc<dyn TimerDriver>,
    pending: Mutex<Option<Box<dyn TimerHandle>>>,
}

impl Debouncer {
    pub fn new(delay: Duration, driver: Arc<dyn TimerDriver>) -> Self {
        Self {
            delay,
            driver,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn trigger(&self, task: BoxFuture<'static, ()>) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.cancel();
        }
        *pending = Some(self.driver.schedule(self.delay, task));
    }

    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.cancel();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "tests/timer_tests.rs"]
mod tests;
