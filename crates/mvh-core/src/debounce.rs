#![forbid(unsafe_code)]

//! Latest-wins debouncing over the [`Timers`] capability.
//!
//! A [`Debouncer`] wraps an operation so that a rapid burst of calls collapses
//! into a single deferred execution: each call arms a fresh timer with the
//! call's payload and disarms whatever was pending. Only the payload of the
//! last call in a quiet window ever reaches the operation.
//!
//! # Invariants
//!
//! 1. At most one timer is pending per debouncer at any time.
//! 2. A superseded invocation never runs; intermediate payloads are dropped,
//!    not queued.
//! 3. The operation runs with the closure context captured at construction,
//!    not at call time.
//! 4. A zero delay still defers to the next scheduling tick (inherited from
//!    [`Timers::timeout`]).
//! 5. [`cancel`](Debouncer::cancel) and drop both disarm any pending timer;
//!    after either, nothing fires until the next call.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;
use web_time::Duration;

use crate::time::{TimerHandle, Timers};

/// Coalesces bursts of calls into one deferred `op(payload)`.
///
/// Single-threaded; share via clone-free `Rc` if multiple owners need to
/// trigger the same debouncer.
pub struct Debouncer<T = ()> {
    timers: Rc<dyn Timers>,
    delay: Duration,
    op: Rc<dyn Fn(T)>,
    pending: Rc<RefCell<Option<TimerHandle>>>,
}

impl<T: 'static> Debouncer<T> {
    /// Wrap `op` so it runs `delay` after the last call.
    #[must_use]
    pub fn new(timers: Rc<dyn Timers>, delay: Duration, op: impl Fn(T) + 'static) -> Self {
        Self {
            timers,
            delay,
            op: Rc::new(op),
            pending: Rc::new(RefCell::new(None)),
        }
    }

    /// Request an invocation with `payload`.
    ///
    /// Arms a fresh timer and disarms any pending one; the previous payload is
    /// discarded.
    pub fn call(&self, payload: T) {
        let pending = Rc::clone(&self.pending);
        let op = Rc::clone(&self.op);
        let handle = self.timers.timeout(
            self.delay,
            Box::new(move || {
                // Clear the slot first: the handle in it belongs to this very
                // timer, and `is_pending` must read false while `op` runs.
                pending.borrow_mut().take();
                op(payload);
            }),
        );

        let superseded = self.pending.borrow_mut().replace(handle);
        if superseded.is_some() {
            trace!(delay_us = self.delay.as_micros() as u64, "debounce superseded");
        }
    }

    /// Disarm any pending invocation without running it.
    pub fn cancel(&self) {
        if self.pending.borrow_mut().take().is_some() {
            trace!("debounce cancelled");
        }
    }

    /// Whether an invocation is currently armed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }

    /// The quiet-window length.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Debouncer<()> {
    /// Request an invocation with no payload.
    pub fn trigger(&self) {
        self.call(());
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        // Dropping the handle disarms the timer; a debouncer going away must
        // not leave a callback behind.
        self.pending.borrow_mut().take();
    }
}

impl<T> std::fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.pending.borrow().is_some())
            .finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
