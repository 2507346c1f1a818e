#![forbid(unsafe_code)]

//! Timer scheduling with a deterministic lab implementation.
//!
//! Everything in this crate that waits does so through the [`Timers`]
//! capability: schedule a one-shot callback, get back a [`TimerHandle`] that
//! cancels the callback when dropped. Production embeddings provide a
//! platform-backed implementation (the web crate wraps `setTimeout`); tests
//! and host-driven embeddings use [`LabTimers`], which only fires callbacks
//! when the owner advances the [`LabClock`] manually.
//!
//! # Invariants
//!
//! 1. A callback fires at most once.
//! 2. Dropping the [`TimerHandle`] before the deadline means the callback
//!    never fires.
//! 3. A zero delay still defers to the next scheduling tick — `timeout` never
//!    invokes the callback synchronously.
//! 4. [`LabTimers::advance`] runs due callbacks in deadline order, ties broken
//!    by scheduling order.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::trace;
use web_time::{Duration, Instant};

// ─── TimerHandle ─────────────────────────────────────────────────────────────

/// Guard for a scheduled callback. Dropping it cancels the timer.
///
/// Cancelling a timer that already fired is a no-op.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl TimerHandle {
    /// Wrap a cancellation action.
    #[must_use]
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

// ─── Timers ──────────────────────────────────────────────────────────────────

/// One-shot timer scheduling capability.
pub trait Timers {
    /// Schedule `callback` to run once after `delay`.
    ///
    /// The returned handle cancels the callback on drop, so callers that want
    /// the timer to survive must keep the handle alive.
    fn timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerHandle;
}

// ─── LabClock ────────────────────────────────────────────────────────────────

/// A manually-advanceable clock for deterministic tests.
///
/// All handles cloned from the same `LabClock` see the same time.
#[derive(Debug, Clone)]
pub struct LabClock {
    epoch: Instant,
    offset_us: Rc<Cell<u64>>,
}

impl LabClock {
    /// Create a new lab clock starting at `Instant::now()`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            offset_us: Rc::new(Cell::new(0)),
        }
    }

    /// Advance the lab clock by `delta`.
    pub fn advance(&self, delta: Duration) {
        let us = delta.as_micros().min(u64::MAX as u128) as u64;
        self.offset_us.set(self.offset_us.get().saturating_add(us));
    }

    /// Current lab time.
    #[must_use]
    pub fn now(&self) -> Instant {
        self.epoch + Duration::from_micros(self.offset_us.get())
    }
}

impl Default for LabClock {
    fn default() -> Self {
        Self::new()
    }
}

// ─── LabTimers ───────────────────────────────────────────────────────────────

struct LabEntry {
    deadline: Instant,
    seq: u64,
    cancelled: Rc<Cell<bool>>,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct LabTimersInner {
    next_seq: u64,
    entries: Vec<LabEntry>,
}

/// Deterministic timer wheel driven by a [`LabClock`].
///
/// Callbacks never run spontaneously: [`advance`](LabTimers::advance) moves
/// the clock and then drains every entry whose deadline has passed, in
/// deadline order. Callbacks may schedule further timers; newly due entries
/// are drained in the same call.
///
/// Cloning shares the underlying wheel and clock.
#[derive(Clone)]
pub struct LabTimers {
    clock: LabClock,
    inner: Rc<RefCell<LabTimersInner>>,
}

impl LabTimers {
    /// Create a timer wheel over a fresh clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(LabClock::new())
    }

    /// Create a timer wheel sharing an existing clock.
    #[must_use]
    pub fn with_clock(clock: LabClock) -> Self {
        Self {
            clock,
            inner: Rc::new(RefCell::new(LabTimersInner::default())),
        }
    }

    /// The clock driving this wheel.
    #[must_use]
    pub fn clock(&self) -> &LabClock {
        &self.clock
    }

    /// Advance the clock by `delta` and run every callback that came due.
    pub fn advance(&self, delta: Duration) {
        self.clock.advance(delta);
        self.run_due();
    }

    /// Run callbacks already due without moving the clock.
    ///
    /// This is the "next tick" for zero-delay timers.
    pub fn tick(&self) {
        self.run_due();
    }

    /// Number of scheduled, not-yet-fired, not-cancelled entries.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|e| !e.cancelled.get())
            .count()
    }

    fn run_due(&self) {
        loop {
            let now = self.clock.now();
            let due = {
                let mut inner = self.inner.borrow_mut();
                inner.entries.retain(|e| !e.cancelled.get());
                let idx = inner
                    .entries
                    .iter()
                    .enumerate()
                    .filter(|(_, e)| e.deadline <= now)
                    .min_by_key(|(_, e)| (e.deadline, e.seq))
                    .map(|(idx, _)| idx);
                match idx {
                    Some(idx) => Some(inner.entries.remove(idx)),
                    None => None,
                }
            };
            // The borrow is released before the callback runs so callbacks can
            // schedule or cancel freely.
            match due {
                Some(entry) => (entry.callback)(),
                None => break,
            }
        }
    }
}

impl Default for LabTimers {
    fn default() -> Self {
        Self::new()
    }
}

impl Timers for LabTimers {
    fn timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerHandle {
        let cancelled = Rc::new(Cell::new(false));
        let deadline = self.clock.now() + delay;
        let seq = {
            let mut inner = self.inner.borrow_mut();
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.entries.push(LabEntry {
                deadline,
                seq,
                cancelled: Rc::clone(&cancelled),
                callback,
            });
            seq
        };
        trace!(seq, delay_us = delay.as_micros() as u64, "lab timer armed");

        let flag = Rc::clone(&cancelled);
        TimerHandle::new(move || flag.set(true))
    }
}

impl std::fmt::Debug for LabTimers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabTimers")
            .field("pending", &self.pending_count())
            .finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lab_clock_advance_accumulates() {
        let clock = LabClock::new();
        let t0 = clock.now();
        clock.advance(Duration::from_millis(100));
        clock.advance(Duration::from_millis(200));
        assert_eq!(clock.now().duration_since(t0), Duration::from_millis(300));
    }

    #[test]
    fn timeout_fires_after_advance() {
        let timers = LabTimers::new();
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let _handle = timers.timeout(Duration::from_millis(50), Box::new(move || flag.set(true)));

        timers.advance(Duration::from_millis(49));
        assert!(!fired.get());
        timers.advance(Duration::from_millis(1));
        assert!(fired.get());
    }

    #[test]
    fn zero_delay_defers_to_next_tick() {
        let timers = LabTimers::new();
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let _handle = timers.timeout(Duration::ZERO, Box::new(move || flag.set(true)));

        // Not synchronous.
        assert!(!fired.get());
        timers.tick();
        assert!(fired.get());
    }

    #[test]
    fn dropping_handle_cancels() {
        let timers = LabTimers::new();
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let handle = timers.timeout(Duration::from_millis(10), Box::new(move || flag.set(true)));
        drop(handle);

        timers.advance(Duration::from_millis(20));
        assert!(!fired.get());
        assert_eq!(timers.pending_count(), 0);
    }

    #[test]
    fn callbacks_run_in_deadline_order() {
        let timers = LabTimers::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&order);
        let _b = timers.timeout(Duration::from_millis(20), Box::new(move || log.borrow_mut().push("late")));
        let log = Rc::clone(&order);
        let _a = timers.timeout(Duration::from_millis(10), Box::new(move || log.borrow_mut().push("early")));

        timers.advance(Duration::from_millis(30));
        assert_eq!(*order.borrow(), vec!["early", "late"]);
    }

    #[test]
    fn same_deadline_runs_in_scheduling_order() {
        let timers = LabTimers::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&order);
        let _a = timers.timeout(Duration::from_millis(10), Box::new(move || log.borrow_mut().push(1)));
        let log = Rc::clone(&order);
        let _b = timers.timeout(Duration::from_millis(10), Box::new(move || log.borrow_mut().push(2)));

        timers.advance(Duration::from_millis(10));
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn callback_may_schedule_followup() {
        let timers = LabTimers::new();
        let fired = Rc::new(Cell::new(0u32));

        let inner_timers = timers.clone();
        let count = Rc::clone(&fired);
        let handles = Rc::new(RefCell::new(Vec::new()));
        let handles_inner = Rc::clone(&handles);
        let outer = timers.timeout(
            Duration::from_millis(10),
            Box::new(move || {
                count.set(count.get() + 1);
                let count = Rc::clone(&count);
                let follow = inner_timers.timeout(
                    Duration::from_millis(5),
                    Box::new(move || count.set(count.get() + 1)),
                );
                handles_inner.borrow_mut().push(follow);
            }),
        );

        // One advance covers both the original deadline and the follow-up.
        timers.advance(Duration::from_millis(20));
        assert_eq!(fired.get(), 2);
        drop(outer);
    }

    #[test]
    fn cancel_from_inside_callback() {
        let timers = LabTimers::new();
        let fired = Rc::new(Cell::new(false));

        let slot: Rc<RefCell<Option<TimerHandle>>> = Rc::new(RefCell::new(None));
        let flag = Rc::clone(&fired);
        let victim = timers.timeout(Duration::from_millis(20), Box::new(move || flag.set(true)));
        *slot.borrow_mut() = Some(victim);

        let slot_inner = Rc::clone(&slot);
        let _killer = timers.timeout(
            Duration::from_millis(10),
            Box::new(move || {
                slot_inner.borrow_mut().take();
            }),
        );

        timers.advance(Duration::from_millis(30));
        assert!(!fired.get());
    }
}
