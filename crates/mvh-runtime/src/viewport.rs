#![forbid(unsafe_code)]

//! Viewport-unit synchronization across a start/stop lifecycle.
//!
//! A [`ViewportSync`] keeps one value — 1% of the window's inner height, in
//! pixels — consistent in two places: an inline custom property on the
//! document root (`--vh: <value>px`) and an [`Observable<f64>`] cell that
//! application code reads or subscribes to.
//!
//! Lifecycle: `idle → started → stopped`, one way. [`start`](ViewportSync::start)
//! publishes the current unit synchronously (so a correct value is visible
//! even in environments that never fire resize) and registers a debounced
//! resize listener; [`stop`](ViewportSync::stop) removes exactly that
//! registration and disarms any pending debounce timer, so no write can land
//! after teardown. Each start/stop cycle uses a fresh instance — restart is
//! deliberately unsupported.
//!
//! Dropping a started instance performs the same teardown through the RAII
//! guards it holds.
//!
//! # Invariants
//!
//! 1. Immediately after `start`, the CSS property and the cell agree with the
//!    current inner height, with no delay.
//! 2. A burst of resize events inside one quiet window produces exactly one
//!    recompute, reading the height current at fire time.
//! 3. After `stop` (or drop), zero listeners and zero pending timers remain.
//! 4. Two concurrently started instances keep independent cells and listeners
//!    but race on the shared CSS property, last write wins.

use std::rc::Rc;

use tracing::{debug, trace};
use web_time::Duration;

use mvh_core::debounce::Debouncer;
use mvh_core::platform::{DocumentLike, ListenerGuard, WindowLike};
use mvh_core::time::Timers;

use crate::reactive::{Observable, Subscription};

/// 1 viewport unit is 1% of the inner height.
const UNIT_SCALE: f64 = 0.01;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Configuration for [`ViewportSync`].
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Quiet window applied to resize events before recomputing.
    /// Default: 100ms.
    pub debounce: Duration,

    /// Custom-property name written to the root style.
    /// Default: `--vh`.
    pub property: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(100),
            property: String::from("--vh"),
        }
    }
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

/// Where a [`ViewportSync`] is in its one-way lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Constructed, not yet started.
    Idle,
    /// Listener registered, cell live.
    Started,
    /// Torn down. Terminal.
    Stopped,
}

/// Error returned on start/stop misuse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// `start` called while already started.
    AlreadyStarted,
    /// `stop` called before `start`.
    NotStarted,
    /// `start` or `stop` called after the instance was stopped.
    AlreadyStopped,
}

impl std::fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyStarted => write!(f, "viewport sync already started"),
            Self::NotStarted => write!(f, "viewport sync not started"),
            Self::AlreadyStopped => write!(f, "viewport sync already stopped"),
        }
    }
}

impl std::error::Error for LifecycleError {}

// ─── ViewportSync ────────────────────────────────────────────────────────────

/// Owns the viewport-unit cell and the resize wiring that keeps it fresh.
pub struct ViewportSync {
    window: Rc<dyn WindowLike>,
    document: Rc<dyn DocumentLike>,
    timers: Rc<dyn Timers>,
    config: SyncConfig,
    cell: Observable<f64>,
    state: SyncState,
    // Held while started; dropping them is the teardown.
    listener: Option<ListenerGuard>,
    debouncer: Option<Rc<Debouncer>>,
}

impl ViewportSync {
    /// Construct an idle synchronizer with the default configuration.
    #[must_use]
    pub fn new(
        window: Rc<dyn WindowLike>,
        document: Rc<dyn DocumentLike>,
        timers: Rc<dyn Timers>,
    ) -> Self {
        Self::with_config(window, document, timers, SyncConfig::default())
    }

    /// Construct an idle synchronizer with an explicit configuration.
    #[must_use]
    pub fn with_config(
        window: Rc<dyn WindowLike>,
        document: Rc<dyn DocumentLike>,
        timers: Rc<dyn Timers>,
        config: SyncConfig,
    ) -> Self {
        Self {
            window,
            document,
            timers,
            config,
            cell: Observable::new(0.0),
            state: SyncState::Idle,
            listener: None,
            debouncer: None,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Publish the current unit immediately and register the debounced
    /// resize listener.
    pub fn start(&mut self) -> Result<(), LifecycleError> {
        match self.state {
            SyncState::Idle => {}
            SyncState::Started => return Err(LifecycleError::AlreadyStarted),
            SyncState::Stopped => return Err(LifecycleError::AlreadyStopped),
        }

        // Synchronous first publish: correct before any resize fires.
        publish(&self.window, &self.document, &self.config.property, &self.cell);

        let window = Rc::clone(&self.window);
        let document = Rc::clone(&self.document);
        let property = self.config.property.clone();
        let cell = self.cell.clone();
        let debouncer = Rc::new(Debouncer::new(
            Rc::clone(&self.timers),
            self.config.debounce,
            move |()| publish(&window, &document, &property, &cell),
        ));

        let trigger = Rc::clone(&debouncer);
        self.listener = Some(self.window.on_resize(Rc::new(move || trigger.trigger())));
        self.debouncer = Some(debouncer);
        self.state = SyncState::Started;
        debug!(
            debounce_us = self.config.debounce.as_micros() as u64,
            property = %self.config.property,
            "viewport sync started"
        );
        Ok(())
    }

    /// Remove the resize listener registered by [`start`](Self::start) and
    /// disarm any pending recompute. Terminal.
    pub fn stop(&mut self) -> Result<(), LifecycleError> {
        match self.state {
            SyncState::Started => {}
            SyncState::Idle => return Err(LifecycleError::NotStarted),
            SyncState::Stopped => return Err(LifecycleError::AlreadyStopped),
        }

        // Guard drop removes the exact registration created at start.
        self.listener.take();
        if let Some(debouncer) = self.debouncer.take() {
            debouncer.cancel();
        }
        self.state = SyncState::Stopped;
        debug!("viewport sync stopped");
        Ok(())
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state
    }

    // ── Cell access ──────────────────────────────────────────────────

    /// Handle to the unit cell; clones share state with this synchronizer.
    #[must_use]
    pub fn cell(&self) -> Observable<f64> {
        self.cell.clone()
    }

    /// Most recently published unit value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.cell.get()
    }

    /// Subscribe to unit changes.
    #[must_use]
    pub fn subscribe(&self, callback: impl Fn(&f64) + 'static) -> Subscription {
        self.cell.subscribe(callback)
    }

    /// The configuration in effect.
    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }
}

impl Drop for ViewportSync {
    fn drop(&mut self) {
        // Field drops do the actual teardown; started instances just get a
        // breadcrumb in the log.
        if self.state == SyncState::Started {
            debug!("viewport sync dropped while started; tearing down");
        }
    }
}

impl std::fmt::Debug for ViewportSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportSync")
            .field("state", &self.state)
            .field("value", &self.cell.get())
            .field("config", &self.config)
            .finish()
    }
}

/// Read the height, derive the unit, and push it to both projections.
///
/// The style write is unconditional; the cell dedupes equal values itself.
fn publish(
    window: &Rc<dyn WindowLike>,
    document: &Rc<dyn DocumentLike>,
    property: &str,
    cell: &Observable<f64>,
) {
    let unit = window.inner_height() * UNIT_SCALE;
    document.set_root_property(property, &format!("{unit}px"));
    cell.set(unit);
    trace!(unit, "viewport unit published");
}

// ─── Tests ───────────────────────────────────────────────────────────────────
