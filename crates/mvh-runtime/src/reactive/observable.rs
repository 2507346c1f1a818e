#![forbid(unsafe_code)]

//! Shared, version-tracked values with change notification.
//!
//! # Design
//!
//! [`Observable<T>`] wraps a value in shared, reference-counted storage.
//! Cloning an `Observable` creates a new handle to the **same** inner state.
//! [`set()`](Observable::set) compares against the current value, and only a
//! genuine change bumps the version and notifies subscribers.
//!
//! Notification snapshots the subscriber list before invoking callbacks, so a
//! callback may read the value, set it, or subscribe/unsubscribe without
//! aliasing the interior borrow.
//!
//! # Failure Modes
//!
//! - **Subscriber sets the value again during notification**: the nested set
//!   runs a full notification cycle of its own with the newer value; the
//!   outer cycle then resumes with its (older) snapshot. Subscribers that
//!   care about the latest value should read it via
//!   [`get()`](Observable::get) instead of trusting the callback argument.
//! - **Observable dropped while subscriptions live**: the subscription guards
//!   hold only a weak reference; their drops become no-ops.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::trace;

type Subscriber<T> = Rc<dyn Fn(&T)>;

struct ObservableInner<T> {
    value: T,
    version: u64,
    next_subscriber_id: u64,
    subscribers: Vec<(u64, Subscriber<T>)>,
}

/// A shared, observable, version-tracked value.
///
/// # Invariants
///
/// 1. `version()` increments by exactly 1 per value-changing `set`.
/// 2. Subscribers are notified in registration order.
/// 3. Setting an equal value does not bump the version or notify.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create an observable holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                next_subscriber_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Run `read` against a reference to the current value.
    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        read(&self.inner.borrow().value)
    }

    /// Monotonically increasing change counter.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Replace the value, notifying subscribers if it actually changed.
    ///
    /// Returns `true` when the value changed.
    pub fn set(&self, value: T) -> bool {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                false
            } else {
                inner.value = value;
                inner.version += 1;
                true
            }
        };
        if changed {
            trace!(version = self.version(), "observable changed");
            self.notify();
        }
        changed
    }

    /// Derive the next value from the current one, then [`set`](Self::set) it.
    pub fn update(&self, derive: impl FnOnce(&T) -> T) -> bool {
        let next = self.with(derive);
        self.set(next)
    }

    /// Register `callback` to run on every value change.
    ///
    /// The callback stays registered until the returned [`Subscription`] is
    /// dropped. It is not invoked with the current value at registration.
    #[must_use]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_subscriber_id;
            inner.next_subscriber_id += 1;
            inner.subscribers.push((id, Rc::new(callback)));
            id
        };

        let weak: Weak<RefCell<ObservableInner<T>>> = Rc::downgrade(&self.inner);
        Subscription {
            remove: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner
                        .borrow_mut()
                        .subscribers
                        .retain(|(subscriber_id, _)| *subscriber_id != id);
                }
            })),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self) {
        // Snapshot subscribers and value so callbacks can re-enter freely.
        let value = self.get();
        let subscribers: Vec<Subscriber<T>> = self
            .inner
            .borrow()
            .subscribers
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in subscribers {
            callback(&value);
        }
    }
}

/// RAII guard for a subscriber registration.
///
/// Dropping it removes the callback; if the observable is already gone the
/// drop is a no-op.
pub struct Subscription {
    remove: Option<Box<dyn FnOnce()>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("live", &self.remove.is_some())
            .finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
