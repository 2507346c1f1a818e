#![forbid(unsafe_code)]

//! Window-like and document-like capability traits.
//!
//! The synchronizer never touches ambient globals. It is handed a
//! [`WindowLike`] (viewport geometry + resize events) and a [`DocumentLike`]
//! (root-element mutations) at construction, so the same code runs against a
//! real browser window on wasm and against in-memory fakes everywhere else.
//!
//! # Invariants
//!
//! 1. [`WindowLike::on_resize`] registers exactly one listener and the
//!    returned [`ListenerGuard`] removes exactly that registration — never a
//!    freshly constructed callback.
//! 2. Dropping a [`ListenerGuard`] twice-removes nothing; removal happens
//!    once.

use std::rc::Rc;

// ─── ListenerGuard ───────────────────────────────────────────────────────────

/// Guard for an event-listener registration. Dropping it removes the listener.
pub struct ListenerGuard {
    remove: Option<Box<dyn FnOnce()>>,
}

impl ListenerGuard {
    /// Wrap a removal action.
    #[must_use]
    pub fn new(remove: impl FnOnce() + 'static) -> Self {
        Self {
            remove: Some(Box::new(remove)),
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("registered", &self.remove.is_some())
            .finish()
    }
}

// ─── Capability traits ───────────────────────────────────────────────────────

/// Read access to viewport geometry plus resize notification.
pub trait WindowLike {
    /// Current inner height of the viewport, in pixels.
    fn inner_height(&self) -> f64;

    /// Register `listener` for resize events.
    ///
    /// The listener stays registered until the returned guard is dropped.
    fn on_resize(&self, listener: Rc<dyn Fn()>) -> ListenerGuard;
}

/// Write access to the document: the root element's style plus the mounted
/// application container.
pub trait DocumentLike {
    /// Set an inline style property (e.g. a custom property) on the document
    /// root element.
    fn set_root_property(&self, name: &str, value: &str);

    /// Add a class to the mounted application container's class list.
    fn add_container_class(&self, class: &str);

    /// Set an attribute on the mounted application container.
    fn set_container_attribute(&self, name: &str, value: &str);

    /// Append a stylesheet to the document.
    fn append_style(&self, css: &str);
}
