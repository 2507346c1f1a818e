#![forbid(unsafe_code)]

//! In-memory window/document fakes for downstream test suites.
//!
//! Both fakes are cheap handles: cloning shares the underlying state, so a
//! test can hand one clone to the code under test and keep another for
//! assertions. No global state is monkeypatched anywhere.

use std::cell::RefCell;
use std::rc::Rc;

use crate::platform::{DocumentLike, ListenerGuard, WindowLike};

// ─── FakeWindow ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeWindowInner {
    height: f64,
    next_id: u64,
    listeners: Vec<(u64, Rc<dyn Fn()>)>,
    added_ids: Vec<u64>,
    removed_ids: Vec<u64>,
}

/// A fake [`WindowLike`] with a settable height and manual resize emission.
#[derive(Clone)]
pub struct FakeWindow {
    inner: Rc<RefCell<FakeWindowInner>>,
}

impl FakeWindow {
    /// Create a fake window reporting `height` as its inner height.
    #[must_use]
    pub fn new(height: f64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(FakeWindowInner {
                height,
                ..FakeWindowInner::default()
            })),
        }
    }

    /// Change the reported inner height. Does not emit a resize event.
    pub fn set_inner_height(&self, height: f64) {
        self.inner.borrow_mut().height = height;
    }

    /// Change the reported inner height and emit a resize event.
    pub fn resize_to(&self, height: f64) {
        self.set_inner_height(height);
        self.emit_resize();
    }

    /// Invoke every registered resize listener.
    pub fn emit_resize(&self) {
        // Snapshot first: a listener may unregister during dispatch.
        let listeners: Vec<Rc<dyn Fn()>> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    /// Number of currently registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Registration ids handed out so far, in order.
    #[must_use]
    pub fn added_ids(&self) -> Vec<u64> {
        self.inner.borrow().added_ids.clone()
    }

    /// Registration ids removed so far, in order.
    #[must_use]
    pub fn removed_ids(&self) -> Vec<u64> {
        self.inner.borrow().removed_ids.clone()
    }
}

impl WindowLike for FakeWindow {
    fn inner_height(&self) -> f64 {
        self.inner.borrow().height
    }

    fn on_resize(&self, listener: Rc<dyn Fn()>) -> ListenerGuard {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.push((id, listener));
            inner.added_ids.push(id);
            id
        };

        let shared = Rc::clone(&self.inner);
        ListenerGuard::new(move || {
            let mut inner = shared.borrow_mut();
            inner.listeners.retain(|(listener_id, _)| *listener_id != id);
            inner.removed_ids.push(id);
        })
    }
}

impl std::fmt::Debug for FakeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("FakeWindow")
            .field("height", &inner.height)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

// ─── FakeDocument ────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeDocumentInner {
    property_writes: Vec<(String, String)>,
    container_classes: Vec<String>,
    container_attributes: Vec<(String, String)>,
    styles: Vec<String>,
}

/// A fake [`DocumentLike`] that records every root-element mutation.
#[derive(Clone, Default)]
pub struct FakeDocument {
    inner: Rc<RefCell<FakeDocumentInner>>,
}

impl FakeDocument {
    /// Create an empty fake document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value written for a root style property, if any.
    #[must_use]
    pub fn root_property(&self, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .property_writes
            .iter()
            .rev()
            .find(|(property, _)| property == name)
            .map(|(_, value)| value.clone())
    }

    /// Number of writes recorded for a root style property.
    #[must_use]
    pub fn property_write_count(&self, name: &str) -> usize {
        self.inner
            .borrow()
            .property_writes
            .iter()
            .filter(|(property, _)| property == name)
            .count()
    }

    /// Classes added to the application container, in order.
    #[must_use]
    pub fn container_classes(&self) -> Vec<String> {
        self.inner.borrow().container_classes.clone()
    }

    /// Last value set for a container attribute, if any.
    #[must_use]
    pub fn container_attribute(&self, name: &str) -> Option<String> {
        self.inner
            .borrow()
            .container_attributes
            .iter()
            .rev()
            .find(|(attribute, _)| attribute == name)
            .map(|(_, value)| value.clone())
    }

    /// Number of attributes ever set on the application container.
    #[must_use]
    pub fn container_attribute_count(&self) -> usize {
        self.inner.borrow().container_attributes.len()
    }

    /// Stylesheets appended to the document, in order.
    #[must_use]
    pub fn styles(&self) -> Vec<String> {
        self.inner.borrow().styles.clone()
    }
}

impl DocumentLike for FakeDocument {
    fn set_root_property(&self, name: &str, value: &str) {
        self.inner
            .borrow_mut()
            .property_writes
            .push((name.to_string(), value.to_string()));
    }

    fn add_container_class(&self, class: &str) {
        self.inner
            .borrow_mut()
            .container_classes
            .push(class.to_string());
    }

    fn set_container_attribute(&self, name: &str, value: &str) {
        self.inner
            .borrow_mut()
            .container_attributes
            .push((name.to_string(), value.to_string()));
    }

    fn append_style(&self, css: &str) {
        self.inner.borrow_mut().styles.push(css.to_string());
    }
}

impl std::fmt::Debug for FakeDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("FakeDocument")
            .field("property_writes", &inner.property_writes.len())
            .field("container_classes", &inner.container_classes)
            .finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
