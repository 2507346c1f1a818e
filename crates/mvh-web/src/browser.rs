#![forbid(unsafe_code)]

//! Browser-backed platform implementation.
//!
//! [`BrowserPlatform`] implements the capability traits over the real
//! `window`/`document` globals: `innerHeight` reads, `resize` listeners,
//! `setTimeout` timers, root-style writes, and container tagging. One value
//! implements all three traits, so a single `Rc` wires the whole plugin.
//!
//! Only compiled for wasm32; every other target works against injected
//! implementations.

use std::rc::Rc;

use gloo_events::EventListener;
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Window};
use web_time::Duration;

use mvh_core::platform::{DocumentLike, ListenerGuard, WindowLike};
use mvh_core::time::{TimerHandle, Timers};
use mvh_runtime::viewport::LifecycleError;

use crate::options::ModuleOptions;
use crate::plugin::VhPlugin;

/// The real browser window, document, and application container.
pub struct BrowserPlatform {
    window: Window,
    document: Document,
    container: Element,
}

impl BrowserPlatform {
    /// Platform over the globals, with `document.body` as the container.
    ///
    /// Returns `None` outside a browsing context.
    #[must_use]
    pub fn from_global() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let container = Element::from(document.body()?);
        Some(Self {
            window,
            document,
            container,
        })
    }

    /// Platform over the globals with an explicit application container.
    #[must_use]
    pub fn with_container(container: Element) -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self {
            window,
            document,
            container,
        })
    }

    /// Install the viewport-height plugin over this platform.
    pub fn install(self, options: ModuleOptions) -> Result<VhPlugin, LifecycleError> {
        let platform = Rc::new(self);
        VhPlugin::install(
            Rc::clone(&platform) as Rc<dyn WindowLike>,
            Rc::clone(&platform) as Rc<dyn DocumentLike>,
            platform as Rc<dyn Timers>,
            options,
        )
    }
}

impl WindowLike for BrowserPlatform {
    fn inner_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|height| height.as_f64())
            .unwrap_or(0.0)
    }

    fn on_resize(&self, listener: Rc<dyn Fn()>) -> ListenerGuard {
        let registration =
            EventListener::new(&self.window, "resize", move |_event: &web_sys::Event| {
                listener();
            });
        // The EventListener removes itself with the registered reference.
        ListenerGuard::new(move || drop(registration))
    }
}

impl DocumentLike for BrowserPlatform {
    fn set_root_property(&self, name: &str, value: &str) {
        if let Some(root) = self.document.document_element() {
            if let Some(root) = root.dyn_ref::<web_sys::HtmlElement>() {
                root.style().set_property(name, value).ok();
            }
        }
    }

    fn add_container_class(&self, class: &str) {
        self.container.class_list().add_1(class).ok();
    }

    fn set_container_attribute(&self, name: &str, value: &str) {
        self.container.set_attribute(name, value).ok();
    }

    fn append_style(&self, css: &str) {
        let Some(head) = self.document.head() else {
            return;
        };
        if let Ok(style) = self.document.create_element("style") {
            style.set_text_content(Some(css));
            head.append_child(&style).ok();
        }
    }
}

impl Timers for BrowserPlatform {
    fn timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerHandle {
        let timeout = Timeout::new(delay.as_millis() as u32, callback);
        TimerHandle::new(move || drop(timeout))
    }
}

impl std::fmt::Debug for BrowserPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserPlatform")
            .field("container", &self.container.tag_name())
            .finish()
    }
}
