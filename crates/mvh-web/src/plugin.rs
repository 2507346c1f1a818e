#![forbid(unsafe_code)]

//! Host-integration plugin.
//!
//! [`VhPlugin`] is the piece a hosting application wires into its lifecycle:
//! [`install`](VhPlugin::install) at client startup (injects the stylesheet
//! and starts the synchronizer), [`app_mounted`](VhPlugin::app_mounted) once
//! the root container exists (stamps the marker class and configured
//! identifier), [`teardown`](VhPlugin::teardown) — or just drop — at
//! shutdown. The unit cell is provided to consumers under the `vh` name.
//!
//! The plugin is written against the platform capability traits, so the same
//! code runs in a browser and under the in-memory fakes.

use std::rc::Rc;

use tracing::debug;

use mvh_core::platform::{DocumentLike, WindowLike};
use mvh_core::time::Timers;
use mvh_runtime::reactive::Observable;
use mvh_runtime::viewport::{LifecycleError, ViewportSync};

use crate::constants::{ID_ATTRIBUTE, MARKER_CLASS, PROVIDE_KEY, STYLESHEET};
use crate::options::ModuleOptions;

/// Installed viewport-height integration.
pub struct VhPlugin {
    document: Rc<dyn DocumentLike>,
    options: ModuleOptions,
    sync: ViewportSync,
}

impl VhPlugin {
    /// Inject the stylesheet and start synchronizing.
    ///
    /// The first unit value is published before this returns.
    pub fn install(
        window: Rc<dyn WindowLike>,
        document: Rc<dyn DocumentLike>,
        timers: Rc<dyn Timers>,
        options: ModuleOptions,
    ) -> Result<Self, LifecycleError> {
        document.append_style(STYLESHEET);

        let mut sync = ViewportSync::new(window, Rc::clone(&document), timers);
        sync.start()?;
        debug!(id = %options.id, "vh plugin installed");

        Ok(Self {
            document,
            options,
            sync,
        })
    }

    /// Tag the application container: the marker class plus the configured
    /// identifier attribute.
    ///
    /// The host invokes this once, after the container is in the tree.
    pub fn app_mounted(&self) {
        self.document.add_container_class(MARKER_CLASS);
        self.document
            .set_container_attribute(ID_ATTRIBUTE, &self.options.id);
        debug!(id = %self.options.id, "application container tagged");
    }

    /// The provided value: its name and a handle to the unit cell.
    #[must_use]
    pub fn provided(&self) -> (&'static str, Observable<f64>) {
        (PROVIDE_KEY, self.sync.cell())
    }

    /// Handle to the unit cell.
    #[must_use]
    pub fn vh(&self) -> Observable<f64> {
        self.sync.cell()
    }

    /// The options this plugin was installed with.
    #[must_use]
    pub fn options(&self) -> &ModuleOptions {
        &self.options
    }

    /// Stop synchronizing: remove the resize listener and disarm any pending
    /// recompute.
    ///
    /// Dropping the plugin without calling this performs the same teardown.
    pub fn teardown(mut self) -> Result<(), LifecycleError> {
        self.sync.stop()
    }
}

impl std::fmt::Debug for VhPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VhPlugin")
            .field("options", &self.options)
            .field("sync", &self.sync)
            .finish()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;
    use web_time::Duration;

    use mvh_core::testing::{FakeDocument, FakeWindow};
    use mvh_core::time::LabTimers;

    use super::*;
    use crate::constants::DEFAULT_ID;

    struct Host {
        window: FakeWindow,
        document: FakeDocument,
        timers: LabTimers,
    }

    impl Host {
        fn new(height: f64) -> Self {
            Self {
                window: FakeWindow::new(height),
                document: FakeDocument::new(),
                timers: LabTimers::new(),
            }
        }

        fn install(&self, options: ModuleOptions) -> VhPlugin {
            VhPlugin::install(
                Rc::new(self.window.clone()),
                Rc::new(self.document.clone()),
                Rc::new(self.timers.clone()),
                options,
            )
            .unwrap()
        }
    }

    // =========================================================================
    // Install
    // =========================================================================

    #[test]
    fn install_publishes_immediately() {
        let host = Host::new(800.0);
        let plugin = host.install(ModuleOptions::default());

        assert_eq!(host.document.root_property("--vh").as_deref(), Some("8px"));
        assert_eq!(plugin.vh().get(), 8.0);
    }

    #[test]
    fn install_injects_stylesheet_once() {
        let host = Host::new(800.0);
        let _plugin = host.install(ModuleOptions::default());

        assert_eq!(host.document.styles(), vec![STYLESHEET.to_string()]);
    }

    // =========================================================================
    // Mount hook
    // =========================================================================

    #[test]
    fn app_mounted_stamps_marker_and_default_id() {
        let host = Host::new(800.0);
        let plugin = host.install(ModuleOptions::default());
        plugin.app_mounted();

        assert_eq!(host.document.container_classes(), vec![MARKER_CLASS]);
        assert_eq!(host.document.container_attribute_count(), 1);
        assert_eq!(
            host.document.container_attribute(ID_ATTRIBUTE).as_deref(),
            Some(DEFAULT_ID)
        );
    }

    #[test]
    fn app_mounted_uses_configured_id() {
        let host = Host::new(800.0);
        let plugin = host.install(ModuleOptions {
            id: String::from("kiosk"),
        });
        plugin.app_mounted();

        assert_eq!(
            host.document.container_attribute(ID_ATTRIBUTE).as_deref(),
            Some("kiosk")
        );
    }

    // =========================================================================
    // Provided value
    // =========================================================================

    #[test]
    fn provides_cell_under_vh_name() {
        let host = Host::new(900.0);
        let plugin = host.install(ModuleOptions::default());

        let (name, cell) = plugin.provided();
        assert_eq!(name, "vh");
        assert_eq!(cell.get(), 9.0);
    }

    #[test]
    fn provided_cell_tracks_resizes() {
        let host = Host::new(800.0);
        let plugin = host.install(ModuleOptions::default());
        let (_, cell) = plugin.provided();

        let seen: Rc<RefCell<Vec<f64>>> = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let _sub = cell.subscribe(move |unit| log.borrow_mut().push(*unit));

        host.window.resize_to(1100.0);
        host.timers.advance(Duration::from_millis(100));
        assert_eq!(cell.get(), 11.0);
        assert_eq!(*seen.borrow(), vec![11.0]);
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    #[test]
    fn teardown_unwires_everything() {
        let host = Host::new(800.0);
        let plugin = host.install(ModuleOptions::default());

        host.window.resize_to(1000.0);
        plugin.teardown().unwrap();

        assert_eq!(host.window.listener_count(), 0);
        assert_eq!(host.timers.pending_count(), 0);
        host.timers.advance(Duration::from_millis(1000));
        assert_eq!(host.document.root_property("--vh").as_deref(), Some("8px"));
    }

    #[test]
    fn drop_is_equivalent_to_teardown() {
        let host = Host::new(800.0);
        let plugin = host.install(ModuleOptions::default());
        host.window.resize_to(1000.0);

        drop(plugin);
        assert_eq!(host.window.listener_count(), 0);
        assert_eq!(host.timers.pending_count(), 0);
    }
}
