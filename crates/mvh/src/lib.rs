#![forbid(unsafe_code)]

//! mvh public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub mod prelude {
    pub use mvh_core as core;
    pub use mvh_runtime as runtime;
    pub use mvh_web as web;

    pub use mvh_core::debounce::Debouncer;
    pub use mvh_runtime::reactive::{Observable, Subscription};
    pub use mvh_runtime::viewport::{SyncConfig, ViewportSync};
    pub use mvh_web::options::ModuleOptions;
    pub use mvh_web::plugin::VhPlugin;
}
