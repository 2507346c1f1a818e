#![forbid(unsafe_code)]

//! Web integration: module options, the host-integration plugin, and the
//! browser-backed platform implementation.

pub mod constants;
pub mod options;
pub mod plugin;

#[cfg(target_arch = "wasm32")]
pub mod browser;
