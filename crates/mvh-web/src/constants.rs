#![forbid(unsafe_code)]

//! Fixed identifiers of the integration surface.

/// Identifier stamped on the application container when none is configured.
pub const DEFAULT_ID: &str = "mvh-app";

/// Marker class added to the application container at mount.
pub const MARKER_CLASS: &str = "__vh";

/// Attribute carrying the configured identifier on the application container.
pub const ID_ATTRIBUTE: &str = "data-mvh-id";

/// Name the unit cell is provided under to consumers.
pub const PROVIDE_KEY: &str = "vh";

/// Stylesheet consuming the `--vh` custom property, injected at install.
///
/// The `1vh` fallback covers the instant before the first write lands.
pub const STYLESHEET: &str = ".__vh {\n  height: calc(var(--vh, 1vh) * 100);\n}\n";
