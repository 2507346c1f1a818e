#![forbid(unsafe_code)]

//! Module options and their merge into the public runtime configuration.
//!
//! Options deserialize with [`serde(default)`], so a partially-specified
//! document (`{}` or `{"id": "shop"}`) fills the remaining fields from the
//! defaults before the merge — caller-supplied values always override
//! whatever the public configuration held before setup.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::DEFAULT_ID;

/// Caller-facing options for the viewport-height module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleOptions {
    /// Identifier stamped on the application container at mount.
    pub id: String,
}

impl Default for ModuleOptions {
    fn default() -> Self {
        Self {
            id: String::from(DEFAULT_ID),
        }
    }
}

/// Public runtime configuration the module merges into at setup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicConfig {
    /// The viewport-height module's slot.
    pub mvh: ModuleOptions,
}

impl ModuleOptions {
    /// Merge these options into `config`, overriding any prior values.
    pub fn merge_into(&self, config: &mut PublicConfig) {
        config.mvh = self.clone();
        debug!(id = %self.id, "module options merged into public config");
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_id_is_built_in() {
        assert_eq!(ModuleOptions::default().id, DEFAULT_ID);
    }

    #[test]
    fn empty_document_deserializes_to_defaults() {
        let options: ModuleOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ModuleOptions::default());
    }

    #[test]
    fn partial_document_overrides_only_named_fields() {
        let options: ModuleOptions = serde_json::from_str(r#"{"id": "shop"}"#).unwrap();
        assert_eq!(options.id, "shop");
    }

    #[test]
    fn merge_overrides_prior_config() {
        let mut config = PublicConfig::default();
        assert_eq!(config.mvh.id, DEFAULT_ID);

        let options = ModuleOptions {
            id: String::from("kiosk"),
        };
        options.merge_into(&mut config);
        assert_eq!(config.mvh.id, "kiosk");
    }

    #[test]
    fn config_round_trips_through_json() {
        let mut config = PublicConfig::default();
        ModuleOptions {
            id: String::from("shop"),
        }
        .merge_into(&mut config);

        let json = serde_json::to_string(&config).unwrap();
        let back: PublicConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn unusual_ids_pass_through_unvalidated() {
        let options: ModuleOptions = serde_json::from_str(r#"{"id": ""}"#).unwrap();
        let mut config = PublicConfig::default();
        options.merge_into(&mut config);
        assert_eq!(config.mvh.id, "");
    }
}
