//! Layered key configuration.
//!
//! global default → process override → per-entity override.
//! The process layer is read only while an entity type is built; values
//! already baked into built types never change.

use dynamap_core::config::{ConfigOverride, KeyConfig};
use std::sync::{LazyLock, PoisonError, RwLock};

static PROCESS_CONFIG: LazyLock<RwLock<ConfigOverride>> =
    LazyLock::new(|| RwLock::new(ConfigOverride::default()));

/// Replace the process-level override layer.
pub fn set_process_config(layer: ConfigOverride) {
    *PROCESS_CONFIG
        .write()
        .unwrap_or_else(PoisonError::into_inner) = layer;
}

/// Load the process-level override layer from JSON text.
pub fn set_process_config_json(text: &str) -> Result<(), serde_json::Error> {
    set_process_config(ConfigOverride::from_json_str(text)?);

    Ok(())
}

/// Drop any process-level override.
pub fn clear_process_config() {
    set_process_config(ConfigOverride::default());
}

/// Current process-level override layer.
#[must_use]
pub fn process_config() -> ConfigOverride {
    PROCESS_CONFIG
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Resolve the effective config for one entity type.
#[must_use]
pub fn resolve(entity: &ConfigOverride) -> KeyConfig {
    KeyConfig::default()
        .with_override(&process_config())
        .with_override(entity)
}
