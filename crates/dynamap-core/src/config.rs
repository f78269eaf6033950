use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// KeyConfig
///
/// Immutable key-generation settings consumed by every core function.
/// Resolved once per entity type and passed explicitly.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct KeyConfig {
    pub key_separator: String,
    pub prefix_sort_key: bool,
    pub partition_key_attr_name: String,
    pub sort_key_attr_name: String,
}

impl KeyConfig {
    pub const DEFAULT_SEPARATOR: &'static str = "#";
    pub const DEFAULT_PARTITION_KEY_ATTR: &'static str = "pk";
    pub const DEFAULT_SORT_KEY_ATTR: &'static str = "sk";

    /// Layer an override on top of this config; unset override fields keep
    /// the current value.
    #[must_use]
    pub fn with_override(mut self, layer: &ConfigOverride) -> Self {
        if let Some(separator) = &layer.key_separator {
            self.key_separator.clone_from(separator);
        }
        if let Some(prefix) = layer.prefix_sort_key {
            self.prefix_sort_key = prefix;
        }
        if let Some(name) = &layer.partition_key_attr_name {
            self.partition_key_attr_name.clone_from(name);
        }
        if let Some(name) = &layer.sort_key_attr_name {
            self.sort_key_attr_name.clone_from(name);
        }

        self
    }

    /// Check the invariants key generation relies on.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.key_separator.is_empty() {
            return Err(ConfigError::EmptySeparator);
        }
        if self.partition_key_attr_name.is_empty() || self.sort_key_attr_name.is_empty() {
            return Err(ConfigError::EmptyAttributeName);
        }
        if self.partition_key_attr_name == self.sort_key_attr_name {
            return Err(ConfigError::SharedAttributeName {
                name: self.partition_key_attr_name.clone(),
            });
        }

        Ok(())
    }
}

///
/// ConfigError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("key separator is empty")]
    EmptySeparator,

    #[error("key attribute names must be non-empty")]
    EmptyAttributeName,

    #[error("partition and sort key attributes share the name '{name}'")]
    SharedAttributeName { name: String },
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            key_separator: Self::DEFAULT_SEPARATOR.to_string(),
            prefix_sort_key: false,
            partition_key_attr_name: Self::DEFAULT_PARTITION_KEY_ATTR.to_string(),
            sort_key_attr_name: Self::DEFAULT_SORT_KEY_ATTR.to_string(),
        }
    }
}

///
/// ConfigOverride
///
/// Partial config layer (process-level or per entity type).
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_separator: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_sort_key: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_key_attr_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_key_attr_name: Option<String>,
}

impl ConfigOverride {
    /// Parse an override layer from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    #[must_use]
    pub fn key_separator(mut self, separator: impl Into<String>) -> Self {
        self.key_separator = Some(separator.into());
        self
    }

    #[must_use]
    pub const fn prefix_sort_key(mut self, prefix: bool) -> Self {
        self.prefix_sort_key = Some(prefix);
        self
    }

    #[must_use]
    pub fn partition_key_attr_name(mut self, name: impl Into<String>) -> Self {
        self.partition_key_attr_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn sort_key_attr_name(mut self, name: impl Into<String>) -> Self {
        self.sort_key_attr_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_store_conventions() {
        let config = KeyConfig::default();

        assert_eq!(config.key_separator, "#");
        assert!(!config.prefix_sort_key);
        assert_eq!(config.partition_key_attr_name, "pk");
        assert_eq!(config.sort_key_attr_name, "sk");
        assert!(config.check().is_ok());
    }

    #[test]
    fn later_layers_win() {
        let process = ConfigOverride::default()
            .key_separator("|")
            .prefix_sort_key(true);
        let entity = ConfigOverride::default().key_separator("::");

        let config = KeyConfig::default()
            .with_override(&process)
            .with_override(&entity);

        assert_eq!(config.key_separator, "::");
        assert!(config.prefix_sort_key);
        assert_eq!(config.sort_key_attr_name, "sk");
    }

    #[test]
    fn override_parses_from_json() {
        let layer = ConfigOverride::from_json_str(r#"{"key_separator":"/","sort_key_attr_name":"range"}"#)
            .expect("override should parse");

        assert_eq!(layer.key_separator.as_deref(), Some("/"));
        assert_eq!(layer.sort_key_attr_name.as_deref(), Some("range"));
        assert!(layer.prefix_sort_key.is_none());
    }

    #[test]
    fn override_rejects_unknown_fields() {
        assert!(ConfigOverride::from_json_str(r#"{"separator":"/"}"#).is_err());
    }

    #[test]
    fn check_rejects_colliding_attribute_names() {
        let config = KeyConfig::default()
            .with_override(&ConfigOverride::default().sort_key_attr_name("pk"));

        assert_eq!(
            config.check(),
            Err(ConfigError::SharedAttributeName {
                name: "pk".to_string()
            })
        );
        assert_eq!(
            KeyConfig::default()
                .with_override(&ConfigOverride::default().key_separator(""))
                .check(),
            Err(ConfigError::EmptySeparator)
        );
    }
}
