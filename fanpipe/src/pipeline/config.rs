//! Pipeline configuration.

use crate::types::ConversionPolicy;
use serde::{Deserialize, Serialize};

/// Settings shared by construction, subscription and sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Name used in logs, spans and events.
    pub name: String,
    /// Which producer/consumer type pairs are accepted.
    pub conversion: ConversionPolicy,
    /// Include argument and result values in emitted events.
    pub emit_values: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: "pipeline".to_string(),
            conversion: ConversionPolicy::Widening,
            emit_values: false,
        }
    }
}

impl PipelineConfig {
    /// Creates a config with the given name and default settings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the conversion policy.
    #[must_use]
    pub fn with_conversion(mut self, conversion: ConversionPolicy) -> Self {
        self.conversion = conversion;
        self
    }

    /// Accepts only identical types (and `any`).
    #[must_use]
    pub fn strict(self) -> Self {
        self.with_conversion(ConversionPolicy::Strict)
    }

    /// Includes values in emitted events.
    #[must_use]
    pub fn with_emit_values(mut self, emit_values: bool) -> Self {
        self.emit_values = emit_values;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.name, "pipeline");
        assert_eq!(config.conversion, ConversionPolicy::Widening);
        assert!(!config.emit_values);
    }

    #[test]
    fn test_builder_methods() {
        let config = PipelineConfig::new("numbers").strict().with_emit_values(true);
        assert_eq!(config.name, "numbers");
        assert_eq!(config.conversion, ConversionPolicy::Strict);
        assert!(config.emit_values);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"name": "audit", "conversion": "strict"}"#).unwrap();
        assert_eq!(config.name, "audit");
        assert_eq!(config.conversion, ConversionPolicy::Strict);
        assert!(!config.emit_values);
    }
}
