//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the docbr pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Confidence below which the legacy fallback strategy is attempted.
    pub fallback_threshold: f32,

    /// Enable the legacy monolithic strategy as a fallback.
    pub enable_legacy_fallback: bool,

    /// Enable the fixture tier (literal rules for known sample documents).
    pub enable_fixture_tier: bool,

    /// Infer sex from a name's gendered ending on identity documents when no
    /// sex marker matched. Flagged low-confidence in the output.
    pub infer_sex_from_name: bool,

    /// Lines scanned after a context-window anchor. Bounded to guarantee
    /// termination.
    pub context_window: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fallback_threshold: 0.5,
            enable_legacy_fallback: true,
            enable_fixture_tier: true,
            infer_sex_from_name: false,
            context_window: 3,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| crate::error::DocbrError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::error::Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| crate::error::DocbrError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Clamp the context window to the documented bound.
    pub fn bounded_window(&self) -> usize {
        self.context_window.min(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.fallback_threshold, 0.5);
        assert!(config.enable_legacy_fallback);
        assert!(!config.infer_sex_from_name);
        assert_eq!(config.bounded_window(), 3);
    }

    #[test]
    fn test_window_is_bounded() {
        let config = PipelineConfig {
            context_window: 100,
            ..Default::default()
        };
        assert_eq!(config.bounded_window(), 4);
    }

    #[test]
    fn test_config_roundtrip_json() {
        let config = PipelineConfig {
            fallback_threshold: 0.7,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.fallback_threshold, 0.7);
    }
}
