//! Recognizer configuration.

use std::path::{Path, PathBuf};

use fingerspell_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::rules::RuleThresholds;
use crate::stability::DEFAULT_STABLE_REQUIRED;
use crate::templates::DEFAULT_MATCH_THRESHOLD;
use crate::training::TrainingConfig;

/// Prefix for environment overrides, e.g. `FINGERSPELL_STABILITY__STABLE_REQUIRED=3`
pub const ENV_PREFIX: &str = "FINGERSPELL";

/// Complete recognizer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Rule classifier thresholds
    pub rules: RuleThresholds,

    /// Nearest-neighbor template matching
    pub templates: TemplateConfig,

    /// Display debounce
    pub stability: StabilityConfig,

    /// Optional learned model
    pub model: ModelConfig,

    /// Model training hyperparameters
    pub training: TrainingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Maximum mean-vector distance accepted as a match
    pub match_threshold: f64,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Consecutive identical frames before a label is shown
    pub stable_required: u32,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            stable_required: DEFAULT_STABLE_REQUIRED,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model artifact loaded at startup, if any
    pub artifact_path: Option<PathBuf>,
}

impl RecognizerConfig {
    /// Load configuration from file, with environment overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))
    }
}
