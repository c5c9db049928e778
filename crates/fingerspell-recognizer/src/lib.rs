//! # Fingerspell-Recognizer
//!
//! Real-time classification of fingerspelled letters from hand landmarks.
//!
//! ## Pipeline
//!
//! 1. **Feature extraction**: 21 landmarks to a scale-invariant 18-entry vector
//! 2. **Model**: optional dense network, consulted first when loaded
//! 3. **Rules**: hand-calibrated geometric rules in fixed priority order
//! 4. **Templates**: mean-vector nearest neighbor over captured samples
//! 5. **Stability**: a label is shown only after holding for several frames
//!
//! The template store is shared behind a read-write lock so capture code
//! can add samples while the pipeline keeps classifying.

pub mod classifier;
pub mod config;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod rules;
pub mod seed;
pub mod stability;
pub mod templates;
pub mod training;

#[cfg(test)]
mod testing;

pub use classifier::{Classifier, ClassifierKind};
pub use config::{ModelConfig, RecognizerConfig, StabilityConfig, TemplateConfig};
pub use features::{extract_features, FeatureExtractor};
pub use model::{DenseLayer, ModelArtifact, ModelClassifier};
pub use pipeline::{ClassificationPipeline, FrameOutcome};
pub use rules::{RuleClassifier, RuleThresholds};
pub use stability::{StabilityFilter, StabilityState};
pub use templates::{SharedTemplateStore, TemplateClassifier, TemplateSet, TemplateStore};
pub use training::{ModelTrainer, TrainingConfig};
