//! Per-frame classification pipeline.
//!
//! ```text
//! landmarks → features → model → rules → templates → stability → display
//! ```
//!
//! The first classifier with an opinion wins. The template store is owned
//! by the caller and shared, so sample capture and account switching
//! happen outside the pipeline.

use fingerspell_core::{FeatureVector, Label, Landmark, Letter, Prediction, Result};

use crate::classifier::{Classifier, ClassifierKind};
use crate::config::RecognizerConfig;
use crate::features::FeatureExtractor;
use crate::model::{ModelArtifact, ModelClassifier};
use crate::rules::RuleClassifier;
use crate::stability::StabilityFilter;
use crate::templates::{SharedTemplateStore, TemplateClassifier};
use crate::training::{ModelTrainer, TrainingConfig};

/// Everything the pipeline learned about one frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameOutcome {
    /// Extracted features, for sample capture
    pub features: Option<FeatureVector>,
    /// Raw per-frame prediction before debouncing
    pub prediction: Option<Prediction>,
    /// Classifier that produced `prediction`
    pub source: Option<ClassifierKind>,
    /// Label to display, `None` for blank
    pub display: Option<Label>,
}

pub struct ClassificationPipeline {
    extractor: FeatureExtractor,
    model: Option<ModelClassifier>,
    rules: RuleClassifier,
    templates: TemplateClassifier,
    filter: StabilityFilter,
    training: TrainingConfig,
    last_features: Option<FeatureVector>,
    recording: Option<Letter>,
}

impl ClassificationPipeline {
    /// Build a pipeline over `store`.
    ///
    /// The configured match threshold is applied to the shared store. A
    /// configured model that fails to load is logged and skipped.
    pub fn new(config: &RecognizerConfig, store: SharedTemplateStore) -> Self {
        store
            .write()
            .set_match_threshold(config.templates.match_threshold);

        let model = config
            .model
            .artifact_path
            .as_ref()
            .and_then(|path| ModelClassifier::load(path).ok());

        Self {
            extractor: FeatureExtractor::new(),
            model,
            rules: RuleClassifier::new(config.rules.clone()),
            templates: TemplateClassifier::new(store),
            filter: StabilityFilter::new(config.stability.stable_required),
            training: config.training.clone(),
            last_features: None,
            recording: None,
        }
    }

    /// Classify one frame and return the label to display
    pub fn classify_frame(&mut self, landmarks: Option<&[Landmark]>) -> Option<Label> {
        self.process_frame(landmarks).display
    }

    pub fn process_frame(&mut self, landmarks: Option<&[Landmark]>) -> FrameOutcome {
        let Some(landmarks) = landmarks else {
            self.last_features = None;
            self.filter.update(None);
            return FrameOutcome::default();
        };

        let Some(features) = self.extractor.extract(landmarks) else {
            tracing::debug!("Partial hand ({} landmarks), treating as unknown", landmarks.len());
            self.last_features = None;
            return FrameOutcome {
                display: self.filter.update(Some(Label::Unknown)),
                ..FrameOutcome::default()
            };
        };
        self.last_features = Some(features);

        if self.recording.is_some() {
            return FrameOutcome {
                features: Some(features),
                display: self.filter.displayed(),
                ..FrameOutcome::default()
            };
        }

        let decision = self.classifiers().find_map(|classifier| {
            classifier
                .classify(&features, landmarks)
                .map(|prediction| (classifier.kind(), prediction))
        });

        let label = decision.map_or(Label::Unknown, |(_, p)| p.label);
        if let Some((kind, prediction)) = decision {
            tracing::debug!("{} -> {} (score {:.3})", kind, prediction.label, prediction.score);
        }

        FrameOutcome {
            features: Some(features),
            prediction: decision.map(|(_, p)| p),
            source: decision.map(|(kind, _)| kind),
            display: self.filter.update(Some(label)),
        }
    }

    /// Classifiers in priority order
    fn classifiers(&self) -> impl Iterator<Item = &dyn Classifier> {
        let fixed: [&dyn Classifier; 2] = [&self.rules, &self.templates];
        self.model
            .iter()
            .map(|model| model as &dyn Classifier)
            .chain(fixed)
    }

    pub fn set_model(&mut self, model: Option<ModelClassifier>) {
        self.model = model;
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Train on the current store contents and install the result
    pub fn train_model(&mut self) -> Result<ModelArtifact> {
        let templates = self.store().read().export();
        let artifact = ModelTrainer::new(self.training.clone()).train(&templates)?;
        self.model = Some(ModelClassifier::from_artifact(&artifact)?);
        Ok(artifact)
    }

    pub fn store(&self) -> &SharedTemplateStore {
        self.templates.store()
    }

    /// Add a sample for `letter` to the shared store
    pub fn capture(&self, letter: Letter, features: &FeatureVector) {
        self.store().write().add(letter, *features);
    }

    /// Features of the most recent frame with a full hand
    pub fn last_features(&self) -> Option<&FeatureVector> {
        self.last_features.as_ref()
    }

    /// Pause classification while collecting samples for `letter`
    pub fn start_recording(&mut self, letter: Letter) {
        tracing::info!("Recording samples for {}", letter);
        self.recording = Some(letter);
    }

    pub fn stop_recording(&mut self) {
        self.recording = None;
    }

    pub fn recording(&self) -> Option<Letter> {
        self.recording
    }

    /// Store the last frame's features under the letter being recorded.
    ///
    /// Returns false when not recording or no hand has been seen.
    pub fn record_sample(&self) -> bool {
        match (self.recording, self.last_features) {
            (Some(letter), Some(features)) => {
                self.capture(letter, &features);
                true
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.filter.reset();
        self.last_features = None;
    }

    pub fn filter(&self) -> &StabilityFilter {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{TemplateSet, TemplateStore};
    use crate::testing::Digit::{Curled, Extended};
    use crate::testing::{constant_artifact, hand, offset, THUMB_IN, THUMB_OUT};

    fn pipeline(stable_required: u32) -> ClassificationPipeline {
        let mut config = RecognizerConfig::default();
        config.stability.stable_required = stable_required;
        ClassificationPipeline::new(&config, TemplateStore::default().into_shared())
    }

    fn letter(c: char) -> Letter {
        Letter::new(c).unwrap()
    }

    #[test]
    fn test_rules_then_display() {
        let mut pipeline = pipeline(3);
        let d = hand([Extended, Curled, Curled, Curled], THUMB_IN);

        let first = pipeline.process_frame(Some(&d[..]));
        assert_eq!(first.source, Some(ClassifierKind::Rules));
        assert_eq!(first.prediction.unwrap().label, Label::Letter(letter('D')));
        assert_eq!(first.display, None);
        assert!(first.features.is_some());

        assert_eq!(pipeline.classify_frame(Some(&d[..])), None);
        assert_eq!(pipeline.classify_frame(Some(&d[..])), Some(Label::Letter(letter('D'))));
    }

    #[test]
    fn test_model_takes_priority_over_rules() {
        let mut pipeline = pipeline(1);
        let d = hand([Extended, Curled, Curled, Curled], THUMB_IN);
        assert_eq!(pipeline.classify_frame(Some(&d[..])), Some(Label::Letter(letter('D'))));

        let model = ModelClassifier::from_artifact(&constant_artifact("BQ", vec![0.0, 4.0])).unwrap();
        pipeline.set_model(Some(model));
        assert!(pipeline.has_model());

        let outcome = pipeline.process_frame(Some(&d[..]));
        assert_eq!(outcome.source, Some(ClassifierKind::Model));
        assert_eq!(outcome.display, Some(Label::Letter(letter('Q'))));

        pipeline.set_model(None);
        assert_eq!(pipeline.classify_frame(Some(&d[..])), Some(Label::Letter(letter('D'))));
    }

    #[test]
    fn test_templates_catch_rule_misses() {
        let mut pipeline = pipeline(1);
        let flat = hand([Extended; 4], THUMB_OUT);

        let unknown = pipeline.process_frame(Some(&flat[..]));
        assert_eq!(unknown.source, Some(ClassifierKind::Templates));
        assert_eq!(unknown.display, Some(Label::Unknown));

        pipeline.capture(letter('B'), &unknown.features.unwrap());
        let outcome = pipeline.process_frame(Some(&flat[..]));
        assert_eq!(outcome.display, Some(Label::Letter(letter('B'))));
        assert_eq!(outcome.prediction.unwrap().score, 0.0);
    }

    #[test]
    fn test_configured_match_threshold_applies_to_store() {
        let mut config = RecognizerConfig::default();
        config.stability.stable_required = 1;
        config.templates.match_threshold = 0.2;
        let store = TemplateStore::default().into_shared();
        let mut pipeline = ClassificationPipeline::new(&config, store.clone());
        assert_eq!(store.read().match_threshold(), 0.2);

        let flat = hand([Extended; 4], THUMB_OUT);
        let features = pipeline.process_frame(Some(&flat[..])).features.unwrap();
        pipeline.capture(letter('B'), &offset(&features, 0.3));

        let outcome = pipeline.process_frame(Some(&flat[..]));
        assert_eq!(outcome.source, Some(ClassifierKind::Templates));
        assert_eq!(outcome.display, Some(Label::Unknown));

        config.templates.match_threshold = 0.45;
        let mut pipeline = ClassificationPipeline::new(&config, store);
        assert_eq!(pipeline.classify_frame(Some(&flat[..])), Some(Label::Letter(letter('B'))));
    }

    #[test]
    fn test_hand_loss_blanks_and_resets() {
        let mut pipeline = pipeline(2);
        let i = hand([Curled, Curled, Curled, Extended], THUMB_IN);
        pipeline.classify_frame(Some(&i[..]));
        assert_eq!(pipeline.classify_frame(Some(&i[..])), Some(Label::Letter(letter('I'))));

        assert_eq!(pipeline.process_frame(None), FrameOutcome::default());
        assert!(pipeline.last_features().is_none());
        assert_eq!(pipeline.classify_frame(Some(&i[..])), None);
    }

    #[test]
    fn test_hand_loss_needs_full_run_at_default_stability() {
        let mut pipeline = pipeline(5);
        let d = hand([Extended, Curled, Curled, Curled], THUMB_IN);
        for _ in 0..5 {
            pipeline.classify_frame(Some(&d[..]));
        }
        assert_eq!(pipeline.filter().displayed(), Some(Label::Letter(letter('D'))));

        assert_eq!(pipeline.classify_frame(None), None);
        let shown: Vec<_> = (0..5).map(|_| pipeline.classify_frame(Some(&d[..]))).collect();
        assert_eq!(
            shown,
            vec![None, None, None, None, Some(Label::Letter(letter('D')))]
        );
    }

    #[test]
    fn test_partial_hand_feeds_unknown() {
        let mut pipeline = pipeline(1);
        let landmarks = hand([Extended; 4], THUMB_OUT);
        let outcome = pipeline.process_frame(Some(&landmarks[..12]));
        assert!(outcome.features.is_none());
        assert_eq!(outcome.display, Some(Label::Unknown));
    }

    #[test]
    fn test_recording_mode_captures_without_classifying() {
        let mut pipeline = pipeline(1);
        let w = hand([Extended, Extended, Extended, Curled], THUMB_IN);
        assert!(!pipeline.record_sample());

        pipeline.start_recording(letter('W'));
        let outcome = pipeline.process_frame(Some(&w[..]));
        assert!(outcome.prediction.is_none());
        assert_eq!(outcome.display, None);
        assert!(pipeline.record_sample());
        assert!(pipeline.record_sample());
        pipeline.stop_recording();

        assert_eq!(pipeline.store().read().samples(letter('W')).len(), 2);
    }

    #[test]
    fn test_trained_model_is_installed() {
        let mut config = RecognizerConfig::default();
        config.stability.stable_required = 1;
        config.training.epochs = 2;
        let store = TemplateStore::with_templates(TemplateSet::seeded(), 0.45).into_shared();
        let mut pipeline = ClassificationPipeline::new(&config, store);

        let artifact = pipeline.train_model().unwrap();
        assert_eq!(artifact.labels.len(), 26);
        assert!(pipeline.has_model());

        let d = hand([Extended, Curled, Curled, Curled], THUMB_IN);
        assert_eq!(pipeline.process_frame(Some(&d[..])).source, Some(ClassifierKind::Model));
    }

    #[test]
    fn test_missing_model_file_is_skipped() {
        let mut config = RecognizerConfig::default();
        config.model.artifact_path = Some("does/not/exist.json".into());
        let pipeline = ClassificationPipeline::new(&config, TemplateStore::default().into_shared());
        assert!(!pipeline.has_model());
    }
}
