//! Per-letter template sets and the nearest-neighbor fallback classifier.

use std::collections::BTreeMap;
use std::sync::Arc;

use fingerspell_core::{FeatureVector, Landmark, Letter, Prediction, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::classifier::{Classifier, ClassifierKind};

/// Default distance above which the nearest letter is rejected
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.45;

/// Captured feature vectors keyed by letter.
///
/// JSON form is `{"A": [[18 numbers], ...], "B": [...]}`. Iteration is
/// alphabetical.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateSet(BTreeMap<Letter, Vec<FeatureVector>>);

impl TemplateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn push(&mut self, letter: Letter, sample: FeatureVector) {
        self.0.entry(letter).or_default().push(sample);
    }

    pub fn get(&self, letter: Letter) -> Option<&[FeatureVector]> {
        self.0.get(&letter).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Letter, &Vec<FeatureVector>)> {
        self.0.iter()
    }

    /// Letters present in the set, including ones with no samples
    pub fn letters(&self) -> impl Iterator<Item = Letter> + '_ {
        self.0.keys().copied()
    }

    pub fn sample_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count() == 0
    }
}

impl FromIterator<(Letter, Vec<FeatureVector>)> for TemplateSet {
    fn from_iter<T: IntoIterator<Item = (Letter, Vec<FeatureVector>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Mutable template collection with mean-vector nearest-neighbor lookup
#[derive(Debug, Clone)]
pub struct TemplateStore {
    templates: TemplateSet,
    match_threshold: f64,
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}

impl TemplateStore {
    pub fn new(match_threshold: f64) -> Self {
        Self {
            templates: TemplateSet::new(),
            match_threshold,
        }
    }

    pub fn with_templates(templates: TemplateSet, match_threshold: f64) -> Self {
        Self {
            templates,
            match_threshold,
        }
    }

    /// Wrap the store for sharing between the pipeline and capture code
    pub fn into_shared(self) -> SharedTemplateStore {
        Arc::new(RwLock::new(self))
    }

    pub fn match_threshold(&self) -> f64 {
        self.match_threshold
    }

    pub fn set_match_threshold(&mut self, match_threshold: f64) {
        self.match_threshold = match_threshold;
    }

    pub fn add(&mut self, letter: Letter, sample: FeatureVector) {
        self.templates.push(letter, sample);
        tracing::debug!(
            "Captured sample for {} ({} total)",
            letter,
            self.samples(letter).len()
        );
    }

    /// Clear one letter (keeping it with no samples) or, with `None`, every letter
    pub fn clear(&mut self, letter: Option<Letter>) {
        match letter {
            Some(letter) => {
                self.templates.0.insert(letter, Vec::new());
            }
            None => self.templates.0.clear(),
        }
    }

    pub fn samples(&self, letter: Letter) -> &[FeatureVector] {
        self.templates.get(letter).unwrap_or(&[])
    }

    pub fn sample_count(&self) -> usize {
        self.templates.sample_count()
    }

    /// Letters with at least one sample, alphabetical
    pub fn non_empty_letters(&self) -> Vec<Letter> {
        self.templates
            .iter()
            .filter(|(_, samples)| !samples.is_empty())
            .map(|(letter, _)| *letter)
            .collect()
    }

    pub fn export(&self) -> TemplateSet {
        self.templates.clone()
    }

    /// Replace the whole collection
    pub fn import(&mut self, templates: TemplateSet) {
        tracing::info!(
            "Imported {} samples across {} letters",
            templates.sample_count(),
            templates.0.len()
        );
        self.templates = templates;
    }

    /// Mean-vector nearest neighbor.
    ///
    /// Ties resolve to the alphabetically first letter. A best distance
    /// above the match threshold gives an unknown prediction that still
    /// carries the distance; an empty store gives unknown with an infinite
    /// score.
    pub fn nearest_neighbor(&self, features: &FeatureVector) -> Prediction {
        let mut best: Option<(Letter, f64)> = None;

        for (letter, samples) in self.templates.iter() {
            let Some(mean) = FeatureVector::mean(samples) else {
                continue;
            };
            let distance = features.distance_to(&mean);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((*letter, distance));
            }
        }

        match best {
            Some((letter, distance)) if distance <= self.match_threshold => {
                Prediction::letter(letter, distance)
            }
            Some((_, distance)) => Prediction::unknown(distance),
            None => Prediction::unknown(f64::INFINITY),
        }
    }
}

/// Template store shared between the pipeline and sample capture
pub type SharedTemplateStore = Arc<RwLock<TemplateStore>>;

/// Nearest-neighbor classifier over a shared template store
#[derive(Debug, Clone)]
pub struct TemplateClassifier {
    store: SharedTemplateStore,
}

impl TemplateClassifier {
    pub fn new(store: SharedTemplateStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SharedTemplateStore {
        &self.store
    }
}

impl Classifier for TemplateClassifier {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Templates
    }

    fn classify(&self, features: &FeatureVector, _landmarks: &[Landmark]) -> Option<Prediction> {
        // One read lock for the whole mean-and-distance pass.
        let store = self.store.read();
        Some(store.nearest_neighbor(features))
    }
}
