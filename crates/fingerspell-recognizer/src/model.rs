//! Learned letter classifier: a two-layer dense network over feature vectors.
//!
//! The artifact carries its own label table, so a model keeps meaning the
//! same letters no matter how the template store changes after training.

use std::path::Path;

use fingerspell_core::{Error, FeatureVector, Landmark, Letter, Prediction, Result, FEATURE_COUNT};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::classifier::{Classifier, ClassifierKind};

/// Fully connected layer; `weights` has one row per output unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

impl DenseLayer {
    pub fn inputs(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    pub fn outputs(&self) -> usize {
        self.weights.len()
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.weights.is_empty() {
            return Err(Error::ModelShape(format!("{} layer has no units", name)));
        }
        let inputs = self.inputs();
        if let Some(row) = self.weights.iter().position(|r| r.len() != inputs) {
            return Err(Error::ModelShape(format!(
                "{} layer row {} has {} weights, expected {}",
                name,
                row,
                self.weights[row].len(),
                inputs
            )));
        }
        if self.bias.len() != self.outputs() {
            return Err(Error::ModelShape(format!(
                "{} layer has {} biases for {} units",
                name,
                self.bias.len(),
                self.outputs()
            )));
        }
        Ok(())
    }

    pub(crate) fn from_matrix(weights: &DMatrix<f64>, bias: &DVector<f64>) -> Self {
        Self {
            weights: weights
                .row_iter()
                .map(|row| row.iter().copied().collect())
                .collect(),
            bias: bias.iter().copied().collect(),
        }
    }

    fn to_matrix(&self) -> (DMatrix<f64>, DVector<f64>) {
        let weights = DMatrix::from_fn(self.outputs(), self.inputs(), |r, c| self.weights[r][c]);
        (weights, DVector::from_column_slice(&self.bias))
    }
}

/// Serialized model: label table plus ReLU hidden layer and softmax output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub labels: Vec<Letter>,
    pub hidden: DenseLayer,
    pub output: DenseLayer,
}

impl ModelArtifact {
    pub fn new(labels: Vec<Letter>, hidden: DenseLayer, output: DenseLayer) -> Result<Self> {
        let artifact = Self {
            labels,
            hidden,
            output,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    /// Check layer shapes against the feature width and the label table
    pub fn validate(&self) -> Result<()> {
        self.hidden.validate("hidden")?;
        self.output.validate("output")?;

        if self.hidden.inputs() != FEATURE_COUNT {
            return Err(Error::ModelShape(format!(
                "hidden layer takes {} inputs, features have {}",
                self.hidden.inputs(),
                FEATURE_COUNT
            )));
        }
        if self.output.inputs() != self.hidden.outputs() {
            return Err(Error::ModelShape(format!(
                "output layer takes {} inputs, hidden layer has {} units",
                self.output.inputs(),
                self.hidden.outputs()
            )));
        }
        if self.labels.is_empty() {
            return Err(Error::ModelShape("label table is empty".to_string()));
        }
        if self.output.outputs() != self.labels.len() {
            return Err(Error::ModelShape(format!(
                "output layer has {} units for {} labels",
                self.output.outputs(),
                self.labels.len()
            )));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: Self = serde_json::from_str(json)?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json).map_err(|e| Error::ModelLoad(format!("{}: {}", path.display(), e)))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Dense network classifier built from a validated [`ModelArtifact`]
#[derive(Debug, Clone)]
pub struct ModelClassifier {
    labels: Vec<Letter>,
    hidden_weights: DMatrix<f64>,
    hidden_bias: DVector<f64>,
    output_weights: DMatrix<f64>,
    output_bias: DVector<f64>,
}

impl ModelClassifier {
    pub fn from_artifact(artifact: &ModelArtifact) -> Result<Self> {
        artifact.validate()?;
        let (hidden_weights, hidden_bias) = artifact.hidden.to_matrix();
        let (output_weights, output_bias) = artifact.output.to_matrix();
        Ok(Self {
            labels: artifact.labels.clone(),
            hidden_weights,
            hidden_bias,
            output_weights,
            output_bias,
        })
    }

    /// Load and validate an artifact file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let artifact = ModelArtifact::load(path).map_err(|e| {
            tracing::warn!("Rejected model artifact {}: {}", path.display(), e);
            e
        })?;
        let model = Self::from_artifact(&artifact)?;
        tracing::info!(
            "Loaded model from {} ({} labels, {} hidden units)",
            path.display(),
            model.labels.len(),
            model.hidden_bias.len()
        );
        Ok(model)
    }

    pub fn labels(&self) -> &[Letter] {
        &self.labels
    }

    /// Class probabilities in label-table order
    pub fn probabilities(&self, features: &FeatureVector) -> DVector<f64> {
        let input = DVector::from_column_slice(features.as_slice());
        let hidden = (&self.hidden_weights * input + &self.hidden_bias).map(|v| v.max(0.0));
        softmax(&(&self.output_weights * hidden + &self.output_bias))
    }

    /// Most likely letter with `score = 1 - p_max`.
    ///
    /// Returns `None` when the network output is not finite.
    pub fn predict(&self, features: &FeatureVector) -> Option<Prediction> {
        let probabilities = self.probabilities(features);
        if probabilities.iter().any(|p| !p.is_finite()) {
            tracing::warn!("Model produced non-finite output, skipping");
            return None;
        }

        let best = probabilities
            .iter()
            .enumerate()
            .fold(0, |best, (i, p)| if *p > probabilities[best] { i } else { best });
        let letter = *self.labels.get(best)?;
        Some(Prediction::letter(letter, (1.0 - probabilities[best]).max(0.0)))
    }
}

impl Classifier for ModelClassifier {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Model
    }

    fn classify(&self, features: &FeatureVector, _landmarks: &[Landmark]) -> Option<Prediction> {
        self.predict(features)
    }
}

/// Numerically stable softmax
pub(crate) fn softmax(logits: &DVector<f64>) -> DVector<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp = logits.map(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}
