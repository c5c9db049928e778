//! Training of the dense letter model from captured templates.
//!
//! Network: x → ReLU(W₁x + b₁) → dropout → softmax(W₂h + b₂)
//!
//! Loss: categorical cross-entropy, L = -log p[y], averaged per mini-batch
//! and minimized with Adam.

use fingerspell_core::{Error, FeatureVector, Letter, Result, FEATURE_COUNT};
use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::model::{softmax, DenseLayer, ModelArtifact};
use crate::templates::TemplateSet;

/// Configuration for model training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Width of the hidden ReLU layer
    pub hidden_units: usize,
    /// Fraction of hidden activations dropped during training
    pub dropout: f64,
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
    pub batch_size: usize,
    pub epochs: usize,
    /// Seed for weight init, shuffling and dropout masks
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            hidden_units: 64,
            dropout: 0.2,
            learning_rate: 0.001,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-7,
            batch_size: 16,
            epochs: 50,
            seed: 42,
        }
    }
}

impl TrainingConfig {
    fn validate(&self) -> Result<()> {
        if self.hidden_units == 0 {
            return Err(Error::Config("hidden_units must be positive".to_string()));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(Error::Config(format!(
                "dropout must be in [0, 1), got {}",
                self.dropout
            )));
        }
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be positive".to_string()));
        }
        Ok(())
    }
}

/// Adam first and second moment estimates for one parameter tensor
struct Moments {
    m: Vec<f64>,
    v: Vec<f64>,
}

impl Moments {
    fn new(len: usize) -> Self {
        Self {
            m: vec![0.0; len],
            v: vec![0.0; len],
        }
    }

    fn step(&mut self, params: &mut [f64], grads: &[f64], config: &TrainingConfig, t: i32) {
        let correction1 = 1.0 - config.beta1.powi(t);
        let correction2 = 1.0 - config.beta2.powi(t);

        for (((p, g), m), v) in params
            .iter_mut()
            .zip(grads)
            .zip(self.m.iter_mut())
            .zip(self.v.iter_mut())
        {
            *m = config.beta1 * *m + (1.0 - config.beta1) * g;
            *v = config.beta2 * *v + (1.0 - config.beta2) * g * g;
            let m_hat = *m / correction1;
            let v_hat = *v / correction2;
            *p -= config.learning_rate * m_hat / (v_hat.sqrt() + config.epsilon);
        }
    }
}

struct Parameters {
    w1: DMatrix<f64>,
    b1: DVector<f64>,
    w2: DMatrix<f64>,
    b2: DVector<f64>,
}

struct Gradients {
    w1: DMatrix<f64>,
    b1: DVector<f64>,
    w2: DMatrix<f64>,
    b2: DVector<f64>,
}

impl Gradients {
    fn zeros(hidden: usize, classes: usize) -> Self {
        Self {
            w1: DMatrix::zeros(hidden, FEATURE_COUNT),
            b1: DVector::zeros(hidden),
            w2: DMatrix::zeros(classes, hidden),
            b2: DVector::zeros(classes),
        }
    }
}

/// Glorot-uniform initialization
fn glorot(rows: usize, cols: usize, rng: &mut StdRng) -> DMatrix<f64> {
    let limit = (6.0 / (rows + cols) as f64).sqrt();
    DMatrix::from_fn(rows, cols, |_, _| rng.gen_range(-limit..limit))
}

/// Trains a [`ModelArtifact`] from a template set
pub struct ModelTrainer {
    config: TrainingConfig,
}

impl ModelTrainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn train(&self, templates: &TemplateSet) -> Result<ModelArtifact> {
        self.train_with_history(templates).map(|(artifact, _)| artifact)
    }

    /// Train and also return the mean loss of every epoch.
    ///
    /// Labels are the letters with at least one sample, alphabetical.
    pub fn train_with_history(&self, templates: &TemplateSet) -> Result<(ModelArtifact, Vec<f64>)> {
        self.config.validate()?;

        let mut labels: Vec<Letter> = Vec::new();
        let mut samples: Vec<(&FeatureVector, usize)> = Vec::new();
        for (letter, vectors) in templates.iter().filter(|(_, v)| !v.is_empty()) {
            let class = labels.len();
            labels.push(*letter);
            samples.extend(vectors.iter().map(|v| (v, class)));
        }
        if samples.is_empty() {
            return Err(Error::InsufficientData {
                required: 1,
                available: 0,
            });
        }

        let config = &self.config;
        let hidden = config.hidden_units;
        let classes = labels.len();
        let keep = 1.0 - config.dropout;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut params = Parameters {
            w1: glorot(hidden, FEATURE_COUNT, &mut rng),
            b1: DVector::zeros(hidden),
            w2: glorot(classes, hidden, &mut rng),
            b2: DVector::zeros(classes),
        };
        let mut moments = [
            Moments::new(hidden * FEATURE_COUNT),
            Moments::new(hidden),
            Moments::new(classes * hidden),
            Moments::new(classes),
        ];

        let inputs: Vec<DVector<f64>> = samples
            .iter()
            .map(|(v, _)| DVector::from_column_slice(v.as_slice()))
            .collect();
        let mut order: Vec<usize> = (0..samples.len()).collect();
        let mut history = Vec::with_capacity(config.epochs);
        let mut t = 0;

        for epoch in 0..config.epochs {
            order.shuffle(&mut rng);
            let mut epoch_loss = 0.0;

            for batch in order.chunks(config.batch_size) {
                let mut grads = Gradients::zeros(hidden, classes);

                for &i in batch {
                    let x = &inputs[i];
                    let target = samples[i].1;

                    // Forward
                    let z1 = &params.w1 * x + &params.b1;
                    let mask = DVector::from_fn(hidden, |_, _| {
                        if rng.gen::<f64>() < keep {
                            1.0 / keep
                        } else {
                            0.0
                        }
                    });
                    let h = z1.map(|v| v.max(0.0)).component_mul(&mask);
                    let p = softmax(&(&params.w2 * &h + &params.b2));
                    epoch_loss -= p[target].max(f64::MIN_POSITIVE).ln();

                    // Backward
                    let mut d2 = p;
                    d2[target] -= 1.0;
                    grads.w2 += &d2 * h.transpose();
                    grads.b2 += &d2;

                    let relu_grad = z1.map(|v| if v > 0.0 { 1.0 } else { 0.0 });
                    let d1 = (params.w2.transpose() * &d2)
                        .component_mul(&mask)
                        .component_mul(&relu_grad);
                    grads.w1 += &d1 * x.transpose();
                    grads.b1 += &d1;
                }

                let scale = 1.0 / batch.len() as f64;
                t += 1;
                moments[0].step(params.w1.as_mut_slice(), (grads.w1 * scale).as_slice(), config, t);
                moments[1].step(params.b1.as_mut_slice(), (grads.b1 * scale).as_slice(), config, t);
                moments[2].step(params.w2.as_mut_slice(), (grads.w2 * scale).as_slice(), config, t);
                moments[3].step(params.b2.as_mut_slice(), (grads.b2 * scale).as_slice(), config, t);
            }

            let mean_loss = epoch_loss / samples.len() as f64;
            tracing::debug!("Epoch {}/{}: loss {:.4}", epoch + 1, config.epochs, mean_loss);
            history.push(mean_loss);
        }

        let artifact = ModelArtifact::new(
            labels,
            DenseLayer::from_matrix(&params.w1, &params.b1),
            DenseLayer::from_matrix(&params.w2, &params.b2),
        )?;
        tracing::info!(
            "Trained model on {} samples, {} labels, final loss {:.4}",
            samples.len(),
            classes,
            history.last().copied().unwrap_or(f64::NAN)
        );
        Ok((artifact, history))
    }
}
