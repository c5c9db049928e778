//! Synthetic hand fixtures shared by the unit tests.
//!
//! The hand is upright in image coordinates: wrist at (0.5, 0.8), the four
//! base knuckles on the line y = 0.6, so the normalization scale is 0.2.

use fingerspell_core::{
    FeatureVector, Landmark, Letter, FEATURE_COUNT, INDEX_MCP, LANDMARK_COUNT, MIDDLE_MCP, PINKY_MCP,
    RING_MCP, THUMB_CMC, THUMB_IP, THUMB_MCP, THUMB_TIP, WRIST,
};

use crate::model::{DenseLayer, ModelArtifact};

pub const KNUCKLE_Y: f64 = 0.6;
pub const KNUCKLE_X: [f64; 4] = [0.44, 0.50, 0.56, 0.62];
pub const FINGER_BASES: [usize; 4] = [INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];

/// Thumb tip position that counts as extended
pub const THUMB_OUT: [f64; 2] = [0.30, 0.62];
/// Thumb tip position close to the wrist, not extended
pub const THUMB_IN: [f64; 2] = [0.47, 0.72];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Digit {
    Extended,
    Curled,
}

/// Build a hand from the state of index, middle, ring and pinky plus the
/// thumb tip position.
pub fn hand(fingers: [Digit; 4], thumb_tip: [f64; 2]) -> Vec<Landmark> {
    let mut landmarks = vec![Landmark::default(); LANDMARK_COUNT];
    landmarks[WRIST] = Landmark::new(0.5, 0.8, 0.0);
    landmarks[THUMB_CMC] = Landmark::new(0.42, 0.76, 0.0);
    landmarks[THUMB_MCP] = Landmark::new(0.38, 0.70, 0.0);
    landmarks[THUMB_TIP] = Landmark::new(thumb_tip[0], thumb_tip[1], 0.0);
    landmarks[THUMB_IP] = Landmark::new(
        (0.38 + thumb_tip[0]) / 2.0,
        (0.70 + thumb_tip[1]) / 2.0,
        0.0,
    );

    for (finger, digit) in fingers.iter().enumerate() {
        let base = FINGER_BASES[finger];
        let x = KNUCKLE_X[finger];
        let ys = match digit {
            Digit::Extended => [KNUCKLE_Y, 0.54, 0.50, 0.46],
            Digit::Curled => [KNUCKLE_Y, 0.56, 0.585, 0.605],
        };
        for (joint, y) in ys.iter().enumerate() {
            landmarks[base + joint] = Landmark::new(x, *y, 0.0);
        }
    }

    landmarks
}

/// Move every joint of a finger (0 = index .. 3 = pinky) to column `x`
pub fn shift_finger(landmarks: &mut [Landmark], finger: usize, x: f64) {
    let base = FINGER_BASES[finger];
    for joint in base..base + 4 {
        landmarks[joint].x = x;
    }
}

/// A feature vector with every entry set to `value`
pub fn uniform(value: f64) -> FeatureVector {
    FeatureVector::new([value; FEATURE_COUNT])
}

/// `base` moved by `distance` along the first axis
pub fn offset(base: &FeatureVector, distance: f64) -> FeatureVector {
    let mut values = base.values();
    values[0] += distance;
    FeatureVector::new(values)
}

pub fn letters(s: &str) -> Vec<Letter> {
    s.chars().map(|c| Letter::new(c).unwrap()).collect()
}

/// Network whose output depends only on the output bias
pub fn constant_artifact(labels: &str, output_bias: Vec<f64>) -> ModelArtifact {
    let hidden = DenseLayer {
        weights: vec![vec![0.0; FEATURE_COUNT]; 2],
        bias: vec![1.0, 0.0],
    };
    let output = DenseLayer {
        weights: vec![vec![0.0; 2]; output_bias.len()],
        bias: output_bias,
    };
    ModelArtifact::new(letters(labels), hidden, output).unwrap()
}
