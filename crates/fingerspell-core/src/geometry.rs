//! Geometric utilities over hand landmarks.

use nalgebra::Vector3;

use crate::types::{Landmark, MIDDLE_MCP, WRIST};

/// Substituted for a zero normalization scale
pub const NORM_EPSILON: f64 = 1e-6;

/// Euclidean distance between two landmarks
pub fn distance(a: &Landmark, b: &Landmark) -> f64 {
    a.distance_to(b)
}

/// Calculate angle between two vectors.
///
/// Degenerate (zero-length) vectors yield 0.
pub fn angle_between(v1: &Vector3<f64>, v2: &Vector3<f64>) -> f64 {
    let norms = v1.norm() * v2.norm();
    if norms < 1e-12 {
        0.0
    } else {
        (v1.dot(v2) / norms).clamp(-1.0, 1.0).acos()
    }
}

/// Angle at `vertex` formed by the arms toward `a` and `c`, in [0, π]
pub fn angle_at(a: &Landmark, vertex: &Landmark, c: &Landmark) -> f64 {
    let u = a.to_vector() - vertex.to_vector();
    let v = c.to_vector() - vertex.to_vector();
    angle_between(&u, &v)
}

/// Wrist to middle-knuckle distance used to make hand measurements
/// scale invariant.
///
/// Callers must supply at least [`crate::LANDMARK_COUNT`] landmarks.
pub fn normalization_scale(landmarks: &[Landmark]) -> f64 {
    let norm = distance(&landmarks[WRIST], &landmarks[MIDDLE_MCP]);
    if norm > 0.0 {
        norm
    } else {
        NORM_EPSILON
    }
}
