//! Feature extraction for letter classification.
//!
//! Converts the 21 hand landmarks into the fixed 18-entry layout described
//! on [`FeatureVector`]. Downstream classifiers and stored templates depend
//! on this exact order.

use std::ops::Range;

use fingerspell_core::{
    angle_at, distance, normalization_scale, FeatureVector, Landmark, FEATURE_COUNT, FINGERTIPS,
    INDEX_MCP, INDEX_PIP, INDEX_TIP, LANDMARK_COUNT, MIDDLE_MCP, MIDDLE_PIP, MIDDLE_TIP, PINKY_TIP,
    RING_MCP, RING_PIP, RING_TIP, THUMB_TIP, TIP_JOINTS, WRIST,
};

/// Tip-to-wrist distances, thumb to pinky
pub const TIP_TO_WRIST: Range<usize> = 0..5;
/// Tip-to-joint curl distances, thumb to pinky
pub const TIP_CURL: Range<usize> = 5..10;
/// Fingertip pair distances, in [`FINGERTIP_PAIRS`] order
pub const PAIR_DISTANCES: Range<usize> = 10..15;
/// Joint angles for index, middle and ring
pub const JOINT_ANGLES: Range<usize> = 15..18;

/// Fingertip pairs measured into [`PAIR_DISTANCES`]
pub const FINGERTIP_PAIRS: [(usize, usize); 5] = [
    (INDEX_TIP, MIDDLE_TIP),
    (INDEX_TIP, THUMB_TIP),
    (MIDDLE_TIP, RING_TIP),
    (RING_TIP, PINKY_TIP),
    (THUMB_TIP, INDEX_TIP),
];

/// (knuckle, vertex, tip) triples for [`JOINT_ANGLES`]
pub const ANGLE_JOINTS: [(usize, usize, usize); 3] = [
    (INDEX_MCP, INDEX_PIP, INDEX_TIP),
    (MIDDLE_MCP, MIDDLE_PIP, MIDDLE_TIP),
    (RING_MCP, RING_PIP, RING_TIP),
];

/// Stateless landmark-to-feature converter
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the feature vector for one hand.
    ///
    /// Returns `None` when fewer than 21 landmarks are supplied.
    pub fn extract(&self, landmarks: &[Landmark]) -> Option<FeatureVector> {
        if landmarks.len() < LANDMARK_COUNT {
            return None;
        }

        let norm = normalization_scale(landmarks);
        let wrist = &landmarks[WRIST];
        let mut values = [0.0; FEATURE_COUNT];

        for (i, &tip) in FINGERTIPS.iter().enumerate() {
            values[TIP_TO_WRIST.start + i] = distance(&landmarks[tip], wrist) / norm;
        }

        for (i, (&tip, &joint)) in FINGERTIPS.iter().zip(TIP_JOINTS.iter()).enumerate() {
            values[TIP_CURL.start + i] = distance(&landmarks[tip], &landmarks[joint]) / norm;
        }

        for (i, &(a, b)) in FINGERTIP_PAIRS.iter().enumerate() {
            values[PAIR_DISTANCES.start + i] = distance(&landmarks[a], &landmarks[b]) / norm;
        }

        for (i, &(knuckle, vertex, tip)) in ANGLE_JOINTS.iter().enumerate() {
            values[JOINT_ANGLES.start + i] =
                angle_at(&landmarks[knuckle], &landmarks[vertex], &landmarks[tip]);
        }

        Some(FeatureVector::new(values))
    }
}

/// Shorthand for [`FeatureExtractor::extract`]
pub fn extract_features(landmarks: &[Landmark]) -> Option<FeatureVector> {
    FeatureExtractor.extract(landmarks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{hand, Digit};
    use proptest::prelude::*;
    use std::f64::consts::PI;

    fn open_hand() -> Vec<Landmark> {
        hand(
            [Digit::Extended, Digit::Extended, Digit::Extended, Digit::Extended],
            [0.30, 0.62],
        )
    }

    #[test]
    fn test_short_input_is_rejected() {
        let landmarks = open_hand();
        assert!(extract_features(&landmarks[..20]).is_none());
        assert!(extract_features(&[]).is_none());
    }

    #[test]
    fn test_layout() {
        let landmarks = open_hand();
        let features = extract_features(&landmarks).unwrap();
        let norm = landmarks[WRIST].distance_to(&landmarks[MIDDLE_MCP]);

        let index_to_wrist = landmarks[INDEX_TIP].distance_to(&landmarks[WRIST]) / norm;
        assert!((features[1] - index_to_wrist).abs() < 1e-12);

        // Pair 1 and pair 4 measure the same two tips.
        assert!((features[11] - features[14]).abs() < 1e-12);

        // Straight fingers have joint angles close to π.
        for i in JOINT_ANGLES {
            assert!((features[i] - PI).abs() < 1e-6, "angle {} = {}", i, features[i]);
        }
    }

    #[test]
    fn test_values_in_range() {
        let features = extract_features(&open_hand()).unwrap();
        for i in 0..JOINT_ANGLES.start {
            assert!(features[i] >= 0.0);
        }
        for i in JOINT_ANGLES {
            assert!((0.0..=PI).contains(&features[i]));
        }
    }

    #[test]
    fn test_collapsed_hand_stays_finite() {
        let landmarks = vec![Landmark::new(0.5, 0.5, 0.0); 21];
        let features = extract_features(&landmarks).unwrap();
        assert!(features.is_finite());
        assert_eq!(features[JOINT_ANGLES.start], 0.0);
    }

    proptest! {
        #[test]
        fn scale_invariance(factor in 0.05f64..20.0) {
            let landmarks = open_hand();
            let scaled: Vec<Landmark> = landmarks.iter().map(|l| l.scaled(factor)).collect();

            let a = extract_features(&landmarks).unwrap();
            let b = extract_features(&scaled).unwrap();
            for i in 0..FEATURE_COUNT {
                prop_assert!((a[i] - b[i]).abs() < 1e-9, "feature {} differs: {} vs {}", i, a[i], b[i]);
            }
        }

        #[test]
        fn extraction_is_deterministic(dx in -0.05f64..0.05, dy in -0.05f64..0.05) {
            let mut landmarks = open_hand();
            landmarks[INDEX_TIP].x += dx;
            landmarks[INDEX_TIP].y += dy;
            prop_assert_eq!(extract_features(&landmarks), extract_features(&landmarks));
        }
    }
}
