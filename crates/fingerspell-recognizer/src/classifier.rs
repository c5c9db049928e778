//! Common contract shared by the model, rule and template classifiers.

use std::fmt;

use fingerspell_core::{FeatureVector, Landmark, Prediction};
use serde::{Deserialize, Serialize};

use crate::rules::RuleClassifier;

/// Which classifier produced a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    Model,
    Rules,
    Templates,
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierKind::Model => write!(f, "model"),
            ClassifierKind::Rules => write!(f, "rules"),
            ClassifierKind::Templates => write!(f, "templates"),
        }
    }
}

/// Base trait for all letter classifiers
pub trait Classifier: Send + Sync {
    fn kind(&self) -> ClassifierKind;

    /// Classify one hand.
    ///
    /// `None` means "no opinion, ask the next classifier". A returned
    /// prediction ends the chain even when its label is unknown.
    fn classify(&self, features: &FeatureVector, landmarks: &[Landmark]) -> Option<Prediction>;
}

impl Classifier for RuleClassifier {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Rules
    }

    fn classify(&self, features: &FeatureVector, landmarks: &[Landmark]) -> Option<Prediction> {
        RuleClassifier::classify(self, features, landmarks).map(|letter| Prediction::letter(letter, 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::extract_features;
    use crate::testing::Digit::{Curled, Extended};
    use crate::testing::{hand, THUMB_IN};

    #[test]
    fn test_rule_hit_has_zero_score() {
        let landmarks = hand([Extended, Curled, Curled, Curled], THUMB_IN);
        let features = extract_features(&landmarks).unwrap();
        let rules: &dyn Classifier = &RuleClassifier::default();

        let prediction = rules.classify(&features, &landmarks).unwrap();
        assert_eq!(prediction.label.to_string(), "D");
        assert_eq!(prediction.score, 0.0);
        assert_eq!(rules.kind(), ClassifierKind::Rules);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ClassifierKind::Templates.to_string(), "templates");
        assert_eq!(serde_json::to_string(&ClassifierKind::Model).unwrap(), "\"model\"");
    }
}
