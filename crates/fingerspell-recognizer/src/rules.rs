//! Hand-authored decision rules for fingerspelled letters.
//!
//! The rules are a flat list evaluated in order; the first rule that fires
//! decides the letter. Specific shapes (fist variants) come before general
//! fallbacks, so reordering the list changes results.

use fingerspell_core::{
    FeatureVector, Landmark, Letter, INDEX_DIP, INDEX_MCP, INDEX_TIP, KNUCKLES, LANDMARK_COUNT,
    MIDDLE_MCP, MIDDLE_TIP, PINKY_TIP, RING_MCP, RING_TIP, THUMB_TIP,
};
use serde::{Deserialize, Serialize};

use crate::features::TIP_TO_WRIST;

/// Empirically calibrated rule thresholds.
///
/// Distances are in units of the wrist to middle-knuckle distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleThresholds {
    /// Knuckle-above-tip rise for a finger to count as extended
    pub extended_rise: f64,
    /// Tip-to-knuckle reach for a finger to count as extended
    pub extended_reach: f64,
    /// Tip-to-joint distance below which a finger counts as curled
    pub curled_reach: f64,
    /// Tip-to-wrist distance above which the thumb counts as extended
    pub thumb_extended: f64,
    pub fist_a_radius: f64,
    pub fist_s_radius: f64,
    pub fist_t_radius: f64,
    /// Fingertips this close to the thumb tip count as covering it (M/N)
    pub fist_overlap_radius: f64,
    /// Thumb-tip to index-tip distance below which a fist reads as E
    pub fist_e_radius: f64,
    /// Index-middle tip separation separating U from V
    pub spread_max: f64,
    /// Index-middle tip separation for crossed fingers (R)
    pub crossed_max: f64,
    pub circle_o: f64,
    pub circle_c: f64,
    pub pinch_f: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            extended_rise: 0.03,
            extended_reach: 0.20,
            curled_reach: 0.12,
            thumb_extended: 0.55,
            fist_a_radius: 0.08,
            fist_s_radius: 0.12,
            fist_t_radius: 0.06,
            fist_overlap_radius: 0.09,
            fist_e_radius: 0.12,
            spread_max: 0.18,
            crossed_max: 0.08,
            circle_o: 0.12,
            circle_c: 0.22,
            pinch_f: 0.08,
        }
    }
}

const FINGER_TIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

const INDEX: usize = 0;
const MIDDLE: usize = 1;
const RING: usize = 2;
const PINKY: usize = 3;

/// Derived facts about one hand shared by all rules
struct HandShape<'a> {
    landmarks: &'a [Landmark],
    norm: f64,
    /// Index, middle, ring, pinky
    extended: [bool; 4],
    pointing_up: [bool; 4],
    thumb_extended: bool,
}

impl<'a> HandShape<'a> {
    fn new(features: &FeatureVector, landmarks: &'a [Landmark], t: &RuleThresholds) -> Self {
        let norm = fingerspell_core::normalization_scale(landmarks);

        let mut extended = [false; 4];
        let mut pointing_up = [false; 4];
        for finger in 0..4 {
            let tip = &landmarks[FINGER_TIPS[finger]];
            let knuckle = &landmarks[KNUCKLES[finger]];
            let rise = (knuckle.y - tip.y) / norm;
            let reach = tip.distance_to(knuckle) / norm;
            pointing_up[finger] = rise > t.extended_rise;
            extended[finger] = pointing_up[finger] || reach > t.extended_reach;
        }

        Self {
            landmarks,
            norm,
            extended,
            pointing_up,
            thumb_extended: features[TIP_TO_WRIST.start] > t.thumb_extended,
        }
    }

    /// Normalized distance between two landmarks
    fn dist(&self, a: usize, b: usize) -> f64 {
        self.landmarks[a].distance_to(&self.landmarks[b]) / self.norm
    }

    /// Whether landmark `a` is higher in the image than landmark `b`
    fn above(&self, a: usize, b: usize) -> bool {
        self.landmarks[a].y < self.landmarks[b].y
    }

    /// Exact extension pattern: thumb, index, middle, ring, pinky
    fn pattern(&self) -> [bool; 5] {
        [
            self.thumb_extended,
            self.extended[INDEX],
            self.extended[MIDDLE],
            self.extended[RING],
            self.extended[PINKY],
        ]
    }

    fn no_finger_extended(&self) -> bool {
        self.extended.iter().all(|e| !e)
    }

    /// Index and middle up, ring and pinky down
    fn two_fingers(&self) -> bool {
        self.extended[INDEX] && self.extended[MIDDLE] && !self.extended[RING] && !self.extended[PINKY]
    }

    fn index_alone(&self) -> bool {
        self.extended[INDEX] && !self.extended[MIDDLE] && !self.extended[RING] && !self.extended[PINKY]
    }
}

type Rule = fn(&HandShape, &RuleThresholds) -> Option<char>;

/// Rules in priority order
const RULES: [(&str, Rule); 13] = [
    ("fist", fist_variants),
    ("pointing index", pointing_index),
    ("pinky only", pinky_only),
    ("index and thumb", index_and_thumb),
    ("two fingers up", two_fingers_up),
    ("three fingers", three_fingers),
    ("thumb and pinky", thumb_and_pinky),
    ("curved hand", curved_hand),
    ("pinch", pinch),
    ("crossed fingers", crossed_fingers),
    ("hooked index", hooked_index),
    ("two fingers sideways", two_fingers_sideways),
    ("pointing down", pointing_down),
];

/// Fist variants: A, S, T, M, N, E
fn fist_variants(h: &HandShape, t: &RuleThresholds) -> Option<char> {
    if !h.no_finger_extended() {
        return None;
    }

    let to_index = h.dist(THUMB_TIP, INDEX_MCP);
    let to_middle = h.dist(THUMB_TIP, MIDDLE_MCP);
    let to_ring = h.dist(THUMB_TIP, RING_MCP);
    let thumb_above_index = h.above(THUMB_TIP, INDEX_TIP);

    if to_index < t.fist_a_radius && to_middle < t.fist_a_radius {
        return Some('A');
    }
    if to_index < t.fist_s_radius && thumb_above_index {
        return Some('S');
    }
    if to_index < t.fist_t_radius && h.above(INDEX_TIP, THUMB_TIP) {
        return Some('T');
    }
    if to_middle < to_ring && to_middle < to_index {
        let covering = [INDEX_TIP, MIDDLE_TIP, RING_TIP]
            .iter()
            .filter(|&&tip| h.dist(tip, THUMB_TIP) < t.fist_overlap_radius)
            .count();
        match covering {
            n if n >= 3 => return Some('M'),
            2 => return Some('N'),
            _ => {}
        }
    }
    if h.dist(THUMB_TIP, INDEX_TIP) < t.fist_e_radius {
        return Some('E');
    }
    None
}

fn pointing_index(h: &HandShape, _: &RuleThresholds) -> Option<char> {
    (h.pattern() == [false, true, false, false, false] && h.above(INDEX_TIP, THUMB_TIP))
        .then_some('D')
}

fn pinky_only(h: &HandShape, _: &RuleThresholds) -> Option<char> {
    (h.pattern() == [false, false, false, false, true]).then_some('I')
}

fn index_and_thumb(h: &HandShape, _: &RuleThresholds) -> Option<char> {
    (h.pattern() == [true, true, false, false, false]).then_some('L')
}

fn two_fingers_up(h: &HandShape, t: &RuleThresholds) -> Option<char> {
    if !h.two_fingers() || !h.pointing_up[INDEX] || !h.pointing_up[MIDDLE] {
        return None;
    }
    let separation = h.dist(INDEX_TIP, MIDDLE_TIP);
    if separation < t.crossed_max {
        None
    } else if separation < t.spread_max {
        Some('U')
    } else {
        Some('V')
    }
}

fn three_fingers(h: &HandShape, _: &RuleThresholds) -> Option<char> {
    (h.extended == [true, true, true, false]).then_some('W')
}

fn thumb_and_pinky(h: &HandShape, _: &RuleThresholds) -> Option<char> {
    (h.pattern() == [true, false, false, false, true]).then_some('Y')
}

fn curved_hand(h: &HandShape, t: &RuleThresholds) -> Option<char> {
    let mean = FINGER_TIPS
        .iter()
        .map(|&tip| h.dist(THUMB_TIP, tip))
        .sum::<f64>()
        / FINGER_TIPS.len() as f64;

    if mean < t.circle_o {
        Some('O')
    } else if mean < t.circle_c {
        Some('C')
    } else {
        None
    }
}

fn pinch(h: &HandShape, t: &RuleThresholds) -> Option<char> {
    (h.dist(THUMB_TIP, INDEX_TIP) < t.pinch_f).then_some('F')
}

fn crossed_fingers(h: &HandShape, t: &RuleThresholds) -> Option<char> {
    (h.extended[INDEX] && h.extended[MIDDLE] && h.dist(INDEX_TIP, MIDDLE_TIP) < t.crossed_max)
        .then_some('R')
}

fn hooked_index(h: &HandShape, t: &RuleThresholds) -> Option<char> {
    let curled = h.dist(INDEX_TIP, INDEX_DIP) < t.curled_reach;
    (curled && !h.extended[MIDDLE] && !h.extended[RING] && !h.extended[PINKY]).then_some('X')
}

fn two_fingers_sideways(h: &HandShape, _: &RuleThresholds) -> Option<char> {
    if !h.two_fingers() {
        return None;
    }
    // Image y grows downward: a lower index tip means the hand is tipped over.
    if h.above(MIDDLE_TIP, INDEX_TIP) {
        Some('P')
    } else {
        Some('K')
    }
}

fn pointing_down(h: &HandShape, _: &RuleThresholds) -> Option<char> {
    (h.index_alone() && h.above(THUMB_TIP, INDEX_TIP)).then_some('Q')
}

/// Deterministic rule-based letter classifier
#[derive(Debug, Clone, Default)]
pub struct RuleClassifier {
    thresholds: RuleThresholds,
}

impl RuleClassifier {
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }

    /// Classify a hand, or `None` when no rule fires.
    ///
    /// Fewer than 21 landmarks also yields `None`.
    pub fn classify(&self, features: &FeatureVector, landmarks: &[Landmark]) -> Option<Letter> {
        self.matching_rule(features, landmarks).map(|(_, letter)| letter)
    }

    /// Like [`classify`](Self::classify) but also names the rule that fired
    pub fn matching_rule(
        &self,
        features: &FeatureVector,
        landmarks: &[Landmark],
    ) -> Option<(&'static str, Letter)> {
        if landmarks.len() < LANDMARK_COUNT {
            return None;
        }

        let shape = HandShape::new(features, landmarks, &self.thresholds);
        RULES.iter().find_map(|(name, rule)| {
            rule(&shape, &self.thresholds)
                .and_then(|c| Letter::new(c).ok())
                .map(|letter| (*name, letter))
        })
    }

    pub fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }
}
