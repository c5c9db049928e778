//! Heuristic starter templates.
//!
//! One hand-tuned sample per letter so the nearest-neighbor fallback works
//! before any real samples have been captured. Letters whose static pose
//! matches another letter reuse that letter's sample.

use fingerspell_core::{FeatureVector, Letter};

use crate::templates::TemplateSet;

/// Tip-to-wrist reach of a straight finger
const REACH_OPEN: f64 = 0.9;
/// Tip-to-wrist reach of a curled finger
const REACH_CURLED: f64 = 0.32;
const CURL_OPEN: f64 = 0.6;
const CURL_TIGHT: f64 = 0.12;
const PAIR_NEAR: f64 = 0.08;
const PAIR_FAR: f64 = 0.45;

const fn sample(reach: [f64; 5], curl: [f64; 5], pairs: [f64; 5], angles: [f64; 3]) -> [f64; 18] {
    [
        reach[0], reach[1], reach[2], reach[3], reach[4], curl[0], curl[1], curl[2], curl[3],
        curl[4], pairs[0], pairs[1], pairs[2], pairs[3], pairs[4], angles[0], angles[1], angles[2],
    ]
}

const O: f64 = CURL_OPEN;
const T: f64 = CURL_TIGHT;
const C: f64 = REACH_CURLED;
const X: f64 = REACH_OPEN;

const FIST_CURL: [f64; 5] = [T; 5];
const FIST_PAIRS: [f64; 5] = [PAIR_NEAR; 5];

/// Letters with their own sample
const PROFILES: [(char, [f64; 18]); 21] = [
    ('A', sample([C; 5], FIST_CURL, FIST_PAIRS, [2.6; 3])),
    ('B', sample([C, X, X, X, X], [T, O, O, O, O], [PAIR_FAR; 5], [0.4, 0.45, 0.5])),
    (
        'C',
        sample(
            [0.7, 0.75, 0.78, 0.72, 0.7],
            [0.35, 0.38, 0.4, 0.36, 0.34],
            [0.25, 0.22, 0.26, 0.28, 0.2],
            [1.2, 1.1, 1.15],
        ),
    ),
    ('D', sample([C, X, C, C, C], [T, O, T, T, T], [0.25, 0.18, 0.2, 0.2, 0.18], [0.6, 1.8, 1.9])),
    ('E', sample([C; 5], FIST_CURL, FIST_PAIRS, [2.4; 3])),
    (
        'F',
        sample([0.45, 0.7, 0.7, 0.65, 0.6], [T, O, O, O, O], [0.06, 0.22, 0.25, 0.28, 0.22], [0.6, 0.7, 0.8]),
    ),
    (
        'G',
        sample([0.5, 0.82, 0.5, 0.48, 0.46], [T, O, T, T, T], [0.28, 0.18, 0.22, 0.2, 0.18], [0.5, 1.4, 1.5]),
    ),
    (
        'H',
        sample([0.4, 0.86, 0.86, 0.48, 0.44], [T, O, O, T, T], [0.12, 0.22, 0.22, 0.2, 0.2], [0.4, 0.45, 1.6]),
    ),
    (
        'I',
        sample([0.4, 0.45, 0.42, 0.4, 0.88], [T, T, T, T, O], [0.28, 0.18, 0.22, 0.26, 0.14], [2.0; 3]),
    ),
    (
        'K',
        sample([0.6, X, X, 0.5, 0.45], [T, O, O, T, T], [0.22, 0.2, 0.22, 0.2, 0.18], [0.5, 0.45, 1.4]),
    ),
    (
        'L',
        sample([X, 0.85, 0.4, 0.38, 0.36], [O, O, T, T, T], [0.18, 0.26, 0.28, 0.24, 0.2], [0.5, 1.7, 1.8]),
    ),
    ('M', sample([C; 5], FIST_CURL, FIST_PAIRS, [2.5; 3])),
    ('O', sample([0.44; 5], FIST_CURL, [0.08; 5], [1.9; 3])),
    ('R', sample([C, 0.8, 0.8, C, C], [T, O, O, T, T], [0.1, 0.08, 0.14, 0.18, 0.16], [0.5, 0.5, 1.8])),
    ('T', sample([C; 5], FIST_CURL, FIST_PAIRS, [2.5; 3])),
    ('U', sample([C, X, X, C, C], [T, O, O, T, T], [0.12, 0.12, 0.18, 0.18, 0.16], [0.4, 0.45, 1.6])),
    ('V', sample([C, X, X, C, C], [T, O, O, T, T], [0.3, 0.25, 0.3, 0.22, 0.18], [0.4, 0.6, 1.6])),
    ('W', sample([C, X, X, X, C], [T, O, O, O, T], [0.3, 0.3, 0.3, 0.26, 0.22], [0.4, 0.45, 0.5])),
    ('X', sample([C, 0.45, C, C, C], FIST_CURL, [0.18, 0.16, 0.18, 0.16, 0.14], [1.9, 2.0, 2.0])),
    ('Y', sample([X, 0.36, 0.36, 0.36, X], [O, T, T, T, O], [0.4, 0.22, 0.2, 0.18, 0.4], [0.5, 1.9, 2.0])),
    ('Z', sample([C, X, C, C, C], [T, O, T, T, T], [0.22, 0.18, 0.2, 0.18, 0.16], [0.5, 1.5, 1.6])),
];

/// Letters sharing another letter's static pose: (letter, source)
const MIRRORS: [(char, char); 5] = [('J', 'I'), ('N', 'M'), ('P', 'K'), ('Q', 'G'), ('S', 'A')];

impl TemplateSet {
    /// One heuristic sample for every letter A-Z
    pub fn seeded() -> Self {
        let mut set = TemplateSet::new();
        for (c, values) in PROFILES {
            if let Ok(letter) = Letter::new(c) {
                set.push(letter, FeatureVector::new(values));
            }
        }
        for (c, source) in MIRRORS {
            let profile = PROFILES.iter().find(|(p, _)| *p == source);
            if let (Ok(letter), Some((_, values))) = (Letter::new(c), profile) {
                set.push(letter, FeatureVector::new(*values));
            }
        }
        set
    }
}
