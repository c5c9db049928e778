//! Fundamental types for the fingerspelling recognizer.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// HAND LANDMARK INDICES (21-point hand model)
// ============================================================================

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Fingertips, thumb to pinky
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// The joint just below each fingertip, thumb to pinky
pub const TIP_JOINTS: [usize; 5] = [THUMB_IP, INDEX_DIP, MIDDLE_DIP, RING_DIP, PINKY_DIP];

/// Base knuckles of the four fingers, index to pinky
pub const KNUCKLES: [usize; 4] = [INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];

/// A single 3D landmark in normalized image coordinates.
///
/// `x` and `y` are in [0, 1] relative to the frame with `y` growing
/// downward; `z` is relative depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Scale all coordinates by a constant factor
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

impl From<[f64; 3]> for Landmark {
    fn from(p: [f64; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

// ============================================================================
// LETTERS AND LABELS
// ============================================================================

/// One of the 26 fingerspelled letters, always stored uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Letter(u8);

impl Letter {
    pub const COUNT: usize = 26;

    pub fn new(c: char) -> Result<Self> {
        let upper = c.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Ok(Self(upper as u8))
        } else {
            Err(Error::InvalidLetter(c.to_string()))
        }
    }

    /// Letter at position `index` in the alphabet (0 = A)
    pub fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self(b'A' + index as u8))
        } else {
            None
        }
    }

    pub fn index(&self) -> usize {
        (self.0 - b'A') as usize
    }

    pub fn as_char(&self) -> char {
        self.0 as char
    }

    /// All letters A through Z in order
    pub fn all() -> impl Iterator<Item = Letter> {
        (b'A'..=b'Z').map(Letter)
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Letter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Letter::new(c),
            _ => Err(Error::InvalidLetter(s.to_string())),
        }
    }
}

impl TryFrom<char> for Letter {
    type Error = Error;

    fn try_from(c: char) -> Result<Self> {
        Letter::new(c)
    }
}

impl TryFrom<String> for Letter {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Letter> for String {
    fn from(letter: Letter) -> Self {
        letter.to_string()
    }
}

/// Outcome label of a classification: a letter or the reserved unknown marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Label {
    Letter(Letter),
    /// No classifier produced a confident label
    Unknown,
}

impl Label {
    pub const UNKNOWN_MARKER: char = '?';

    pub fn letter(&self) -> Option<Letter> {
        match self {
            Label::Letter(letter) => Some(*letter),
            Label::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Label::Unknown)
    }
}

impl From<Letter> for Label {
    fn from(letter: Letter) -> Self {
        Label::Letter(letter)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Letter(letter) => write!(f, "{}", letter),
            Label::Unknown => write!(f, "{}", Self::UNKNOWN_MARKER),
        }
    }
}

impl TryFrom<String> for Label {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        if s.trim() == Self::UNKNOWN_MARKER.to_string() {
            Ok(Label::Unknown)
        } else {
            s.parse().map(Label::Letter)
        }
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.to_string()
    }
}

/// A label paired with a distance/uncertainty score (lower = more confident)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,
    pub score: f64,
}

impl Prediction {
    pub fn new(label: Label, score: f64) -> Self {
        Self { label, score }
    }

    pub fn letter(letter: Letter, score: f64) -> Self {
        Self::new(Label::Letter(letter), score)
    }

    pub fn unknown(score: f64) -> Self {
        Self::new(Label::Unknown, score)
    }

    pub fn is_unknown(&self) -> bool {
        self.label.is_unknown()
    }
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Number of entries in a [`FeatureVector`]
pub const FEATURE_COUNT: usize = 18;

/// Scale-invariant description of a hand pose.
///
/// Layout:
/// - 0..5: tip-to-wrist distances (thumb, index, middle, ring, pinky)
/// - 5..10: tip-to-joint "curl" distances, same finger order
/// - 10..15: fingertip pair distances (index-middle, index-thumb,
///   middle-ring, ring-pinky, thumb-index)
/// - 15..18: joint angles in radians for index, middle, ring
///
/// Distances are divided by the wrist to middle-knuckle distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let array: [f64; FEATURE_COUNT] =
            values.try_into().map_err(|_| Error::FeatureLength {
                expected: FEATURE_COUNT,
                actual: values.len(),
            })?;
        Ok(Self(array))
    }

    pub fn zeros() -> Self {
        Self([0.0; FEATURE_COUNT])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn values(&self) -> [f64; FEATURE_COUNT] {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }

    /// Euclidean distance to another vector
    pub fn distance_to(&self, other: &FeatureVector) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Per-dimension arithmetic mean; `None` for an empty set
    pub fn mean<'a, I>(vectors: I) -> Option<FeatureVector>
    where
        I: IntoIterator<Item = &'a FeatureVector>,
    {
        let mut sum = [0.0; FEATURE_COUNT];
        let mut count = 0usize;
        for v in vectors {
            for (acc, x) in sum.iter_mut().zip(v.0.iter()) {
                *acc += x;
            }
            count += 1;
        }
        if count == 0 {
            return None;
        }
        for acc in sum.iter_mut() {
            *acc /= count as f64;
        }
        Some(FeatureVector(sum))
    }
}

impl Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }
}

impl TryFrom<Vec<f64>> for FeatureVector {
    type Error = Error;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::from_slice(&values)
    }
}
