//! Error types for the fingerspelling recognizer.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid letter: {0:?} (expected a single letter A-Z)")]
    InvalidLetter(String),

    #[error("Feature vector length mismatch: expected {expected}, got {actual}")]
    FeatureLength { expected: usize, actual: usize },

    #[error("Invalid model shape: {0}")]
    ModelShape(String),

    #[error("Model loading error: {0}")]
    ModelLoad(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Insufficient data: need {required} samples, have {available}")]
    InsufficientData { required: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
