//! Error types for the RedWings motion metrics system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Landmark count mismatch: expected {expected}, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },

    #[error("Non-finite value in landmark {index}")]
    NonFiniteLandmark { index: usize },

    #[error("Landmark {index} confidence {confidence} outside [0, 1]")]
    ConfidenceRange { index: usize, confidence: f64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
