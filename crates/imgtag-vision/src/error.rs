//! Error types for model loading and inference.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for vision operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors that can occur while loading a model or classifying an image.
///
/// Everything except `UnsupportedModel`/`ModelNotFound`/`InvalidVocabulary`
/// surfaces at inference time and is treated as fatal by the pipeline.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Unsupported model '{name}'. Supported models are: {supported}")]
    UnsupportedModel { name: String, supported: String },

    #[error("Model file not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Invalid label vocabulary: {0}")]
    InvalidVocabulary(String),

    #[error("Inference runtime error: {0}")]
    Runtime(String),

    #[error("Unexpected model output: expected {expected} scores, got {actual}")]
    OutputShape { expected: usize, actual: usize },

    #[error("top-k must be a positive integer, got {0}")]
    InvalidTopK(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl VisionError {
    /// Create an unsupported model error listing the accepted names.
    pub fn unsupported_model(name: impl Into<String>, supported: &[&str]) -> Self {
        Self::UnsupportedModel {
            name: name.into(),
            supported: supported.join(", "),
        }
    }

    /// Create a model not found error.
    pub fn model_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ModelNotFound(path.into())
    }

    /// Create an invalid vocabulary error.
    pub fn invalid_vocabulary(message: impl Into<String>) -> Self {
        Self::InvalidVocabulary(message.into())
    }

    /// Create a runtime error.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }

    /// Whether this error happens before any record is processed.
    pub fn is_startup_error(&self) -> bool {
        matches!(
            self,
            VisionError::UnsupportedModel { .. }
                | VisionError::ModelNotFound(_)
                | VisionError::InvalidVocabulary(_)
        )
    }
}
