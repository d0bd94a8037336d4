//! Inference engine port: Trait for running a bundled model.
//!
//! This trait abstracts the model runtime (ONNX Runtime) from the
//! application logic.

use std::path::{Path, PathBuf};

/// Error type for model loading and inference.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Model file not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Model {file} is not listed in the manifest")]
    NotInManifest { file: String },

    #[error("Model {file} failed integrity check (expected {expected}, got {actual})")]
    DigestMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid model manifest: {0}")]
    Manifest(String),

    #[error("Failed to load model session: {0}")]
    Session(String),

    #[error("Inference failed: {0}")]
    Runtime(String),

    #[error("Encoded {actual} features, model expects {expected}")]
    InputShape { expected: usize, actual: usize },

    #[error("Model returned {actual} outputs, expected {expected}")]
    OutputShape { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for running a single-input, single-output classification model.
///
/// Implementations may cache loaded sessions between calls.
pub trait InferenceEngine: Send + Sync {
    /// Run the model at `model` on one feature vector.
    ///
    /// The vector is fed as a `[1, input.len()]` float tensor to the model's
    /// first input; the first output is returned flattened.
    ///
    /// # Errors
    /// Returns `InferenceError` if the model cannot be loaded or run.
    fn infer(&self, model: &Path, input: &[f32]) -> Result<Vec<f32>, InferenceError>;

    /// Drop any cached session for `model`.
    fn evict(&self, _model: &Path) {}
}
