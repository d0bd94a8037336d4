//! # Vitalcheck
//!
//! Local health-risk self-assessment with four bundled ONNX models.
//!
//! This crate provides:
//! - A shared survey of health answers with defaults for every field
//! - Feature encoders for heart disease, maternal health risk, obesity and
//!   diabetes models
//! - ONNX Runtime inference with optional digest verification
//! - Terminal UI with one panel per prediction
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Survey, encoders, prediction results and advice
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (ONNX Runtime, log sanitizer)
//! - `application`: Survey store, prediction service and panel state
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use config::AppConfig;
pub use domain::{PredictionResult, PredictionTask, SurveyState};

/// Result type for Vitalcheck operations
pub type Result<T> = std::result::Result<T, VitalcheckError>;

/// Main error type for Vitalcheck
///
/// Inference failures stay on `ports::InferenceError` and are shown per panel.
#[derive(Debug, thiserror::Error)]
pub enum VitalcheckError {
    #[error("Invalid configuration: {0}")]
    Config(String),
}
