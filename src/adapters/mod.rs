//! Adapters layer: Concrete implementations of ports.
//!
//! - `onnx`: ONNX Runtime via `ort` for model inference
//! - `sanitize`: redaction of health data in logs

pub mod onnx;
pub mod sanitize;
