//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundary
//! between the application and the model runtime.

mod inference_engine;

pub use inference_engine::{InferenceEngine, InferenceError};
