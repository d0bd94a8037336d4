//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides:
//! - A general section for answers shared by every prediction
//! - One panel per model with its questions and results
//! - Background inference so the interface stays responsive

mod app;
mod styles;
mod ui;
mod worker;

pub use app::App;
pub use styles::MedicalTheme;
pub use worker::{PredictionProgress, PredictionWorker, PredictionWorkerHandle};
