//! Domain layer: Core survey and prediction types.
//!
//! Pure Rust types with no I/O. Encoders and argmax live here so they can be
//! tested without a model or a terminal.

pub mod advice;
pub mod encoding;
mod prediction;
mod survey;

pub use advice::{advice_for, Advice};
pub use prediction::{index_of_max, to_percentages, PredictionResult, PredictionTask};
pub use survey::{
    ChestPainType, FieldKind, Sex, SurveyField, SurveyState, SurveyUpdate, Transportation,
};
