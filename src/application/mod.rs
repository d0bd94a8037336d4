//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod panel;
mod prediction;
mod store;

pub use panel::{PanelState, PredictionPanel, RunTicket};
pub use prediction::PredictionService;
pub use store::{SubscriptionId, SurveyStore};
