//! Prediction panel state machine.
//!
//! ```text
//! Idle ──run──▶ Loading ──ok──▶ HasResults ──clear──▶ Idle
//!                  │                 └──run──▶ Loading
//!                  └──err──▶ Error ──retry──▶ Loading
//!                              └──clear──▶ Idle
//! ```
//!
//! Each run gets a `RunTicket`. Only the outcome carrying the latest ticket
//! is applied, so a slow earlier run can never overwrite a newer one.

use crate::domain::{PredictionResult, PredictionTask};
use crate::ports::InferenceError;

/// Identifies one run request of one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunTicket {
    pub task: PredictionTask,
    generation: u64,
}

/// What a panel currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PanelState {
    #[default]
    Idle,
    Loading {
        ticket: RunTicket,
    },
    HasResults(PredictionResult),
    Error {
        message: String,
    },
}

/// One prediction panel: its task, its state and its run counter.
#[derive(Debug, Clone)]
pub struct PredictionPanel {
    task: PredictionTask,
    state: PanelState,
    generation: u64,
}

impl PredictionPanel {
    #[must_use]
    pub fn new(task: PredictionTask) -> Self {
        Self {
            task,
            state: PanelState::Idle,
            generation: 0,
        }
    }

    #[must_use]
    pub fn task(&self) -> PredictionTask {
        self.task
    }

    #[must_use]
    pub fn state(&self) -> &PanelState {
        &self.state
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.state, PanelState::Loading { .. })
    }

    #[must_use]
    pub fn result(&self) -> Option<&PredictionResult> {
        match &self.state {
            PanelState::HasResults(result) => Some(result),
            _ => None,
        }
    }

    /// Drop any previous result and enter loading. Also used to retry.
    pub fn begin_run(&mut self) -> RunTicket {
        self.generation += 1;
        let ticket = RunTicket {
            task: self.task,
            generation: self.generation,
        };
        if self.is_loading() {
            tracing::debug!(task = %self.task, "Superseding in-flight run");
        }
        self.state = PanelState::Loading { ticket };
        ticket
    }

    /// Apply the outcome of a run. Returns `false` if the ticket is stale
    /// and the outcome was discarded.
    pub fn complete(
        &mut self,
        ticket: RunTicket,
        outcome: Result<PredictionResult, InferenceError>,
    ) -> bool {
        let current = matches!(self.state, PanelState::Loading { ticket: t } if t == ticket);
        if !current {
            tracing::warn!(task = %self.task, "Discarding stale prediction outcome");
            return false;
        }

        self.state = match outcome {
            Ok(result) => PanelState::HasResults(result),
            Err(e) => {
                tracing::warn!(task = %self.task, error = %e, "Prediction failed");
                PanelState::Error {
                    message: e.to_string(),
                }
            }
        };
        true
    }

    /// Return to idle and invalidate any in-flight run.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.state = PanelState::Idle;
    }
}
