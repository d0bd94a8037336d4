//! Background prediction worker.
//!
//! Runs one model on a snapshot of the survey without blocking the TUI main
//! loop. Each worker is bound to the `RunTicket` it was started with.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::application::{PredictionService, RunTicket};
use crate::domain::{PredictionResult, SurveyState};
use crate::ports::{InferenceEngine, InferenceError};

/// Progress updates from the prediction worker.
#[derive(Debug)]
pub enum PredictionProgress {
    /// Model is loading or running
    Running,
    /// Prediction finished
    Complete(PredictionResult),
    /// Model could not be loaded or run
    Error(InferenceError),
}

/// Handle to a running prediction worker.
pub struct PredictionWorkerHandle {
    pub ticket: RunTicket,
    pub started_at: Instant,
    progress_rx: Receiver<PredictionProgress>,
    _handle: JoinHandle<()>,
}

impl std::fmt::Debug for PredictionWorkerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionWorkerHandle")
            .field("ticket", &self.ticket)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

impl PredictionWorkerHandle {
    /// Try to receive the next progress update (non-blocking).
    ///
    /// # Errors
    /// `TryRecvError::Empty` while the worker is still busy, and
    /// `TryRecvError::Disconnected` once it exited without sending more.
    pub fn try_recv(&self) -> Result<PredictionProgress, TryRecvError> {
        self.progress_rx.try_recv()
    }
}

/// Spawns one thread per prediction run.
pub struct PredictionWorker;

impl PredictionWorker {
    /// Spawn a background prediction for `ticket.task` on `survey`.
    pub fn spawn<E>(
        service: PredictionService<E>,
        ticket: RunTicket,
        survey: SurveyState,
    ) -> PredictionWorkerHandle
    where
        E: InferenceEngine + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            Self::run_with_progress(&service, ticket, &survey, &tx);
        });

        PredictionWorkerHandle {
            ticket,
            started_at: Instant::now(),
            progress_rx: rx,
            _handle: handle,
        }
    }

    fn run_with_progress<E>(
        service: &PredictionService<E>,
        ticket: RunTicket,
        survey: &SurveyState,
        tx: &Sender<PredictionProgress>,
    ) where
        E: InferenceEngine,
    {
        let _ = tx.send(PredictionProgress::Running);

        // The receiver is gone when the run was superseded or cleared.
        let progress = match service.run(ticket.task, survey) {
            Ok(result) => PredictionProgress::Complete(result),
            Err(e) => PredictionProgress::Error(e),
        };
        if tx.send(progress).is_err() {
            tracing::debug!(task = %ticket.task, "Prediction finished after its panel moved on");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::PredictionPanel;
    use crate::domain::PredictionTask;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    struct CrashingEngine;

    impl InferenceEngine for CrashingEngine {
        fn infer(&self, _model: &Path, _input: &[f32]) -> Result<Vec<f32>, InferenceError> {
            panic!("runtime crashed");
        }
    }

    fn drain(handle: &PredictionWorkerHandle) -> Vec<Result<PredictionProgress, TryRecvError>> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut seen = Vec::new();
        while Instant::now() < deadline {
            match handle.try_recv() {
                Err(TryRecvError::Empty) => std::thread::sleep(Duration::from_millis(5)),
                Err(TryRecvError::Disconnected) => {
                    seen.push(Err(TryRecvError::Disconnected));
                    break;
                }
                Ok(progress) => seen.push(Ok(progress)),
            }
        }
        seen
    }

    #[test]
    fn test_crashed_worker_reports_disconnect() {
        let service = PredictionService::new(Arc::new(CrashingEngine), "models");
        let mut panel = PredictionPanel::new(PredictionTask::HeartDisease);
        let ticket = panel.begin_run();

        let handle = PredictionWorker::spawn(service, ticket, SurveyState::default());
        let seen = drain(&handle);

        assert!(matches!(seen.first(), Some(Ok(PredictionProgress::Running))));
        assert!(matches!(seen.last(), Some(Err(TryRecvError::Disconnected))));
        assert!(!seen
            .iter()
            .any(|p| matches!(p, Ok(PredictionProgress::Complete(_)))));
    }
}
