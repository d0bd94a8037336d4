//! Prediction service: Runs one task's model on the current survey.
//!
//! This service coordinates:
//! - Feature encoding
//! - Model inference
//! - Percentage conversion and verdict selection

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::{PredictionResult, PredictionTask, SurveyState};
use crate::ports::{InferenceEngine, InferenceError};

/// Service for running the bundled models.
pub struct PredictionService<E>
where
    E: InferenceEngine,
{
    engine: Arc<E>,
    model_dir: PathBuf,
}

impl<E> PredictionService<E>
where
    E: InferenceEngine,
{
    /// Create a new prediction service reading models from `model_dir`.
    pub fn new(engine: Arc<E>, model_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            model_dir: model_dir.into(),
        }
    }

    #[must_use]
    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Full path of the model file for `task`.
    #[must_use]
    pub fn model_path(&self, task: PredictionTask) -> PathBuf {
        self.model_dir.join(task.model_file())
    }

    /// Tasks whose model file is missing from the model directory.
    #[must_use]
    pub fn missing_models(&self) -> Vec<PredictionTask> {
        PredictionTask::ALL
            .into_iter()
            .filter(|task| !self.model_path(*task).exists())
            .collect()
    }

    /// Run the model for `task` on `state`.
    ///
    /// # Errors
    /// Returns `InferenceError` if the model cannot be loaded or run, or if
    /// its input or output length does not match the task.
    pub fn run(
        &self,
        task: PredictionTask,
        state: &SurveyState,
    ) -> Result<PredictionResult, InferenceError> {
        tracing::info!(%task, "Starting prediction");

        let features = task.encode(state);
        if features.len() != task.feature_len() {
            return Err(InferenceError::InputShape {
                expected: task.feature_len(),
                actual: features.len(),
            });
        }
        tracing::debug!(%task, features = features.len(), "Encoded survey");

        let path = self.model_path(task);
        let raw = self.engine.infer(&path, &features)?;
        if raw.len() != task.class_count() {
            return Err(InferenceError::OutputShape {
                expected: task.class_count(),
                actual: raw.len(),
            });
        }

        let result = PredictionResult::from_raw(task, &raw);
        tracing::info!(
            %task,
            verdict = result.verdict_label().unwrap_or("none"),
            "Prediction complete"
        );
        Ok(result)
    }

    /// Forget the cached session for `task` so the next run reloads it.
    pub fn reload(&self, task: PredictionTask) {
        self.engine.evict(&self.model_path(task));
    }
}

impl<E> Clone for PredictionService<E>
where
    E: InferenceEngine,
{
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            model_dir: self.model_dir.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Engine returning fixed outputs and recording what it was given.
    #[derive(Default)]
    pub(crate) struct StubEngine {
        pub outputs: Vec<f32>,
        pub fail: bool,
        pub calls: Mutex<Vec<(PathBuf, Vec<f32>)>>,
        pub evicted: Mutex<Vec<PathBuf>>,
    }

    impl StubEngine {
        pub(crate) fn returning(outputs: &[f32]) -> Self {
            Self {
                outputs: outputs.to_vec(),
                ..Default::default()
            }
        }
    }

    impl InferenceEngine for StubEngine {
        fn infer(&self, model: &Path, input: &[f32]) -> Result<Vec<f32>, InferenceError> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_path_buf(), input.to_vec()));
            if self.fail {
                return Err(InferenceError::ModelNotFound(model.to_path_buf()));
            }
            Ok(self.outputs.clone())
        }

        fn evict(&self, model: &Path) {
            self.evicted.lock().unwrap().push(model.to_path_buf());
        }
    }

    #[test]
    fn test_run_uses_task_model_and_encoder() {
        let engine = Arc::new(StubEngine::returning(&[0.3, 0.7]));
        let service = PredictionService::new(Arc::clone(&engine), "models");
        let state = SurveyState::default();

        let result = service.run(PredictionTask::HeartDisease, &state).unwrap();
        assert_eq!(result.verdict, Some(1));
        assert_eq!(result.verdict_label(), Some("High Risk"));

        let calls = engine.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Path::new("models").join("heart_disease_model.onnx"));
        assert_eq!(calls[0].1, PredictionTask::HeartDisease.encode(&state));
    }

    #[test]
    fn test_percentages_are_scaled_and_floored() {
        let engine = Arc::new(StubEngine::returning(&[-0.1, 0.6, 0.5]));
        let service = PredictionService::new(engine, "models");
        let result = service
            .run(PredictionTask::DiabetesLikelihood, &SurveyState::default())
            .unwrap();
        assert_eq!(result.percentages[0], 0.0);
        assert!((result.percentages[1] - 60.0).abs() < 1e-4);
        assert_eq!(result.verdict_label(), Some("Prediabetes"));
        assert!(result.advice().is_some());
    }

    #[test]
    fn test_output_length_mismatch_is_error() {
        let engine = Arc::new(StubEngine::returning(&[0.5, 0.5]));
        let service = PredictionService::new(engine, "models");
        let err = service
            .run(PredictionTask::ObesityLikelihood, &SurveyState::default())
            .unwrap_err();
        assert!(matches!(
            err,
            InferenceError::OutputShape {
                expected: 7,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_engine_error_is_propagated() {
        let engine = Arc::new(StubEngine {
            fail: true,
            ..Default::default()
        });
        let service = PredictionService::new(engine, "models");
        let err = service
            .run(PredictionTask::MaternalHealthRisk, &SurveyState::default())
            .unwrap_err();
        assert!(matches!(err, InferenceError::ModelNotFound(_)));
    }

    #[test]
    fn test_reload_evicts_task_model() {
        let engine = Arc::new(StubEngine::default());
        let service = PredictionService::new(Arc::clone(&engine), "models");
        assert_eq!(service.model_dir(), Path::new("models"));
        service.reload(PredictionTask::DiabetesLikelihood);
        assert_eq!(
            *engine.evicted.lock().unwrap(),
            vec![Path::new("models").join("diabetes_likelihood_model.onnx")]
        );
        assert!(engine.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_missing_models_in_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let service = PredictionService::new(Arc::new(StubEngine::default()), dir.path());
        assert_eq!(service.missing_models().len(), 4);

        std::fs::write(dir.path().join("diabetes_likelihood_model.onnx"), b"x").unwrap();
        assert_eq!(service.missing_models().len(), 3);
    }
}
