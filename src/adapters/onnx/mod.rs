//! ONNX Runtime adapter.
//!
//! Implements `InferenceEngine` on top of the `ort` crate. Sessions are built
//! on first use and cached per model path. When the model directory carries a
//! `manifest.json`, every model is checked against its SHA-256 digest before
//! a session is built.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ort::execution_providers::CPUExecutionProvider;
use ort::session::Session;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ports::{InferenceEngine, InferenceError};

/// File name of the digest manifest inside a model directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Only manifest version understood by this build.
pub const MANIFEST_VERSION: u32 = 1;

/// Digest manifest written by the `hash_models` binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub version: u32,
    /// Model file name to lowercase SHA-256 hex digest.
    pub files: BTreeMap<String, String>,
}

impl ModelManifest {
    /// Read `manifest.json` from `dir`, `Ok(None)` when there is none.
    ///
    /// # Errors
    /// Returns `InferenceError::Manifest` for unreadable or malformed files.
    pub fn load(dir: &Path) -> Result<Option<Self>, InferenceError> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read(&path)?;
        let manifest: Self = serde_json::from_slice(&content)
            .map_err(|e| InferenceError::Manifest(format!("Invalid {MANIFEST_FILE}: {e}")))?;
        if manifest.version != MANIFEST_VERSION {
            return Err(InferenceError::Manifest(format!(
                "Unsupported manifest version: {}",
                manifest.version
            )));
        }
        Ok(Some(manifest))
    }

    /// Check `bytes` against the digest recorded for `file`.
    ///
    /// # Errors
    /// Returns `NotInManifest` or `DigestMismatch`.
    pub fn verify(&self, file: &str, bytes: &[u8]) -> Result<(), InferenceError> {
        let expected = self
            .files
            .get(file)
            .ok_or_else(|| InferenceError::NotInManifest {
                file: file.to_string(),
            })?;
        let actual = sha256_hex(bytes);
        if !constant_time_eq_str(&actual, &expected.to_ascii_lowercase()) {
            return Err(InferenceError::DigestMismatch {
                file: file.to_string(),
                expected: expected.clone(),
                actual,
            });
        }
        Ok(())
    }
}

/// Lowercase hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// Constant-time compare for ASCII hex digests.
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

type SharedSession = Arc<Mutex<Session>>;

/// ONNX Runtime engine with a per-path session cache.
pub struct OnnxEngine {
    require_manifest: bool,
    sessions: Mutex<HashMap<PathBuf, SharedSession>>,
}

impl std::fmt::Debug for OnnxEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEngine")
            .field("require_manifest", &self.require_manifest)
            .field("cached_sessions", &self.cached_sessions())
            .finish()
    }
}

impl OnnxEngine {
    /// Create an engine. With `require_manifest`, models in a directory
    /// without `manifest.json` are refused.
    #[must_use]
    pub fn new(require_manifest: bool) -> Self {
        Self {
            require_manifest,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Number of loaded sessions held in the cache.
    #[must_use]
    pub fn cached_sessions(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Read and verify the model bytes at `path`.
    fn read_verified(&self, path: &Path) -> Result<Vec<u8>, InferenceError> {
        if !path.exists() {
            return Err(InferenceError::ModelNotFound(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let file = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| InferenceError::ModelNotFound(path.to_path_buf()))?;

        match ModelManifest::load(dir)? {
            Some(manifest) => {
                manifest.verify(file, &bytes)?;
                tracing::debug!(model = file, "Model digest verified");
            }
            None if self.require_manifest => {
                return Err(InferenceError::Manifest(format!(
                    "{MANIFEST_FILE} is required but missing in {}",
                    dir.display()
                )));
            }
            None => {
                tracing::warn!(model = file, "No model manifest found; integrity not verified");
            }
        }
        Ok(bytes)
    }

    fn build_session(bytes: &[u8]) -> Result<Session, InferenceError> {
        Session::builder()
            .map_err(|e| InferenceError::Session(format!("Session builder error: {e}")))?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .map_err(|e| InferenceError::Session(format!("Provider error: {e}")))?
            .commit_from_memory(bytes)
            .map_err(|e| InferenceError::Session(format!("Failed to load ONNX model: {e}")))
    }

    /// Cached session for `path`, building it on first use.
    fn session(&self, path: &Path) -> Result<SharedSession, InferenceError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| InferenceError::Runtime("Session cache lock poisoned".into()))?;

        if let Some(session) = sessions.get(path) {
            return Ok(Arc::clone(session));
        }

        let bytes = self.read_verified(path)?;
        let session = Arc::new(Mutex::new(Self::build_session(&bytes)?));
        tracing::info!(model = %path.display(), "Model session loaded");
        sessions.insert(path.to_path_buf(), Arc::clone(&session));
        Ok(session)
    }
}

impl Default for OnnxEngine {
    fn default() -> Self {
        Self::new(false)
    }
}

impl InferenceEngine for OnnxEngine {
    fn infer(&self, model: &Path, input: &[f32]) -> Result<Vec<f32>, InferenceError> {
        let shared = self.session(model)?;
        let mut session = shared
            .lock()
            .map_err(|_| InferenceError::Runtime("Session lock poisoned".into()))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| InferenceError::Runtime("Model has no inputs".into()))?;
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| InferenceError::Runtime("Model has no outputs".into()))?;

        let tensor = ort::value::Tensor::from_array((vec![1, input.len()], input.to_vec()))
            .map_err(|e| InferenceError::Runtime(format!("Failed to create input tensor: {e}")))?;

        let outputs = session
            .run(ort::inputs![input_name.as_str() => tensor])
            .map_err(|e| InferenceError::Runtime(format!("ONNX inference failed: {e}")))?;

        let output = outputs
            .get(output_name.as_str())
            .ok_or_else(|| InferenceError::Runtime(format!("Output '{output_name}' not found")))?;

        let (_shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Runtime(format!("Failed to extract tensor: {e}")))?;

        Ok(data.to_vec())
    }

    fn evict(&self, model: &Path) {
        if let Ok(mut sessions) = self.sessions.lock() {
            if sessions.remove(model).is_some() {
                tracing::debug!(model = %model.display(), "Model session evicted");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(dir: &Path, manifest: &ModelManifest) {
        let json = serde_json::to_vec_pretty(manifest).unwrap();
        fs::write(dir.join(MANIFEST_FILE), json).unwrap();
    }

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq_str("abc", "abc"));
        assert!(!constant_time_eq_str("abc", "abd"));
        assert!(!constant_time_eq_str("abc", "ab"));
    }

    #[test]
    fn test_missing_model_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let engine = OnnxEngine::default();
        let err = engine
            .infer(&dir.path().join("heart_disease_model.onnx"), &[0.0; 14])
            .unwrap_err();
        assert!(matches!(err, InferenceError::ModelNotFound(_)));
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("heart_disease_model.onnx");
        fs::write(&model, b"bytes").unwrap();
        let mut files = BTreeMap::new();
        files.insert("heart_disease_model.onnx".to_string(), sha256_hex(b"other"));
        write_manifest(
            dir.path(),
            &ModelManifest {
                version: MANIFEST_VERSION,
                files,
            },
        );

        let engine = OnnxEngine::default();
        assert!(engine.infer(&model, &[0.0; 14]).is_err());
        assert_eq!(engine.cached_sessions(), 0);

        engine.evict(&model);
        assert_eq!(engine.cached_sessions(), 0);
        assert!(matches!(
            engine.infer(&model, &[0.0; 14]).unwrap_err(),
            InferenceError::DigestMismatch { .. }
        ));
    }

    #[test]
    fn test_manifest_absent_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ModelManifest::load(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_manifest_rejects_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = ModelManifest {
            version: 7,
            files: BTreeMap::new(),
        };
        write_manifest(dir.path(), &manifest);
        let err = ModelManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, InferenceError::Manifest(_)));
    }

    #[test]
    fn test_digest_mismatch_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("obesity_likelihood_model.onnx");
        fs::write(&model, b"tampered bytes").unwrap();

        let mut files = BTreeMap::new();
        files.insert(
            "obesity_likelihood_model.onnx".to_string(),
            sha256_hex(b"original bytes"),
        );
        write_manifest(
            dir.path(),
            &ModelManifest {
                version: MANIFEST_VERSION,
                files,
            },
        );

        let engine = OnnxEngine::default();
        let err = engine.infer(&model, &[0.0; 24]).unwrap_err();
        assert!(matches!(err, InferenceError::DigestMismatch { .. }));
    }

    #[test]
    fn test_unlisted_model_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("diabetes_likelihood_model.onnx");
        fs::write(&model, b"bytes").unwrap();
        write_manifest(
            dir.path(),
            &ModelManifest {
                version: MANIFEST_VERSION,
                files: BTreeMap::new(),
            },
        );

        let err = OnnxEngine::default().infer(&model, &[0.0; 32]).unwrap_err();
        assert!(matches!(err, InferenceError::NotInManifest { .. }));
    }

    #[test]
    fn test_required_manifest_missing() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("maternal_health_risk_model.onnx");
        fs::write(&model, b"bytes").unwrap();

        let err = OnnxEngine::new(true).infer(&model, &[0.0; 6]).unwrap_err();
        assert!(matches!(err, InferenceError::Manifest(_)));
    }

    #[test]
    fn test_verify_accepts_matching_digest() {
        let mut files = BTreeMap::new();
        files.insert("m.onnx".to_string(), sha256_hex(b"model").to_uppercase());
        let manifest = ModelManifest {
            version: MANIFEST_VERSION,
            files,
        };
        assert!(manifest.verify("m.onnx", b"model").is_ok());
    }
}
