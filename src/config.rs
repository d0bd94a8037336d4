//! Runtime configuration read from `VITALCHECK_*` environment variables.

use std::path::PathBuf;

use crate::VitalcheckError;

pub const MODEL_DIR_ENV: &str = "VITALCHECK_MODEL_DIR";
pub const LOG_MODE_ENV: &str = "VITALCHECK_LOG_MODE";
pub const LOG_FILE_ENV: &str = "VITALCHECK_LOG_FILE";
pub const REQUIRE_MANIFEST_ENV: &str = "VITALCHECK_REQUIRE_MANIFEST";

const DEFAULT_MODEL_DIR: &str = "models";
const DEFAULT_LOG_FILE: &str = "vitalcheck.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File on an interactive terminal, stdout otherwise.
    #[default]
    Auto,
    File,
    Stdout,
}

impl LogMode {
    /// Resolve `Auto` against whether stdout is a terminal.
    #[must_use]
    pub fn use_file(self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

impl std::str::FromStr for LogMode {
    type Err = VitalcheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "file" => Ok(Self::File),
            "stdout" => Ok(Self::Stdout),
            other => Err(VitalcheckError::Config(format!(
                "{LOG_MODE_ENV} must be auto, file or stdout (got {other:?})"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the four model files and an optional manifest.
    pub model_dir: PathBuf,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    /// Refuse to load models from a directory without `manifest.json`.
    pub require_manifest: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            require_manifest: false,
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "YES")
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `VitalcheckError::Config` for an unknown log mode.
    pub fn from_env() -> crate::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, unset keys take defaults.
    ///
    /// # Errors
    /// Returns `VitalcheckError::Config` for an unknown log mode.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let log_mode = match lookup(LOG_MODE_ENV) {
            Some(v) => v.parse()?,
            None => defaults.log_mode,
        };

        Ok(Self {
            model_dir: lookup(MODEL_DIR_ENV)
                .filter(|v| !v.trim().is_empty())
                .map_or(defaults.model_dir, PathBuf::from),
            log_mode,
            log_file: lookup(LOG_FILE_ENV)
                .filter(|v| !v.trim().is_empty())
                .map_or(defaults.log_file, PathBuf::from),
            require_manifest: lookup(REQUIRE_MANIFEST_ENV)
                .is_some_and(|v| parse_bool(&v)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.model_dir, PathBuf::from("models"));
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (MODEL_DIR_ENV, "/opt/vitalcheck/models"),
            (LOG_MODE_ENV, "Stdout"),
            (LOG_FILE_ENV, "/tmp/v.log"),
            (REQUIRE_MANIFEST_ENV, "yes"),
        ]))
        .unwrap();
        assert_eq!(config.model_dir, PathBuf::from("/opt/vitalcheck/models"));
        assert_eq!(config.log_mode, LogMode::Stdout);
        assert_eq!(config.log_file, PathBuf::from("/tmp/v.log"));
        assert!(config.require_manifest);
    }

    #[test]
    fn test_unknown_log_mode_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[(LOG_MODE_ENV, "syslog")])).unwrap_err();
        assert!(matches!(err, VitalcheckError::Config(_)));
        assert!(err.to_string().starts_with("Invalid configuration: VITALCHECK_LOG_MODE"));
    }

    #[test]
    fn test_log_mode_resolution() {
        assert!(LogMode::Auto.use_file(true));
        assert!(!LogMode::Auto.use_file(false));
        assert!(LogMode::File.use_file(false));
        assert!(!LogMode::Stdout.use_file(true));
    }
}
