//! Runtime configuration for front ends embedding the core.
//!
//! # Responsibility
//! - Resolve database, documents and log locations from platform defaults.
//! - Apply `NOTEPAD_*` environment overrides.
//!
//! # Invariants
//! - A validated config always has an absolute log directory and a known
//!   log level.

use crate::logging::{default_log_level, normalize_level, normalize_log_dir, LoggingConfig};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB: &str = "NOTEPAD_DB";
pub const ENV_DOCUMENTS_DIR: &str = "NOTEPAD_DOCUMENTS_DIR";
pub const ENV_LOG_DIR: &str = "NOTEPAD_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "NOTEPAD_LOG_LEVEL";

const APP_DIR_NAME: &str = "notepad";
const DB_FILE_NAME: &str = "notes.sqlite3";
const LOG_DIR_NAME: &str = "logs";
const DOCUMENTS_DIR_NAME: &str = "Documents";

/// Resolved locations and levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotepadConfig {
    pub db_path: PathBuf,
    /// Target directory of plain-text exports.
    pub documents_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No platform data directory and no override.
    NoDataDir,
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDataDir => write!(
                f,
                "cannot determine a data directory; set {ENV_DB} and {ENV_LOG_DIR}"
            ),
            Self::Invalid(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl Error for ConfigError {}

impl NotepadConfig {
    /// Resolves defaults plus process environment overrides.
    pub fn resolve() -> Result<Self, ConfigError> {
        Self::resolve_with(|key| std::env::var(key).ok())
    }

    /// Resolves defaults plus overrides looked up through `env`.
    pub fn resolve_with<F>(env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|value| !value.trim().is_empty());
        let app_dir = dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME));

        let db_path = match lookup(ENV_DB) {
            Some(value) => PathBuf::from(value),
            None => app_dir
                .as_ref()
                .map(|dir| dir.join(DB_FILE_NAME))
                .ok_or(ConfigError::NoDataDir)?,
        };
        let log_dir = match lookup(ENV_LOG_DIR) {
            Some(value) => PathBuf::from(value),
            None => app_dir
                .as_ref()
                .map(|dir| dir.join(LOG_DIR_NAME))
                .ok_or(ConfigError::NoDataDir)?,
        };
        let documents_dir = lookup(ENV_DOCUMENTS_DIR)
            .map(PathBuf::from)
            .or_else(dirs::document_dir)
            .or_else(|| dirs::home_dir().map(|home| home.join(DOCUMENTS_DIR_NAME)))
            .or_else(|| app_dir.as_ref().map(|dir| dir.join(DOCUMENTS_DIR_NAME)))
            .ok_or(ConfigError::NoDataDir)?;
        let log_level = lookup(ENV_LOG_LEVEL).unwrap_or_else(|| default_log_level().to_string());

        let config = Self {
            db_path,
            documents_dir,
            log_dir,
            log_level,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks log level and log directory.
    pub fn validate(&self) -> Result<(), ConfigError> {
        normalize_level(&self.log_level).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        normalize_log_dir(&self.log_dir).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Logging settings derived from this config.
    pub fn logging(&self, echo_warnings: bool) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            log_dir: self.log_dir.clone(),
            echo_warnings,
        }
    }
}
