//! Runtime configuration and logging setup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::models::{AssessmentPolicy, Program};

pub const DEFAULT_LOG_FILTER: &str = "wellspace_core=info";

pub const ENV_DB_PATH: &str = "WELLSPACE_DB_PATH";
pub const ENV_BLOB_DIR: &str = "WELLSPACE_BLOB_DIR";
pub const ENV_PROGRAM: &str = "WELLSPACE_PROGRAM";
pub const ENV_QOL_POLICY: &str = "WELLSPACE_QOL_POLICY";
pub const ENV_LOG: &str = "WELLSPACE_LOG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Host configuration for one core handle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WellspaceConfig {
    /// SQLite file; in-memory when unset.
    pub db_path: Option<PathBuf>,
    /// Root directory for uploaded medical record files.
    pub blob_dir: Option<PathBuf>,
    pub program: Program,
    /// Overrides the program's assessment write policy.
    pub qol_policy: Option<AssessmentPolicy>,
    pub log_filter: String,
}

impl Default for WellspaceConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            blob_dir: None,
            program: Program::Generic,
            qol_policy: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl WellspaceConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Read `WELLSPACE_*` variables over the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_DB_PATH) {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = get(ENV_BLOB_DIR) {
            config.blob_dir = Some(PathBuf::from(dir));
        }
        if let Some(value) = get(ENV_PROGRAM) {
            config.program = Program::parse(&value).ok_or_else(|| invalid(ENV_PROGRAM, &value))?;
        }
        if let Some(value) = get(ENV_QOL_POLICY) {
            config.qol_policy = Some(
                AssessmentPolicy::parse(&value).ok_or_else(|| invalid(ENV_QOL_POLICY, &value))?,
            );
        }
        if let Some(filter) = get(ENV_LOG) {
            config.log_filter = filter;
        }
        Ok(config)
    }

    /// Policy in effect: the override if set, else the program's own.
    pub fn assessment_policy(&self) -> AssessmentPolicy {
        self.qol_policy
            .unwrap_or(self.program.schema().assessment_policy)
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `filter`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(filter: &str) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .try_init();
    if result.is_ok() {
        tracing::info!("Wellspace core v{}", env!("CARGO_PKG_VERSION"));
    }
}
