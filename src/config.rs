//! Trainer configuration from environment variables
//!
//! Environment:
//! - DATA_DIR: directory of the data files (optional, default `data/`)
//! - QUESTION_SEED_FILES: read-only question files replayed before the
//!   bank, in the platform's path-list format (optional)
//! - COMPACTION_THRESHOLD: writes between automatic compactions, 0 disables
//!   (optional, default 1000)
//! - SYNC_WRITES: fsync after every append, `true` or `false` (optional,
//!   default true)

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::log_store::LogStoreConfig;

pub const DEFAULT_DATA_DIR: &str = "data/";

const QUESTIONS_FILE: &str = "question.data";
const TRAININGS_FILE: &str = "trainings.data";
const HISTORY_FILE: &str = "history.data";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct TrainerConfig {
    pub data_dir: PathBuf,
    pub question_seed_files: Vec<PathBuf>,
    pub log_store: LogStoreConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl TrainerConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            question_seed_files: Vec::new(),
            log_store: LogStoreConfig::default(),
        }
    }

    pub fn with_seed_files<I, P>(mut self, seeds: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.question_seed_files = seeds.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_log_store(mut self, log_store: LogStoreConfig) -> Self {
        self.log_store = log_store;
        self
    }

    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var_os(key).map(|v| v.to_string_lossy().into_owned()))
    }

    /// Load from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new(lookup("DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()));

        if let Some(seeds) = lookup("QUESTION_SEED_FILES") {
            config.question_seed_files = env::split_paths(&seeds)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }

        if let Some(value) = lookup("COMPACTION_THRESHOLD") {
            let threshold = value.trim().parse::<usize>().map_err(|_| ConfigError::Invalid {
                key: "COMPACTION_THRESHOLD",
                expected: "a non-negative integer",
                value: value.clone(),
            })?;
            config.log_store = config.log_store.with_compaction_threshold(threshold);
        }

        if let Some(value) = lookup("SYNC_WRITES") {
            let sync = match value.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "SYNC_WRITES",
                        expected: "true or false",
                        value,
                    })
                }
            };
            config.log_store = config.log_store.with_sync_writes(sync);
        }

        Ok(config)
    }

    pub fn questions_path(&self) -> PathBuf {
        self.data_dir.join(QUESTIONS_FILE)
    }

    pub fn trainings_path(&self) -> PathBuf {
        self.data_dir.join(TRAININGS_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_FILE)
    }
}
