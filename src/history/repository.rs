//! History persistence

use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::log_store::{LogStore, LogStoreConfig, LogStoreError, LogStoreResult, Record};
use crate::types::{History, HistoryId, TrainingUpdated};

impl Record for History {
    type Id = HistoryId;

    fn record_id(&self) -> HistoryId {
        self.id
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error(transparent)]
    Store(#[from] LogStoreError),
}

/// Histories over a log store
#[derive(Clone)]
pub struct HistoryRepository {
    store: LogStore<History>,
}

impl HistoryRepository {
    pub fn open<P: AsRef<Path>>(path: P, config: LogStoreConfig) -> LogStoreResult<Self> {
        let store = LogStore::open_with(path, &[] as &[&Path], config)?;
        Ok(Self { store })
    }

    pub fn get(&self, id: HistoryId) -> Option<History> {
        self.store.get(&id)
    }

    /// Start an empty history for a new training. An existing one is kept.
    pub fn create(&self, id: HistoryId) -> Result<History, HistoryError> {
        if let Some(existing) = self.get(id) {
            debug!(history_id = %id, "history already exists");
            return Ok(existing);
        }
        Ok(self.store.save(History::new(id))?)
    }

    /// Record an answer; a passing answer finalizes the round.
    ///
    /// A missing history is created on the spot, so the first event of a
    /// training whose `training.created` was never handled is not lost.
    pub fn record(&self, event: &TrainingUpdated) -> Result<History, HistoryError> {
        let mut history = self.get(event.training_id).unwrap_or_else(|| {
            warn!(history_id = %event.training_id, "history missing, creating it");
            History::new(event.training_id)
        });

        history.add_answer(event.answer_ids.clone());
        if event.passed {
            history.finalize(event.challenge_id, event.answer_ids.clone());
        }
        Ok(self.store.save(history)?)
    }

    pub fn count(&self) -> usize {
        self.store.count_all()
    }

    pub fn store(&self) -> &LogStore<History> {
        &self.store
    }
}
