//! Question bank
//!
//! `QuestionRepository` keeps questions in a [`LogStore`], validates edits,
//! publishes `question.updated` when an answer key changes, and hands out
//! random challenges to trainings.

mod crud;
pub mod predicates;
mod provider;

use std::path::Path;

use thiserror::Error;

use crate::event_bus::{BusError, EventBus};
use crate::log_store::{LogStore, LogStoreConfig, LogStoreError, LogStoreResult, Record};
use crate::types::{OptionId, Question, QuestionId, ValidationError};

pub use provider::{ChallengeProvider, ProviderError};

impl Record for Question {
    type Id = QuestionId;

    fn record_id(&self) -> QuestionId {
        self.id
    }
}

/// Errors of question bank operations
#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("question {0} not found")]
    NotFound(QuestionId),

    #[error("invalid question: {0}")]
    Validation(#[from] ValidationError),

    #[error("option {0} already belongs to another question")]
    ForeignOption(OptionId),

    #[error(transparent)]
    Store(#[from] LogStoreError),

    /// The edit is saved, but a subscriber failed to handle it
    #[error("question saved, but event delivery failed: {0}")]
    EventDelivery(#[source] BusError),
}

/// Question bank over a log store
#[derive(Clone)]
pub struct QuestionRepository {
    pub(crate) store: LogStore<Question>,
    pub(crate) bus: EventBus,
}

impl QuestionRepository {
    /// Open the bank at `path`, replaying `seeds` (bundled question sets)
    /// before the bank's own file.
    pub fn open<P, S>(
        path: P,
        seeds: &[S],
        config: LogStoreConfig,
        bus: EventBus,
    ) -> LogStoreResult<Self>
    where
        P: AsRef<Path>,
        S: AsRef<Path>,
    {
        let store = LogStore::open_with(path, seeds, config)?;
        Ok(Self::with_store(store, bus))
    }

    pub fn with_store(store: LogStore<Question>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    /// The underlying store, for stats and maintenance
    pub fn store(&self) -> &LogStore<Question> {
        &self.store
    }
}

impl std::fmt::Debug for QuestionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionRepository")
            .field("path", &self.store.path())
            .field("questions", &self.store.count_all())
            .finish()
    }
}
