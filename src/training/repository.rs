//! Training persistence
//!
//! Saving is persist-then-publish: events go out only after the new state
//! is in the log and the index. A failing subscriber never rolls the state
//! back; the failure is reported to the caller instead.

use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

use crate::event_bus::{BusError, EventBus};
use crate::log_store::{LogStore, LogStoreConfig, LogStoreError, LogStoreResult, Record};
use crate::questions::ProviderError;
use crate::types::{QuestionId, Training, TrainingEvent, TrainingId};

impl Record for Training {
    type Id = TrainingId;

    fn record_id(&self) -> TrainingId {
        self.id
    }
}

/// Errors of training operations
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("training {0} not found")]
    NotFound(TrainingId),

    #[error("no next challenge: {0}")]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] LogStoreError),

    /// The training is saved, but a subscriber failed to handle an event
    #[error("training saved, but event delivery failed: {0}")]
    EventDelivery(#[source] BusError),
}

/// Trainings over a log store, publishing their events on the bus
#[derive(Clone)]
pub struct TrainingRepository {
    store: LogStore<Training>,
    bus: EventBus,
}

impl TrainingRepository {
    pub fn open<P: AsRef<Path>>(
        path: P,
        config: LogStoreConfig,
        bus: EventBus,
    ) -> LogStoreResult<Self> {
        let store = LogStore::open_with(path, &[] as &[&Path], config)?;
        Ok(Self::with_store(store, bus))
    }

    pub fn with_store(store: LogStore<Training>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    /// Persist `training`, then publish `events` in order.
    ///
    /// Every event is attempted even if an earlier one failed to deliver;
    /// the first delivery failure is returned.
    pub fn save(
        &self,
        training: Training,
        events: &[TrainingEvent],
    ) -> Result<Training, TrainingError> {
        let saved = self.store.save(training)?;

        let mut first_failure = None;
        for event in events {
            match event.publish(&self.bus) {
                Ok(delivered) => {
                    debug!(training_id = %saved.id, topic = event.topic(), delivered, "event published");
                }
                Err(err) => {
                    warn!(
                        training_id = %saved.id,
                        topic = event.topic(),
                        error = %err,
                        "event delivery failed"
                    );
                    first_failure.get_or_insert(err);
                }
            }
        }

        match first_failure {
            Some(err) => Err(TrainingError::EventDelivery(err)),
            None => Ok(saved),
        }
    }

    pub fn get(&self, id: TrainingId) -> Option<Training> {
        self.store.get(&id)
    }

    /// Every training, newest first
    pub fn all(&self) -> Vec<Training> {
        let mut trainings = self.store.find_all(|_| true);
        trainings.sort_by(|a, b| b.created().cmp(&a.created()).then(a.id().cmp(&b.id())));
        trainings
    }

    /// Trainings that ever drew the question `question_id`
    pub fn containing_challenge(&self, question_id: QuestionId) -> Vec<Training> {
        self.store.find_all(|t| t.contains_challenge(question_id))
    }

    pub fn count(&self) -> usize {
        self.store.count_all()
    }

    pub fn store(&self) -> &LogStore<Training> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::{HandlerResult, WILDCARD};
    use crate::types::{Challenge, TrainingCreated};
    use chrono::Utc;
    use parking_lot::Mutex;
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn provider(_: &BTreeSet<QuestionId>) -> Result<Challenge, ProviderError> {
        Ok(Challenge::new(Uuid::new_v4(), [Uuid::new_v4()]))
    }

    fn repo(dir: &TempDir, bus: EventBus) -> TrainingRepository {
        TrainingRepository::open(
            dir.path().join("trainings.log"),
            LogStoreConfig::without_compaction(),
            bus,
        )
        .unwrap()
    }

    #[test]
    fn test_events_are_published_after_the_state_is_indexed() {
        let dir = TempDir::new().unwrap();
        let bus = EventBus::new();
        let repo = repo(&dir, bus.clone());

        // The subscriber looks the training up while handling the event
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (s, lookup) = (Arc::clone(&seen), repo.clone());
        bus.subscribe_event(move |e: TrainingCreated| -> HandlerResult {
            s.lock().push(lookup.get(e.training_id).is_some());
            Ok(())
        });

        let t = Training::start(&provider, Utc::now()).unwrap();
        repo.save(t.training, &t.events).unwrap();

        assert_eq!(*seen.lock(), vec![true]);
    }

    #[test]
    fn test_delivery_failure_keeps_saved_state() {
        let dir = TempDir::new().unwrap();
        let bus = EventBus::new();
        bus.subscribe_raw(WILDCARD, |_| Err("subscriber down".into()));
        let repo = repo(&dir, bus);

        let t = Training::start(&provider, Utc::now()).unwrap();
        let id = t.training.id();
        let err = repo.save(t.training, &t.events).unwrap_err();

        assert!(matches!(err, TrainingError::EventDelivery(_)));
        assert!(repo.get(id).is_some());
    }

    #[test]
    fn test_trainings_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let now = Utc::now();
        let id = {
            let repo = repo(&dir, EventBus::new());
            let t = Training::start(&provider, now).unwrap();
            let saved = repo.save(t.training, &t.events).unwrap();
            let key: Vec<_> = saved.current_challenge().answer_ids.iter().copied().collect();
            let next = saved.next(&key, &provider, now).unwrap();
            repo.save(next.training, &next.events).unwrap().id()
        };

        let repo = repo(&dir, EventBus::new());
        let training = repo.get(id).unwrap();
        assert_eq!(training.challenges().len(), 2);
        assert_eq!(training.stats().passed, 1);
        assert_eq!(repo.count(), 1);
    }
}
