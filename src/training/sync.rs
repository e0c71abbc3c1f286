//! Keeps trainings in line with edited questions
//!
//! When a question's answer key changes, every training that drew the
//! question gets the new key and loses its progress on that challenge.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::repository::{TrainingError, TrainingRepository};
use crate::event_bus::EventBus;
use crate::log_store::LogStore;
use crate::types::{OptionId, QuestionUpdated, Training};

/// Subscribe the trainings to `question.updated`.
///
/// The handler holds only the training store, not the repository, so the
/// bus does not keep a reference to itself.
pub fn subscribe_question_updates(bus: &EventBus, trainings: &TrainingRepository) {
    let store = trainings.store().clone();
    bus.subscribe_event(move |event: QuestionUpdated| -> Result<(), TrainingError> {
        apply_question_update(&store, &event, Utc::now()).map(|_| ())
    });
}

/// Apply an answer key change to all affected trainings.
///
/// Every affected training is attempted; returns how many were saved, or
/// the first save error.
pub fn apply_question_update(
    store: &LogStore<Training>,
    event: &QuestionUpdated,
    now: DateTime<Utc>,
) -> Result<usize, TrainingError> {
    let answer_ids: BTreeSet<OptionId> = event.answer_ids.iter().copied().collect();
    let affected = store.find_all(|t| t.contains_challenge(event.question_id));

    let mut saved = 0;
    let mut first_error = None;
    for mut training in affected {
        if !training.update_challenge_answer(event.question_id, &answer_ids, now) {
            continue;
        }
        let training_id = training.id();
        match store.save(training) {
            Ok(_) => saved += 1,
            Err(err) => {
                warn!(
                    training_id = %training_id,
                    question_id = %event.question_id,
                    error = %err,
                    "failed to save invalidated training"
                );
                first_error.get_or_insert(err);
            }
        }
    }

    info!(
        question_id = %event.question_id,
        trainings = saved,
        "trainings synced with edited question"
    );
    match first_error {
        Some(err) => Err(err.into()),
        None => Ok(saved),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_store::LogStoreConfig;
    use crate::questions::ProviderError;
    use crate::types::{Challenge, Level, QuestionId};
    use parking_lot::Mutex;
    use tempfile::TempDir;
    use uuid::Uuid;

    #[test]
    fn test_every_affected_training_is_updated() {
        let dir = TempDir::new().unwrap();
        let bus = EventBus::new();
        let repo = TrainingRepository::open(
            dir.path().join("trainings.log"),
            LogStoreConfig::without_compaction(),
            bus.clone(),
        )
        .unwrap();
        subscribe_question_updates(&bus, &repo);

        let shared = Challenge::new(Uuid::new_v4(), [Uuid::new_v4()]);
        let now = Utc::now();
        let mut ids = Vec::new();
        for _ in 0..3 {
            // each training draws the shared question first, then fresh ones
            let fresh = Challenge::new(Uuid::new_v4(), [Uuid::new_v4()]);
            let queue = Mutex::new(vec![fresh, shared.clone()]);
            let provider = |_: &BTreeSet<QuestionId>| -> Result<Challenge, ProviderError> {
                queue.lock().pop().ok_or(ProviderError::Exhausted { excluded: 0 })
            };
            let t = Training::start(&provider, now).unwrap();
            let key: Vec<_> = shared.answer_ids.iter().copied().collect();
            let next = t.training.next(&key, &provider, now).unwrap();
            ids.push(repo.save(next.training, &next.events).unwrap().id());
        }
        let unrelated = {
            let provider = |_: &BTreeSet<QuestionId>| -> Result<Challenge, ProviderError> {
                Ok(Challenge::new(Uuid::new_v4(), [Uuid::new_v4()]))
            };
            let t = Training::start(&provider, now).unwrap();
            repo.save(t.training, &t.events).unwrap()
        };

        let new_key = vec![Uuid::new_v4(), Uuid::new_v4()];
        bus.publish_event(&QuestionUpdated {
            question_id: shared.id,
            answer_ids: new_key.clone(),
        })
        .unwrap();

        for id in ids {
            let training = repo.get(id).unwrap();
            let challenge = training.challenges().iter().find(|c| c.id == shared.id).unwrap();
            assert_eq!(challenge.level, Level::NEW);
            assert_eq!(challenge.answer_ids, new_key.iter().copied().collect::<BTreeSet<_>>());
            assert_eq!(challenge.attempts, 1);
        }
        assert_eq!(repo.get(unrelated.id()), Some(unrelated));
    }
}
