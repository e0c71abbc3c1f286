//! Bus wiring for histories

use tracing::debug;

use super::{HistoryError, HistoryRepository};
use crate::event_bus::EventBus;
use crate::types::{TrainingCreated, TrainingUpdated};

/// Subscribe `histories` to the training topics
pub fn subscribe_training_events(bus: &EventBus, histories: &HistoryRepository) {
    let repo = histories.clone();
    bus.subscribe_event(move |event: TrainingCreated| -> Result<(), HistoryError> {
        debug!(training_id = %event.training_id, "opening history");
        repo.create(event.training_id).map(|_| ())
    });

    let repo = histories.clone();
    bus.subscribe_event(move |event: TrainingUpdated| -> Result<(), HistoryError> {
        debug!(training_id = %event.training_id, passed = event.passed, "recording answer");
        repo.record(&event).map(|_| ())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_store::LogStoreConfig;
    use tempfile::TempDir;
    use uuid::Uuid;

    #[test]
    fn test_history_follows_training_events() {
        let dir = TempDir::new().unwrap();
        let bus = EventBus::new();
        let histories = HistoryRepository::open(
            dir.path().join("history.log"),
            LogStoreConfig::without_compaction(),
        )
        .unwrap();
        subscribe_training_events(&bus, &histories);

        let (training_id, challenge_id) = (Uuid::new_v4(), Uuid::new_v4());
        bus.publish_event(&TrainingCreated { training_id }).unwrap();
        assert!(histories.get(training_id).unwrap().is_empty());

        bus.publish_event(&TrainingUpdated {
            training_id,
            challenge_id,
            answer_ids: vec![Uuid::new_v4()],
            passed: true,
        })
        .unwrap();

        let history = histories.get(training_id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.item_at(0).unwrap().challenge_id, challenge_id);
    }
}
