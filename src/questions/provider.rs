//! Source of fresh challenges for trainings

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::debug;

use super::predicates;
use super::QuestionRepository;
use crate::types::{Challenge, QuestionId};

/// Why no challenge could be drawn
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("no question left to draw ({excluded} already drawn)")]
    Exhausted { excluded: usize },
}

/// Draws a challenge whose id is not in `excluded`
pub trait ChallengeProvider {
    fn next_challenge(&self, excluded: &BTreeSet<QuestionId>) -> Result<Challenge, ProviderError>;
}

impl<F> ChallengeProvider for F
where
    F: Fn(&BTreeSet<QuestionId>) -> Result<Challenge, ProviderError>,
{
    fn next_challenge(&self, excluded: &BTreeSet<QuestionId>) -> Result<Challenge, ProviderError> {
        self(excluded)
    }
}

impl ChallengeProvider for QuestionRepository {
    /// Uniform random draw among the questions not drawn yet
    fn next_challenge(&self, excluded: &BTreeSet<QuestionId>) -> Result<Challenge, ProviderError> {
        let question = self
            .store
            .find_random(predicates::id_not_in(excluded))
            .ok_or(ProviderError::Exhausted {
                excluded: excluded.len(),
            })?;
        debug!(question_id = %question.id, excluded = excluded.len(), "challenge drawn");
        Ok(Challenge::from(&question))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::EventBus;
    use crate::log_store::{LogStore, LogStoreConfig};
    use crate::types::{Question, QuestionOption};
    use tempfile::TempDir;

    fn bank(dir: &TempDir, size: usize) -> QuestionRepository {
        let store = LogStore::open_with(
            dir.path().join("questions.log"),
            &[] as &[&str],
            LogStoreConfig::without_compaction(),
        )
        .unwrap();
        let repo = QuestionRepository::with_store(store, EventBus::new());
        for i in 0..size {
            let options = vec![QuestionOption::new("a"), QuestionOption::new("b")];
            let answer = options[1].id;
            repo.import(Question::new(format!("question {i}"), options, [answer]).unwrap())
                .unwrap();
        }
        repo
    }

    #[test]
    fn test_draws_only_undrawn_questions() {
        let dir = TempDir::new().unwrap();
        let repo = bank(&dir, 3);

        let mut drawn = BTreeSet::new();
        for _ in 0..3 {
            let challenge = repo.next_challenge(&drawn).unwrap();
            assert!(drawn.insert(challenge.id));
            assert_eq!(challenge.answer_ids.len(), 1);
        }

        assert_eq!(
            repo.next_challenge(&drawn).unwrap_err(),
            ProviderError::Exhausted { excluded: 3 }
        );
    }

    #[test]
    fn test_closure_provider() {
        let fixed = Challenge::new(uuid::Uuid::new_v4(), [uuid::Uuid::new_v4()]);
        let expected = fixed.clone();
        let provider =
            move |_: &BTreeSet<QuestionId>| -> Result<Challenge, ProviderError> { Ok(fixed.clone()) };

        assert_eq!(provider.next_challenge(&BTreeSet::new()).unwrap(), expected);
    }
}
