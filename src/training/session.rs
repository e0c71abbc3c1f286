//! Training commands
//!
//! Commands never mutate the training they are called on. They return a
//! [`Transition`] holding the new state and the events it produced; the
//! caller persists the state and publishes the events afterwards.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::selection::select_retry_candidate;
use crate::questions::{ChallengeProvider, ProviderError};
use crate::types::{
    OptionId, QuestionId, Stats, Training, TrainingChallenge, TrainingCreated, TrainingEvent,
    TrainingUpdated,
};
use crate::utils::mutual_containment;

/// Result of a training command
#[derive(Debug, Clone)]
pub struct Transition {
    pub training: Training,
    /// Events to publish once `training` is saved, in order
    pub events: Vec<TrainingEvent>,
    /// Whether the answer was correct (`true` for a new training)
    pub passed: bool,
}

impl Training {
    /// Start a training with a first challenge from `provider`
    pub fn start<P>(provider: &P, now: DateTime<Utc>) -> Result<Transition, ProviderError>
    where
        P: ChallengeProvider + ?Sized,
    {
        let first = provider.next_challenge(&BTreeSet::new())?;
        let training = Training {
            id: Uuid::new_v4(),
            current: 0,
            current_failed: false,
            challenges: vec![TrainingChallenge::new(first, now)],
            stats: Stats::default(),
            created: now,
            updated: now,
        };
        info!(training_id = %training.id, challenge_id = %training.current_challenge().id, "training started");

        let events = vec![TrainingEvent::Created(TrainingCreated {
            training_id: training.id,
        })];
        Ok(Transition {
            training,
            events,
            passed: true,
        })
    }

    /// Answer the active challenge.
    ///
    /// A wrong answer keeps the challenge active. A correct one moves it
    /// along the schedule (or back to level 0 if it failed in this streak)
    /// and activates the next challenge: a due retry if there is one,
    /// otherwise a fresh draw. If the draw fails, `self` is unchanged and
    /// nothing is emitted.
    pub fn next<P>(
        &self,
        answer_ids: &[OptionId],
        provider: &P,
        now: DateTime<Utc>,
    ) -> Result<Transition, ProviderError>
    where
        P: ChallengeProvider + ?Sized,
    {
        let mut training = self.clone();
        let challenge_id = training.current_challenge().id;
        let passed = mutual_containment(&training.current_challenge().answer_ids, answer_ids);

        if passed {
            training.stats.record_pass();
            let failed_before = training.current_failed;
            let current = &mut training.challenges[training.current];
            if failed_before {
                current.reset(now);
            } else {
                current.proceed(now);
            }
            debug!(
                training_id = %training.id,
                challenge_id = %challenge_id,
                level = %current.level,
                reset = failed_before,
                "challenge passed"
            );
            training.activate_next(provider, now)?;
        } else {
            training.current_failed = true;
            training.stats.record_fail();
            debug!(training_id = %training.id, challenge_id = %challenge_id, "challenge failed");
        }
        training.updated = now;

        let events = vec![TrainingEvent::Updated(TrainingUpdated {
            training_id: training.id,
            challenge_id,
            answer_ids: answer_ids.to_vec(),
            passed,
        })];
        Ok(Transition {
            training,
            events,
            passed,
        })
    }

    /// Replace the answer key of every challenge for `question_id` and drop
    /// its progress. Returns whether any challenge matched.
    pub fn update_challenge_answer(
        &mut self,
        question_id: QuestionId,
        answer_ids: &BTreeSet<OptionId>,
        now: DateTime<Utc>,
    ) -> bool {
        let mut changed = false;
        for challenge in self.challenges.iter_mut().filter(|c| c.id == question_id) {
            challenge.invalidate(answer_ids.clone(), now);
            changed = true;
        }
        if changed {
            self.updated = now;
            info!(training_id = %self.id, challenge_id = %question_id, "challenge answer key replaced");
        }
        changed
    }

    fn activate_next<P>(&mut self, provider: &P, now: DateTime<Utc>) -> Result<(), ProviderError>
    where
        P: ChallengeProvider + ?Sized,
    {
        match select_retry_candidate(&self.challenges, now) {
            Some(index) => {
                debug!(
                    training_id = %self.id,
                    challenge_id = %self.challenges[index].id,
                    level = %self.challenges[index].level,
                    "retrying due challenge"
                );
                self.current = index;
            }
            None => {
                let challenge = provider.next_challenge(&self.drawn_ids())?;
                debug!(training_id = %self.id, challenge_id = %challenge.id, "drew new challenge");
                self.challenges.push(TrainingChallenge::new(challenge, now));
                self.current = self.challenges.len() - 1;
            }
        }
        self.current_failed = false;
        Ok(())
    }
}
