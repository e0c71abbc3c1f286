//! Training aggregate data
//!
//! State transitions live in `crate::training`; this module only defines the
//! shape of a training and the read accessors.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Challenge, OptionId, QuestionId, TrainingId};

/// Spaced-repetition stage of a challenge, 0 (new) to 4 (mastered)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    pub const NEW: Level = Level(0);
    pub const MASTERED: Level = Level(4);

    pub fn new(value: u8) -> Option<Level> {
        (value <= Self::MASTERED.0).then_some(Level(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Next level, capped at `MASTERED`
    pub fn raised(self) -> Level {
        Level(self.0.saturating_add(1).min(Self::MASTERED.0))
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Level::new(value).ok_or_else(|| format!("level {value} is out of range 0..=4"))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A question drawn into one training, with its scheduling state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingChallenge {
    /// Id of the underlying question
    pub id: QuestionId,
    /// Correct answers, copied when the challenge was drawn
    pub answer_ids: BTreeSet<OptionId>,
    pub level: Level,
    /// Earliest time the challenge may be picked again
    pub ready_at: DateTime<Utc>,
    pub done: bool,
    pub attempts: u32,
}

impl TrainingChallenge {
    /// Wrap a freshly drawn challenge: level 0, ready now
    pub fn new(challenge: Challenge, now: DateTime<Utc>) -> Self {
        Self {
            id: challenge.id,
            answer_ids: challenge.answer_ids,
            level: Level::NEW,
            ready_at: now,
            done: false,
            attempts: 0,
        }
    }

    /// Not done and due at `now` (inclusive)
    pub fn is_ready(&self, now: DateTime<Utc>) -> bool {
        !self.done && self.ready_at <= now
    }

    pub fn is_proceeding(&self) -> bool {
        self.level > Level::NEW && !self.done
    }
}

/// Per-training counters.
///
/// Counting is per streak: repeated failures on one challenge count once,
/// and a pass only counts if the challenge never failed in this streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Challenges presented so far, the active one included
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    /// Failed attempts on the active challenge
    pub current_attempts: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            total: 1,
            passed: 0,
            failed: 0,
            current_attempts: 0,
        }
    }
}

/// Challenge list broken down by scheduling phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChallengeCounts {
    pub initial: usize,
    pub proceeding: usize,
    pub done: usize,
}

/// One training session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TrainingData")]
pub struct Training {
    pub(crate) id: TrainingId,
    /// Index of the active challenge in `challenges`
    pub(crate) current: usize,
    pub(crate) current_failed: bool,
    pub(crate) challenges: Vec<TrainingChallenge>,
    pub(crate) stats: Stats,
    pub(crate) created: DateTime<Utc>,
    pub(crate) updated: DateTime<Utc>,
}

impl Training {
    pub fn id(&self) -> TrainingId {
        self.id
    }

    /// The challenge waiting for an answer
    pub fn current_challenge(&self) -> &TrainingChallenge {
        &self.challenges[self.current]
    }

    /// Whether the active challenge was already answered wrong
    pub fn current_failed(&self) -> bool {
        self.current_failed
    }

    /// Every challenge drawn so far, in draw order
    pub fn challenges(&self) -> &[TrainingChallenge] {
        &self.challenges
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn updated(&self) -> DateTime<Utc> {
        self.updated
    }

    pub fn contains_challenge(&self, question_id: QuestionId) -> bool {
        self.challenges.iter().any(|c| c.id == question_id)
    }

    /// Ids of all drawn challenges, the set a provider must not hand out again
    pub fn drawn_ids(&self) -> BTreeSet<QuestionId> {
        self.challenges.iter().map(|c| c.id).collect()
    }

    pub fn challenge_counts(&self) -> ChallengeCounts {
        self.challenges
            .iter()
            .fold(ChallengeCounts::default(), |mut counts, c| {
                if c.done {
                    counts.done += 1;
                } else if c.is_proceeding() {
                    counts.proceeding += 1;
                } else {
                    counts.initial += 1;
                }
                counts
            })
    }
}

/// Unchecked wire form of a training
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrainingData {
    id: TrainingId,
    current: usize,
    current_failed: bool,
    challenges: Vec<TrainingChallenge>,
    stats: Stats,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl TryFrom<TrainingData> for Training {
    type Error = String;

    fn try_from(data: TrainingData) -> Result<Self, Self::Error> {
        if data.current >= data.challenges.len() {
            return Err(format!(
                "training {}: active challenge index {} out of {} challenges",
                data.id,
                data.current,
                data.challenges.len()
            ));
        }
        Ok(Training {
            id: data.id,
            current: data.current,
            current_failed: data.current_failed,
            challenges: data.challenges,
            stats: data.stats,
            created: data.created,
            updated: data.updated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn challenge(level: u8, done: bool) -> TrainingChallenge {
        let mut c = TrainingChallenge::new(Challenge::new(Uuid::new_v4(), [Uuid::new_v4()]), Utc::now());
        c.level = Level::new(level).unwrap();
        c.done = done;
        c
    }

    fn training(challenges: Vec<TrainingChallenge>) -> Training {
        let now = Utc::now();
        Training {
            id: Uuid::new_v4(),
            current: 0,
            current_failed: false,
            challenges,
            stats: Stats::default(),
            created: now,
            updated: now,
        }
    }

    #[test]
    fn test_level_bounds() {
        assert!(Level::new(4).is_some());
        assert!(Level::new(5).is_none());
        assert_eq!(Level::MASTERED.raised(), Level::MASTERED);
        assert!(serde_json::from_str::<Level>("7").is_err());
        assert_eq!(serde_json::from_str::<Level>("2").unwrap().value(), 2);
    }

    #[test]
    fn test_readiness_is_inclusive() {
        let now = Utc::now();
        let mut c = challenge(1, false);
        c.ready_at = now;
        assert!(c.is_ready(now));
        c.ready_at = now + Duration::seconds(1);
        assert!(!c.is_ready(now));
        c.ready_at = now;
        c.done = true;
        assert!(!c.is_ready(now));
    }

    #[test]
    fn test_challenge_counts() {
        let t = training(vec![
            challenge(0, false),
            challenge(0, false),
            challenge(2, false),
            challenge(4, true),
        ]);
        assert_eq!(
            t.challenge_counts(),
            ChallengeCounts {
                initial: 2,
                proceeding: 1,
                done: 1
            }
        );
    }

    #[test]
    fn test_deserialize_rejects_dangling_index() {
        let t = training(vec![challenge(0, false)]);
        let mut json = serde_json::to_value(&t).unwrap();
        assert_eq!(serde_json::from_value::<Training>(json.clone()).unwrap(), t);

        json["current"] = serde_json::json!(3);
        assert!(serde_json::from_value::<Training>(json).is_err());
    }
}
