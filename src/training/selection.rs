//! Retry-candidate selection

use chrono::{DateTime, Utc};

use crate::types::TrainingChallenge;

/// Index of the challenge to retry at `now`, if any.
///
/// Only challenges that are not done and due (`ready_at <= now`) qualify.
/// The lowest level wins; among equal levels the longest overdue wins.
/// Remaining ties go to the earliest drawn challenge.
pub fn select_retry_candidate(challenges: &[TrainingChallenge], now: DateTime<Utc>) -> Option<usize> {
    challenges
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_ready(now))
        .min_by_key(|(index, c)| (c.level, c.ready_at, *index))
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Challenge, Level};
    use chrono::Duration;
    use uuid::Uuid;

    fn challenge(level: u8, ready_at: DateTime<Utc>) -> TrainingChallenge {
        let mut c = TrainingChallenge::new(Challenge::new(Uuid::new_v4(), [Uuid::new_v4()]), ready_at);
        c.level = Level::new(level).unwrap();
        c
    }

    #[test]
    fn test_lowest_level_wins_over_older_timestamp() {
        let t = Utc::now();
        let challenges = vec![
            challenge(1, t - Duration::minutes(1)),
            challenge(0, t - Duration::minutes(2)),
            challenge(1, t - Duration::minutes(3)),
        ];
        assert_eq!(select_retry_candidate(&challenges, t), Some(1));
    }

    #[test]
    fn test_equal_level_prefers_longest_overdue() {
        let t = Utc::now();
        let challenges = vec![
            challenge(2, t - Duration::minutes(1)),
            challenge(2, t - Duration::minutes(30)),
        ];
        assert_eq!(select_retry_candidate(&challenges, t), Some(1));
    }

    #[test]
    fn test_future_and_done_challenges_are_skipped() {
        let t = Utc::now();
        let mut done = challenge(3, t - Duration::hours(1));
        done.done = true;
        let challenges = vec![challenge(0, t + Duration::seconds(1)), done];

        assert_eq!(select_retry_candidate(&challenges, t), None);
        assert_eq!(select_retry_candidate(&[], t), None);
    }

    #[test]
    fn test_due_exactly_now_is_selected() {
        let t = Utc::now();
        assert_eq!(select_retry_candidate(&[challenge(1, t)], t), Some(0));
    }
}
