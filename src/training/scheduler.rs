//! Spaced-repetition transitions
//!
//! | level after `proceed` | next review |
//! |---|---|
//! | 1 | now + 10 min |
//! | 2 | now + 6 h |
//! | 3 | now + 24 h |
//! | 4 | now, and the challenge is done |
//!
//! `reset` drops any level back to 0 with a review in 10 minutes.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};

use crate::types::{Level, OptionId, Stats, TrainingChallenge};

/// Delay before a challenge comes back after a reset or a level-1 pass
pub fn short_delay() -> Duration {
    Duration::minutes(10)
}

/// Review delay for a challenge that just reached `level`
pub fn review_delay(level: Level) -> Duration {
    match level.value() {
        1 => short_delay(),
        2 => Duration::hours(6),
        3 => Duration::hours(24),
        _ => Duration::zero(),
    }
}

impl TrainingChallenge {
    /// Correct answer on a clean streak: one level up
    pub(crate) fn proceed(&mut self, now: DateTime<Utc>) {
        self.attempts += 1;
        self.level = self.level.raised();
        self.ready_at = now + review_delay(self.level);
        if self.level == Level::MASTERED {
            self.done = true;
        }
    }

    /// Correct answer after a failure in the same streak: back to level 0
    pub(crate) fn reset(&mut self, now: DateTime<Utc>) {
        self.attempts += 1;
        self.level = Level::NEW;
        self.ready_at = now + short_delay();
    }

    /// The answer key changed under this challenge. Progress is dropped,
    /// but this is not an attempt.
    pub(crate) fn invalidate(&mut self, answer_ids: BTreeSet<OptionId>, now: DateTime<Utc>) {
        self.answer_ids = answer_ids;
        self.level = Level::NEW;
        self.done = false;
        self.ready_at = now + short_delay();
    }
}

impl Stats {
    pub(crate) fn record_pass(&mut self) {
        self.total += 1;
        if self.current_attempts == 0 {
            self.passed += 1;
        }
        self.current_attempts = 0;
    }

    pub(crate) fn record_fail(&mut self) {
        if self.current_attempts == 0 {
            self.failed += 1;
        }
        self.current_attempts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Challenge;
    use uuid::Uuid;

    fn at_level(level: u8, now: DateTime<Utc>) -> TrainingChallenge {
        let mut c = TrainingChallenge::new(Challenge::new(Uuid::new_v4(), [Uuid::new_v4()]), now);
        c.level = Level::new(level).unwrap();
        c
    }

    #[test]
    fn test_proceed_curve() {
        let now = Utc::now();
        let expected = [
            (1, Duration::minutes(10), false),
            (2, Duration::hours(6), false),
            (3, Duration::hours(24), false),
            (4, Duration::zero(), true),
        ];
        for (from, (to, delay, done)) in expected.into_iter().enumerate() {
            let mut c = at_level(from as u8, now);
            c.proceed(now);
            assert_eq!(c.level.value(), to);
            assert_eq!(c.ready_at, now + delay);
            assert_eq!(c.done, done);
            assert_eq!(c.attempts, 1);
        }
    }

    #[test]
    fn test_reset_drops_to_zero() {
        let now = Utc::now();
        let mut c = at_level(2, now);
        c.attempts = 3;
        c.reset(now);
        assert_eq!(c.level, Level::NEW);
        assert_eq!(c.ready_at, now + Duration::minutes(10));
        assert_eq!(c.attempts, 4);
        assert!(!c.done);
    }

    #[test]
    fn test_invalidate_keeps_attempts() {
        let now = Utc::now();
        let mut c = at_level(4, now);
        c.done = true;
        c.attempts = 5;
        let key: BTreeSet<_> = [Uuid::new_v4(), Uuid::new_v4()].into_iter().collect();

        c.invalidate(key.clone(), now);

        assert_eq!(c.answer_ids, key);
        assert_eq!(c.level, Level::NEW);
        assert!(!c.done);
        assert_eq!(c.attempts, 5);
        assert_eq!(c.ready_at, now + Duration::minutes(10));
    }

    #[test]
    fn test_stats_count_streaks_once() {
        let mut stats = Stats::default();
        stats.record_fail();
        stats.record_fail();
        stats.record_pass();
        stats.record_pass();

        assert_eq!(
            stats,
            Stats {
                total: 3,
                passed: 1,
                failed: 1,
                current_attempts: 0
            }
        );
    }
}
