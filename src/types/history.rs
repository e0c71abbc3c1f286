//! Answer history of a training

use serde::{Deserialize, Serialize};

use super::{HistoryId, OptionId, QuestionId};

/// A finished round: every answer given until the challenge was solved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub challenge_id: QuestionId,
    /// One entry per attempt, in order
    pub given_answers: Vec<Vec<OptionId>>,
    pub solving_answer: Vec<OptionId>,
}

/// History of one training; shares the training's id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct History {
    pub id: HistoryId,
    /// Attempts of the round in progress
    #[serde(default)]
    pub current_answers: Vec<Vec<OptionId>>,
    #[serde(default)]
    pub items: Vec<HistoryItem>,
}

impl History {
    pub fn new(id: HistoryId) -> Self {
        Self {
            id,
            current_answers: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Record one attempt of the current round
    pub fn add_answer(&mut self, answer_ids: Vec<OptionId>) {
        self.current_answers.push(answer_ids);
    }

    /// Close the current round with the answer that solved it
    pub fn finalize(&mut self, challenge_id: QuestionId, solving_answer: Vec<OptionId>) {
        let given_answers = std::mem::take(&mut self.current_answers);
        self.items.push(HistoryItem {
            challenge_id,
            given_answers,
            solving_answer,
        });
    }

    /// Item by recency: 0 is the most recently finished round
    pub fn item_at(&self, index: usize) -> Option<&HistoryItem> {
        self.items.iter().rev().nth(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_rounds_collect_attempts() {
        let mut history = History::new(Uuid::new_v4());
        let (q1, q2) = (Uuid::new_v4(), Uuid::new_v4());
        let (wrong, right) = (vec![Uuid::new_v4()], vec![Uuid::new_v4()]);

        history.add_answer(wrong.clone());
        history.add_answer(right.clone());
        history.finalize(q1, right.clone());
        history.add_answer(right.clone());
        history.finalize(q2, right.clone());

        assert_eq!(history.len(), 2);
        assert!(history.current_answers.is_empty());

        let latest = history.item_at(0).unwrap();
        assert_eq!(latest.challenge_id, q2);
        assert_eq!(latest.given_answers.len(), 1);

        let first = history.item_at(1).unwrap();
        assert_eq!(first.challenge_id, q1);
        assert_eq!(first.given_answers, vec![wrong, right]);
        assert!(history.item_at(2).is_none());
    }
}
