//! A freshly drawn challenge, as handed out by a question source

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{OptionId, Question, QuestionId};

/// A question id together with its correct answer key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: QuestionId,
    pub answer_ids: BTreeSet<OptionId>,
}

impl Challenge {
    pub fn new<I>(id: QuestionId, answer_ids: I) -> Self
    where
        I: IntoIterator<Item = OptionId>,
    {
        Self {
            id,
            answer_ids: answer_ids.into_iter().collect(),
        }
    }
}

impl From<&Question> for Challenge {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id,
            answer_ids: question.answer_ids.clone(),
        }
    }
}
