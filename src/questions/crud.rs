//! Question bank reads and writes

use tracing::{debug, info};

use super::{predicates, QuestionError, QuestionRepository};
use crate::types::{Question, QuestionEdit, QuestionId, QuestionUpdated};

impl QuestionRepository {
    /// Store a question as-is, e.g. from a bulk loader. No event is published.
    pub fn import(&self, question: Question) -> Result<Question, QuestionError> {
        question.validate()?;
        self.reject_foreign_options(&question)?;
        let saved = self.store.save(question)?;
        debug!(question_id = %saved.id, "question imported");
        Ok(saved)
    }

    /// Replace text, options and answer key of a stored question.
    ///
    /// The stored version is untouched unless the edit is valid. Subscribers
    /// of `question.updated` are notified only when the answer key changed,
    /// and only after the new version is saved.
    pub fn update(&self, id: QuestionId, edit: QuestionEdit) -> Result<Question, QuestionError> {
        let current = self.get(id).ok_or(QuestionError::NotFound(id))?;
        let updated = current.update(edit)?;
        self.reject_foreign_options(&updated)?;

        let saved = self.store.save(updated)?;
        info!(question_id = %id, options = saved.options.len(), "question updated");

        if current.answer_key_differs(&saved) {
            let event = QuestionUpdated {
                question_id: saved.id,
                answer_ids: saved.answer_ids.iter().copied().collect(),
            };
            self.bus
                .publish_event(&event)
                .map_err(QuestionError::EventDelivery)?;
        }
        Ok(saved)
    }

    pub fn get(&self, id: QuestionId) -> Option<Question> {
        self.store.get(&id)
    }

    pub fn find_first<F>(&self, predicate: F) -> Option<Question>
    where
        F: Fn(&Question) -> bool,
    {
        self.store.find_first(predicate)
    }

    pub fn find_all<F>(&self, predicate: F) -> Vec<Question>
    where
        F: Fn(&Question) -> bool,
    {
        self.store.find_all(predicate)
    }

    /// Every question, ordered by text
    pub fn all(&self) -> Vec<Question> {
        let mut questions = self.store.find_all(predicates::any);
        questions.sort_by(|a, b| a.text.cmp(&b.text).then(a.id.cmp(&b.id)));
        questions
    }

    pub fn contains_text(&self, question: &Question) -> bool {
        self.store.contains(predicates::same_text(question))
    }

    pub fn count(&self) -> usize {
        self.store.count_all()
    }

    /// Option ids must never be shared between questions
    fn reject_foreign_options(&self, question: &Question) -> Result<(), QuestionError> {
        for option_id in question.option_ids() {
            let taken = self.store.contains(|other| {
                other.id != question.id && other.option_ids().any(|id| id == option_id)
            });
            if taken {
                return Err(QuestionError::ForeignOption(option_id));
            }
        }
        Ok(())
    }
}
