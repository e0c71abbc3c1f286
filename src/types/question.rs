//! Question bank types

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{OptionId, QuestionId};

/// Minimum number of options a question must offer
pub const MIN_OPTIONS: usize = 2;

/// One selectable answer of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: OptionId,
    pub text: String,
}

impl QuestionOption {
    /// Create an option with a fresh id
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), text)
    }

    pub fn with_id(id: OptionId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// Reasons a question is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("question text is missing")]
    MissingText,

    #[error("a question needs at least {min} options, got {0}", min = MIN_OPTIONS)]
    TooFewOptions(usize),

    #[error("option {0} has no text")]
    EmptyOption(OptionId),

    #[error("option id {0} is used more than once")]
    DuplicateOption(OptionId),

    #[error("answer {0} is not one of the question's options")]
    UnknownAnswer(OptionId),

    #[error("a question needs at least one correct answer")]
    NoAnswer,
}

/// Requested change to a question's text, options and answer key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionEdit {
    pub text: String,
    pub options: Vec<QuestionOption>,
    pub answer_ids: Vec<OptionId>,
}

/// A question with its options and correct answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<QuestionOption>,
    pub answer_ids: BTreeSet<OptionId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Media file references shown with the question
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<String>,
}

impl Question {
    /// Create a validated question with a fresh id
    pub fn new<I>(
        text: impl Into<String>,
        options: Vec<QuestionOption>,
        answer_ids: I,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = OptionId>,
    {
        let question = Self {
            id: Uuid::new_v4(),
            text: text.into(),
            options,
            answer_ids: answer_ids.into_iter().collect(),
            tags: Vec::new(),
            media: Vec::new(),
        };
        question.validate()?;
        Ok(question)
    }

    /// Add tags (builder style)
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Check the question invariants
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::MissingText);
        }
        if self.options.len() < MIN_OPTIONS {
            return Err(ValidationError::TooFewOptions(self.options.len()));
        }

        let mut seen = HashSet::new();
        for option in &self.options {
            if option.text.trim().is_empty() {
                return Err(ValidationError::EmptyOption(option.id));
            }
            if !seen.insert(option.id) {
                return Err(ValidationError::DuplicateOption(option.id));
            }
        }

        if self.answer_ids.is_empty() {
            return Err(ValidationError::NoAnswer);
        }
        if let Some(unknown) = self.answer_ids.iter().find(|id| !seen.contains(*id)) {
            return Err(ValidationError::UnknownAnswer(*unknown));
        }
        Ok(())
    }

    /// Return an edited copy of this question.
    ///
    /// Options submitted with a nil id get a fresh one. Tags and media are
    /// kept. `self` is never modified, even when validation fails.
    pub fn update(&self, edit: QuestionEdit) -> Result<Question, ValidationError> {
        let options = edit
            .options
            .into_iter()
            .map(|option| {
                if option.id.is_nil() {
                    QuestionOption::new(option.text)
                } else {
                    option
                }
            })
            .collect();

        let updated = Question {
            id: self.id,
            text: edit.text,
            options,
            answer_ids: edit.answer_ids.into_iter().collect(),
            tags: self.tags.clone(),
            media: self.media.clone(),
        };
        updated.validate()?;
        Ok(updated)
    }

    /// True if `other` has a different set of correct answers
    pub fn answer_key_differs(&self, other: &Question) -> bool {
        self.answer_ids != other.answer_ids
    }

    /// Ids of all options
    pub fn option_ids(&self) -> impl Iterator<Item = OptionId> + '_ {
        self.options.iter().map(|o| o.id)
    }
}
