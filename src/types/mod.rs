//! Data types for the trainer
//!
//! Plain data shared by every subsystem. Training state transitions are
//! implemented in `crate::training`.

mod challenge;
mod event;
mod history;
mod question;
mod training;

pub use challenge::Challenge;
pub use event::{
    QuestionUpdated, TrainingCreated, TrainingEvent, TrainingUpdated, QUESTION_UPDATED,
    TRAINING_CREATED, TRAINING_UPDATED,
};
pub use history::{History, HistoryItem};
pub use question::{Question, QuestionEdit, QuestionOption, ValidationError, MIN_OPTIONS};
pub use training::{ChallengeCounts, Level, Stats, Training, TrainingChallenge};

use uuid::Uuid;

pub type QuestionId = Uuid;
pub type OptionId = Uuid;
pub type TrainingId = Uuid;
/// Histories are keyed by the id of their training
pub type HistoryId = Uuid;
