//! Recall Trainer
//!
//! A self-quizzing trainer: a question bank, independent training sessions
//! that present one challenge at a time, and a spaced-repetition schedule
//! that decides when a challenge comes back.
//!
//! # Modules
//!
//! - `log_store`: append-only record log with replay and compaction
//! - `event_bus`: synchronous in-process publish/subscribe
//! - `types`: questions, trainings, histories and event payloads
//! - `questions`: question bank and challenge provider
//! - `training`: scheduler, retry selection and training persistence
//! - `history`: answer history fed by training events
//! - `trainer`: composition root
//! - `config`: environment configuration
//! - `utils`: atomic file replacement, set helpers
//!
//! # Example
//!
//! ```no_run
//! use recall_trainer::{Trainer, TrainerConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let trainer = Trainer::open(&TrainerConfig::from_env()?)?;
//!     let training = trainer.start_training()?;
//!     let key: Vec<_> = training.current_challenge().answer_ids.iter().copied().collect();
//!     let answered = trainer.answer(training.id(), &key)?;
//!     assert!(answered.passed);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod event_bus;
pub mod history;
pub mod log_store;
pub mod questions;
pub mod trainer;
pub mod training;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{ConfigError, TrainerConfig};
pub use event_bus::{BusError, BusEvent, EventBus};
pub use history::HistoryRepository;
pub use log_store::{LogStore, LogStoreConfig, LogStoreError, Record};
pub use questions::{ChallengeProvider, ProviderError, QuestionError, QuestionRepository};
pub use trainer::{Answered, Trainer, TrainerError, TrainerStatus};
pub use training::{TrainingError, TrainingRepository, Transition};
pub use types::{
    Challenge, History, Level, Question, QuestionEdit, QuestionOption, Training, TrainingChallenge,
};
