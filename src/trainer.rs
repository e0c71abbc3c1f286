//! Trainer - wires stores, bus and subscribers together
//!
//! This is the surface an outer layer (HTTP, CLI) talks to. Commands are
//! serialized; queries read the stores directly.

use std::fs;
use std::io;
use std::path::PathBuf;

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::TrainerConfig;
use crate::event_bus::EventBus;
use crate::history::{subscribe_training_events, HistoryRepository};
use crate::log_store::{LogStoreError, LogStoreStats};
use crate::questions::{QuestionError, QuestionRepository};
use crate::training::sync::subscribe_question_updates;
use crate::training::{TrainingError, TrainingRepository};
use crate::types::{
    History, OptionId, Question, QuestionEdit, QuestionId, Training, TrainingId,
};

#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("cannot create data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Store(#[from] LogStoreError),

    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error(transparent)]
    Training(#[from] TrainingError),
}

/// Outcome of answering a challenge
#[derive(Debug, Clone)]
pub struct Answered {
    pub training: Training,
    pub passed: bool,
}

/// Store statistics for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct TrainerStatus {
    pub questions: LogStoreStats,
    pub trainings: LogStoreStats,
    pub histories: LogStoreStats,
    pub events_published: u64,
}

pub struct Trainer {
    bus: EventBus,
    questions: QuestionRepository,
    trainings: TrainingRepository,
    histories: HistoryRepository,
    commands: Mutex<()>,
}

impl Trainer {
    /// Open all stores under the configured data directory and register
    /// the subscribers.
    pub fn open(config: &TrainerConfig) -> Result<Self, TrainerError> {
        fs::create_dir_all(&config.data_dir).map_err(|source| TrainerError::DataDir {
            path: config.data_dir.clone(),
            source,
        })?;

        let bus = EventBus::new();
        let questions = QuestionRepository::open(
            config.questions_path(),
            &config.question_seed_files,
            config.log_store.clone(),
            bus.clone(),
        )?;
        let trainings =
            TrainingRepository::open(config.trainings_path(), config.log_store.clone(), bus.clone())?;
        let histories = HistoryRepository::open(config.history_path(), config.log_store.clone())?;

        subscribe_training_events(&bus, &histories);
        subscribe_question_updates(&bus, &trainings);

        info!(
            data_dir = %config.data_dir.display(),
            questions = questions.count(),
            trainings = trainings.count(),
            "trainer ready"
        );

        Ok(Self {
            bus,
            questions,
            trainings,
            histories,
            commands: Mutex::new(()),
        })
    }

    /// Start a training with a random first question
    pub fn start_training(&self) -> Result<Training, TrainerError> {
        let _guard = self.commands.lock();
        let transition =
            Training::start(&self.questions, Utc::now()).map_err(TrainingError::from)?;
        Ok(self.trainings.save(transition.training, &transition.events)?)
    }

    /// Answer the active challenge of a training
    pub fn answer(
        &self,
        training_id: TrainingId,
        answer_ids: &[OptionId],
    ) -> Result<Answered, TrainerError> {
        let _guard = self.commands.lock();
        let training = self
            .trainings
            .get(training_id)
            .ok_or(TrainingError::NotFound(training_id))?;

        let transition = training
            .next(answer_ids, &self.questions, Utc::now())
            .map_err(TrainingError::from)?;
        let passed = transition.passed;
        let training = self.trainings.save(transition.training, &transition.events)?;
        Ok(Answered { training, passed })
    }

    /// Edit a question. Trainings that drew it are reset for that question
    /// if the answer key changed.
    pub fn update_question(
        &self,
        question_id: QuestionId,
        edit: QuestionEdit,
    ) -> Result<Question, TrainerError> {
        let _guard = self.commands.lock();
        Ok(self.questions.update(question_id, edit)?)
    }

    /// Add a question to the bank without notifying anyone
    pub fn import_question(&self, question: Question) -> Result<Question, TrainerError> {
        let _guard = self.commands.lock();
        Ok(self.questions.import(question)?)
    }

    pub fn training(&self, id: TrainingId) -> Option<Training> {
        self.trainings.get(id)
    }

    /// Every training, newest first
    pub fn trainings(&self) -> Vec<Training> {
        self.trainings.all()
    }

    pub fn question(&self, id: QuestionId) -> Option<Question> {
        self.questions.get(id)
    }

    /// Every question, ordered by text
    pub fn questions(&self) -> Vec<Question> {
        self.questions.all()
    }

    pub fn history(&self, training_id: TrainingId) -> Option<History> {
        self.histories.get(training_id)
    }

    pub fn status(&self) -> TrainerStatus {
        TrainerStatus {
            questions: self.questions.store().stats(),
            trainings: self.trainings.store().stats(),
            histories: self.histories.store().stats(),
            events_published: self.bus.current_sequence_id(),
        }
    }

    /// The bus, for additional subscribers
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}

impl std::fmt::Debug for Trainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trainer")
            .field("questions", &self.questions)
            .field("trainings", &self.trainings.count())
            .field("histories", &self.histories.count())
            .field("bus", &self.bus)
            .finish()
    }
}
