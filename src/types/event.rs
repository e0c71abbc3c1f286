//! Event types published on the bus
//!
//! Payloads are serialized as camelCase JSON. Every event is bound to a
//! fixed topic through [`BusEvent`].

use serde::{Deserialize, Serialize};

use super::{OptionId, QuestionId, TrainingId};
use crate::event_bus::{BusError, BusEvent, EventBus};

/// Topic of [`QuestionUpdated`]
pub const QUESTION_UPDATED: &str = "question.updated";
/// Topic of [`TrainingCreated`]
pub const TRAINING_CREATED: &str = "training.created";
/// Topic of [`TrainingUpdated`]
pub const TRAINING_UPDATED: &str = "training.updated";

/// The answer key of a question changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionUpdated {
    pub question_id: QuestionId,
    pub answer_ids: Vec<OptionId>,
}

impl BusEvent for QuestionUpdated {
    const TOPIC: &'static str = QUESTION_UPDATED;
}

/// A training was started
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingCreated {
    pub training_id: TrainingId,
}

impl BusEvent for TrainingCreated {
    const TOPIC: &'static str = TRAINING_CREATED;
}

/// A challenge of a training was answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingUpdated {
    pub training_id: TrainingId,
    pub challenge_id: QuestionId,
    /// Answers as given by the user
    pub answer_ids: Vec<OptionId>,
    pub passed: bool,
}

impl BusEvent for TrainingUpdated {
    const TOPIC: &'static str = TRAINING_UPDATED;
}

/// Events emitted by training commands, in emission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainingEvent {
    Created(TrainingCreated),
    Updated(TrainingUpdated),
}

impl TrainingEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            TrainingEvent::Created(_) => TrainingCreated::TOPIC,
            TrainingEvent::Updated(_) => TrainingUpdated::TOPIC,
        }
    }

    /// Deliver this event on its topic
    pub fn publish(&self, bus: &EventBus) -> Result<usize, BusError> {
        match self {
            TrainingEvent::Created(event) => bus.publish_event(event),
            TrainingEvent::Updated(event) => bus.publish_event(event),
        }
    }
}
