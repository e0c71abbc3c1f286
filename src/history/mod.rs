//! Answer history per training
//!
//! Fed entirely by training events: `training.created` opens a history,
//! `training.updated` records an attempt and closes the round on a pass.

mod repository;
mod subscriber;

pub use repository::{HistoryError, HistoryRepository};
pub use subscriber::subscribe_training_events;
