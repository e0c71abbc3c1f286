//! Training sessions and their spaced-repetition schedule
//!
//! - `scheduler`: level curve and the proceed/reset/invalidate transitions
//! - `selection`: which due challenge to retry next
//! - `session`: `Training::start` / `Training::next`, returning a [`Transition`]
//! - `TrainingRepository`: persist, then publish
//! - `sync`: reacts to edited questions

pub mod scheduler;
pub mod selection;
mod repository;
mod session;
pub mod sync;

pub use repository::{TrainingError, TrainingRepository};
pub use selection::select_retry_candidate;
pub use session::Transition;
