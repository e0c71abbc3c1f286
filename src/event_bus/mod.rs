//! Event Bus Module
//!
//! Typed, synchronous publish/subscribe used to decouple aggregates.
//! The bus is an ordinary value: construct one in the composition root
//! and hand a clone to every publisher and subscriber.

mod bus;
mod envelope;

pub use bus::{
    BusError, BusEvent, EventBus, HandlerError, HandlerFailure, HandlerResult, WILDCARD,
};
pub use envelope::{Envelope, JSON_CONTENT_TYPE};
