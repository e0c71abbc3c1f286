//! In-process publish/subscribe bus
//!
//! Delivery is synchronous: `publish` calls every handler registered for
//! the topic, in registration order, followed by every wildcard handler,
//! and returns only after the last one finished. Nothing is queued.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::envelope::{Envelope, JSON_CONTENT_TYPE};

/// Topic whose handlers receive every event
pub const WILDCARD: &str = "*";

/// Error type handlers report back to the publisher
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result of one handler invocation
pub type HandlerResult = Result<(), HandlerError>;

type Handler = Arc<dyn Fn(&Envelope) -> HandlerResult + Send + Sync>;

/// An event type bound to a fixed topic
pub trait BusEvent: Serialize + DeserializeOwned {
    const TOPIC: &'static str;
}

/// A handler that failed during `publish`
#[derive(Debug)]
pub struct HandlerFailure {
    /// Topic the handler was registered on (the event topic or `*`)
    pub subscribed_to: String,
    /// Position of the handler in its topic's registration order
    pub position: usize,
    pub error: HandlerError,
}

/// Errors that can occur on the bus
#[derive(Debug, Error)]
pub enum BusError {
    #[error("failed to serialize event for {topic}: {source}")]
    Serialize {
        topic: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode event on {topic}: {source}")]
    Decode {
        topic: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("illegal payload type {content_type} for event type {topic}")]
    UnsupportedContentType { topic: String, content_type: String },

    #[error("{count} handler(s) failed for {topic}: {details}", count = .failures.len(), details = summarize(.failures))]
    Delivery {
        topic: String,
        failures: Vec<HandlerFailure>,
    },
}

fn summarize(failures: &[HandlerFailure]) -> String {
    failures
        .iter()
        .map(|f| f.error.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Event bus handle. Clones share the same subscriptions.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<HashMap<String, Vec<Handler>>>>,
    sequence_counter: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler that receives the raw envelope
    pub fn subscribe_raw<F>(&self, topic: &str, handler: F)
    where
        F: Fn(&Envelope) -> HandlerResult + Send + Sync + 'static,
    {
        let mut subscribers = self.subscribers.write();
        let handlers = subscribers.entry(topic.to_string()).or_default();
        handlers.push(Arc::new(handler));
        debug!(topic, position = handlers.len() - 1, "subscriber registered");
    }

    /// Register a handler that receives the payload decoded as `T`.
    ///
    /// A payload that does not decode is reported as that handler's
    /// failure.
    pub fn subscribe<T, E, F>(&self, topic: &str, handler: F)
    where
        T: DeserializeOwned + 'static,
        E: Into<HandlerError> + 'static,
        F: Fn(T) -> Result<(), E> + Send + Sync + 'static,
    {
        self.subscribe_raw(topic, move |envelope| {
            let event: T = envelope.decode()?;
            handler(event).map_err(Into::into)
        });
    }

    /// Register a typed handler on the event's own topic
    pub fn subscribe_event<T, E, F>(&self, handler: F)
    where
        T: BusEvent + 'static,
        E: Into<HandlerError> + 'static,
        F: Fn(T) -> Result<(), E> + Send + Sync + 'static,
    {
        self.subscribe(T::TOPIC, handler);
    }

    /// Publish a typed event on its own topic
    pub fn publish_event<T: BusEvent>(&self, event: &T) -> Result<usize, BusError> {
        self.publish(T::TOPIC, event)
    }

    /// Serialize `event` and deliver it to the topic's handlers, then to
    /// the wildcard handlers.
    ///
    /// Every handler runs even if an earlier one fails. Returns the number
    /// of handlers that succeeded, or `BusError::Delivery` listing the
    /// failures.
    pub fn publish<T>(&self, topic: &str, event: &T) -> Result<usize, BusError>
    where
        T: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(event).map_err(|source| BusError::Serialize {
            topic: topic.to_string(),
            source,
        })?;

        let envelope = Envelope {
            topic: topic.to_string(),
            sequence_id: self.sequence_counter.fetch_add(1, Ordering::SeqCst),
            timestamp: chrono::Utc::now().timestamp(),
            content_type: JSON_CONTENT_TYPE.to_string(),
            payload,
        };

        // Snapshot the handler lists so handlers may subscribe or publish
        // without deadlocking on the registry lock.
        let targets: Vec<(String, Vec<Handler>)> = {
            let subscribers = self.subscribers.read();
            let mut targets = Vec::with_capacity(2);
            if let Some(handlers) = subscribers.get(topic) {
                targets.push((topic.to_string(), handlers.clone()));
            }
            if topic != WILDCARD {
                if let Some(handlers) = subscribers.get(WILDCARD) {
                    targets.push((WILDCARD.to_string(), handlers.clone()));
                }
            }
            targets
        };

        let mut delivered = 0;
        let mut failures = Vec::new();
        for (subscribed_to, handlers) in targets {
            for (position, handler) in handlers.iter().enumerate() {
                match handler(&envelope) {
                    Ok(()) => delivered += 1,
                    Err(error) => {
                        warn!(
                            topic,
                            subscribed_to = %subscribed_to,
                            position,
                            error = %error,
                            "event handler failed"
                        );
                        failures.push(HandlerFailure {
                            subscribed_to: subscribed_to.clone(),
                            position,
                            error,
                        });
                    }
                }
            }
        }

        debug!(
            topic,
            sequence_id = envelope.sequence_id,
            delivered,
            failed = failures.len(),
            "event published"
        );

        if failures.is_empty() {
            Ok(delivered)
        } else {
            Err(BusError::Delivery {
                topic: topic.to_string(),
                failures,
            })
        }
    }

    /// Number of handlers registered on `topic` (wildcard handlers excluded)
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscribers.read().get(topic).map_or(0, Vec::len)
    }

    /// Sequence ID the next published event will get
    pub fn current_sequence_id(&self) -> u64 {
        self.sequence_counter.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subscribers = self.subscribers.read();
        let mut topics: Vec<(&String, usize)> =
            subscribers.iter().map(|(topic, h)| (topic, h.len())).collect();
        topics.sort();
        f.debug_struct("EventBus")
            .field("topics", &topics)
            .field("sequence_id", &self.current_sequence_id())
            .finish()
    }
}
