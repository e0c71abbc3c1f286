//! Envelope carried through the bus

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::bus::BusError;

/// Content type of every payload the bus produces
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A published event with delivery metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope {
    /// Topic the event was published on
    pub topic: String,

    /// Monotonically increasing sequence ID per bus
    pub sequence_id: u64,

    /// Unix timestamp when the event was published
    pub timestamp: i64,

    /// Encoding of `payload`
    pub content_type: String,

    /// Serialized event
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Deserialize the payload into a typed event
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, BusError> {
        if self.content_type != JSON_CONTENT_TYPE {
            return Err(BusError::UnsupportedContentType {
                topic: self.topic.clone(),
                content_type: self.content_type.clone(),
            });
        }
        serde_json::from_slice(&self.payload).map_err(|source| BusError::Decode {
            topic: self.topic.clone(),
            source,
        })
    }
}
