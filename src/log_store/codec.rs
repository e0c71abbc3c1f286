//! Record codec
//!
//! A record is stored as JSON wrapped in unpadded standard base64. The
//! base64 stage keeps the payload free of control bytes, so the frame
//! length prefix is the only structure in the file.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while encoding or decoding a record
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to serialize record: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("record is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("record is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),
}

/// Encode a value into its on-disk byte form
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    let json = serde_json::to_vec(value).map_err(CodecError::Serialize)?;
    Ok(STANDARD_NO_PAD.encode(json).into_bytes())
}

/// Decode bytes produced by [`encode`]
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    let json = STANDARD_NO_PAD.decode(bytes)?;
    serde_json::from_slice(&json).map_err(CodecError::Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Card {
        id: u32,
        text: String,
        tags: Vec<String>,
    }

    fn card() -> Card {
        Card {
            id: 7,
            text: "Which port does SSH use?\n(choose one)".to_string(),
            tags: vec!["network".to_string()],
        }
    }

    #[test]
    fn test_round_trip() {
        let encoded = encode(&card()).unwrap();
        let decoded: Card = decode(&encoded).unwrap();
        assert_eq!(decoded, card());
    }

    #[test]
    fn test_encoded_form_is_plain_base64() {
        let encoded = encode(&card()).unwrap();
        assert!(encoded
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'+' || *b == b'/'));
        // No padding characters in the raw encoding
        assert!(!encoded.contains(&b'='));
    }

    #[test]
    fn test_corrupt_base64_is_reported() {
        let result: Result<Card, _> = decode(b"not*base64!");
        assert!(matches!(result, Err(CodecError::Base64(_))));
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let bytes = STANDARD_NO_PAD.encode(br#"{"id": 7, "text": "#).into_bytes();
        let result: Result<Card, _> = decode(&bytes);
        assert!(matches!(result, Err(CodecError::Json(_))));
    }

    #[test]
    fn test_wrong_shape_does_not_default() {
        let bytes = encode(&serde_json::json!({"id": 7})).unwrap();
        let result: Result<Card, _> = decode(&bytes);
        assert!(matches!(result, Err(CodecError::Json(_))));
    }
}
