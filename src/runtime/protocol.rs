//! Worker message protocol
//!
//! Requests and responses are tagged envelopes correlated by `id`:
//!
//! ```text
//! → { "id": "7", "type": "CHECK_COMPATIBILITY", "data": { "block": ..., "context": "logic", "existingBlocks": [...] } }
//! ← { "id": "7", "type": "COMPATIBILITY_RESULT", "data": { "isValid": true, "reason": "..." } }
//! ```
//!
//! The `type` tag is read before the payload so that an unknown type can
//! still be answered with an `ERROR` carrying the caller's `id`.

use serde::{Deserialize, Serialize};

use crate::core::block::lenient_string;
use crate::core::{Block, ValidationVerdict};

pub const CHECK_COMPATIBILITY: &str = "CHECK_COMPATIBILITY";
pub const BATCH_CHECK: &str = "BATCH_CHECK";

/// Payload of `CHECK_COMPATIBILITY`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckPayload {
    pub block: Block,
    /// Raw context string; validated by the engine, not by the decoder.
    /// Missing or non-string values decode as `None`.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub context: Option<String>,
    #[serde(default)]
    pub existing_blocks: Vec<Block>,
}

/// Payload of `BATCH_CHECK`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPayload {
    pub blocks: Vec<Block>,
    /// Same decoding as `CheckPayload::context`
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub context: Option<String>,
    #[serde(default)]
    pub existing_blocks: Vec<Block>,
}

/// Decoded request kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    Check(CheckPayload),
    Batch(BatchPayload),
}

impl RequestKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            RequestKind::Check(_) => CHECK_COMPATIBILITY,
            RequestKind::Batch(_) => BATCH_CHECK,
        }
    }
}

/// Request envelope as it arrives: the payload stays untyped until the tag is
/// known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Envelope {
    /// Decode the payload according to the tag
    pub fn decode(&self) -> Result<RequestKind, ProtocolError> {
        match self.kind.as_str() {
            CHECK_COMPATIBILITY => serde_json::from_value(self.data.clone())
                .map(RequestKind::Check)
                .map_err(|e| ProtocolError::InvalidPayload {
                    kind: CHECK_COMPATIBILITY,
                    message: e.to_string(),
                }),
            BATCH_CHECK => serde_json::from_value(self.data.clone())
                .map(RequestKind::Batch)
                .map_err(|e| ProtocolError::InvalidPayload {
                    kind: BATCH_CHECK,
                    message: e.to_string(),
                }),
            other => Err(ProtocolError::UnknownType(other.to_string())),
        }
    }
}

/// Typed request, used by in-process callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub id: String,
    pub kind: RequestKind,
}

impl Request {
    pub fn check(id: impl Into<String>, payload: CheckPayload) -> Self {
        Self {
            id: id.into(),
            kind: RequestKind::Check(payload),
        }
    }

    pub fn batch(id: impl Into<String>, payload: BatchPayload) -> Self {
        Self {
            id: id.into(),
            kind: RequestKind::Batch(payload),
        }
    }

    /// Wire envelope for this request
    pub fn to_envelope(&self) -> Result<Envelope, serde_json::Error> {
        let data = match &self.kind {
            RequestKind::Check(p) => serde_json::to_value(p)?,
            RequestKind::Batch(p) => serde_json::to_value(p)?,
        };
        Ok(Envelope {
            id: self.id.clone(),
            kind: self.kind.type_name().to_string(),
            data,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseKind {
    CompatibilityResult,
    BatchResult,
    Error,
}

/// Error payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Response payload; the variant always agrees with `Response::kind`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    Verdict(ValidationVerdict),
    Batch(Vec<ValidationVerdict>),
    Error(ErrorBody),
}

/// Response envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    pub data: ResponseData,
}

impl Response {
    pub fn verdict(id: impl Into<String>, verdict: ValidationVerdict) -> Self {
        Self {
            id: id.into(),
            kind: ResponseKind::CompatibilityResult,
            data: ResponseData::Verdict(verdict),
        }
    }

    pub fn batch(id: impl Into<String>, verdicts: Vec<ValidationVerdict>) -> Self {
        Self {
            id: id.into(),
            kind: ResponseKind::BatchResult,
            data: ResponseData::Batch(verdicts),
        }
    }

    pub fn error(id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: ResponseKind::Error,
            data: ResponseData::Error(ErrorBody {
                error: error.into(),
            }),
        }
    }

    /// Error message, if this is an `ERROR` response
    pub fn error_message(&self) -> Option<&str> {
        match &self.data {
            ResponseData::Error(body) => Some(&body.error),
            _ => None,
        }
    }
}

/// Failures decoding a request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error("Unknown message type: {0}")]
    UnknownType(String),

    #[error("Invalid {kind} payload: {message}")]
    InvalidPayload { kind: &'static str, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::BlockCategory;
    use serde_json::json;

    #[test]
    fn test_decode_check() {
        let envelope: Envelope = serde_json::from_value(json!({
            "id": "1",
            "type": "CHECK_COMPATIBILITY",
            "data": {
                "block": { "category": "event" },
                "context": "logic",
                "existingBlocks": [{ "blockType": "text" }]
            }
        }))
        .unwrap();

        match envelope.decode().unwrap() {
            RequestKind::Check(payload) => {
                assert_eq!(payload.block, Block::with_category(BlockCategory::Event));
                assert_eq!(payload.context.as_deref(), Some("logic"));
                assert_eq!(payload.existing_blocks, vec![Block::with_type("text")]);
            }
            other => panic!("expected check, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_existing_blocks_defaults_to_empty() {
        let envelope: Envelope = serde_json::from_value(json!({
            "id": "2",
            "type": "BATCH_CHECK",
            "data": { "blocks": [], "context": "flex" }
        }))
        .unwrap();

        match envelope.decode().unwrap() {
            RequestKind::Batch(payload) => assert!(payload.existing_blocks.is_empty()),
            other => panic!("expected batch, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type() {
        let envelope = Envelope {
            id: "3".into(),
            kind: "PING".into(),
            data: serde_json::Value::Null,
        };
        assert_eq!(
            envelope.decode().unwrap_err(),
            ProtocolError::UnknownType("PING".into())
        );
    }

    #[test]
    fn test_payload_mismatch() {
        let envelope = Envelope {
            id: "4".into(),
            kind: BATCH_CHECK.into(),
            data: json!({ "block": {}, "context": "logic" }),
        };
        assert!(matches!(
            envelope.decode(),
            Err(ProtocolError::InvalidPayload { kind: BATCH_CHECK, .. })
        ));
    }

    #[test]
    fn test_response_wire_format() {
        let response = Response::verdict("9", ValidationVerdict::accept("fine"));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "id": "9",
                "type": "COMPATIBILITY_RESULT",
                "data": { "isValid": true, "reason": "fine" }
            })
        );

        let response = Response::error("10", "boom");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "id": "10", "type": "ERROR", "data": { "error": "boom" } })
        );
        assert_eq!(response.error_message(), Some("boom"));
    }

    #[test]
    fn test_response_parses_back() {
        let text = r#"{"id":"5","type":"BATCH_RESULT","data":[{"isValid":false,"reason":"no","suggestions":["x"]}]}"#;
        let response: Response = serde_json::from_str(text).unwrap();
        assert_eq!(response.kind, ResponseKind::BatchResult);
        match response.data {
            ResponseData::Batch(verdicts) => {
                assert_eq!(verdicts.len(), 1);
                assert_eq!(verdicts[0].suggestions(), ["x".to_string()]);
            }
            other => panic!("expected batch data, got {:?}", other),
        }
    }

    #[test]
    fn test_request_envelope_round_trip() {
        let request = Request::check(
            "11",
            CheckPayload {
                block: Block::with_type("bubble"),
                context: Some("flex".into()),
                existing_blocks: vec![],
            },
        );
        let envelope = request.to_envelope().unwrap();
        assert_eq!(envelope.kind, CHECK_COMPATIBILITY);
        assert_eq!(envelope.decode().unwrap(), request.kind);
    }
}
