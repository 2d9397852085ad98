//! Wire helpers for the three server surfaces.
//!
//! - Snapshot: `GET /messages` returns a JSON array of messages that may
//!   contain `null` entries. They are preserved here so the caller decides
//!   how to filter them.
//! - Send: `POST /send` takes a [`SendRequest`] body.
//! - Push: the live channel carries JSON frames with a `{type, payload}`
//!   envelope; the only topic is `message` and its payload may be `null`.

use serde::{Deserialize, Serialize};

use crate::{Message, WireError};

/// Body of `POST /send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    /// Message body to broadcast.
    pub content: String,
    /// Label of the sending client.
    pub username: String,
}

impl SendRequest {
    /// Build a send request.
    pub fn new(content: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            username: username.into(),
        }
    }

    /// Serialize to a JSON body.
    pub fn to_json(&self) -> Result<String, WireError> {
        serde_json::to_string(self).map_err(WireError::Serialization)
    }
}

/// Envelope for frames on the push channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum PushFrame {
    /// Server → client: a new-message event on the `message` topic.
    ///
    /// A `null` payload is a well-formed frame carrying no message.
    #[serde(rename = "message")]
    Message(Option<Message>),
}

impl PushFrame {
    /// Parse a frame from JSON text.
    pub fn parse(raw: &str) -> Result<Self, WireError> {
        serde_json::from_str(raw).map_err(WireError::Deserialization)
    }

    /// Serialize to JSON text.
    pub fn to_json(&self) -> Result<String, WireError> {
        serde_json::to_string(self).map_err(WireError::Serialization)
    }
}

/// Parse a `GET /messages` snapshot body.
///
/// `null` array entries survive the parse as `None`.
pub fn parse_snapshot(raw: &str) -> Result<Vec<Option<Message>>, WireError> {
    serde_json::from_str(raw).map_err(WireError::Deserialization)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_request_matches_contract_body() {
        let req = SendRequest::new("hello", "Sender 1");
        let json = req.to_json().unwrap();
        assert_eq!(json, r#"{"content":"hello","username":"Sender 1"}"#);
    }

    #[test]
    fn push_frame_envelope_is_tagged() {
        let frame = PushFrame::Message(Some(Message::outbound("hi", "A")));
        let json = frame.to_json().unwrap();
        assert!(json.contains(r#""type":"message""#));
        assert!(json.contains(r#""payload""#));

        let parsed = PushFrame::parse(&json).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn push_frame_accepts_null_payload() {
        let frame = PushFrame::parse(r#"{"type":"message","payload":null}"#).unwrap();
        assert_eq!(frame, PushFrame::Message(None));
    }

    #[test]
    fn snapshot_preserves_null_entries() {
        let raw = r#"[{"content":"hi","username":"A"},null]"#;
        let entries = parse_snapshot(raw).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[0].as_ref().and_then(|m| m.content.as_deref()),
            Some("hi")
        );
        assert!(entries[1].is_none());
    }

    #[test]
    fn snapshot_rejects_non_array_body() {
        let result = parse_snapshot(r#"{"oops": true}"#);
        assert!(matches!(result, Err(WireError::Deserialization(_))));
    }
}
