//! The chat message entity.

use serde::{Deserialize, Serialize};

/// A single chat message as exchanged with the server.
///
/// Every field is optional on the wire: the server relays whatever its
/// sources produced, and a shape-deficient message is still a message.
/// Absent fields are substituted with display placeholders at render time,
/// never used to drop the entry. There is no unique id; a message's position
/// in the feed is its only identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Originator label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Server-side creation timestamp, RFC 3339 when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Message {
    /// Build an outbound message with the given content and sender label.
    ///
    /// `createdAt` is stamped by the server on broadcast and is left unset.
    pub fn outbound(content: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            username: Some(username.into()),
            created_at: None,
        }
    }
}
