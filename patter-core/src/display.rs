//! Display rules for rendering a message.
//!
//! Shape-deficient messages are rendered with placeholders, never dropped
//! and never a panic. The placeholders are fixed strings so a presentation
//! layer can rely on them.

use chrono::{DateTime, Local};
use patter_types::Message;

/// Label shown when a message has no `username`.
pub const UNKNOWN_SENDER: &str = "Unknown";

/// Body shown when a message has no `content`.
pub const EMPTY_CONTENT: &str = "No message";

/// Marker shown when a message has no `createdAt`.
pub const NO_DATE: &str = "No date";

/// Marker shown when `createdAt` does not parse as a date.
pub const INVALID_DATE: &str = "Invalid Date";

/// The label to display for a message's sender.
///
/// Rendering only; never used as an identity signal.
pub fn sender_label(message: &Message) -> &str {
    message.username.as_deref().unwrap_or(UNKNOWN_SENDER)
}

/// The body text to display for a message.
pub fn content_text(message: &Message) -> &str {
    message.content.as_deref().unwrap_or(EMPTY_CONTENT)
}

/// Format a raw `createdAt` value for display.
///
/// The mapping is total and the three outcomes are mutually exclusive:
/// absent → [`NO_DATE`], unparseable → [`INVALID_DATE`], valid RFC 3339 →
/// the instant formatted in local time.
pub fn format_timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return NO_DATE.to_string();
    };
    match DateTime::parse_from_rfc3339(raw) {
        Ok(instant) => instant.with_timezone(&Local).format("%c").to_string(),
        Err(_) => INVALID_DATE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_username_renders_unknown() {
        let msg = Message {
            content: Some("hi".into()),
            username: None,
            created_at: None,
        };
        assert_eq!(sender_label(&msg), UNKNOWN_SENDER);
    }

    #[test]
    fn missing_content_renders_placeholder() {
        let msg = Message {
            content: None,
            username: Some("A".into()),
            created_at: None,
        };
        assert_eq!(content_text(&msg), EMPTY_CONTENT);
    }

    #[test]
    fn present_fields_render_verbatim() {
        let msg = Message::outbound("hello", "Sender 1");
        assert_eq!(sender_label(&msg), "Sender 1");
        assert_eq!(content_text(&msg), "hello");
    }

    #[test]
    fn absent_timestamp_is_no_date() {
        assert_eq!(format_timestamp(None), NO_DATE);
    }

    #[test]
    fn unparseable_timestamp_is_invalid_date() {
        assert_eq!(format_timestamp(Some("not-a-date")), INVALID_DATE);
        assert_eq!(format_timestamp(Some("")), INVALID_DATE);
    }

    #[test]
    fn valid_timestamp_formats_as_local_time() {
        let raw = "2024-01-11T12:00:00Z";
        let formatted = format_timestamp(Some(raw));

        let expected = DateTime::parse_from_rfc3339(raw)
            .unwrap()
            .with_timezone(&Local)
            .format("%c")
            .to_string();
        assert_eq!(formatted, expected);
        assert_ne!(formatted, NO_DATE);
        assert_ne!(formatted, INVALID_DATE);
    }
}
