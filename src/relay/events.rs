//! Events pushed to the browser over the chat stream.

use serde::{Deserialize, Serialize};

/// One event pushed to the browser.
///
/// Serialises as `{"type":"message","content":…}`,
/// `{"type":"completed_message","content":…}` or `{"type":"stream_end"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A single upstream delta, not the running total.
    Message { content: String },
    /// Full accumulated text, or the classified failure text.
    CompletedMessage { content: String },
    /// Always the last event of a response.
    StreamEnd,
}

impl StreamEvent {
    pub fn message(content: impl Into<String>) -> Self {
        StreamEvent::Message { content: content.into() }
    }

    pub fn completed(content: impl Into<String>) -> Self {
        StreamEvent::CompletedMessage { content: content.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn json(event: &StreamEvent) -> String {
        serde_json::to_string(event).unwrap()
    }

    #[test]
    fn message_shape() {
        assert_eq!(json(&StreamEvent::message("Hi")), r#"{"type":"message","content":"Hi"}"#);
    }

    #[test]
    fn completed_shape() {
        assert_eq!(
            json(&StreamEvent::completed("Hi there")),
            r#"{"type":"completed_message","content":"Hi there"}"#
        );
    }

    #[test]
    fn stream_end_has_no_payload() {
        assert_eq!(json(&StreamEvent::StreamEnd), r#"{"type":"stream_end"}"#);
    }

    #[test]
    fn content_newlines_are_escaped() {
        let text = json(&StreamEvent::message("a\nb"));
        assert!(!text.contains('\n'));
        let back: StreamEvent = serde_json::from_str(&text).unwrap();
        assert_eq!(back, StreamEvent::message("a\nb"));
    }
}
