//! Wire messages shared with the feed service.
//!
//! Frames are JSON event envelopes of the form
//! `{"event": <name>, "data": <payload>}`. Inbound payloads are opaque and
//! are never validated or transformed on the way to the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outbound events sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Requests subscription to a room.
    Join {
        /// Room naming the subscription group.
        room: String,
    },
}

/// Inbound events the client listens for.
///
/// Envelopes carrying any other event name fail to decode and are skipped
/// by the connection worker, like events with no registered listener.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Live announcement payload.
    News(Value),
    /// Historical announcements delivered to a newly joined subscriber.
    NewsBacklog(Value),
}

impl ClientMessage {
    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl ServerMessage {
    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ClientMessage, ServerMessage};

    #[test]
    fn join_encodes_event_name_and_room_payload() {
        let msg = ClientMessage::Join {
            room: "secret_announcements".to_string(),
        };
        let text = msg.to_text().expect("encode");
        assert_eq!(
            text,
            r#"{"event":"join","data":{"room":"secret_announcements"}}"#
        );
    }

    #[test]
    fn news_decodes_scalar_payload_untouched() {
        let msg = ServerMessage::from_text(r#"{"event":"news","data":"C"}"#).expect("decode");
        assert_eq!(msg, ServerMessage::News(json!("C")));
    }

    #[test]
    fn news_backlog_decodes_array_payload_untouched() {
        let msg = ServerMessage::from_text(r#"{"event":"news_backlog","data":["A","B"]}"#)
            .expect("decode");
        assert_eq!(msg, ServerMessage::NewsBacklog(json!(["A", "B"])));
    }

    #[test]
    fn nested_payload_shape_is_preserved() {
        let msg = ServerMessage::from_text(
            r#"{"event":"news","data":{"headline":"h","tags":["a"],"priority":2}}"#,
        )
        .expect("decode");
        assert_eq!(
            msg,
            ServerMessage::News(json!({"headline": "h", "tags": ["a"], "priority": 2}))
        );
    }

    #[test]
    fn unsubscribed_event_names_fail_to_decode() {
        assert!(ServerMessage::from_text(r#"{"event":"presence","data":{}}"#).is_err());
    }
}
