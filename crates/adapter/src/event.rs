//! Event-level wire decoding.
//!
//! Where segment decoding is lenient per field, event construction is strict:
//! a frame either yields a complete, well-typed [`MessageEvent`] or it yields
//! nothing. No partial events ever reach a handler.

use std::fmt;

use {
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

use crate::{
    error::EventError,
    message::{MessageSegment, decode_segment, lenient_i64},
};

/// Audience category of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Private,
    Group,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Group => "group",
        }
    }

    /// Parse the wire value; `None` for categories this bridge does not know.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "private" => Some(Self::Private),
            "group" => Some(Self::Group),
            _ => None,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who sent the event. Immutable once attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    pub user_id: i64,
    pub nickname: String,
    /// Per-group display name; empty when the sender has none set.
    pub card: String,
    pub role: Option<String>,
}

/// One normalized inbound message event.
///
/// Owns its sender and its ordered segment list exclusively; constructed
/// fresh per frame and discarded after dispatch.
#[derive(Debug, Clone)]
pub struct MessageEvent {
    pub message_id: i64,
    pub message_type: MessageType,
    pub sender: Sender,
    /// Segments in exact wire order; rendering depends on it.
    pub segments: Vec<MessageSegment>,
    pub group_id: Option<i64>,
    pub group_name: Option<String>,
}

fn require<'a>(wire: &'a Value, field: &'static str) -> Result<&'a Value, EventError> {
    wire.get(field).ok_or(EventError::MissingField(field))
}

fn decode_sender(wire: &Value) -> Result<Sender, EventError> {
    let user_id = wire
        .get("user_id")
        .and_then(lenient_i64)
        .ok_or(EventError::MissingField("sender.user_id"))?;
    let nickname = wire
        .get("nickname")
        .and_then(Value::as_str)
        .ok_or(EventError::MissingField("sender.nickname"))?
        .to_string();
    let card = wire
        .get("card")
        .and_then(Value::as_str)
        .ok_or(EventError::MissingField("sender.card"))?
        .to_string();
    let role = wire
        .get("role")
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(Sender {
        user_id,
        nickname,
        card,
        role,
    })
}

/// Build a [`MessageEvent`] from a parsed wire frame.
///
/// All-or-nothing: a missing required field, an unknown category, or a single
/// undecodable segment abandons the whole event.
pub fn build_event(wire: &Value) -> Result<MessageEvent, EventError> {
    let message_id = lenient_i64(require(wire, "message_id")?)
        .ok_or(EventError::MissingField("message_id"))?;

    let raw_type = require(wire, "message_type")?
        .as_str()
        .ok_or(EventError::MissingField("message_type"))?;
    let message_type = MessageType::from_wire(raw_type)
        .ok_or_else(|| EventError::UnknownMessageType(raw_type.to_string()))?;

    let sender = decode_sender(require(wire, "sender")?)?;

    let segments = match wire.get("message") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(decode_segment)
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(EventError::MissingField("message")),
    };

    Ok(MessageEvent {
        message_id,
        message_type,
        sender,
        segments,
        group_id: wire.get("group_id").and_then(lenient_i64),
        group_name: wire
            .get("group_name")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}
