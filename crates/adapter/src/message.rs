//! Segment-level wire decoding.
//!
//! A message event carries an ordered list of content segments. Each wire
//! segment is `{"type": <str>, "data": {...}}`; upstream gateways are loose
//! about field presence and stringify large ids, so decoding is lenient per
//! field but strict about the discriminator itself.

use std::fmt;

use serde_json::Value;

use crate::error::SegmentError;

/// One content unit inside a message event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageSegment {
    /// Plain text.
    Text { text: String },

    /// Mention of another participant. `target` is `0` when the upstream
    /// did not resolve the mention.
    At { target: i64 },

    /// Reference to an earlier message, optionally wrapping that message's
    /// content. The wire decoder never fills `source`; it is populated by
    /// code paths that look the referenced message up.
    Replay {
        id: i64,
        source: Option<Box<MessageSegment>>,
    },
}

impl MessageSegment {
    /// Wire discriminator for this segment kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::At { .. } => "at",
            Self::Replay { .. } => "replay",
        }
    }
}

impl fmt::Display for MessageSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { text } => write!(f, "{text}"),
            Self::At { target } => write!(f, "@{target}"),
            Self::Replay {
                id,
                source: Some(source),
            } => write!(f, "[replay of message {id}: {source}]"),
            Self::Replay { id, source: None } => write!(f, "[replay of message {id}]"),
        }
    }
}

/// Read an integer field that upstreams send as a number or a numeric
/// string. Anything else counts as absent.
pub(crate) fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn int_field(data: &Value, key: &str) -> Option<i64> {
    data.get(key).and_then(lenient_i64)
}

/// Decode one wire segment.
///
/// Pure and total over its error cases: a missing `data` mapping fails with
/// [`SegmentError::MissingData`], an unrecognized discriminator with
/// [`SegmentError::UnsupportedType`]. Everything else defaults field by
/// field rather than failing.
pub fn decode_segment(wire: &Value) -> Result<MessageSegment, SegmentError> {
    let kind = wire.get("type").and_then(Value::as_str).unwrap_or_default();
    let Some(data) = wire.get("data") else {
        return Err(SegmentError::MissingData);
    };

    match kind {
        "text" => Ok(MessageSegment::Text {
            text: data
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }),
        "at" => {
            // Gateways disagree on the field name: `target` wins, `qq` is
            // the fallback, zero means unresolved.
            let target = int_field(data, "target")
                .filter(|t| *t != 0)
                .or_else(|| int_field(data, "qq"))
                .unwrap_or(0);
            Ok(MessageSegment::At { target })
        },
        // `reply` is an upstream alias for the same segment kind.
        "replay" | "reply" => Ok(MessageSegment::Replay {
            id: int_field(data, "id").unwrap_or(0),
            source: None,
        }),
        other => Err(SegmentError::UnsupportedType(other.to_string())),
    }
}
