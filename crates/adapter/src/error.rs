use {thiserror::Error, tokio_tungstenite::tungstenite};

/// Failure decoding a single wire segment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    /// The segment carried no `data` mapping at all. An empty mapping is
    /// fine (fields default); a missing one is not.
    #[error("segment has no data field")]
    MissingData,

    /// The `type` discriminator names a segment kind this bridge does not
    /// understand.
    #[error("unsupported segment type: {0:?}")]
    UnsupportedType(String),
}

/// Failure constructing a [`MessageEvent`](crate::event::MessageEvent) from a
/// wire frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// A required event or sender field is absent.
    #[error("event is missing required field: {0}")]
    MissingField(&'static str),

    /// `message_type` is present but names no known category.
    #[error("unknown message type: {0:?}")]
    UnknownMessageType(String),

    /// One of the `message` segments failed to decode; the whole event is
    /// abandoned rather than delivered with holes.
    #[error(transparent)]
    Segment(#[from] SegmentError),
}

/// Fatal connection-level failure. Everything below the receive loop is
/// recovered in place; these are the only errors that escape
/// [`BotAdapter::run`](crate::client::BotAdapter::run).
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The opening handshake failed.
    #[error("failed to connect to gateway: {0}")]
    Connect(#[source] tungstenite::Error),

    /// The established connection died mid-stream.
    #[error("gateway connection lost: {0}")]
    Transport(#[source] tungstenite::Error),

    /// The configured bearer token cannot be sent as an HTTP header value.
    #[error("auth token is not a valid header value")]
    Token(#[from] http::header::InvalidHeaderValue),
}
