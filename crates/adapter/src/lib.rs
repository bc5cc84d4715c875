//! Event ingestion pipeline for the upstream chat gateway.
//!
//! Owns the persistent WebSocket connection, decodes loosely-typed wire
//! frames into the typed event model, and dispatches events by category
//! through the router. Malformed frames never kill the connection; only
//! transport failures do.

pub mod client;
pub mod error;
pub mod event;
pub mod message;
pub mod router;

pub use {
    client::BotAdapter,
    error::{AdapterError, EventError, SegmentError},
    event::{MessageEvent, MessageType, Sender, build_event},
    message::{MessageSegment, decode_segment},
    router::{EventHandler, EventRouter},
};
