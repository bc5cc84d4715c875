//! Category-to-handler dispatch.

use std::collections::HashMap;

use {async_trait::async_trait, tracing::debug};

use crate::event::MessageEvent;

/// Downstream consumer of normalized events. Implementations are expected to
/// be fast and non-failing; the receive loop awaits them inline, so a slow
/// handler delays ingestion of the next frame.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &MessageEvent);
}

/// Registry mapping an event category to its handler.
///
/// Populated once at startup and read-only afterwards; dispatch for a
/// category with no handler is a deliberate no-op, because upstreams send
/// event kinds the bridge does not yet understand.
#[derive(Default)]
pub struct EventRouter {
    handlers: HashMap<String, Box<dyn EventHandler>>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for a category, replacing any previous one.
    pub fn register(&mut self, category: impl Into<String>, handler: Box<dyn EventHandler>) {
        self.handlers.insert(category.into(), handler);
    }

    /// Registered categories, for startup logging.
    pub fn categories(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    /// Dispatch an event to its category's handler, if one is registered.
    pub async fn route(&self, event: &MessageEvent) {
        match self.handlers.get(event.message_type.as_str()) {
            Some(handler) => handler.handle(event).await,
            None => {
                debug!(
                    category = event.message_type.as_str(),
                    message_id = event.message_id,
                    "no handler for category; dropping event"
                );
            },
        }
    }
}
