//! Event handlers registered on the router by the binary.
//!
//! Both handlers log the event and, when a store is configured, persist a
//! `message_record` row. Insert failures are logged and swallowed — a broken
//! database must never disturb the receive loop.

use std::sync::Arc;

use {
    async_trait::async_trait,
    tracing::{error, info},
};

use {
    ponte_adapter::{EventHandler, MessageEvent},
    ponte_store::{MessageRecord, MessageStore},
};

/// Handles direct (friend) messages.
pub struct FriendMessageHandler {
    store: Option<Arc<MessageStore>>,
}

impl FriendMessageHandler {
    pub fn new(store: Option<Arc<MessageStore>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventHandler for FriendMessageHandler {
    async fn handle(&self, event: &MessageEvent) {
        info!(
            sender = event.sender.user_id,
            message = %render(event),
            "friend message"
        );
        persist(self.store.as_deref(), event).await;
    }
}

/// Handles group messages.
pub struct GroupMessageHandler {
    store: Option<Arc<MessageStore>>,
}

impl GroupMessageHandler {
    pub fn new(store: Option<Arc<MessageStore>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventHandler for GroupMessageHandler {
    async fn handle(&self, event: &MessageEvent) {
        info!(
            sender = event.sender.user_id,
            group = event.group_id,
            message = %render(event),
            "group message"
        );
        persist(self.store.as_deref(), event).await;
    }
}

fn render(event: &MessageEvent) -> String {
    event
        .segments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

async fn persist(store: Option<&MessageStore>, event: &MessageEvent) {
    let Some(store) = store else { return };
    let record = MessageRecord::from_event(event);
    if let Err(e) = store.insert(&record).await {
        error!(
            message_id = event.message_id,
            error = %e,
            "failed to persist message record"
        );
    }
}

#[cfg(test)]
mod tests {
    use {ponte_adapter::build_event, serde_json::json};

    use super::*;

    fn group_event() -> MessageEvent {
        build_event(&json!({
            "message_id": 20,
            "message_type": "group",
            "sender": {"user_id": 9, "nickname": "n", "card": "c"},
            "message": [
                {"type": "at", "data": {"qq": 3}},
                {"type": "text", "data": {"text": "hello"}},
            ],
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn group_handler_persists_a_record() {
        let store = Arc::new(MessageStore::connect("sqlite::memory:").await.unwrap());
        let handler = GroupMessageHandler::new(Some(Arc::clone(&store)));

        handler.handle(&group_event()).await;
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn handlers_without_a_store_only_log() {
        let handler = FriendMessageHandler::new(None);
        // Must not panic or block; there is nothing else observable.
        handler.handle(&group_event()).await;
    }
}
