//! Projection of a normalized event into a `message_record` row.

use {
    chrono::{Local, NaiveDateTime},
    ponte_adapter::{MessageEvent, MessageSegment, MessageType},
};

/// One row of the `message_record` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub message_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub send_time: NaiveDateTime,
    pub group_id: Option<String>,
    pub group_name: Option<String>,
    pub content: String,
    /// Comma-joined mention targets; `None` when the message mentions nobody.
    pub at_target_list: Option<String>,
}

impl MessageRecord {
    /// Flatten an event into a row. `content` is the segments rendered in
    /// wire order, joined by single spaces; group metadata and the mention
    /// list only apply to group events.
    pub fn from_event(event: &MessageEvent) -> Self {
        let content = event
            .segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");

        let is_group = event.message_type == MessageType::Group;

        // Group members often set a per-group card; prefer it when present.
        let sender_name = if is_group && !event.sender.card.is_empty() {
            event.sender.card.clone()
        } else {
            event.sender.nickname.clone()
        };

        let at_target_list = if is_group {
            let targets: Vec<String> = event
                .segments
                .iter()
                .filter_map(|segment| match segment {
                    MessageSegment::At { target } if *target != 0 => Some(target.to_string()),
                    _ => None,
                })
                .collect();
            (!targets.is_empty()).then(|| targets.join(","))
        } else {
            None
        };

        Self {
            message_id: event.message_id.to_string(),
            sender_id: event.sender.user_id.to_string(),
            sender_name,
            send_time: Local::now().naive_local(),
            group_id: is_group
                .then(|| event.group_id.map(|id| id.to_string()))
                .flatten(),
            group_name: is_group.then(|| event.group_name.clone()).flatten(),
            content,
            at_target_list,
        }
    }
}
