use std::sync::Arc;

use tracing::{debug, info};

use super::channels::{MessageSink, OutgoingMessage};
use super::events::NotificationEvent;
use crate::Result;

const MENTION_EVERYONE_PREFIX: &str = "@everyone ";

/// Formats announcements and hands them to the messaging sink.
pub struct NotificationEmitter {
    sink: Arc<dyn MessageSink>,
    mention_everyone: bool,
}

impl NotificationEmitter {
    pub fn new(sink: Arc<dyn MessageSink>, mention_everyone: bool) -> Self {
        Self {
            sink,
            mention_everyone,
        }
    }

    /// Send `text` to `channel_id`, with the `@everyone` prefix when configured.
    pub async fn emit(&self, channel_id: &str, text: &str) -> Result<()> {
        let message = if self.mention_everyone {
            OutgoingMessage {
                content: format!("{MENTION_EVERYONE_PREFIX}{text}"),
                mention_everyone: true,
            }
        } else {
            OutgoingMessage {
                content: text.to_string(),
                mention_everyone: false,
            }
        };

        self.sink.send_message(channel_id, &message).await?;
        debug!(
            channel_id = %channel_id,
            sink = self.sink.channel_type(),
            "Notification sent"
        );
        Ok(())
    }

    /// Render and send an event.
    pub async fn notify(&self, channel_id: &str, event: &NotificationEvent) -> Result<()> {
        info!(
            event = event.event_type(),
            channel_id = %channel_id,
            "Sending announcement"
        );
        self.emit(channel_id, &event.render()).await
    }
}
