//! Message delivery.
//!
//! The core only needs "resolve a channel by id and post text to it". That
//! capability is the [`MessageSink`] trait; [`DiscordChannel`] implements it
//! against the Discord bot REST API.

mod discord;

pub use discord::{DiscordChannel, DiscordConfig};

use async_trait::async_trait;

use crate::Result;

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub content: String,
    /// Whether an `@everyone` in `content` should actually ping.
    pub mention_everyone: bool,
}

/// Trait for messaging backends.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Get the sink type name.
    fn channel_type(&self) -> &'static str;

    /// Resolve `channel_id` and post `message` to it.
    async fn send_message(&self, channel_id: &str, message: &OutgoingMessage) -> Result<()>;
}
