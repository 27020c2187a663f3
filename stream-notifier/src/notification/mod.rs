//! Outbound announcements.
//!
//! Source checks hand a [`NotificationEvent`] and a destination channel id to
//! the [`NotificationEmitter`], which renders the text, applies the optional
//! `@everyone` prefix and delegates delivery to a [`MessageSink`]. The
//! production sink is the Discord bot REST API.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use stream_notifier::notification::{DiscordChannel, DiscordConfig, NotificationEmitter, NotificationEvent};
//!
//! let discord = DiscordChannel::new(DiscordConfig::new("bot-token"), reqwest::Client::new());
//! let emitter = NotificationEmitter::new(Arc::new(discord), true);
//! emitter
//!     .notify("123456789", &NotificationEvent::NewVideo { video_id: "abc123".into() })
//!     .await?;
//! ```

pub mod channels;
mod emitter;
mod events;

pub use channels::{DiscordChannel, DiscordConfig, MessageSink, OutgoingMessage};
pub use emitter::NotificationEmitter;
pub use events::NotificationEvent;
