//! Notification events.

use platforms_api::{twitch, youtube};

/// Something worth announcing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// A new upload appeared at the top of the channel feed.
    NewVideo { video_id: String },
    /// The monitored stream went from offline to live.
    StreamOnline { username: String },
    /// A clip we have not announced yet.
    NewClip { clip_id: String, url: String },
}

impl NotificationEvent {
    /// Stable snake_case name, used in logs.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::NewVideo { .. } => "new_video",
            Self::StreamOnline { .. } => "stream_online",
            Self::NewClip { .. } => "new_clip",
        }
    }

    /// Message body without any mention prefix.
    pub fn render(&self) -> String {
        match self {
            Self::NewVideo { video_id } => {
                format!("🎬 New YouTube video!\n{}", youtube::video_url(video_id))
            }
            Self::StreamOnline { username } => {
                format!(
                    "🔴 {username} is LIVE on Twitch!\n{}",
                    twitch::channel_url(username)
                )
            }
            Self::NewClip { url, .. } => format!("✂️ New Twitch clip!\n{url}"),
        }
    }
}
