use std::sync::Arc;

use async_trait::async_trait;
use platforms_api::youtube::{FeedSource, extract_latest_video_id};
use tracing::{debug, info};

use super::check::{CheckContext, SourceCheck};
use crate::Result;
use crate::notification::NotificationEvent;

#[derive(Debug, Clone)]
pub struct FeedCheckConfig {
    /// Feed document URL.
    pub url: String,
    /// Destination channel for new-video announcements.
    pub channel_id: String,
}

/// Announces the newest item of a channel feed.
pub struct FeedCheck {
    config: FeedCheckConfig,
    source: Arc<dyn FeedSource>,
}

impl FeedCheck {
    pub fn new(config: FeedCheckConfig, source: Arc<dyn FeedSource>) -> Self {
        Self { config, source }
    }
}

#[async_trait]
impl SourceCheck for FeedCheck {
    fn name(&self) -> &'static str {
        "feed"
    }

    async fn check(&self, ctx: &mut CheckContext<'_>) -> Result<()> {
        let raw = self.source.fetch_feed(&self.config.url).await?;

        let Some(video_id) = extract_latest_video_id(&raw) else {
            debug!(url = %self.config.url, "No video id found in feed");
            return Ok(());
        };

        if ctx.state.get().last_video_id.as_deref() == Some(video_id) {
            return Ok(());
        }

        let video_id = video_id.to_string();
        info!(video_id = %video_id, "New video detected");
        ctx.state
            .update(|state| state.last_video_id = Some(video_id.clone()));

        ctx.emitter
            .notify(
                &self.config.channel_id,
                &NotificationEvent::NewVideo { video_id },
            )
            .await
    }
}
