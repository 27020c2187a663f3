use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use platforms_api::twitch::TwitchApi;
use tracing::{debug, info};

use super::check::{CheckContext, SourceCheck, authed};
use crate::Result;
use crate::credentials::TokenCache;
use crate::notification::NotificationEvent;

#[derive(Debug, Clone)]
pub struct ClipCheckConfig {
    /// Twitch login whose clips are announced.
    pub username: String,
    /// Destination channel for clip announcements.
    pub channel_id: String,
}

/// Announces the newest clip of a channel.
pub struct ClipCheck {
    config: ClipCheckConfig,
    api: Arc<dyn TwitchApi>,
    tokens: Arc<TokenCache>,
    /// User id for `config.username`, resolved once.
    broadcaster_id: Mutex<Option<String>>,
}

impl ClipCheck {
    pub fn new(config: ClipCheckConfig, api: Arc<dyn TwitchApi>, tokens: Arc<TokenCache>) -> Self {
        Self {
            config,
            api,
            tokens,
            broadcaster_id: Mutex::new(None),
        }
    }

    async fn resolve_broadcaster_id(&self, token: &str) -> Result<Option<String>> {
        let cached = self.broadcaster_id.lock().clone();
        if cached.is_some() {
            return Ok(cached);
        }

        let users = authed(
            &self.tokens,
            self.api.get_users(token, &self.config.username).await,
        )?;
        let Some(user) = users.into_iter().next() else {
            return Ok(None);
        };

        debug!(username = %self.config.username, user_id = %user.id, "Resolved Twitch user id");
        *self.broadcaster_id.lock() = Some(user.id.clone());
        Ok(Some(user.id))
    }
}

#[async_trait]
impl SourceCheck for ClipCheck {
    fn name(&self) -> &'static str {
        "clips"
    }

    async fn check(&self, ctx: &mut CheckContext<'_>) -> Result<()> {
        let token = self.tokens.get_token().await?;

        let Some(broadcaster_id) = self.resolve_broadcaster_id(&token).await? else {
            debug!(username = %self.config.username, "Twitch user not found");
            return Ok(());
        };

        let clips = authed(
            &self.tokens,
            self.api.get_clips(&token, &broadcaster_id, 1).await,
        )?;
        let Some(clip) = clips.into_iter().next() else {
            return Ok(());
        };

        if ctx.state.get().last_clip_id.as_deref() == Some(clip.id.as_str()) {
            return Ok(());
        }

        info!(clip_id = %clip.id, "New clip detected");
        ctx.state
            .update(|state| state.last_clip_id = Some(clip.id.clone()));

        ctx.emitter
            .notify(
                &self.config.channel_id,
                &NotificationEvent::NewClip {
                    clip_id: clip.id,
                    url: clip.url,
                },
            )
            .await
    }
}
