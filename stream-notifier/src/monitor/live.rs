use std::sync::Arc;

use async_trait::async_trait;
use platforms_api::twitch::TwitchApi;
use tracing::{debug, info};

use super::check::{CheckContext, SourceCheck, authed};
use crate::Result;
use crate::credentials::TokenCache;
use crate::notification::NotificationEvent;

#[derive(Debug, Clone)]
pub struct LiveCheckConfig {
    /// Twitch login to watch.
    pub username: String,
    /// Destination channel for go-live announcements.
    pub channel_id: String,
}

/// Announces offline → live transitions.
///
/// Going offline is recorded silently; repeated observations of the same
/// status neither write state nor notify.
pub struct LiveStatusCheck {
    config: LiveCheckConfig,
    api: Arc<dyn TwitchApi>,
    tokens: Arc<TokenCache>,
}

impl LiveStatusCheck {
    pub fn new(config: LiveCheckConfig, api: Arc<dyn TwitchApi>, tokens: Arc<TokenCache>) -> Self {
        Self {
            config,
            api,
            tokens,
        }
    }
}

#[async_trait]
impl SourceCheck for LiveStatusCheck {
    fn name(&self) -> &'static str {
        "live"
    }

    async fn check(&self, ctx: &mut CheckContext<'_>) -> Result<()> {
        let token = self.tokens.get_token().await?;
        let streams = authed(
            &self.tokens,
            self.api.get_streams(&token, &self.config.username).await,
        )?;
        let is_live = !streams.is_empty();

        match (ctx.state.get().was_live, is_live) {
            (false, true) => {
                info!(username = %self.config.username, "Stream went live");
                ctx.state.update(|state| state.was_live = true);
                ctx.emitter
                    .notify(
                        &self.config.channel_id,
                        &NotificationEvent::StreamOnline {
                            username: self.config.username.clone(),
                        },
                    )
                    .await
            }
            (true, false) => {
                info!(username = %self.config.username, "Stream went offline");
                ctx.state.update(|state| state.was_live = false);
                Ok(())
            }
            _ => {
                debug!(username = %self.config.username, is_live, "Live status unchanged");
                Ok(())
            }
        }
    }
}
