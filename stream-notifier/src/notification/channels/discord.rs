//! Discord bot channel.
//!
//! Posts plain-text messages to guild channels through the REST API
//! (`/channels/{id}/messages`) authenticated with a bot token.
//!
//! Implements Discord's recommended rate limit handling:
//! - No hardcoded rate limits
//! - Retries on 429 responses respecting the Retry-After header

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::{MessageSink, OutgoingMessage};
use crate::Result;

/// Maximum number of attempts for rate-limited requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Longest rate-limit wait honoured in place. Longer waits fail the send and
/// leave the retry to the next tick.
const MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(5);

/// Discord REST API root.
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Discord bot configuration.
#[derive(Clone)]
pub struct DiscordConfig {
    /// Bot token, sent as `Authorization: Bot <token>`.
    pub bot_token: String,
    /// REST API root.
    pub api_base: String,
}

impl DiscordConfig {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("bot_token", &"<redacted>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ChannelInfo {
    id: String,
}

/// Discord bot messaging channel.
pub struct DiscordChannel {
    config: DiscordConfig,
    client: Client,
    /// Channel ids confirmed to exist and be visible to the bot.
    resolved: Mutex<HashSet<String>>,
}

impl DiscordChannel {
    pub fn new(config: DiscordConfig, client: Client) -> Self {
        Self {
            config,
            client,
            resolved: Mutex::new(HashSet::new()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.config.bot_token)
    }

    /// Build the message payload.
    ///
    /// `allowed_mentions` is always set so an `@everyone` only pings when the
    /// notifier was configured to mention everyone.
    fn build_payload(message: &OutgoingMessage) -> serde_json::Value {
        let parse: &[&str] = if message.mention_everyone {
            &["everyone"]
        } else {
            &[]
        };

        json!({
            "content": message.content,
            "allowed_mentions": { "parse": parse },
        })
    }

    /// Look the channel up once so a bad id fails with a clear error.
    async fn resolve_channel(&self, channel_id: &str) -> Result<()> {
        if self.resolved.lock().contains(channel_id) {
            return Ok(());
        }

        let response = self
            .client
            .get(self.url(&format!("channels/{channel_id}")))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(|e| crate::Error::notification(format!("Discord request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(crate::Error::notification(format!(
                "Could not resolve Discord channel {}: {} - {}",
                channel_id, status, body
            )));
        }

        let info: ChannelInfo = response
            .json()
            .await
            .map_err(|e| crate::Error::notification(format!("Invalid channel response: {}", e)))?;
        debug!(channel_id = %info.id, "Resolved Discord channel");
        self.resolved.lock().insert(info.id);
        Ok(())
    }

    /// Send request with rate limit handling.
    /// Retries on 429 responses respecting the Retry-After header.
    async fn send_with_retry(&self, channel_id: &str, payload: &serde_json::Value) -> Result<()> {
        let url = self.url(&format!("channels/{channel_id}/messages"));
        let mut attempts = 0;

        loop {
            attempts += 1;

            let response = self
                .client
                .post(&url)
                .header(reqwest::header::AUTHORIZATION, self.auth_header())
                .json(payload)
                .send()
                .await
                .map_err(|e| {
                    crate::Error::notification(format!("Discord request failed: {}", e))
                })?;

            let status = response.status();

            if status.is_success() {
                return Ok(());
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = Self::parse_retry_after(response.headers());

                if attempts >= MAX_RATE_LIMIT_RETRIES {
                    warn!(
                        "Discord rate limit: max retries ({}) exceeded, last retry_after was {:?}",
                        MAX_RATE_LIMIT_RETRIES, retry_after
                    );
                    return Err(crate::Error::notification(format!(
                        "Discord rate limit exceeded after {} retries",
                        MAX_RATE_LIMIT_RETRIES
                    )));
                }

                let wait_duration = retry_after.unwrap_or(Duration::from_secs(1));
                if wait_duration > MAX_RATE_LIMIT_WAIT {
                    warn!(
                        "Discord rate limit: retry_after {:?} exceeds {:?}, giving up until next tick",
                        wait_duration, MAX_RATE_LIMIT_WAIT
                    );
                    return Err(crate::Error::notification(format!(
                        "Discord rate limited for {:?}",
                        wait_duration
                    )));
                }
                debug!(
                    "Discord rate limited (429), waiting {:?} before retry (attempt {}/{})",
                    wait_duration, attempts, MAX_RATE_LIMIT_RETRIES
                );
                tokio::time::sleep(wait_duration).await;
                continue;
            }

            if status == StatusCode::NOT_FOUND || status == StatusCode::FORBIDDEN {
                // Channel deleted or permissions revoked since it was resolved.
                self.resolved.lock().remove(channel_id);
            }

            let body = response.text().await.unwrap_or_default();
            return Err(crate::Error::notification(format!(
                "Discord message failed: {} - {}",
                status, body
            )));
        }
    }

    /// Parse the Retry-After duration from a 429 response.
    ///
    /// Values too large for a [`Duration`] saturate to [`Duration::MAX`].
    fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
        ["Retry-After", "X-RateLimit-Reset-After"]
            .iter()
            .filter_map(|name| headers.get(*name))
            .filter_map(|value| value.to_str().ok()?.trim().parse::<f64>().ok())
            .find(|secs| !secs.is_nan() && *secs >= 0.0)
            .map(|secs| Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
    }
}

#[async_trait]
impl MessageSink for DiscordChannel {
    fn channel_type(&self) -> &'static str {
        "discord"
    }

    async fn send_message(&self, channel_id: &str, message: &OutgoingMessage) -> Result<()> {
        self.resolve_channel(channel_id).await?;

        let payload = Self::build_payload(message);
        self.send_with_retry(channel_id, &payload).await?;

        debug!(channel_id = %channel_id, "Discord message sent");
        Ok(())
    }
}
