//! Process configuration.
//!
//! All settings come from environment variables (optionally loaded from a
//! `.env` file by `main`). They are read and validated once at startup into a
//! [`NotifierConfig`]; each source check then receives only the subset it needs.
//!
//! A source whose settings are incomplete is disabled on its own, the other
//! sources keep running.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::credentials::TwitchCredentials;
use crate::monitor::{ClipCheckConfig, FeedCheckConfig, LiveCheckConfig};
use crate::notification::DiscordConfig;
use crate::scheduler::{MAX_CHECK_INTERVAL_SECS, SchedulerConfig};
use crate::{Error, Result};

pub const ENV_DISCORD_TOKEN: &str = "DISCORD_TOKEN";
pub const ENV_YOUTUBE_RSS_URL: &str = "YOUTUBE_RSS_URL";
pub const ENV_YT_CHANNEL_ID: &str = "YT_ANNOUNCE_CHANNEL_ID";
pub const ENV_TWITCH_CLIENT_ID: &str = "TWITCH_CLIENT_ID";
pub const ENV_TWITCH_CLIENT_SECRET: &str = "TWITCH_CLIENT_SECRET";
pub const ENV_TWITCH_USERNAME: &str = "TWITCH_USERNAME";
pub const ENV_LIVE_CHANNEL_ID: &str = "LIVE_ANNOUNCE_CHANNEL_ID";
pub const ENV_CLIPS_CHANNEL_ID: &str = "CLIPS_CHANNEL_ID";
pub const ENV_CHECK_INTERVAL: &str = "CHECK_INTERVAL";
pub const ENV_MENTION_EVERYONE: &str = "MENTION_EVERYONE";
pub const ENV_STATE_FILE: &str = "STATE_FILE";
pub const ENV_LOG_DIR: &str = "LOG_DIR";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";

/// Default location of the durable dedup state.
pub const DEFAULT_STATE_FILE: &str = "/app/data/state.json";

/// Default log directory.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Validated configuration for the whole notifier.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub discord: DiscordConfig,
    /// Prefix every announcement with `@everyone`.
    pub mention_everyone: bool,
    pub scheduler: SchedulerConfig,
    pub state_path: PathBuf,
    /// Per-request timeout for outbound HTTP. `None` leaves requests unbounded.
    pub http_timeout: Option<Duration>,
    pub feed: Option<FeedCheckConfig>,
    pub twitch: Option<TwitchCredentials>,
    pub live: Option<LiveCheckConfig>,
    pub clips: Option<ClipCheckConfig>,
}

/// Resolve `LOG_DIR` on its own, so logging can start before the rest of the
/// configuration is validated.
pub fn log_dir_from_env() -> PathBuf {
    log_dir_from_lookup(&|key: &str| std::env::var(key).ok())
}

fn log_dir_from_lookup<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup(ENV_LOG_DIR)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
}

impl NotifierConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bot_token = get(ENV_DISCORD_TOKEN)
            .ok_or_else(|| Error::config(format!("{ENV_DISCORD_TOKEN} must be set")))?;
        let discord = DiscordConfig::new(bot_token);

        let mention_everyone = get(ENV_MENTION_EVERYONE)
            .map(|v| v == "true")
            .unwrap_or(false);

        let scheduler = match get(ENV_CHECK_INTERVAL) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if (1..=MAX_CHECK_INTERVAL_SECS).contains(&secs) => {
                    SchedulerConfig::with_interval_secs(secs)
                }
                _ => {
                    warn!(
                        value = %raw,
                        "Invalid {ENV_CHECK_INTERVAL}; using the default interval"
                    );
                    SchedulerConfig::default()
                }
            },
            None => SchedulerConfig::default(),
        };

        let http_timeout = match get(ENV_HTTP_TIMEOUT_SECS) {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| {
                    Error::config(format!("{ENV_HTTP_TIMEOUT_SECS} must be a number, got {raw}"))
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        let feed = match (get(ENV_YOUTUBE_RSS_URL), get(ENV_YT_CHANNEL_ID)) {
            (Some(url), Some(channel_id)) => match url::Url::parse(&url) {
                Ok(_) => Some(FeedCheckConfig { url, channel_id }),
                Err(e) => {
                    warn!(
                        value = %url,
                        error = %e,
                        "{ENV_YOUTUBE_RSS_URL} is not a valid URL; feed check disabled"
                    );
                    None
                }
            },
            (Some(_), None) => {
                warn!("{ENV_YOUTUBE_RSS_URL} is set but {ENV_YT_CHANNEL_ID} is not; feed check disabled");
                None
            }
            _ => None,
        };

        let twitch = match (get(ENV_TWITCH_CLIENT_ID), get(ENV_TWITCH_CLIENT_SECRET)) {
            (Some(client_id), Some(client_secret)) => Some(TwitchCredentials {
                client_id,
                client_secret,
            }),
            (None, None) => None,
            _ => {
                warn!(
                    "Both {ENV_TWITCH_CLIENT_ID} and {ENV_TWITCH_CLIENT_SECRET} must be set; Twitch checks disabled"
                );
                None
            }
        };

        let username = get(ENV_TWITCH_USERNAME);
        if username.is_some() && twitch.is_none() {
            warn!("{ENV_TWITCH_USERNAME} is set without Twitch credentials; Twitch checks disabled");
        }
        let twitch_user = username.filter(|_| twitch.is_some());

        let live = match (&twitch_user, get(ENV_LIVE_CHANNEL_ID)) {
            (Some(username), Some(channel_id)) => Some(LiveCheckConfig {
                username: username.clone(),
                channel_id,
            }),
            (Some(_), None) => {
                warn!("{ENV_LIVE_CHANNEL_ID} is not set; live-status check disabled");
                None
            }
            _ => None,
        };

        let clips = match (&twitch_user, get(ENV_CLIPS_CHANNEL_ID)) {
            (Some(username), Some(channel_id)) => Some(ClipCheckConfig {
                username: username.clone(),
                channel_id,
            }),
            (Some(_), None) => {
                warn!("{ENV_CLIPS_CHANNEL_ID} is not set; clip check disabled");
                None
            }
            _ => None,
        };

        Ok(Self {
            discord,
            mention_everyone,
            scheduler,
            state_path: get(ENV_STATE_FILE)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
            http_timeout,
            feed,
            twitch,
            live,
            clips,
        })
    }

    /// Whether at least one source check is configured.
    pub fn has_any_source(&self) -> bool {
        self.feed.is_some() || self.live.is_some() || self.clips.is_some()
    }
}
