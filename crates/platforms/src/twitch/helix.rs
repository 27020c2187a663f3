use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::models::{AppAccessToken, Clip, HelixResponse, Stream, User};
use crate::error::ApiError;

pub const DEFAULT_AUTH_BASE: &str = "https://id.twitch.tv";
pub const DEFAULT_API_BASE: &str = "https://api.twitch.tv/helix";

const CHANNEL_URL_BASE: &str = "https://twitch.tv";

/// Public channel page for a login name.
pub fn channel_url(login: &str) -> String {
    format!("{CHANNEL_URL_BASE}/{login}")
}

/// The subset of the Twitch API the notifier relies on.
///
/// Every call except [`TwitchApi::exchange_token`] needs an app access token.
#[async_trait]
pub trait TwitchApi: Send + Sync {
    /// Exchange the configured client credentials for an app access token.
    async fn exchange_token(&self) -> Result<AppAccessToken, ApiError>;

    /// Active streams for a login. Empty when offline.
    async fn get_streams(&self, token: &str, user_login: &str) -> Result<Vec<Stream>, ApiError>;

    /// Resolve a login to its user record.
    async fn get_users(&self, token: &str, login: &str) -> Result<Vec<User>, ApiError>;

    /// Clips for a broadcaster id, at most `first` entries.
    async fn get_clips(
        &self,
        token: &str,
        broadcaster_id: &str,
        first: u32,
    ) -> Result<Vec<Clip>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HelixConfig {
    pub client_id: String,
    pub client_secret: String,
    /// OAuth host, `https://id.twitch.tv` in production.
    pub auth_base: String,
    /// Helix root, `https://api.twitch.tv/helix` in production.
    pub api_base: String,
}

impl HelixConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_base: DEFAULT_AUTH_BASE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

pub struct HelixClient {
    client: Client,
    config: HelixConfig,
}

impl HelixClient {
    pub fn new(client: Client, config: HelixConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(base: &str, path: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    async fn get_helix<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ApiError> {
        let url = Self::endpoint(&self.config.api_base, path);
        let response = self
            .client
            .get(&url)
            .header("Client-ID", &self.config.client_id)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }

        let body = response.text().await?;
        let parsed: HelixResponse<T> = serde_json::from_str(&body)?;
        debug!(path = %path, count = parsed.data.len(), "Helix request completed");
        Ok(parsed.data)
    }
}

#[async_trait]
impl TwitchApi for HelixClient {
    async fn exchange_token(&self) -> Result<AppAccessToken, ApiError> {
        let url = Self::endpoint(&self.config.auth_base, "oauth2/token");
        let response = self
            .client
            .post(&url)
            .query(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::from_response(response).await);
        }

        let token: AppAccessToken = response.json().await?;
        debug!(expires_in = ?token.expires_in, "Obtained Twitch app access token");
        Ok(token)
    }

    async fn get_streams(&self, token: &str, user_login: &str) -> Result<Vec<Stream>, ApiError> {
        self.get_helix(token, "streams", &[("user_login", user_login)])
            .await
    }

    async fn get_users(&self, token: &str, login: &str) -> Result<Vec<User>, ApiError> {
        self.get_helix(token, "users", &[("login", login)]).await
    }

    async fn get_clips(
        &self,
        token: &str,
        broadcaster_id: &str,
        first: u32,
    ) -> Result<Vec<Clip>, ApiError> {
        let first = first.to_string();
        self.get_helix(
            token,
            "clips",
            &[("broadcaster_id", broadcaster_id), ("first", first.as_str())],
        )
        .await
    }
}
