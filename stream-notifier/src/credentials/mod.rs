//! Twitch app credentials and the process-wide bearer token cache.

mod error;
mod token_cache;

pub use error::CredentialError;
pub use token_cache::{TokenCache, TokenState};

/// Client credentials registered for the Twitch application.
#[derive(Clone)]
pub struct TwitchCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for TwitchCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwitchCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
