//! Lazily fetched app access token shared by the Twitch checks.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use platforms_api::twitch::TwitchApi;
use tracing::{debug, info, warn};

use super::CredentialError;

/// Tokens this close to their reported expiry are exchanged again.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Lifecycle of the cached bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenState {
    /// Nothing fetched yet.
    Unset,
    /// A token the platform accepted (or has not yet rejected).
    Valid {
        token: String,
        /// Expiry reported by the exchange, if any.
        expires_at: Option<DateTime<Utc>>,
    },
    /// The platform rejected the last token; the next request re-exchanges.
    Invalid { reason: String },
}

impl TokenState {
    /// The token to use at `now`, if one is usable.
    fn usable_token(&self, now: DateTime<Utc>) -> Option<&str> {
        match self {
            Self::Valid { token, expires_at } => {
                let expiring = expires_at
                    .is_some_and(|at| at - Duration::seconds(EXPIRY_MARGIN_SECS) <= now);
                (!expiring).then_some(token.as_str())
            }
            Self::Unset | Self::Invalid { .. } => None,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

/// Process-lifetime cache for the Twitch app access token.
///
/// The token is fetched on first use and reused until it nears its reported
/// expiry or a check reports that the platform rejected it.
pub struct TokenCache {
    api: Arc<dyn TwitchApi>,
    state: Mutex<TokenState>,
}

impl TokenCache {
    pub fn new(api: Arc<dyn TwitchApi>) -> Self {
        Self {
            api,
            state: Mutex::new(TokenState::Unset),
        }
    }

    /// Return the cached token, exchanging client credentials when needed.
    pub async fn get_token(&self) -> Result<String, CredentialError> {
        let cached = self
            .state
            .lock()
            .usable_token(Utc::now())
            .map(str::to_string);
        if let Some(token) = cached {
            return Ok(token);
        }

        debug!("Exchanging client credentials for a new app access token");
        let fresh = self.api.exchange_token().await?;

        // Lifetimes beyond chrono's range are treated as non-expiring.
        let expires_at = fresh
            .expires_in
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));

        *self.state.lock() = TokenState::Valid {
            token: fresh.access_token.clone(),
            expires_at,
        };
        info!(expires_at = ?expires_at, "Twitch app access token cached");

        Ok(fresh.access_token)
    }

    /// Mark the cached token as rejected so the next call re-exchanges.
    pub fn invalidate(&self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(reason = %reason, "Invalidating cached Twitch app access token");
        *self.state.lock() = TokenState::Invalid { reason };
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> TokenState {
        self.state.lock().clone()
    }
}
