use async_trait::async_trait;
use platforms_api::ApiError;
use tracing::{error, warn};

use crate::{Error, Result};
use crate::credentials::TokenCache;
use crate::notification::NotificationEmitter;
use crate::state::TrackedState;

/// Everything a check may touch during a tick.
pub struct CheckContext<'a> {
    pub state: &'a mut TrackedState,
    pub emitter: &'a NotificationEmitter,
}

/// One independently configured monitor.
#[async_trait]
pub trait SourceCheck: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch one snapshot, compare it with the state and notify on change.
    async fn check(&self, ctx: &mut CheckContext<'_>) -> Result<()>;

    /// Run [`SourceCheck::check`] and log any failure instead of returning it.
    ///
    /// A failed tick is a no-op for this source; the next tick retries.
    async fn run_once(&self, ctx: &mut CheckContext<'_>) {
        match self.check(ctx).await {
            Ok(()) => {}
            Err(Error::Credential(e)) if e.requires_reconfiguration() => {
                error!(
                    source = self.name(),
                    error = %e,
                    "Client credentials were rejected; check TWITCH_CLIENT_ID and TWITCH_CLIENT_SECRET"
                );
            }
            Err(e) => warn!(source = self.name(), error = %e, "Source check failed"),
        }
    }
}

/// Pass an authenticated API result through, invalidating the cached token
/// when the platform rejected it.
pub(super) fn authed<T>(tokens: &TokenCache, result: std::result::Result<T, ApiError>) -> Result<T> {
    result.map_err(|e| {
        if e.is_unauthorized() {
            tokens.invalidate(e.to_string());
        }
        e.into()
    })
}
