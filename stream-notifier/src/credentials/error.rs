//! Credential error types.

use platforms_api::ApiError;
use thiserror::Error;

/// Errors that can occur while obtaining a bearer token.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The client-credentials exchange failed.
    #[error("Token exchange failed: {0}")]
    Exchange(#[from] ApiError),
}

impl CredentialError {
    /// Whether the auth server rejected the client id/secret themselves.
    ///
    /// Retrying will not help until the configuration changes.
    pub fn requires_reconfiguration(&self) -> bool {
        match self {
            Self::Exchange(e) => {
                e.is_unauthorized()
                    || matches!(e, ApiError::Status { status, .. } if *status == 400 || *status == 403)
            }
        }
    }
}
