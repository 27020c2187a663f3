use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

impl ApiError {
    /// Whether the remote rejected our credentials (HTTP 401).
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Unauthorized(_) => true,
            Self::HttpError(e) => e.status() == Some(reqwest::StatusCode::UNAUTHORIZED),
            _ => false,
        }
    }

    /// Map a non-success response into an error, keeping the body for diagnostics.
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Self::Unauthorized(body);
        }
        Self::Status {
            status: status.as_u16(),
            body,
        }
    }
}
