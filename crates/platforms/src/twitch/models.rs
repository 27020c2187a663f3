use serde::Deserialize;

/// Response of the client-credentials grant.
#[derive(Debug, Clone, Deserialize)]
pub struct AppAccessToken {
    pub access_token: String,
    /// Lifetime in seconds, as reported by the auth server.
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Envelope shared by every Helix list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct HelixResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// An active broadcast from `GET /streams`.
#[derive(Debug, Clone, Deserialize)]
pub struct Stream {
    pub id: String,
    #[serde(default)]
    pub user_login: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub game_name: Option<String>,
    #[serde(rename = "type", default)]
    pub stream_type: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Clip {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
}
