mod helix;
mod models;

pub use helix::{DEFAULT_API_BASE, DEFAULT_AUTH_BASE, HelixClient, HelixConfig, TwitchApi, channel_url};
pub use models::{AppAccessToken, Clip, HelixResponse, Stream, User};
