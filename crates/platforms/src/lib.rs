//! Platform clients used by `stream-notifier`.
//!
//! - [`youtube`]: channel Atom feed fetching and video id extraction
//! - [`twitch`]: Helix API client (app access token, streams, users, clips)

pub mod client;
pub mod error;
pub mod twitch;
mod utils;
pub mod youtube;

pub use client::{create_client_builder, default_client};
pub use error::ApiError;
