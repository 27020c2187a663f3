use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::warn;

const DEFAULT_USER_AGENT: &str = concat!("stream-notifier/", env!("CARGO_PKG_VERSION"));

/// Base client builder shared by every platform client.
///
/// A zero `timeout` leaves requests unbounded.
pub fn create_client_builder(timeout: Option<Duration>) -> ClientBuilder {
    let mut builder = Client::builder().user_agent(DEFAULT_USER_AGENT);
    if let Some(timeout) = timeout.filter(|t| !t.is_zero()) {
        builder = builder.timeout(timeout);
    }
    builder
}

/// Build the default client, falling back to reqwest defaults if the builder fails.
pub fn default_client(timeout: Option<Duration>) -> Client {
    create_client_builder(timeout).build().unwrap_or_else(|error| {
        warn!(
            error = %error,
            "Failed to create configured HTTP client; falling back to reqwest defaults"
        );
        Client::new()
    })
}
