use std::sync::Arc;

use platforms_api::twitch::{HelixClient, HelixConfig, TwitchApi};
use platforms_api::youtube::FeedClient;
use stream_notifier::config::{self, NotifierConfig};
use stream_notifier::credentials::TokenCache;
use stream_notifier::logging;
use stream_notifier::monitor::{self, ClipCheck, FeedCheck, LiveStatusCheck};
use stream_notifier::notification::{DiscordChannel, NotificationEmitter};
use stream_notifier::scheduler::Scheduler;
use stream_notifier::state::{JsonFileStateStore, TrackedState};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Logging comes up before the config so its warnings are recorded
    let logging_guard = logging::init_logging(&config::log_dir_from_env())?;

    let config = match NotifierConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        interval_secs = config.scheduler.interval.as_secs(),
        log_dir = %logging_guard.log_dir().display(),
        "Starting stream-notifier"
    );
    if !config.has_any_source() {
        warn!("No source is configured; nothing will be announced");
    }

    let cancel = CancellationToken::new();
    logging_guard.start_retention_cleanup(cancel.child_token());

    let client = platforms_api::default_client(config.http_timeout);

    let sink = Arc::new(DiscordChannel::new(config.discord.clone(), client.clone()));
    let emitter = NotificationEmitter::new(sink, config.mention_everyone);

    let store = Arc::new(JsonFileStateStore::new(config.state_path.clone()));
    info!(path = %store.path().display(), "Loading notifier state");
    let state = TrackedState::load(store);

    let feed = config
        .feed
        .clone()
        .map(|feed| FeedCheck::new(feed, Arc::new(FeedClient::new(client.clone()))));

    let (live, clips) = match &config.twitch {
        Some(credentials) => {
            let api: Arc<dyn TwitchApi> = Arc::new(HelixClient::new(
                client.clone(),
                HelixConfig::new(
                    credentials.client_id.clone(),
                    credentials.client_secret.clone(),
                ),
            ));
            let tokens = Arc::new(TokenCache::new(api.clone()));
            let live = config
                .live
                .clone()
                .map(|live| LiveStatusCheck::new(live, api.clone(), tokens.clone()));
            let clips = config
                .clips
                .clone()
                .map(|clips| ClipCheck::new(clips, api.clone(), tokens.clone()));
            (live, clips)
        }
        None => (None, None),
    };

    let scheduler = Scheduler::new(
        config.scheduler.clone(),
        state,
        emitter,
        monitor::ordered_checks(feed, live, clips),
    );
    info!(checks = ?scheduler.check_names(), "Source checks configured");

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
        shutdown.cancel();
    });

    scheduler.run(cancel).await;

    info!("stream-notifier stopped");
    Ok(())
}
