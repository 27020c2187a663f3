use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::monitor::{CheckContext, SourceCheck};
use crate::notification::NotificationEmitter;
use crate::state::{PersistedState, TrackedState};

/// Default check interval (60 seconds).
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;

/// Longest accepted check interval (one day).
pub const MAX_CHECK_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Time between ticks.
    pub interval: Duration,
}

impl SchedulerConfig {
    pub fn with_interval_secs(secs: u64) -> Self {
        Self {
            interval: Duration::from_secs(secs),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::with_interval_secs(DEFAULT_CHECK_INTERVAL_SECS)
    }
}

/// Owns the dedup state and runs the source checks on a timer.
///
/// The scheduler does no error handling of its own: every check swallows and
/// logs its failures, so one broken source never stops the others.
pub struct Scheduler {
    config: SchedulerConfig,
    state: TrackedState,
    emitter: NotificationEmitter,
    checks: Vec<Box<dyn SourceCheck>>,
}

impl Scheduler {
    /// `checks` run in the given order on every tick.
    pub fn new(
        config: SchedulerConfig,
        state: TrackedState,
        emitter: NotificationEmitter,
        checks: Vec<Box<dyn SourceCheck>>,
    ) -> Self {
        Self {
            config,
            state,
            emitter,
            checks,
        }
    }

    /// Current in-memory state.
    pub fn state(&self) -> &PersistedState {
        self.state.get()
    }

    /// Names of the active checks, in tick order.
    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Run every check once, in order.
    pub async fn tick(&mut self) {
        let started = Instant::now();
        let mut ctx = CheckContext {
            state: &mut self.state,
            emitter: &self.emitter,
        };

        for check in &self.checks {
            check.run_once(&mut ctx).await;
        }

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Tick completed"
        );
    }

    /// Tick every `interval` until `cancel` fires.
    ///
    /// The first tick happens one interval after start. A tick that overruns
    /// the interval delays the next one instead of overlapping it. Intervals
    /// above [`MAX_CHECK_INTERVAL_SECS`] are clamped.
    pub async fn run(mut self, cancel: CancellationToken) {
        let period = self
            .config
            .interval
            .clamp(Duration::from_secs(1), Duration::from_secs(MAX_CHECK_INTERVAL_SECS));
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = period.as_secs(),
            checks = ?self.check_names(),
            "Scheduler started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Scheduler shutting down");
                    break;
                }
                _ = interval.tick() => {
                    self.tick().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::credentials::TokenCache;
    use crate::monitor::{
        ClipCheck, ClipCheckConfig, FeedCheck, FeedCheckConfig, LiveCheckConfig, LiveStatusCheck,
        ordered_checks,
    };
    use crate::test_support::{FakeFeed, FakeTwitch, MemoryStateStore, RecordingSink, feed_with};

    struct Harness {
        scheduler: Scheduler,
        twitch: Arc<FakeTwitch>,
        store: Arc<MemoryStateStore>,
        sink: Arc<RecordingSink>,
    }

    fn harness(feed: FakeFeed, interval_secs: u64) -> Harness {
        let twitch = Arc::new(FakeTwitch::default());
        let store = Arc::new(MemoryStateStore::default());
        let sink = Arc::new(RecordingSink::default());
        let tokens = Arc::new(TokenCache::new(twitch.clone()));

        let checks = ordered_checks(
            Some(FeedCheck::new(
                FeedCheckConfig {
                    url: "https://example.com/feed.xml".to_string(),
                    channel_id: "yt".to_string(),
                },
                Arc::new(feed),
            )),
            Some(LiveStatusCheck::new(
                LiveCheckConfig {
                    username: "zunami".to_string(),
                    channel_id: "live".to_string(),
                },
                twitch.clone(),
                tokens.clone(),
            )),
            Some(ClipCheck::new(
                ClipCheckConfig {
                    username: "zunami".to_string(),
                    channel_id: "clips".to_string(),
                },
                twitch.clone(),
                tokens,
            )),
        );

        let scheduler = Scheduler::new(
            SchedulerConfig::with_interval_secs(interval_secs),
            TrackedState::load(store.clone()),
            NotificationEmitter::new(sink.clone(), false),
            checks,
        );

        Harness {
            scheduler,
            twitch,
            store,
            sink,
        }
    }

    fn channels(sink: &RecordingSink) -> Vec<String> {
        sink.messages().into_iter().map(|(c, _)| c).collect()
    }

    #[test]
    fn test_default_interval() {
        assert_eq!(SchedulerConfig::default().interval, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_first_observation_notifies_each_source_once() {
        let mut h = harness(FakeFeed::with_body(feed_with("abc123")), 60);
        h.twitch.set_live(true);
        h.twitch.set_clip(Some("Clip-1"));

        h.scheduler.tick().await;
        h.scheduler.tick().await;

        assert_eq!(channels(&h.sink), vec!["yt", "live", "clips"]);
        assert_eq!(
            h.scheduler.state(),
            &PersistedState {
                last_video_id: Some("abc123".to_string()),
                was_live: true,
                last_clip_id: Some("Clip-1".to_string()),
            }
        );
        assert_eq!(h.store.save_count(), 3);
    }

    #[tokio::test]
    async fn test_token_shared_between_live_and_clips() {
        let mut h = harness(FakeFeed::with_body(feed_with("abc123")), 60);
        h.twitch.set_clip(Some("Clip-1"));

        h.scheduler.tick().await;

        assert_eq!(h.twitch.stream_requests(), 1);
        assert_eq!(h.twitch.clip_requests(), 1);
        assert_eq!(h.twitch.exchange_count(), 1);
    }

    #[tokio::test]
    async fn test_live_failure_does_not_block_other_checks() {
        let mut h = harness(FakeFeed::with_body(feed_with("abc123")), 60);
        h.twitch.fail_streams(true);
        h.twitch.set_live(true);
        h.twitch.set_clip(Some("Clip-1"));

        h.scheduler.tick().await;

        assert_eq!(channels(&h.sink), vec!["yt", "clips"]);
        assert!(!h.scheduler.state().was_live);

        // Recovers on the next tick.
        h.twitch.fail_streams(false);
        h.scheduler.tick().await;
        assert_eq!(channels(&h.sink), vec!["yt", "clips", "live"]);
    }

    #[tokio::test]
    async fn test_feed_failure_does_not_block_twitch_checks() {
        let mut h = harness(FakeFeed::failing(), 60);
        h.twitch.set_live(true);

        h.scheduler.tick().await;

        assert_eq!(channels(&h.sink), vec!["live"]);
    }

    #[tokio::test]
    async fn test_check_order() {
        let h = harness(FakeFeed::failing(), 60);
        assert_eq!(h.scheduler.check_names(), vec!["feed", "live", "clips"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_on_interval_until_cancelled() {
        let h = harness(FakeFeed::with_body(feed_with("abc123")), 60);
        let twitch = h.twitch.clone();
        let sink = h.sink.clone();
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(h.scheduler.run(cancel.clone()));

        // Nothing runs before the first interval elapses.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(twitch.stream_requests(), 0);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(twitch.stream_requests(), 1);
        assert_eq!(sink.messages().len(), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(twitch.stream_requests(), 2);

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_clamps_oversized_interval() {
        let h = harness(FakeFeed::with_body(feed_with("abc123")), u64::MAX);
        let twitch = h.twitch.clone();
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(h.scheduler.run(cancel.clone()));

        tokio::time::sleep(Duration::from_secs(MAX_CHECK_INTERVAL_SECS + 1)).await;
        assert_eq!(twitch.stream_requests(), 1);

        cancel.cancel();
        handle.await.unwrap();
    }
}
