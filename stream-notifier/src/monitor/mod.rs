//! Source checks.
//!
//! Each check fetches one snapshot from its platform, compares it with the
//! persisted dedup state and announces anything new:
//! - [`FeedCheck`]: newest upload in a YouTube channel feed
//! - [`LiveStatusCheck`]: offline → live transitions of a Twitch channel
//! - [`ClipCheck`]: newest clip of a Twitch channel

mod check;
mod clips;
mod feed;
mod live;

pub use check::{CheckContext, SourceCheck};
pub use clips::{ClipCheck, ClipCheckConfig};
pub use feed::{FeedCheck, FeedCheckConfig};
pub use live::{LiveCheckConfig, LiveStatusCheck};

/// Arrange the configured checks in tick order: feed, live status, clips.
///
/// Live status runs before clips so the token fetched for it is reused.
pub fn ordered_checks(
    feed: Option<FeedCheck>,
    live: Option<LiveStatusCheck>,
    clips: Option<ClipCheck>,
) -> Vec<Box<dyn SourceCheck>> {
    let mut checks: Vec<Box<dyn SourceCheck>> = Vec::with_capacity(3);
    if let Some(feed) = feed {
        checks.push(Box::new(feed));
    }
    if let Some(live) = live {
        checks.push(Box::new(live));
    }
    if let Some(clips) = clips {
        checks.push(Box::new(clips));
    }
    checks
}
