//! YouTube channel feed support.
//!
//! Channel uploads are published as an Atom document
//! (`https://www.youtube.com/feeds/videos.xml?channel_id=...`). Only the newest
//! entry matters for notifications, so the document is scanned with a fixed
//! pattern instead of being parsed.

mod feed;

pub use feed::{FeedClient, FeedSource, extract_latest_video_id, video_url};
