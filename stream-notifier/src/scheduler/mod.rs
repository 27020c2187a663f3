//! Fixed-interval scheduler.
//!
//! One repeating timer drives every configured source check. Within a tick
//! the checks run strictly in sequence (feed, live status, clips), each
//! awaited to completion before the next starts.

mod service;

pub use service::{
    DEFAULT_CHECK_INTERVAL_SECS, MAX_CHECK_INTERVAL_SECS, Scheduler, SchedulerConfig,
};
