//! stream-notifier library crate.
//!
//! Polls a YouTube channel feed and a Twitch channel, and announces new
//! uploads, go-lives and clips to Discord channels.

pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod notification;
pub mod scheduler;
pub mod state;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};
