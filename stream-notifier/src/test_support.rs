//! In-memory stand-ins for the platform, messaging and storage seams.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use platforms_api::ApiError;
use platforms_api::twitch::{AppAccessToken, Clip, Stream, TwitchApi, User};
use platforms_api::youtube::FeedSource;

use crate::notification::{MessageSink, OutgoingMessage};
use crate::state::{PersistedState, StateStore};
use crate::{Error, Result};

/// Minimal Atom document whose first entry is `video_id`.
pub fn feed_with(video_id: &str) -> String {
    format!(
        "<feed xmlns:yt=\"http://www.youtube.com/xml/schemas/2015\"><entry><yt:videoId>{video_id}</yt:videoId></entry><entry><yt:videoId>older</yt:videoId></entry></feed>"
    )
}

#[derive(Default)]
pub struct MemoryStateStore {
    initial: PersistedState,
    saved: Mutex<Vec<PersistedState>>,
    fail: bool,
}

impl MemoryStateStore {
    pub fn with_state(initial: PersistedState) -> Self {
        Self {
            initial,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn save_count(&self) -> usize {
        self.saved.lock().len()
    }

    pub fn last_saved(&self) -> Option<PersistedState> {
        self.saved.lock().last().cloned()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> PersistedState {
        self.initial.clone()
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        self.saved.lock().push(state.clone());
        if self.fail {
            return Err(Error::Other("disk full".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<(String, OutgoingMessage)>>,
    fail: AtomicBool,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<(String, OutgoingMessage)> {
        self.sent.lock().clone()
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    fn channel_type(&self) -> &'static str {
        "recording"
    }

    async fn send_message(&self, channel_id: &str, message: &OutgoingMessage) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::notification("Unknown Channel"));
        }
        self.sent
            .lock()
            .push((channel_id.to_string(), message.clone()));
        Ok(())
    }
}

pub struct FakeFeed {
    body: Mutex<Option<String>>,
}

impl FakeFeed {
    pub fn with_body(body: String) -> Self {
        Self {
            body: Mutex::new(Some(body)),
        }
    }

    pub fn failing() -> Self {
        Self {
            body: Mutex::new(None),
        }
    }
}

#[async_trait]
impl FeedSource for FakeFeed {
    async fn fetch_feed(&self, _url: &str) -> std::result::Result<String, ApiError> {
        self.body.lock().clone().ok_or(ApiError::Status {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

/// Scriptable Twitch API.
pub struct FakeTwitch {
    exchanges: AtomicUsize,
    stream_requests: AtomicUsize,
    user_requests: AtomicUsize,
    clip_requests: AtomicUsize,
    fail_exchange: AtomicBool,
    fail_streams: AtomicBool,
    reject_next: AtomicBool,
    live: AtomicBool,
    expires_in: Mutex<Option<u64>>,
    user_id: Mutex<Option<String>>,
    clip_id: Mutex<Option<String>>,
    /// The token the next authenticated call must carry.
    current_token: Mutex<Option<String>>,
}

impl Default for FakeTwitch {
    fn default() -> Self {
        Self {
            exchanges: AtomicUsize::new(0),
            stream_requests: AtomicUsize::new(0),
            user_requests: AtomicUsize::new(0),
            clip_requests: AtomicUsize::new(0),
            fail_exchange: AtomicBool::new(false),
            fail_streams: AtomicBool::new(false),
            reject_next: AtomicBool::new(false),
            live: AtomicBool::new(false),
            expires_in: Mutex::new(Some(3600)),
            user_id: Mutex::new(Some("1001".to_string())),
            clip_id: Mutex::new(None),
            current_token: Mutex::new(None),
        }
    }
}

impl FakeTwitch {
    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }

    pub fn stream_requests(&self) -> usize {
        self.stream_requests.load(Ordering::SeqCst)
    }

    pub fn user_requests(&self) -> usize {
        self.user_requests.load(Ordering::SeqCst)
    }

    pub fn clip_requests(&self) -> usize {
        self.clip_requests.load(Ordering::SeqCst)
    }

    pub fn fail_exchange(&self, fail: bool) {
        self.fail_exchange.store(fail, Ordering::SeqCst);
    }

    /// Make the streams endpoint fail with a server error.
    pub fn fail_streams(&self, fail: bool) {
        self.fail_streams.store(fail, Ordering::SeqCst);
    }

    /// Answer the next authenticated request with 401.
    pub fn reject_next_request(&self) {
        self.reject_next.store(true, Ordering::SeqCst);
    }

    pub fn set_live(&self, live: bool) {
        self.live.store(live, Ordering::SeqCst);
    }

    /// Lifetime reported by subsequent exchanges.
    pub fn set_expires_in(&self, secs: Option<u64>) {
        *self.expires_in.lock() = secs;
    }

    pub fn set_user_id(&self, id: Option<&str>) {
        *self.user_id.lock() = id.map(str::to_string);
    }

    pub fn set_clip(&self, id: Option<&str>) {
        *self.clip_id.lock() = id.map(str::to_string);
    }

    fn authorize(&self, token: &str) -> std::result::Result<(), ApiError> {
        if self.reject_next.swap(false, Ordering::SeqCst) {
            return Err(ApiError::Unauthorized("Invalid OAuth token".to_string()));
        }
        match self.current_token.lock().as_deref() {
            Some(current) if current == token => Ok(()),
            _ => Err(ApiError::Unauthorized("Unknown OAuth token".to_string())),
        }
    }
}

#[async_trait]
impl TwitchApi for FakeTwitch {
    async fn exchange_token(&self) -> std::result::Result<AppAccessToken, ApiError> {
        if self.fail_exchange.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 503,
                body: "auth unavailable".to_string(),
            });
        }
        let n = self.exchanges.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("token-{n}");
        *self.current_token.lock() = Some(token.clone());
        Ok(AppAccessToken {
            access_token: token,
            expires_in: *self.expires_in.lock(),
            token_type: Some("bearer".to_string()),
        })
    }

    async fn get_streams(
        &self,
        token: &str,
        user_login: &str,
    ) -> std::result::Result<Vec<Stream>, ApiError> {
        self.stream_requests.fetch_add(1, Ordering::SeqCst);
        self.authorize(token)?;
        if self.fail_streams.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                body: "internal error".to_string(),
            });
        }
        if !self.live.load(Ordering::SeqCst) {
            return Ok(Vec::new());
        }
        Ok(vec![Stream {
            id: "stream-1".to_string(),
            user_login: user_login.to_string(),
            title: "Live!".to_string(),
            game_name: None,
            stream_type: Some("live".to_string()),
            started_at: None,
        }])
    }

    async fn get_users(&self, token: &str, login: &str) -> std::result::Result<Vec<User>, ApiError> {
        self.user_requests.fetch_add(1, Ordering::SeqCst);
        self.authorize(token)?;
        Ok(self
            .user_id
            .lock()
            .clone()
            .map(|id| User {
                id,
                login: login.to_string(),
                display_name: login.to_string(),
            })
            .into_iter()
            .collect())
    }

    async fn get_clips(
        &self,
        token: &str,
        _broadcaster_id: &str,
        first: u32,
    ) -> std::result::Result<Vec<Clip>, ApiError> {
        self.clip_requests.fetch_add(1, Ordering::SeqCst);
        self.authorize(token)?;
        Ok(self
            .clip_id
            .lock()
            .clone()
            .map(|id| Clip {
                url: format!("https://clips.twitch.tv/{id}"),
                id,
                title: "clip".to_string(),
                created_at: None,
            })
            .into_iter()
            .take(first as usize)
            .collect())
    }
}
