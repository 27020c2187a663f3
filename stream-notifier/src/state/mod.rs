//! Durable dedup state.
//!
//! The notifier remembers the last announced video, the last observed live
//! flag and the last announced clip. The record is loaded once at startup,
//! kept in memory by [`TrackedState`] and written through to the store after
//! every mutation.

mod store;

pub use store::{JsonFileStateStore, StateStore};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// The persisted record of what has already been announced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Most recently announced feed item.
    #[serde(default, alias = "lastVideo", skip_serializing_if = "Option::is_none")]
    pub last_video_id: Option<String>,
    /// Whether the stream was live as of the previous tick.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub was_live: bool,
    /// Most recently announced clip.
    #[serde(default, alias = "lastClip", skip_serializing_if = "Option::is_none")]
    pub last_clip_id: Option<String>,
}

/// In-memory copy of [`PersistedState`] with write-through persistence.
pub struct TrackedState {
    current: PersistedState,
    store: Arc<dyn StateStore>,
}

impl TrackedState {
    /// Load the durable copy once. Never fails; see [`StateStore::load`].
    pub fn load(store: Arc<dyn StateStore>) -> Self {
        let current = store.load();
        debug!(state = ?current, "Loaded notifier state");
        Self { current, store }
    }

    pub fn get(&self) -> &PersistedState {
        &self.current
    }

    /// Apply a mutation and persist the result immediately.
    ///
    /// A failed write is logged and otherwise ignored: the in-memory copy stays
    /// authoritative for this process and the caller still notifies.
    pub fn update<F>(&mut self, mutate: F)
    where
        F: FnOnce(&mut PersistedState),
    {
        mutate(&mut self.current);
        if let Err(e) = self.store.save(&self.current) {
            error!(error = %e, "Failed to persist notifier state");
        }
    }
}
