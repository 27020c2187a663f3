use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::PersistedState;
use crate::utils::fs;
use crate::Result;

/// Durable storage for [`PersistedState`]. Single writer assumed.
pub trait StateStore: Send + Sync {
    /// Read the durable copy. Missing or unreadable storage yields the empty record.
    fn load(&self) -> PersistedState;

    /// Replace the durable copy.
    fn save(&self, state: &PersistedState) -> Result<()>;
}

/// Pretty-printed JSON file, replaced atomically on every save.
#[derive(Debug, Clone)]
pub struct JsonFileStateStore {
    path: PathBuf,
}

impl JsonFileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStateStore {
    fn load(&self) -> PersistedState {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No state file yet; starting empty");
                return PersistedState::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read state file; starting empty");
                return PersistedState::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(
                path = %self.path.display(),
                raw_len = raw.len(),
                error = %e,
                "Failed to parse state file; starting empty"
            );
            PersistedState::default()
        })
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        fs::ensure_parent_dir_sync(&self.path)?;

        let json = serde_json::to_string_pretty(state)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| fs::io_error("creating temp file in", dir, e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| fs::io_error("writing", tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| fs::io_error("replacing", &self.path, e.error))?;

        debug!(path = %self.path.display(), "Persisted notifier state");
        Ok(())
    }
}
