//! Snapshot persistence
//!
//! The full state tree is serialized to a versioned JSON file after
//! every dispatch and loaded back on startup. Loading is forgiving:
//! an absent, unreadable, or unparseable snapshot falls back to the
//! default initial state so startup never fails. Serde field defaults
//! give additive-default merging when a newer build reads an older
//! snapshot. User-supplied imports go through strict validation
//! instead.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::AppState;

/// Snapshot schema version, part of the file name
pub const SNAPSHOT_VERSION: u32 = 1;

/// Top-level keys a user-supplied import must carry
const REQUIRED_KEYS: [&str; 4] = ["groups", "clients", "transactions", "installments"];

/// Reads and writes the state snapshot file
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot under the platform data directory
    /// (`~/.local/share/purse/state_v1.json` on Linux)
    pub fn default_location() -> Result<Self> {
        let base = dirs::data_dir()
            .ok_or_else(|| Error::Snapshot("No platform data directory available".into()))?;
        Ok(Self::new(base.join("purse").join(format!(
            "state_v{}.json",
            SNAPSHOT_VERSION
        ))))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted state, falling back to defaults on any failure
    pub fn load_or_default(&self) -> AppState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "No snapshot to load, starting fresh");
                return AppState::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Snapshot is corrupt, starting fresh");
                AppState::default()
            }
        }
    }

    /// Persist the state atomically (temp file + rename)
    pub fn save(&self, state: &AppState) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::Snapshot("Snapshot path has no parent directory".into()))?;
        fs::create_dir_all(parent)?;

        let json = serde_json::to_string_pretty(state)?;
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path)
            .map_err(|e| Error::Snapshot(format!("Failed to persist snapshot: {}", e)))?;
        debug!(path = %self.path.display(), "Snapshot saved");
        Ok(())
    }
}

/// Serialize the full state tree for backup
pub fn export_state(state: &AppState) -> Result<String> {
    Ok(serde_json::to_string_pretty(state)?)
}

/// Parse a user-supplied snapshot, validating shape before acceptance
///
/// Requires the core collections to be present as arrays; everything
/// else falls back to field defaults. The caller is expected to route
/// the result through `Action::ImportState`, which also repairs the
/// wallet balance against the transaction log.
pub fn parse_snapshot(json: &str) -> Result<AppState> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let object = value
        .as_object()
        .ok_or_else(|| Error::InvalidData("Snapshot is not a JSON object".into()))?;
    for key in REQUIRED_KEYS {
        match object.get(key) {
            Some(v) if v.is_array() => {}
            Some(_) => {
                return Err(Error::InvalidData(format!(
                    "Snapshot key '{}' is not an array",
                    key
                )))
            }
            None => {
                return Err(Error::InvalidData(format!(
                    "Snapshot is missing required key '{}'",
                    key
                )))
            }
        }
    }
    Ok(serde_json::from_value(value)?)
}
