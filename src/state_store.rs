use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::utils::error::Result;

/// Last known combined availability per identifier.
pub type AvailabilityState = BTreeMap<String, bool>;

/// Flat JSON file holding the [`AvailabilityState`] between restarts.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails: a missing file is a fresh start, an unreadable or corrupt
    /// one is logged and treated the same way.
    pub fn load(&self) -> AvailabilityState {
        if !self.path.exists() {
            tracing::info!("No state file at {}, starting fresh", self.path.display());
            return AvailabilityState::new();
        }

        match self.try_load() {
            Ok(state) => {
                tracing::debug!("Loaded {} entries from {}", state.len(), self.path.display());
                state
            }
            Err(e) => {
                tracing::error!("Could not read {}: {}", self.path.display(), e);
                AvailabilityState::new()
            }
        }
    }

    pub fn try_load(&self) -> Result<AvailabilityState> {
        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Persistence failures are logged, not propagated; the in-memory state
    /// stays authoritative for the running process. Returns whether the file
    /// was written.
    pub fn save(&self, state: &AvailabilityState) -> bool {
        match self.try_save(state) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Could not save {}: {}", self.path.display(), e);
                false
            }
        }
    }

    /// Writes the whole map to a sibling temp file, then renames it over the
    /// target so a crash never leaves a half-written file.
    pub fn try_save(&self, state: &AvailabilityState) -> Result<()> {
        let data = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
