// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The navigation context that survives between invocations: the product
//! and version the user last chose.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::ProductVersion;

const CHOSEN_VERSION_FILE: &str = "chosen_version.json";

/// Returns the state directory for crashstats-query, creating it if necessary.
/// Uses the OS-standard cache directory:
/// - Linux: ~/.cache/crashstats-query/
/// - macOS: ~/Library/Caches/crashstats-query/
/// - Windows: %LOCALAPPDATA%/crashstats-query/
pub fn state_dir() -> Option<PathBuf> {
    let dir = dirs::cache_dir()?.join("crashstats-query");
    fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

pub struct ChosenVersionStore {
    path: PathBuf,
}

impl ChosenVersionStore {
    pub fn open_default() -> Option<Self> {
        state_dir().map(|dir| Self::at(&dir))
    }

    pub fn at(dir: &Path) -> Self {
        Self {
            path: dir.join(CHOSEN_VERSION_FILE),
        }
    }

    /// Returns None if nothing was saved or the file is unreadable.
    pub fn load(&self) -> Option<ProductVersion> {
        let data = fs::read(&self.path).ok()?;
        match serde_json::from_slice(&data) {
            Ok(chosen) => Some(chosen),
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "ignoring unreadable chosen version");
                None
            }
        }
    }

    /// Returns true if writing succeeded.
    pub fn save(&self, chosen: &ProductVersion) -> bool {
        let Ok(data) = serde_json::to_vec_pretty(chosen) else {
            return false;
        };
        match fs::write(&self.path, data) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "could not save chosen version");
                false
            }
        }
    }
}
