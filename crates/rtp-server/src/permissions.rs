//! Operator levels.
//!
//! Persisted as a JSON object (`name -> level`) in `ops.json`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use rtp_command::PERMISSION_LEVEL_OWNER;
use tracing::{info, warn};

pub const OPS_FILE: &str = "ops.json";

/// Operator levels by display name, with JSON persistence.
pub struct PermissionManager {
    path: PathBuf,
    /// Display name → operator level (0 to 4).
    pub ops: HashMap<String, u8>,
    /// Level for anyone not in `ops`.
    pub default_level: u8,
}

impl PermissionManager {
    /// Load `ops.json` from the working directory.
    pub fn load(default_level: u8) -> Self {
        Self::load_from(OPS_FILE, default_level)
    }

    /// Load from `path`. A missing or unreadable file yields an empty list.
    pub fn load_from(path: impl AsRef<Path>, default_level: u8) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            ops: load_map(&path),
            path,
            default_level: default_level.min(PERMISSION_LEVEL_OWNER),
        }
    }

    pub fn level_of(&self, name: &str) -> u8 {
        self.ops.get(name).copied().unwrap_or(self.default_level)
    }

    /// Set a player's level (clamped to 4) and save.
    pub fn set_level(&mut self, name: &str, level: u8) {
        self.ops
            .insert(name.to_string(), level.min(PERMISSION_LEVEL_OWNER));
        self.save_ops();
    }

    /// Save the ops list to disk.
    pub fn save_ops(&self) {
        save_map(&self.path, &self.ops);
    }
}

/// Load a name → level map from a JSON object file.
fn load_map(path: &Path) -> HashMap<String, u8> {
    if !path.exists() {
        return HashMap::new();
    }
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str::<HashMap<String, u8>>(&contents) {
            Ok(map) => {
                info!("Loaded {} entries from {}", map.len(), path.display());
                map
            }
            Err(e) => {
                warn!("Failed to parse {}: {e}", path.display());
                HashMap::new()
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {e}", path.display());
            HashMap::new()
        }
    }
}

/// Save a name → level map as a JSON object with sorted keys.
fn save_map(path: &Path, map: &HashMap<String, u8>) {
    let sorted: std::collections::BTreeMap<&String, &u8> = map.iter().collect();
    match serde_json::to_string_pretty(&sorted) {
        Ok(json) => {
            if let Err(e) = fs::write(path, json) {
                warn!("Failed to write {}: {e}", path.display());
            }
        }
        Err(e) => warn!("Failed to serialize {}: {e}", path.display()),
    }
}
