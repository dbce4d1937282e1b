//! Timeline persistence with versioning and migration.
//!
//! Files are JSON with a schema version field. Loading migrates old layouts
//! forward and then re-checks the structural invariants, so a hand-edited
//! file can never produce an overlapping or unsorted track.

use reelkit_core::{MediaCatalog, ReelkitError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::timeline::Timeline;

/// Current schema version.
pub const CURRENT_VERSION: u32 = 3;

/// Versioned timeline file wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct TimelineFile {
    /// Schema version for migration.
    pub version: u32,
    /// The timeline data.
    pub timeline: Timeline,
    /// Library version that wrote this file.
    pub app_version: String,
}

impl TimelineFile {
    /// Wrap a timeline for saving.
    pub fn new(timeline: Timeline) -> Self {
        Self {
            version: CURRENT_VERSION,
            timeline,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| ReelkitError::Serialization(format!("failed to serialize timeline: {e}")))
    }

    /// Deserialize from JSON bytes, applying migrations and checking invariants.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: Value = serde_json::from_slice(data)
            .map_err(|e| ReelkitError::Serialization(format!("invalid JSON: {e}")))?;

        let version = match raw.get("version") {
            None => 0,
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| ReelkitError::Serialization(format!("invalid version {v}")))?,
        };
        if version > CURRENT_VERSION {
            return Err(ReelkitError::Serialization(format!(
                "timeline file version {version} is newer than supported version {CURRENT_VERSION}"
            )));
        }

        let migrated = migrate(raw, version)?;
        let file: Self = serde_json::from_value(migrated)
            .map_err(|e| ReelkitError::Serialization(format!("failed to parse timeline: {e}")))?;
        file.timeline.check_invariants()?;
        tracing::debug!(
            version,
            clips = file.timeline.clip_count(),
            "loaded timeline file"
        );
        Ok(file)
    }

    /// Unwrap the timeline after checking every clip against `catalog`.
    pub fn into_timeline(self, catalog: &dyn MediaCatalog) -> Result<Timeline> {
        self.timeline
            .check_media(catalog)
            .map_err(|e| ReelkitError::Invariant(e.to_string()))?;
        Ok(self.timeline)
    }

    /// Save to a file path.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let data = self.to_json()?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Load from a file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}

/// Apply sequential migrations from `from_version` to `CURRENT_VERSION`.
fn migrate(mut data: Value, from_version: u32) -> Result<Value> {
    let mut version = from_version;

    while version < CURRENT_VERSION {
        match version {
            0 => {
                // v0 → v1: the whole document was a bare timeline.
                if data.get("version").is_none() {
                    data = serde_json::json!({
                        "version": 1,
                        "timeline": data,
                        "app_version": "0.0.0",
                    });
                }
                version = 1;
            }
            1 => {
                // v1 → v2: markers and track lock/mute flags were added.
                let timeline = data
                    .get_mut("timeline")
                    .and_then(Value::as_object_mut)
                    .ok_or_else(|| ReelkitError::Serialization("missing timeline".into()))?;
                timeline
                    .entry("markers")
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Some(tracks) = timeline.get_mut("tracks").and_then(Value::as_array_mut) {
                    for track in tracks.iter_mut().filter_map(Value::as_object_mut) {
                        track.entry("muted").or_insert(Value::Bool(false));
                        track.entry("locked").or_insert(Value::Bool(false));
                    }
                }
                data["version"] = Value::from(2);
                version = 2;
            }
            2 => {
                // v2 → v3: timeline-wide filter stack.
                data.get_mut("timeline")
                    .and_then(Value::as_object_mut)
                    .ok_or_else(|| ReelkitError::Serialization("missing timeline".into()))?
                    .entry("filters")
                    .or_insert_with(|| Value::Array(Vec::new()));
                data["version"] = Value::from(3);
                version = 3;
            }
            _ => {
                return Err(ReelkitError::Serialization(format!(
                    "no migration path from version {version}"
                )));
            }
        }
    }

    Ok(data)
}
