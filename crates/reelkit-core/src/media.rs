//! Imported media items and the read-only catalog that serves them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::geometry::Resolution;
use crate::time::{FrameRate, MediaTime};

/// Identifier of an imported media item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(String);

impl MediaId {
    /// Create a media id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Kind of imported media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

/// An imported media file. Immutable once imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: MediaId,
    /// Location of the source file
    pub uri: String,
    pub kind: MediaKind,
    /// Intrinsic duration of the source
    pub duration: MediaTime,
    /// Frame dimensions (zero for audio-only media)
    pub resolution: Resolution,
    pub frame_rate: FrameRate,
    /// Video codec name as reported by the prober
    pub codec: String,
    /// Source bitrate in bits per second, if known
    pub bitrate: Option<u64>,
    pub has_audio: bool,
    pub audio_codec: Option<String>,
}

impl MediaItem {
    /// A video item with an audio stream.
    pub fn video(
        id: impl Into<String>,
        duration: MediaTime,
        resolution: Resolution,
        frame_rate: FrameRate,
    ) -> Self {
        let id = id.into();
        Self {
            uri: format!("media/{id}.mp4"),
            id: MediaId::new(id),
            kind: MediaKind::Video,
            duration,
            resolution,
            frame_rate,
            codec: "h264".into(),
            bitrate: None,
            has_audio: true,
            audio_codec: Some("aac".into()),
        }
    }

    /// An audio-only item.
    pub fn audio(id: impl Into<String>, duration: MediaTime) -> Self {
        let id = id.into();
        Self {
            uri: format!("media/{id}.m4a"),
            id: MediaId::new(id),
            kind: MediaKind::Audio,
            duration,
            resolution: Resolution::new(0, 0),
            frame_rate: FrameRate::default(),
            codec: String::new(),
            bitrate: None,
            has_audio: true,
            audio_codec: Some("aac".into()),
        }
    }

    /// Whether the item carries picture content.
    pub fn has_video(&self) -> bool {
        self.kind != MediaKind::Audio && !self.resolution.is_empty()
    }
}

/// Read-only lookup of imported media.
///
/// Unknown ids yield `None`; callers decide how to report them.
pub trait MediaCatalog {
    fn media_item(&self, id: &MediaId) -> Option<&MediaItem>;
}

/// Catalog backed by a hash map, filled at import time.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    items: HashMap<MediaId, MediaItem>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an imported item, replacing any item with the same id.
    pub fn insert(&mut self, item: MediaItem) {
        self.items.insert(item.id.clone(), item);
    }

    /// Builder-style insert.
    pub fn with(mut self, item: MediaItem) -> Self {
        self.insert(item);
        self
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl MediaCatalog for InMemoryCatalog {
    fn media_item(&self, id: &MediaId) -> Option<&MediaItem> {
        self.items.get(id)
    }
}

impl FromIterator<MediaItem> for InMemoryCatalog {
    fn from_iter<I: IntoIterator<Item = MediaItem>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for item in iter {
            catalog.insert(item);
        }
        catalog
    }
}
