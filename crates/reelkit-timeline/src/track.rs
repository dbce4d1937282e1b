//! Track types for the timeline.

use reelkit_core::{MediaTime, TimeRange};
use serde::{Deserialize, Serialize};

use crate::clip::Clip;
use crate::error::EditError;
use crate::id::{ClipId, TrackId};

/// Kind of track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackKind {
    Video,
    Audio,
    Subtitle,
    Graphics,
    Effect,
}

impl TrackKind {
    /// Default display-name prefix ("V1", "A2", ...).
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Video => "V",
            Self::Audio => "A",
            Self::Subtitle => "S",
            Self::Graphics => "G",
            Self::Effect => "FX",
        }
    }
}

/// A lane of non-overlapping clips, kept in strictly increasing start order.
///
/// Clips are only reachable mutably through [`crate::Timeline`], which
/// validates every change before committing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub id: TrackId,
    /// Track name
    pub name: String,
    /// Track kind
    pub kind: TrackKind,
    /// Clips ordered by start time
    pub(crate) clips: Vec<Clip>,
    /// Is track muted
    pub muted: bool,
    /// Is track locked (prevent edits)
    pub locked: bool,
}

impl Track {
    /// Create an empty track.
    pub fn new(id: TrackId, kind: TrackKind, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            clips: Vec::new(),
            muted: false,
            locked: false,
        }
    }

    /// Clips in start order.
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    /// Number of clips on this track.
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Whether the track holds no clips.
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// End of the last clip, or zero for an empty track.
    ///
    /// Clips are sorted and disjoint, so the last clip ends last.
    pub fn end(&self) -> MediaTime {
        self.clips.last().map(Clip::end).unwrap_or(MediaTime::ZERO)
    }

    /// Find a clip by ID.
    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    /// Index of a clip by ID.
    pub(crate) fn clip_index(&self, id: ClipId) -> Option<usize> {
        self.clips.iter().position(|c| c.id == id)
    }

    /// Clip covering the given time, if any.
    pub fn clip_at_time(&self, time: MediaTime) -> Option<&Clip> {
        let idx = self.clips.partition_point(|c| c.start <= time);
        let clip = self.clips.get(idx.checked_sub(1)?)?;
        clip.range().contains(time).then_some(clip)
    }

    /// Check that `range` is free on this track, ignoring the clips in `ignore`.
    pub fn check_slot(&self, range: TimeRange, ignore: &[ClipId]) -> Result<(), EditError> {
        // Clips starting at or after `range.end()` cannot overlap. Walking the
        // rest backwards, ends strictly decrease, so stop at the first clip
        // that ends at or before `range.start`.
        let idx = self.clips.partition_point(|c| c.start < range.end());
        for clip in self.clips[..idx].iter().rev() {
            if clip.end() <= range.start {
                break;
            }
            if !ignore.contains(&clip.id) {
                return Err(EditError::Overlap {
                    track: self.id,
                    conflicting: clip.id,
                    start: clip.start,
                    end: clip.end(),
                });
            }
        }
        Ok(())
    }

    /// Insert keeping start order. The caller has already checked the slot.
    pub(crate) fn insert_sorted(&mut self, clip: Clip) {
        let idx = self.clips.partition_point(|c| c.start < clip.start);
        self.clips.insert(idx, clip);
    }

    /// Remove a clip by ID.
    pub(crate) fn remove(&mut self, id: ClipId) -> Option<Clip> {
        let idx = self.clip_index(id)?;
        Some(self.clips.remove(idx))
    }

    /// Check ordering, disjointness and ownership of every clip.
    pub(crate) fn check_well_formed(&self) -> Result<(), String> {
        for clip in &self.clips {
            if clip.track_id != self.id {
                return Err(format!("clip {} claims track {}", clip.id, clip.track_id));
            }
            clip.check_shape().map_err(|e| format!("clip {}: {e}", clip.id))?;
        }
        for pair in self.clips.windows(2) {
            if pair[0].start >= pair[1].start {
                return Err(format!("track {} is out of order", self.id));
            }
            if pair[0].end() > pair[1].start {
                return Err(format!(
                    "clips {} and {} overlap on track {}",
                    pair[0].id, pair[1].id, self.id
                ));
            }
        }
        Ok(())
    }
}
