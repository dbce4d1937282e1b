//! Edit failures.
//!
//! Every variant is recoverable: the timeline is untouched when one is
//! returned, so the caller may retry with corrected parameters.

use reelkit_core::{MediaId, MediaTime};
use thiserror::Error;

use crate::id::{ClipId, EffectId, MarkerId, TrackId, TransitionId};

/// Reason an edit operation was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("clip overlaps an existing clip on this track (clip {conflicting}, {start}..{end})")]
    Overlap {
        track: TrackId,
        conflicting: ClipId,
        start: MediaTime,
        end: MediaTime,
    },

    #[error("invalid trim window {in_point}..{out_point} for source of {source_duration}")]
    InvalidTrim {
        in_point: MediaTime,
        out_point: MediaTime,
        source_duration: MediaTime,
    },

    #[error("start {0} is outside the timeline")]
    InvalidStart(MediaTime),

    #[error("unknown track {0}")]
    UnknownTrack(TrackId),

    #[error("unknown media item {0}")]
    UnknownMedia(MediaId),

    #[error("unknown clip {0}")]
    UnknownClip(ClipId),

    #[error("split point {at} is not inside the clip ({start}..{end})")]
    SplitOutOfBounds {
        at: MediaTime,
        start: MediaTime,
        end: MediaTime,
    },

    #[error("track order does not name exactly the current tracks ({expected} tracks)")]
    TrackSetMismatch { expected: usize },

    #[error("clip {clip} has no effect {effect}")]
    UnknownEffect { clip: ClipId, effect: EffectId },

    #[error("invalid effect: {0}")]
    InvalidEffect(String),

    #[error("clip {clip} has no transition {transition}")]
    UnknownTransition {
        clip: ClipId,
        transition: TransitionId,
    },

    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    #[error("no global filter {0}")]
    UnknownFilter(EffectId),

    #[error("unknown marker {0}")]
    UnknownMarker(MarkerId),

    #[error("track {0} is locked")]
    TrackLocked(TrackId),

    #[error("malformed track: {0}")]
    MalformedTrack(String),

    #[error("id {0} is already in use")]
    DuplicateId(String),
}
