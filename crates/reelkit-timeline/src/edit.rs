//! Edit operations with undo/redo support.
//!
//! Uses the Command pattern: every mutation is an `EditCommand` whose
//! `apply` validates, commits, and hands back the command that reverses it.
//! Commands carry pre-generated ids so re-applying one after an undo
//! reproduces exactly the same timeline.

use reelkit_core::{MediaCatalog, MediaTime};
use std::collections::VecDeque;

use crate::clip::Clip;
use crate::effect::{Effect, Transition};
use crate::error::EditError;
use crate::id::{ClipId, EffectId, MarkerId, TrackId, TransitionId};
use crate::timeline::{Marker, Timeline};
use crate::track::{Track, TrackKind};

// ── Edit commands ───────────────────────────────────────────────

/// A reversible edit operation on the timeline.
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    /// Append an empty track.
    AddTrack {
        track_id: TrackId,
        kind: TrackKind,
        name: String,
    },
    /// Remove a track with all its clips.
    RemoveTrack { track_id: TrackId },
    /// Put a removed track back at its old index.
    RestoreTrack { index: usize, track: Track },
    /// Lock or unlock a track.
    SetTrackLocked { track_id: TrackId, locked: bool },
    /// Reorder all tracks.
    ReorderTracks { order: Vec<TrackId> },
    /// Place a clip (new or previously removed).
    PlaceClip { clip: Clip },
    /// Remove a clip.
    RemoveClip { clip_id: ClipId },
    /// Move a clip to a new start on its track.
    MoveClip { clip_id: ClipId, start: MediaTime },
    /// Replace a clip's trim window.
    TrimClip {
        clip_id: ClipId,
        in_point: MediaTime,
        out_point: MediaTime,
    },
    /// Split a clip at an absolute time into two new clips.
    SplitClip {
        clip_id: ClipId,
        at: MediaTime,
        left_id: ClipId,
        right_id: ClipId,
    },
    /// Enable or disable a clip.
    SetClipEnabled { clip_id: ClipId, enabled: bool },
    /// Insert an effect into a clip's stack (`None` = on top).
    StackEffect {
        clip_id: ClipId,
        effect: Effect,
        index: Option<usize>,
    },
    /// Remove an effect from a clip's stack.
    RemoveEffect { clip_id: ClipId, effect_id: EffectId },
    /// Attach a transition to a clip edge.
    AttachTransition {
        clip_id: ClipId,
        transition: Transition,
    },
    /// Detach a transition.
    DetachTransition {
        clip_id: ClipId,
        transition_id: TransitionId,
    },
    /// Add a marker.
    AddMarker { marker: Marker },
    /// Remove a marker.
    RemoveMarker { marker_id: MarkerId },
    /// Insert a timeline-wide filter (`None` = on top).
    AddGlobalFilter {
        filter: Effect,
        index: Option<usize>,
    },
    /// Remove a timeline-wide filter.
    RemoveGlobalFilter { filter_id: EffectId },
    /// A batch of commands applied atomically.
    Batch(Vec<EditCommand>),
}

impl EditCommand {
    /// Apply this command. On success returns the inverse command; on error
    /// the timeline is unchanged.
    pub fn apply(
        &self,
        timeline: &mut Timeline,
        catalog: &dyn MediaCatalog,
    ) -> Result<EditCommand, EditError> {
        let inverse = match self {
            Self::AddTrack {
                track_id,
                kind,
                name,
            } => {
                let track = Track::new(*track_id, *kind, name.clone());
                timeline.insert_track(usize::MAX, track)?;
                Self::RemoveTrack {
                    track_id: *track_id,
                }
            }
            Self::RemoveTrack { track_id } => {
                let (index, track) = timeline.remove_track(*track_id)?;
                Self::RestoreTrack { index, track }
            }
            Self::RestoreTrack { index, track } => {
                timeline.insert_track(*index, track.clone())?;
                Self::RemoveTrack { track_id: track.id }
            }
            Self::SetTrackLocked { track_id, locked } => {
                let previous = timeline.set_track_locked(*track_id, *locked)?;
                Self::SetTrackLocked {
                    track_id: *track_id,
                    locked: previous,
                }
            }
            Self::ReorderTracks { order } => {
                let previous = timeline.reorder_tracks(order)?;
                Self::ReorderTracks { order: previous }
            }
            Self::PlaceClip { clip } => {
                timeline.insert_clip(catalog, clip.clone())?;
                Self::RemoveClip { clip_id: clip.id }
            }
            Self::RemoveClip { clip_id } => {
                let clip = timeline.remove_clip(*clip_id)?;
                Self::PlaceClip { clip }
            }
            Self::MoveClip { clip_id, start } => {
                let previous = timeline.move_clip(*clip_id, *start)?;
                Self::MoveClip {
                    clip_id: *clip_id,
                    start: previous,
                }
            }
            Self::TrimClip {
                clip_id,
                in_point,
                out_point,
            } => {
                let (in_point, out_point) =
                    timeline.trim_clip(catalog, *clip_id, *in_point, *out_point)?;
                Self::TrimClip {
                    clip_id: *clip_id,
                    in_point,
                    out_point,
                }
            }
            Self::SplitClip {
                clip_id,
                at,
                left_id,
                right_id,
            } => {
                let original = timeline
                    .clip(*clip_id)
                    .cloned()
                    .ok_or(EditError::UnknownClip(*clip_id))?;
                timeline.split_clip_with_ids(*clip_id, *at, *left_id, *right_id)?;
                // Undo split = drop both halves, restore the original.
                Self::Batch(vec![
                    Self::RemoveClip { clip_id: *right_id },
                    Self::RemoveClip { clip_id: *left_id },
                    Self::PlaceClip { clip: original },
                ])
            }
            Self::SetClipEnabled { clip_id, enabled } => {
                let previous = timeline.set_clip_enabled(*clip_id, *enabled)?;
                Self::SetClipEnabled {
                    clip_id: *clip_id,
                    enabled: previous,
                }
            }
            Self::StackEffect {
                clip_id,
                effect,
                index,
            } => {
                timeline.stack_effect(*clip_id, effect.clone(), *index)?;
                Self::RemoveEffect {
                    clip_id: *clip_id,
                    effect_id: effect.id,
                }
            }
            Self::RemoveEffect { clip_id, effect_id } => {
                let (index, effect) = timeline.remove_effect(*clip_id, *effect_id)?;
                Self::StackEffect {
                    clip_id: *clip_id,
                    effect,
                    index: Some(index),
                }
            }
            Self::AttachTransition {
                clip_id,
                transition,
            } => {
                timeline.attach_transition(*clip_id, transition.clone())?;
                Self::DetachTransition {
                    clip_id: *clip_id,
                    transition_id: transition.id,
                }
            }
            Self::DetachTransition {
                clip_id,
                transition_id,
            } => {
                let transition = timeline.detach_transition(*clip_id, *transition_id)?;
                Self::AttachTransition {
                    clip_id: *clip_id,
                    transition,
                }
            }
            Self::AddMarker { marker } => {
                let marker_id = timeline.add_marker(marker.clone())?;
                Self::RemoveMarker { marker_id }
            }
            Self::RemoveMarker { marker_id } => {
                let marker = timeline.remove_marker(*marker_id)?;
                Self::AddMarker { marker }
            }
            Self::AddGlobalFilter { filter, index } => {
                timeline.add_global_filter(filter.clone(), *index)?;
                Self::RemoveGlobalFilter {
                    filter_id: filter.id,
                }
            }
            Self::RemoveGlobalFilter { filter_id } => {
                let (index, filter) = timeline.remove_global_filter(*filter_id)?;
                Self::AddGlobalFilter {
                    filter,
                    index: Some(index),
                }
            }
            Self::Batch(commands) => {
                // Work on a scratch copy so a failure part-way leaves no trace.
                let mut scratch = timeline.clone();
                let mut inverses = Vec::with_capacity(commands.len());
                for command in commands {
                    inverses.push(command.apply(&mut scratch, catalog)?);
                }
                *timeline = scratch;
                inverses.reverse();
                Self::Batch(inverses)
            }
        };
        Ok(inverse)
    }

    /// Short human-readable label for history menus and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddTrack { .. } => "Add track",
            Self::RemoveTrack { .. } => "Remove track",
            Self::RestoreTrack { .. } => "Restore track",
            Self::SetTrackLocked { .. } => "Lock track",
            Self::ReorderTracks { .. } => "Reorder tracks",
            Self::PlaceClip { .. } => "Place clip",
            Self::RemoveClip { .. } => "Remove clip",
            Self::MoveClip { .. } => "Move clip",
            Self::TrimClip { .. } => "Trim clip",
            Self::SplitClip { .. } => "Split clip",
            Self::SetClipEnabled { .. } => "Toggle clip",
            Self::StackEffect { .. } => "Add effect",
            Self::RemoveEffect { .. } => "Remove effect",
            Self::AttachTransition { .. } => "Add transition",
            Self::DetachTransition { .. } => "Remove transition",
            Self::AddMarker { .. } => "Add marker",
            Self::RemoveMarker { .. } => "Remove marker",
            Self::AddGlobalFilter { .. } => "Add filter",
            Self::RemoveGlobalFilter { .. } => "Remove filter",
            Self::Batch(_) => "Batch edit",
        }
    }
}

// ── Undo stack ──────────────────────────────────────────────────

/// An executed command together with the command that reverses it.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub command: EditCommand,
    pub inverse: EditCommand,
}

/// Undo/redo history stack.
#[derive(Debug)]
pub struct UndoStack {
    /// Commands that have been executed (most recent last).
    undo: VecDeque<HistoryEntry>,
    /// Commands that have been undone (most recent last).
    redo: Vec<EditCommand>,
    /// Maximum history depth.
    max_depth: usize,
}

impl UndoStack {
    /// Create a new undo stack with the given maximum depth.
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Record a freshly executed command.
    /// Clears the redo stack (new action invalidates redo history).
    pub fn record(&mut self, command: EditCommand, inverse: EditCommand) {
        self.redo.clear();
        self.push_undo(HistoryEntry { command, inverse });
    }

    /// Push an entry without touching redo history (used by redo).
    pub fn push_undo(&mut self, entry: HistoryEntry) {
        self.undo.push_back(entry);
        while self.undo.len() > self.max_depth {
            self.undo.pop_front();
        }
    }

    /// Pop the most recent entry for undo.
    pub fn pop_undo(&mut self) -> Option<HistoryEntry> {
        self.undo.pop_back()
    }

    /// Remember an undone command for redo.
    pub fn push_redo(&mut self, command: EditCommand) {
        self.redo.push(command);
    }

    /// Pop the most recent undone command for redo.
    pub fn pop_redo(&mut self) -> Option<EditCommand> {
        self.redo.pop()
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Label of the command the next undo would revert.
    pub fn undo_label(&self) -> Option<&'static str> {
        self.undo.back().map(|e| e.command.label())
    }

    /// Clear all history.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Number of undo steps available.
    pub fn undo_count(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo steps available.
    pub fn redo_count(&self) -> usize {
        self.redo.len()
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(200)
    }
}

// ── Tests ───────────────────────────────────────────────────────
