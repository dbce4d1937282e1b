//! Editing session: the single owner of a timeline and its history.
//!
//! Every public mutator builds an [`EditCommand`], applies it and records
//! the inverse, so all edits are undoable. Observers poll
//! [`EditSession::revision`] to learn that something changed.

use parking_lot::Mutex;
use reelkit_core::{MediaCatalog, MediaId, MediaTime, Result as CoreResult};
use std::sync::Arc;

use crate::clip::Clip;
use crate::edit::{EditCommand, HistoryEntry, UndoStack};
use crate::effect::{Effect, Transition};
use crate::error::EditError;
use crate::id::{ClipId, EffectId, MarkerId, TrackId, TransitionId};
use crate::serialization::TimelineFile;
use crate::timeline::{Marker, Timeline};
use crate::track::TrackKind;

/// Catalog handle shared between the session and the application.
pub type SharedCatalog = Arc<dyn MediaCatalog + Send + Sync>;

/// A session behind the single-writer lock. Edits and export resolution
/// both take the lock, so a resolve never sees a half-applied edit.
pub type SharedSession = Arc<Mutex<EditSession>>;

/// Owns a timeline, the media catalog handle and the undo history.
pub struct EditSession {
    timeline: Timeline,
    catalog: SharedCatalog,
    history: UndoStack,
    revision: u64,
}

impl EditSession {
    /// Start a session on an existing timeline.
    pub fn new(timeline: Timeline, catalog: SharedCatalog) -> Self {
        Self {
            timeline,
            catalog,
            history: UndoStack::default(),
            revision: 0,
        }
    }

    /// Open a loaded file, checking every clip against the catalog.
    pub fn open(file: TimelineFile, catalog: SharedCatalog) -> CoreResult<Self> {
        let timeline = file.into_timeline(catalog.as_ref())?;
        tracing::info!(name = timeline.name(), "opened timeline");
        Ok(Self::new(timeline, catalog))
    }

    /// Snapshot for saving.
    pub fn to_file(&self) -> TimelineFile {
        TimelineFile::new(self.timeline.clone())
    }

    /// Move the session behind a lock.
    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn catalog(&self) -> &SharedCatalog {
        &self.catalog
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Bumped on every successful edit, undo or redo.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Total duration of the current timeline.
    pub fn total_duration(&self) -> MediaTime {
        self.timeline.total_duration()
    }

    /// Apply a command and record it for undo.
    pub fn execute(&mut self, command: EditCommand) -> Result<(), EditError> {
        match command.apply(&mut self.timeline, self.catalog.as_ref()) {
            Ok(inverse) => {
                self.revision += 1;
                tracing::debug!(
                    edit = command.label(),
                    revision = self.revision,
                    "edit applied"
                );
                self.history.record(command, inverse);
                Ok(())
            }
            Err(err) => {
                tracing::debug!(edit = command.label(), %err, "edit rejected");
                Err(err)
            }
        }
    }

    /// Revert the most recent edit. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, EditError> {
        let Some(entry) = self.history.pop_undo() else {
            return Ok(false);
        };
        match entry.inverse.apply(&mut self.timeline, self.catalog.as_ref()) {
            Ok(_) => {
                self.revision += 1;
                tracing::debug!(edit = entry.command.label(), "undo");
                self.history.push_redo(entry.command);
                Ok(true)
            }
            Err(err) => {
                // Catalog changed under us; keep the entry so nothing is lost.
                tracing::warn!(edit = entry.command.label(), %err, "undo failed");
                self.history.push_undo(entry);
                Err(err)
            }
        }
    }

    /// Re-apply the most recently undone edit. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool, EditError> {
        let Some(command) = self.history.pop_redo() else {
            return Ok(false);
        };
        match command.apply(&mut self.timeline, self.catalog.as_ref()) {
            Ok(inverse) => {
                self.revision += 1;
                tracing::debug!(edit = command.label(), "redo");
                self.history.push_undo(HistoryEntry { command, inverse });
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(edit = command.label(), %err, "redo failed");
                self.history.push_redo(command);
                Err(err)
            }
        }
    }

    // ── Tracks ──────────────────────────────────────────────────

    /// Append a track with the next default name for its kind.
    pub fn add_track(&mut self, kind: TrackKind) -> Result<TrackId, EditError> {
        let track_id = TrackId::new();
        let name = self.timeline.default_track_name(kind);
        self.execute(EditCommand::AddTrack {
            track_id,
            kind,
            name,
        })?;
        Ok(track_id)
    }

    pub fn remove_track(&mut self, track_id: TrackId) -> Result<(), EditError> {
        self.execute(EditCommand::RemoveTrack { track_id })
    }

    pub fn set_track_locked(&mut self, track_id: TrackId, locked: bool) -> Result<(), EditError> {
        self.execute(EditCommand::SetTrackLocked { track_id, locked })
    }

    pub fn reorder_tracks(&mut self, order: &[TrackId]) -> Result<(), EditError> {
        self.execute(EditCommand::ReorderTracks {
            order: order.to_vec(),
        })
    }

    // ── Clips ───────────────────────────────────────────────────

    pub fn place_clip(
        &mut self,
        track_id: TrackId,
        media_id: MediaId,
        start: MediaTime,
        in_point: MediaTime,
        out_point: MediaTime,
    ) -> Result<ClipId, EditError> {
        let clip = Clip::new(ClipId::new(), track_id, media_id, start, in_point, out_point);
        let clip_id = clip.id;
        self.execute(EditCommand::PlaceClip { clip })?;
        Ok(clip_id)
    }

    pub fn remove_clip(&mut self, clip_id: ClipId) -> Result<(), EditError> {
        self.execute(EditCommand::RemoveClip { clip_id })
    }

    pub fn move_clip(&mut self, clip_id: ClipId, start: MediaTime) -> Result<(), EditError> {
        self.execute(EditCommand::MoveClip { clip_id, start })
    }

    pub fn trim_clip(
        &mut self,
        clip_id: ClipId,
        in_point: MediaTime,
        out_point: MediaTime,
    ) -> Result<(), EditError> {
        self.execute(EditCommand::TrimClip {
            clip_id,
            in_point,
            out_point,
        })
    }

    /// Split a clip at an absolute time. Returns `(left, right)` IDs.
    pub fn split_clip(
        &mut self,
        clip_id: ClipId,
        at: MediaTime,
    ) -> Result<(ClipId, ClipId), EditError> {
        let (left_id, right_id) = (ClipId::new(), ClipId::new());
        self.execute(EditCommand::SplitClip {
            clip_id,
            at,
            left_id,
            right_id,
        })?;
        Ok((left_id, right_id))
    }

    pub fn set_clip_enabled(&mut self, clip_id: ClipId, enabled: bool) -> Result<(), EditError> {
        self.execute(EditCommand::SetClipEnabled { clip_id, enabled })
    }

    // ── Effects & transitions ───────────────────────────────────

    /// Stack an effect at `index`, or on top when `None`.
    pub fn stack_effect(
        &mut self,
        clip_id: ClipId,
        effect: Effect,
        index: Option<usize>,
    ) -> Result<EffectId, EditError> {
        let effect_id = effect.id;
        self.execute(EditCommand::StackEffect {
            clip_id,
            effect,
            index,
        })?;
        Ok(effect_id)
    }

    pub fn remove_effect(&mut self, clip_id: ClipId, effect_id: EffectId) -> Result<(), EditError> {
        self.execute(EditCommand::RemoveEffect { clip_id, effect_id })
    }

    pub fn attach_transition(
        &mut self,
        clip_id: ClipId,
        transition: Transition,
    ) -> Result<TransitionId, EditError> {
        let transition_id = transition.id;
        self.execute(EditCommand::AttachTransition {
            clip_id,
            transition,
        })?;
        Ok(transition_id)
    }

    pub fn detach_transition(
        &mut self,
        clip_id: ClipId,
        transition_id: TransitionId,
    ) -> Result<(), EditError> {
        self.execute(EditCommand::DetachTransition {
            clip_id,
            transition_id,
        })
    }

    // ── Markers ─────────────────────────────────────────────────

    pub fn add_marker(&mut self, marker: Marker) -> Result<MarkerId, EditError> {
        let marker_id = marker.id;
        self.execute(EditCommand::AddMarker { marker })?;
        Ok(marker_id)
    }

    pub fn remove_marker(&mut self, marker_id: MarkerId) -> Result<(), EditError> {
        self.execute(EditCommand::RemoveMarker { marker_id })
    }

    // ── Global filters ──────────────────────────────────────────

    /// Push a timeline-wide filter. Returns its ID.
    pub fn add_global_filter(
        &mut self,
        filter: Effect,
        index: Option<usize>,
    ) -> Result<EffectId, EditError> {
        let filter_id = filter.id;
        self.execute(EditCommand::AddGlobalFilter { filter, index })?;
        Ok(filter_id)
    }

    pub fn remove_global_filter(&mut self, filter_id: EffectId) -> Result<(), EditError> {
        self.execute(EditCommand::RemoveGlobalFilter { filter_id })
    }
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("timeline", &self.timeline.name())
            .field("revision", &self.revision)
            .field("undo", &self.history.undo_count())
            .field("redo", &self.history.redo_count())
            .finish()
    }
}
