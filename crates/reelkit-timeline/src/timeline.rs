//! The timeline: tracks, clips and markers for one editing session.
//!
//! Every mutator validates against a candidate state first and commits only
//! when validation passes, so a returned `EditError` means nothing changed.

use reelkit_core::{MediaCatalog, MediaId, MediaTime, ReelkitError, Result as CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::clip::Clip;
use crate::effect::{ClipEdge, Effect, Transition};
use crate::error::EditError;
use crate::id::{ClipId, EffectId, MarkerId, TimelineId, TrackId, TransitionId};
use crate::track::{Track, TrackKind};

/// Kind of marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    Standard,
    Chapter,
    Comment,
    Todo,
    SyncPoint,
}

/// A labelled point on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    pub time: MediaTime,
    pub label: String,
    pub kind: MarkerKind,
}

impl Marker {
    /// Create a standard marker.
    pub fn new(time: MediaTime, label: impl Into<String>) -> Self {
        Self {
            id: MarkerId::new(),
            time,
            label: label.into(),
            kind: MarkerKind::Standard,
        }
    }
}

/// Multi-track edit state.
///
/// The global duration is never stored; [`Timeline::total_duration`] derives
/// it from the current clip placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    id: TimelineId,
    name: String,
    tracks: Vec<Track>,
    markers: Vec<Marker>,
    /// Timeline-wide filter stack, applied to the composited output
    filters: Vec<Effect>,
}

impl Timeline {
    /// Create an empty timeline with no tracks.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TimelineId::new(),
            name: name.into(),
            tracks: Vec::new(),
            markers: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn id(&self) -> TimelineId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tracks in display order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Markers in time order.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Global filters in render order.
    pub fn global_filters(&self) -> &[Effect] {
        &self.filters
    }

    /// Find a track by ID.
    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Track IDs in display order.
    pub fn track_order(&self) -> Vec<TrackId> {
        self.tracks.iter().map(|t| t.id).collect()
    }

    /// Find a clip by ID on any track.
    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.tracks.iter().find_map(|t| t.clip(id))
    }

    /// All clips, track by track in start order.
    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.tracks.iter().flat_map(|t| t.clips.iter())
    }

    /// Number of clips across all tracks.
    pub fn clip_count(&self) -> usize {
        self.tracks.iter().map(Track::clip_count).sum()
    }

    /// Maximum over all clips of `start + duration`.
    pub fn total_duration(&self) -> MediaTime {
        self.tracks
            .iter()
            .map(Track::end)
            .max()
            .unwrap_or(MediaTime::ZERO)
    }

    // ── Tracks ──────────────────────────────────────────────────

    /// Append a new empty track with a generated name ("V1", "A2", ...).
    pub fn add_track(&mut self, kind: TrackKind) -> TrackId {
        let id = TrackId::new();
        let name = self.default_track_name(kind);
        self.tracks.push(Track::new(id, kind, name));
        id
    }

    /// Next free default name for a track of this kind.
    pub fn default_track_name(&self, kind: TrackKind) -> String {
        let count = self.tracks.iter().filter(|t| t.kind == kind).count();
        format!("{}{}", kind.prefix(), count + 1)
    }

    /// Insert a track (with any clips it carries) at `index`.
    ///
    /// Used to restore removed tracks; the track must be well formed and its
    /// ids must not collide with anything already on the timeline.
    pub fn insert_track(&mut self, index: usize, track: Track) -> Result<(), EditError> {
        if self.track(track.id).is_some() {
            return Err(EditError::DuplicateId(track.id.to_string()));
        }
        for clip in &track.clips {
            if self.clip(clip.id).is_some() {
                return Err(EditError::DuplicateId(clip.id.to_string()));
            }
        }
        track.check_well_formed().map_err(EditError::MalformedTrack)?;
        let index = index.min(self.tracks.len());
        self.tracks.insert(index, track);
        self.debug_check();
        Ok(())
    }

    /// Remove a track and all its clips. Returns its former index and the track.
    pub fn remove_track(&mut self, id: TrackId) -> Result<(usize, Track), EditError> {
        let idx = self.track_index(id)?;
        if self.tracks[idx].locked {
            return Err(EditError::TrackLocked(id));
        }
        Ok((idx, self.tracks.remove(idx)))
    }

    /// Lock or unlock a track. Returns the previous state.
    pub fn set_track_locked(&mut self, id: TrackId, locked: bool) -> Result<bool, EditError> {
        let idx = self.track_index(id)?;
        Ok(std::mem::replace(&mut self.tracks[idx].locked, locked))
    }

    /// Reorder tracks. `order` must name every current track exactly once.
    ///
    /// Returns the previous order.
    pub fn reorder_tracks(&mut self, order: &[TrackId]) -> Result<Vec<TrackId>, EditError> {
        let mismatch = EditError::TrackSetMismatch {
            expected: self.tracks.len(),
        };
        if order.len() != self.tracks.len() {
            return Err(mismatch);
        }
        let mut seen = HashSet::with_capacity(order.len());
        let mut indices = Vec::with_capacity(order.len());
        for id in order {
            if !seen.insert(*id) {
                return Err(mismatch);
            }
            match self.tracks.iter().position(|t| t.id == *id) {
                Some(idx) => indices.push(idx),
                None => return Err(mismatch),
            }
        }

        let previous = self.track_order();
        let mut slots: Vec<Option<Track>> = self.tracks.drain(..).map(Some).collect();
        self.tracks = indices
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .collect();
        self.debug_check();
        Ok(previous)
    }

    // ── Clips ───────────────────────────────────────────────────

    /// Place a new clip on a track. Returns the generated clip ID.
    pub fn place_clip(
        &mut self,
        catalog: &dyn MediaCatalog,
        track_id: TrackId,
        media_id: MediaId,
        start: MediaTime,
        in_point: MediaTime,
        out_point: MediaTime,
    ) -> Result<ClipId, EditError> {
        let clip = Clip::new(ClipId::new(), track_id, media_id, start, in_point, out_point);
        let id = clip.id;
        self.insert_clip(catalog, clip)?;
        Ok(id)
    }

    /// Place a fully built clip (effects and transitions included).
    pub fn insert_clip(&mut self, catalog: &dyn MediaCatalog, clip: Clip) -> Result<(), EditError> {
        if self.clip(clip.id).is_some() {
            return Err(EditError::DuplicateId(clip.id.to_string()));
        }
        let track_idx = self.validate_clip(Some(catalog), &clip, &[])?;
        self.tracks[track_idx].insert_sorted(clip);
        self.debug_check();
        Ok(())
    }

    /// Remove a clip. Returns the removed clip.
    pub fn remove_clip(&mut self, id: ClipId) -> Result<Clip, EditError> {
        let (track_idx, _) = self.locate_unlocked(id)?;
        self.tracks[track_idx]
            .remove(id)
            .ok_or(EditError::UnknownClip(id))
    }

    /// Move a clip to a new start on its own track. Returns the previous start.
    pub fn move_clip(&mut self, id: ClipId, new_start: MediaTime) -> Result<MediaTime, EditError> {
        let (track_idx, clip_idx) = self.locate_unlocked(id)?;
        let current = &self.tracks[track_idx].clips[clip_idx];
        let mut candidate = current.clone();
        candidate.start = new_start;
        self.validate_clip(None, &candidate, &[id])?;
        let previous = current.start;
        self.commit_replace(track_idx, candidate);
        Ok(previous)
    }

    /// Change a clip's trim window, keeping its start. Returns the previous window.
    pub fn trim_clip(
        &mut self,
        catalog: &dyn MediaCatalog,
        id: ClipId,
        in_point: MediaTime,
        out_point: MediaTime,
    ) -> Result<(MediaTime, MediaTime), EditError> {
        let (track_idx, clip_idx) = self.locate_unlocked(id)?;
        let current = &self.tracks[track_idx].clips[clip_idx];
        let mut candidate = current.clone();
        candidate.in_point = in_point;
        candidate.out_point = out_point;
        self.validate_clip(Some(catalog), &candidate, &[id])?;
        let previous = (current.in_point, current.out_point);
        self.commit_replace(track_idx, candidate);
        Ok(previous)
    }

    /// Split a clip at an absolute timeline time. Returns `(left, right)` IDs.
    pub fn split_clip(&mut self, id: ClipId, at: MediaTime) -> Result<(ClipId, ClipId), EditError> {
        self.split_clip_with_ids(id, at, ClipId::new(), ClipId::new())
    }

    /// Split using caller-chosen IDs for the two halves.
    ///
    /// The left half keeps the head transition, the right half the tail
    /// transition; both halves get the full effect stack. Transitions longer
    /// than their half are shortened to fit.
    pub fn split_clip_with_ids(
        &mut self,
        id: ClipId,
        at: MediaTime,
        left_id: ClipId,
        right_id: ClipId,
    ) -> Result<(ClipId, ClipId), EditError> {
        let (track_idx, clip_idx) = self.locate_unlocked(id)?;
        let original = &self.tracks[track_idx].clips[clip_idx];
        if !original.range().strictly_contains(at) {
            return Err(EditError::SplitOutOfBounds {
                at,
                start: original.start,
                end: original.end(),
            });
        }
        if left_id == right_id {
            return Err(EditError::DuplicateId(left_id.to_string()));
        }
        for new_id in [left_id, right_id] {
            if new_id != id && self.clip(new_id).is_some() {
                return Err(EditError::DuplicateId(new_id.to_string()));
            }
        }

        let offset = at - original.start;
        let cut = original.in_point + offset;

        let mut left = original.clone();
        left.id = left_id;
        left.out_point = cut;
        let mut right = original.clone();
        right.id = right_id;
        right.start = at;
        right.in_point = cut;

        left.transitions.retain(|t| t.edge == ClipEdge::Head);
        right.transitions.retain(|t| t.edge == ClipEdge::Tail);
        for half in [&mut left, &mut right] {
            let max = half.duration();
            for transition in half.transitions.iter_mut() {
                transition.duration = transition.duration.min(max);
            }
        }

        let track = &mut self.tracks[track_idx];
        track.clips.remove(clip_idx);
        track.clips.insert(clip_idx, right);
        track.clips.insert(clip_idx, left);
        self.debug_check();
        Ok((left_id, right_id))
    }

    /// Enable or disable a clip. Returns the previous state.
    pub fn set_clip_enabled(&mut self, id: ClipId, enabled: bool) -> Result<bool, EditError> {
        let (track_idx, clip_idx) = self.locate_unlocked(id)?;
        let clip = &mut self.tracks[track_idx].clips[clip_idx];
        Ok(std::mem::replace(&mut clip.enabled, enabled))
    }

    // ── Effects & transitions ───────────────────────────────────

    /// Push an effect onto a clip's stack, at `index` or on top.
    pub fn stack_effect(
        &mut self,
        clip_id: ClipId,
        effect: Effect,
        index: Option<usize>,
    ) -> Result<(), EditError> {
        let (track_idx, clip_idx) = self.locate_unlocked(clip_id)?;
        effect.validate()?;
        let clip = &mut self.tracks[track_idx].clips[clip_idx];
        if clip.effect_index(effect.id).is_some() {
            return Err(EditError::DuplicateId(effect.id.to_string()));
        }
        let index = index.unwrap_or(clip.effects.len()).min(clip.effects.len());
        clip.effects.insert(index, effect);
        Ok(())
    }

    /// Remove an effect from a clip. Returns its former index and the effect.
    pub fn remove_effect(
        &mut self,
        clip_id: ClipId,
        effect_id: EffectId,
    ) -> Result<(usize, Effect), EditError> {
        let (track_idx, clip_idx) = self.locate_unlocked(clip_id)?;
        let clip = &mut self.tracks[track_idx].clips[clip_idx];
        let index = clip.effect_index(effect_id).ok_or(EditError::UnknownEffect {
            clip: clip_id,
            effect: effect_id,
        })?;
        Ok((index, clip.effects.remove(index)))
    }

    /// Attach a transition to a clip edge.
    pub fn attach_transition(
        &mut self,
        clip_id: ClipId,
        transition: Transition,
    ) -> Result<(), EditError> {
        let (track_idx, clip_idx) = self.locate_unlocked(clip_id)?;
        let mut candidate = self.tracks[track_idx].clips[clip_idx].clone();
        if candidate.transitions.iter().any(|t| t.id == transition.id) {
            return Err(EditError::DuplicateId(transition.id.to_string()));
        }
        candidate.transitions.push(transition);
        self.validate_clip(None, &candidate, &[clip_id])?;
        self.tracks[track_idx].clips[clip_idx] = candidate;
        Ok(())
    }

    /// Detach a transition from a clip. Returns the removed transition.
    pub fn detach_transition(
        &mut self,
        clip_id: ClipId,
        transition_id: TransitionId,
    ) -> Result<Transition, EditError> {
        let (track_idx, clip_idx) = self.locate_unlocked(clip_id)?;
        let clip = &mut self.tracks[track_idx].clips[clip_idx];
        let index = clip
            .transitions
            .iter()
            .position(|t| t.id == transition_id)
            .ok_or(EditError::UnknownTransition {
                clip: clip_id,
                transition: transition_id,
            })?;
        Ok(clip.transitions.remove(index))
    }

    // ── Markers ─────────────────────────────────────────────────

    /// Add a marker, keeping markers in time order.
    pub fn add_marker(&mut self, marker: Marker) -> Result<MarkerId, EditError> {
        if marker.time.is_negative() {
            return Err(EditError::InvalidStart(marker.time));
        }
        if self.markers.iter().any(|m| m.id == marker.id) {
            return Err(EditError::DuplicateId(marker.id.to_string()));
        }
        let id = marker.id;
        let idx = self.markers.partition_point(|m| m.time <= marker.time);
        self.markers.insert(idx, marker);
        Ok(id)
    }

    /// Remove a marker.
    pub fn remove_marker(&mut self, id: MarkerId) -> Result<Marker, EditError> {
        let idx = self
            .markers
            .iter()
            .position(|m| m.id == id)
            .ok_or(EditError::UnknownMarker(id))?;
        Ok(self.markers.remove(idx))
    }

    // ── Global filters ──────────────────────────────────────────

    /// Insert a timeline-wide filter at `index`, or on top of the stack.
    pub fn add_global_filter(
        &mut self,
        filter: Effect,
        index: Option<usize>,
    ) -> Result<(), EditError> {
        filter.validate()?;
        if self.filters.iter().any(|f| f.id == filter.id) {
            return Err(EditError::DuplicateId(filter.id.to_string()));
        }
        let index = index.unwrap_or(self.filters.len()).min(self.filters.len());
        self.filters.insert(index, filter);
        Ok(())
    }

    /// Remove a global filter. Returns its former index and the filter.
    pub fn remove_global_filter(&mut self, id: EffectId) -> Result<(usize, Effect), EditError> {
        let index = self
            .filters
            .iter()
            .position(|f| f.id == id)
            .ok_or(EditError::UnknownFilter(id))?;
        Ok((index, self.filters.remove(index)))
    }

    // ── Validation ──────────────────────────────────────────────

    /// The single placement check every clip mutation goes through.
    ///
    /// `catalog` is `None` when the trim window is unchanged, in which case
    /// the source bound is not re-checked. `replacing` lists clips the
    /// candidate will replace and that must not count as overlaps.
    /// Returns the index of the target track.
    fn validate_clip(
        &self,
        catalog: Option<&dyn MediaCatalog>,
        clip: &Clip,
        replacing: &[ClipId],
    ) -> Result<usize, EditError> {
        let track_idx = self.track_index(clip.track_id)?;
        let track = &self.tracks[track_idx];
        if track.locked {
            return Err(EditError::TrackLocked(track.id));
        }
        if let Some(catalog) = catalog {
            let media = catalog
                .media_item(&clip.media_id)
                .ok_or_else(|| EditError::UnknownMedia(clip.media_id.clone()))?;
            check_trim(clip.in_point, clip.out_point, media.duration)?;
        }
        clip.check_shape()?;
        track.check_slot(clip.range(), replacing)?;
        Ok(track_idx)
    }

    /// Full structural check: clip shape, ordering, disjointness and unique ids.
    pub fn check_invariants(&self) -> CoreResult<()> {
        let mut track_ids = HashSet::new();
        let mut clip_ids = HashSet::new();
        for track in &self.tracks {
            if !track_ids.insert(track.id) {
                return Err(ReelkitError::Invariant(format!("duplicate track {}", track.id)));
            }
            track.check_well_formed().map_err(ReelkitError::Invariant)?;
            for clip in &track.clips {
                if !clip_ids.insert(clip.id) {
                    return Err(ReelkitError::Invariant(format!("duplicate clip {}", clip.id)));
                }
            }
        }
        if self.markers.iter().any(|m| m.time.is_negative()) {
            return Err(ReelkitError::Invariant("marker before timeline start".into()));
        }
        if self.markers.windows(2).any(|w| w[0].time > w[1].time) {
            return Err(ReelkitError::Invariant("markers out of order".into()));
        }
        let mut filter_ids = HashSet::new();
        for filter in &self.filters {
            filter
                .validate()
                .map_err(|e| ReelkitError::Invariant(format!("global filter: {e}")))?;
            if !filter_ids.insert(filter.id) {
                return Err(ReelkitError::Invariant(format!(
                    "duplicate global filter {}",
                    filter.id
                )));
            }
        }
        Ok(())
    }

    /// Check every clip against the catalog: media must exist and trims must fit.
    pub fn check_media(&self, catalog: &dyn MediaCatalog) -> Result<(), EditError> {
        for clip in self.clips() {
            let media = catalog
                .media_item(&clip.media_id)
                .ok_or_else(|| EditError::UnknownMedia(clip.media_id.clone()))?;
            check_trim(clip.in_point, clip.out_point, media.duration)?;
        }
        Ok(())
    }

    fn debug_check(&self) {
        debug_assert!(
            self.check_invariants().is_ok(),
            "timeline invariant broken after commit: {:?}",
            self.check_invariants()
        );
    }

    // ── Lookup helpers ──────────────────────────────────────────

    fn track_index(&self, id: TrackId) -> Result<usize, EditError> {
        self.tracks
            .iter()
            .position(|t| t.id == id)
            .ok_or(EditError::UnknownTrack(id))
    }

    fn locate(&self, id: ClipId) -> Result<(usize, usize), EditError> {
        self.tracks
            .iter()
            .enumerate()
            .find_map(|(t, track)| track.clip_index(id).map(|c| (t, c)))
            .ok_or(EditError::UnknownClip(id))
    }

    fn locate_unlocked(&self, id: ClipId) -> Result<(usize, usize), EditError> {
        let (track_idx, clip_idx) = self.locate(id)?;
        if self.tracks[track_idx].locked {
            return Err(EditError::TrackLocked(self.tracks[track_idx].id));
        }
        Ok((track_idx, clip_idx))
    }

    /// Swap a validated candidate in for the clip with the same ID.
    fn commit_replace(&mut self, track_idx: usize, candidate: Clip) {
        let track = &mut self.tracks[track_idx];
        track.remove(candidate.id);
        track.insert_sorted(candidate);
        self.debug_check();
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new("Untitled Timeline")
    }
}

/// `0 <= in < out <= source_duration`.
fn check_trim(
    in_point: MediaTime,
    out_point: MediaTime,
    source_duration: MediaTime,
) -> Result<(), EditError> {
    if in_point.is_negative() || in_point >= out_point || out_point > source_duration {
        return Err(EditError::InvalidTrim {
            in_point,
            out_point,
            source_duration,
        });
    }
    Ok(())
}
