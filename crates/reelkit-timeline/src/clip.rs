//! Clip types for the timeline.

use reelkit_core::{MediaId, MediaTime, TimeRange};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::effect::{ClipEdge, Effect, Transition};
use crate::error::EditError;
use crate::id::{ClipId, EffectId, TrackId};

/// A trimmed reference to a media item, placed on a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Unique clip ID
    pub id: ClipId,
    /// Clip name (displayed in UI)
    pub name: String,
    /// Source media
    pub media_id: MediaId,
    /// Owning track
    pub track_id: TrackId,
    /// Position on the timeline
    pub start: MediaTime,
    /// Source in point (inclusive)
    pub in_point: MediaTime,
    /// Source out point (exclusive)
    pub out_point: MediaTime,
    /// Effect stack, applied first to last
    pub effects: Vec<Effect>,
    /// Transitions, at most one per edge
    pub transitions: SmallVec<[Transition; 2]>,
    /// Is clip enabled
    pub enabled: bool,
}

impl Clip {
    /// Create a clip with no effects or transitions.
    pub fn new(
        id: ClipId,
        track_id: TrackId,
        media_id: MediaId,
        start: MediaTime,
        in_point: MediaTime,
        out_point: MediaTime,
    ) -> Self {
        Self {
            id,
            name: media_id.to_string(),
            media_id,
            track_id,
            start,
            in_point,
            out_point,
            effects: Vec::new(),
            transitions: SmallVec::new(),
            enabled: true,
        }
    }

    /// Duration on the timeline (`out_point - in_point`).
    #[inline]
    pub fn duration(&self) -> MediaTime {
        self.out_point - self.in_point
    }

    /// Exclusive end on the timeline.
    #[inline]
    pub fn end(&self) -> MediaTime {
        self.start + self.duration()
    }

    /// Occupied interval on the timeline.
    #[inline]
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.duration())
    }

    /// Trim window into the source media.
    #[inline]
    pub fn source_range(&self) -> TimeRange {
        TimeRange::from_start_end(self.in_point, self.out_point)
    }

    /// Map a timeline time inside this clip to a source time.
    pub fn source_time_at(&self, time: MediaTime) -> Option<MediaTime> {
        self.range()
            .contains(time)
            .then(|| self.in_point + (time - self.start))
    }

    /// Transition attached to the given edge, if any.
    pub fn transition_at(&self, edge: ClipEdge) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.edge == edge)
    }

    /// Position of an effect in the stack.
    pub fn effect_index(&self, id: EffectId) -> Option<usize> {
        self.effects.iter().position(|e| e.id == id)
    }

    /// Everything about the clip that can be checked without the catalog:
    /// start, trim shape, end overflow, effects and transitions.
    ///
    /// The source-duration bound is the caller's job.
    pub fn check_shape(&self) -> Result<(), EditError> {
        if self.start.is_negative() {
            return Err(EditError::InvalidStart(self.start));
        }
        if self.in_point.is_negative() || self.in_point >= self.out_point {
            return Err(EditError::InvalidTrim {
                in_point: self.in_point,
                out_point: self.out_point,
                source_duration: MediaTime::MAX,
            });
        }
        if self.start.checked_add(self.duration()).is_none() {
            return Err(EditError::InvalidStart(self.start));
        }

        let mut ids = Vec::with_capacity(self.effects.len());
        for effect in &self.effects {
            effect.validate()?;
            if ids.contains(&effect.id) {
                return Err(EditError::DuplicateId(effect.id.to_string()));
            }
            ids.push(effect.id);
        }

        let mut edges: SmallVec<[ClipEdge; 2]> = SmallVec::new();
        for transition in &self.transitions {
            if edges.contains(&transition.edge) {
                return Err(EditError::InvalidTransition(format!(
                    "clip {} already has a {:?} transition",
                    self.id, transition.edge
                )));
            }
            edges.push(transition.edge);
            if transition.duration <= MediaTime::ZERO || transition.duration > self.duration() {
                return Err(EditError::InvalidTransition(format!(
                    "duration {} does not fit clip of {}",
                    transition.duration,
                    self.duration()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{EffectKind, TransitionKind};

    fn clip() -> Clip {
        Clip::new(
            ClipId::new(),
            TrackId::new(),
            MediaId::new("interview"),
            MediaTime::from_secs(10),
            MediaTime::from_secs(2),
            MediaTime::from_secs(7),
        )
    }

    #[test]
    fn test_duration_and_end() {
        let clip = clip();
        assert_eq!(clip.duration(), MediaTime::from_secs(5));
        assert_eq!(clip.end(), MediaTime::from_secs(15));
        assert_eq!(clip.name, "interview");
    }

    #[test]
    fn test_source_time_mapping() {
        let clip = clip();
        assert_eq!(
            clip.source_time_at(MediaTime::from_secs(11)),
            Some(MediaTime::from_secs(3))
        );
        assert_eq!(clip.source_time_at(MediaTime::from_secs(15)), None);
        assert_eq!(clip.source_time_at(MediaTime::from_secs(9)), None);
    }

    #[test]
    fn test_check_shape() {
        assert!(clip().check_shape().is_ok());

        let mut late = clip();
        late.start = MediaTime::from_micros(i64::MAX - 1_000_000);
        assert!(matches!(late.check_shape(), Err(EditError::InvalidStart(_))));

        let mut early = clip();
        early.start = MediaTime::from_secs(-5);
        assert!(matches!(early.check_shape(), Err(EditError::InvalidStart(_))));

        let mut empty = clip();
        empty.out_point = empty.in_point;
        assert!(matches!(empty.check_shape(), Err(EditError::InvalidTrim { .. })));

        let mut loud = clip();
        loud.effects.push(Effect::new(EffectKind::Glow).with_intensity(5.0));
        assert!(matches!(loud.check_shape(), Err(EditError::InvalidEffect(_))));

        let mut nan = clip();
        nan.effects.push(Effect::new(EffectKind::Blur).with_intensity(f32::NAN));
        assert!(matches!(nan.check_shape(), Err(EditError::InvalidEffect(_))));
    }

    #[test]
    fn test_check_shape_transitions() {
        let fade = |edge, secs| Transition::new(TransitionKind::Fade, edge, MediaTime::from_secs(secs));

        let mut doubled = clip();
        doubled.transitions.push(fade(ClipEdge::Head, 1));
        doubled.transitions.push(fade(ClipEdge::Head, 1));
        assert!(matches!(doubled.check_shape(), Err(EditError::InvalidTransition(_))));

        let mut long = clip();
        long.transitions.push(fade(ClipEdge::Tail, 6));
        assert!(matches!(long.check_shape(), Err(EditError::InvalidTransition(_))));

        let mut both = clip();
        both.transitions.push(fade(ClipEdge::Head, 1));
        both.transitions.push(fade(ClipEdge::Tail, 5));
        assert!(both.check_shape().is_ok());
    }
}
