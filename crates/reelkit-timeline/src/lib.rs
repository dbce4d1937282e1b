//! Reelkit Timeline - multi-track edit model
//!
//! Implements the editable state of a short-form video project:
//! - Tracks holding non-overlapping clips in start order
//! - Effect stacks, edge transitions and markers
//! - Atomic validate-then-apply edit operations
//! - Reversible edit commands with undo/redo
//! - Versioned JSON persistence

pub mod clip;
pub mod edit;
pub mod effect;
pub mod error;
pub mod id;
pub mod serialization;
pub mod session;
pub mod timeline;
pub mod track;

pub use clip::Clip;
pub use edit::{EditCommand, HistoryEntry, UndoStack};
pub use effect::{
    ClipEdge, CurvePoint, Effect, EffectKind, ParamMap, ParamValue, Transition, TransitionKind,
};
pub use error::EditError;
pub use id::{ClipId, EffectId, MarkerId, TimelineId, TrackId, TransitionId};
pub use serialization::{TimelineFile, CURRENT_VERSION};
pub use session::{EditSession, SharedCatalog, SharedSession};
pub use timeline::{Marker, MarkerKind, Timeline};
pub use track::{Track, TrackKind};
